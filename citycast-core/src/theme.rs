//! Background palette derived from the current condition and day/night state.
//!
//! Matched conditions yield two gradient stops; the fallback has three.

use serde::Serialize;

use crate::pipeline::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThemePalette(&'static [&'static str]);

impl ThemePalette {
    pub const CLEAR_DAY: Self = Self(&["#4a90e2", "#81c7f5"]);
    pub const CLEAR_NIGHT: Self = Self(&["#0c1445", "#3b5998"]);
    pub const CLOUDS_DAY: Self = Self(&["#6c7a89", "#95a5a6"]);
    pub const CLOUDS_NIGHT: Self = Self(&["#2c3e50", "#34495e"]);
    pub const RAIN: Self = Self(&["#546e7a", "#37474f"]);
    pub const SNOW: Self = Self(&["#b0c4de", "#a4b0be"]);
    pub const DEFAULT: Self = Self(&["#4c669f", "#3b5998", "#192f6a"]);

    /// Gradient stops in order, as `#rrggbb`.
    pub fn stops(&self) -> &'static [&'static str] {
        self.0
    }

    pub fn rgb(&self) -> Vec<Rgb> {
        self.0.iter().filter_map(|hex| Rgb::from_hex(hex)).collect()
    }
}

/// Palette for a primary condition such as `"Clear"` or `"Rain"`.
/// Rules are checked in order and the first substring match wins.
pub fn derive_palette(condition: &str, is_day: bool) -> ThemePalette {
    if condition.contains("Clear") {
        if is_day { ThemePalette::CLEAR_DAY } else { ThemePalette::CLEAR_NIGHT }
    } else if condition.contains("Clouds") {
        if is_day { ThemePalette::CLOUDS_DAY } else { ThemePalette::CLOUDS_NIGHT }
    } else if condition.contains("Rain") || condition.contains("Drizzle") {
        ThemePalette::RAIN
    } else if condition.contains("Snow") {
        ThemePalette::SNOW
    } else {
        ThemePalette::DEFAULT
    }
}

/// Palette for whatever the pipeline currently shows.
pub fn palette_for(state: &AppState) -> ThemePalette {
    match state {
        AppState::Ready(bundle) => derive_palette(
            &bundle.current.primary_condition().main,
            bundle.current.is_day(),
        ),
        _ => ThemePalette::DEFAULT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}
