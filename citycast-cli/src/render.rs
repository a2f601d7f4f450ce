use std::fmt::{self, Write};

use citycast_core::{
    AppState, Condition, ForecastPoint, Temperature, WeatherBundle, palette_for, theme::Rgb,
};

const HOURLY_POINTS: usize = 24;
const DAILY_POINTS: usize = 8;

/// Human-readable view of a pipeline state.
pub fn state(state: &AppState, color: bool) -> String {
    match state {
        AppState::Idle => String::new(),
        AppState::Loading { city } => format!("Loading weather for {city}...\n"),
        AppState::Error(message) => format!("Error: {message}\n"),
        AppState::Ready(bundle) => {
            let mut out = String::new();
            // Writing into a String cannot fail.
            let _ = write_ready(&mut out, bundle, state, color);
            out
        }
    }
}

fn write_ready(
    out: &mut String,
    bundle: &WeatherBundle,
    state: &AppState,
    color: bool,
) -> fmt::Result {
    let current = &bundle.current;
    let primary = current.primary_condition();

    writeln!(
        out,
        "{}  {} {} ({})",
        bundle.name,
        glyph(&primary.main, current.is_day()),
        primary.main,
        primary.description
    )?;
    writeln!(out, "  {:.0}°F, feels like {:.0}°F", current.temperature, current.feels_like)?;
    writeln!(
        out,
        "  Humidity {}%  UV {:.1}  Wind {:.1} mph",
        current.humidity, current.uv_index, current.wind_speed
    )?;
    writeln!(out, "  Icon {}", primary.icon_url())?;

    writeln!(out, "\nNext {HOURLY_POINTS} hours")?;
    for point in bundle.hourly.iter().take(HOURLY_POINTS) {
        writeln!(out, "  {}", point_line(bundle, point, "%H:%M"))?;
    }

    writeln!(out, "\n{DAILY_POINTS}-day forecast")?;
    for point in bundle.daily.iter().take(DAILY_POINTS) {
        writeln!(out, "  {}", point_line(bundle, point, "%a %m/%d"))?;
    }

    let palette = palette_for(state);
    write!(out, "\nTheme")?;
    for (hex, rgb) in palette.stops().iter().zip(palette.rgb()) {
        write!(out, "  {hex}")?;
        if color {
            write!(out, " {}", swatch(rgb))?;
        }
    }
    writeln!(out)
}

fn point_line(bundle: &WeatherBundle, point: &ForecastPoint, time_format: &str) -> String {
    let when = bundle
        .local_time(point.dt)
        .map(|t| t.format(time_format).to_string())
        .unwrap_or_else(|| point.dt.to_string());

    let primary: &Condition = point.primary_condition();
    format!(
        "{when:<9} {:>11}  {} {}",
        temperature(point.temperature),
        glyph(&primary.main, true),
        primary.main
    )
}

fn temperature(temp: Temperature) -> String {
    match temp {
        Temperature::Scalar(t) => format!("{t:.0}°F"),
        Temperature::Range { min, max } => format!("{min:.0}°F/{max:.0}°F"),
    }
}

fn glyph(condition: &str, is_day: bool) -> &'static str {
    match condition {
        "Clear" if is_day => "☀",
        "Clear" => "☾",
        "Clouds" => "☁",
        "Rain" | "Drizzle" => "☂",
        "Snow" => "❄",
        "Thunderstorm" => "⚡",
        _ => "≋",
    }
}

fn swatch(rgb: Rgb) -> String {
    format!("\x1b[48;2;{};{};{}m    \x1b[0m", rgb.r, rgb.g, rgb.b)
}
