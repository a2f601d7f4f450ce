use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CITY;

/// A city name as typed by the user, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaceQuery(String);

impl PlaceQuery {
    /// Trim `raw`; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlaceQuery {
    fn default() -> Self {
        Self(DEFAULT_CITY.to_string())
    }
}

impl std::fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best geocoding match for a [`PlaceQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoResult {
    pub latitude: f64,
    pub longitude: f64,
    pub canonical_name: String,
}

/// One entry of a condition list, e.g. `{ main: "Rain", description: "light rain", icon: "10d" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    /// Observation time, Unix seconds.
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub uv_index: f64,
    pub wind_speed: f64,
    /// Never empty; the first entry is the primary condition.
    pub conditions: Vec<Condition>,
}

impl CurrentConditions {
    /// Strictly between sunrise and sunset. Either bound itself counts as night.
    pub fn is_day(&self) -> bool {
        self.sunrise < self.dt && self.dt < self.sunset
    }

    pub fn primary_condition(&self) -> &Condition {
        &self.conditions[0]
    }
}

/// Hourly points carry a single reading, daily points a low/high pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Temperature {
    Scalar(f64),
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub dt: i64,
    pub temperature: Temperature,
    pub conditions: Vec<Condition>,
}

impl ForecastPoint {
    pub fn primary_condition(&self) -> &Condition {
        &self.conditions[0]
    }
}

/// Current, hourly and daily weather for one resolved place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherBundle {
    /// Canonical place name from geocoding; the forecast API has none.
    pub name: String,
    /// Seconds east of UTC for the place's local time.
    pub timezone_offset: i32,
    pub current: CurrentConditions,
    pub hourly: Vec<ForecastPoint>,
    pub daily: Vec<ForecastPoint>,
}

impl WeatherBundle {
    /// Every condition list, current and per point, has a primary entry.
    pub fn has_conditions(&self) -> bool {
        !self.current.conditions.is_empty()
            && self.hourly.iter().chain(&self.daily).all(|p| !p.conditions.is_empty())
    }

    /// Local wall-clock time at the bundle's location for a Unix timestamp.
    pub fn local_time(&self, ts: i64) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.timezone_offset)?;
        DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&offset))
    }
}
