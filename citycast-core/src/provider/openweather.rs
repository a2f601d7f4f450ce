use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    WeatherError,
    model::{
        Condition, CurrentConditions, ForecastPoint, GeoResult, PlaceQuery, Temperature,
        WeatherBundle,
    },
};

use super::{ForecastSource, Geocoder};

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const UNITS: &str = "imperial";
const EXCLUDE: &str = "minutely,alerts";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// OpenWeatherMap client serving both the geocoding and One Call endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)).build()?;

        Ok(Self { api_key, base_url: base_url.into(), http })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingCredential)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    async fn resolve(&self, query: &PlaceQuery) -> Result<GeoResult, WeatherError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, GEOCODE_PATH);

        debug!(city = %query, "geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[("q", query.as_str()), ("limit", "1"), ("appid", api_key)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to send geocoding request");
                WeatherError::GeocodeTransport
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(error = %e, "failed to read geocoding response body");
            WeatherError::GeocodeTransport
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "geocoding request failed");
            return Err(WeatherError::GeocodeTransport);
        }

        let matches: Vec<OwGeoMatch> = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "failed to parse geocoding JSON");
            WeatherError::Unknown
        })?;

        let best = matches
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::CityNotFound(query.to_string()))?;

        Ok(GeoResult { latitude: best.lat, longitude: best.lon, canonical_name: best.name })
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    async fn fetch(&self, place: &GeoResult) -> Result<WeatherBundle, WeatherError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, ONE_CALL_PATH);
        let lat = place.latitude.to_string();
        let lon = place.longitude.to_string();

        debug!(%lat, %lon, "fetching One Call forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", UNITS),
                ("exclude", EXCLUDE),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to send One Call request");
                WeatherError::Unknown
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(error = %e, "failed to read One Call response body");
            WeatherError::Unknown
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "One Call request failed");
            return Err(WeatherError::ForecastAuth);
        }

        let parsed: OwOneCall = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "failed to parse One Call JSON");
            WeatherError::Unknown
        })?;

        parsed.into_bundle(place.canonical_name.clone())
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    dt: i64,
    // Absent during polar day/night.
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    uvi: f64,
    wind_speed: f64,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct OwHourly {
    dt: i64,
    temp: f64,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    temp: OwDailyTemp,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct OwOneCall {
    #[serde(default)]
    timezone_offset: i32,
    current: OwCurrent,
    #[serde(default)]
    hourly: Vec<OwHourly>,
    #[serde(default)]
    daily: Vec<OwDaily>,
}

impl OwOneCall {
    fn into_bundle(self, name: String) -> Result<WeatherBundle, WeatherError> {
        let current = self.current;
        let current = CurrentConditions {
            dt: current.dt,
            sunrise: current.sunrise,
            sunset: current.sunset,
            temperature: current.temp,
            feels_like: current.feels_like,
            humidity: current.humidity,
            uv_index: current.uvi,
            wind_speed: current.wind_speed,
            conditions: non_empty(current.weather, "current")?,
        };

        Ok(WeatherBundle {
            name,
            timezone_offset: self.timezone_offset,
            current,
            hourly: self
                .hourly
                .into_iter()
                .map(|h| point(h.dt, Temperature::Scalar(h.temp), h.weather, "hourly"))
                .collect::<Result<_, _>>()?,
            daily: self
                .daily
                .into_iter()
                .map(|d| {
                    let temperature = Temperature::Range { min: d.temp.min, max: d.temp.max };
                    point(d.dt, temperature, d.weather, "daily")
                })
                .collect::<Result<_, _>>()?,
        })
    }
}

fn point(
    dt: i64,
    temperature: Temperature,
    weather: Vec<Condition>,
    series: &str,
) -> Result<ForecastPoint, WeatherError> {
    non_empty(weather, series).map(|conditions| ForecastPoint { dt, temperature, conditions })
}

fn non_empty(conditions: Vec<Condition>, series: &str) -> Result<Vec<Condition>, WeatherError> {
    if conditions.is_empty() {
        warn!(series, "One Call entry has an empty weather list");
        return Err(WeatherError::Unknown);
    }
    Ok(conditions)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
