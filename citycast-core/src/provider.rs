use crate::{
    Config, WeatherError,
    model::{GeoResult, PlaceQuery, WeatherBundle},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Resolves a free-text place name to its best match.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve(&self, query: &PlaceQuery) -> Result<GeoResult, WeatherError>;
}

/// Fetches current, hourly and daily weather for resolved coordinates.
///
/// The returned bundle's `name` is whatever the source knows; the pipeline
/// overwrites it with the geocoded canonical name.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, place: &GeoResult) -> Result<WeatherBundle, WeatherError>;
}

/// Construct the OpenWeatherMap client from config.
///
/// A missing or placeholder key is not an error here: every lookup made with
/// the client fails with [`WeatherError::MissingCredential`] instead, so the
/// caller can still surface it as pipeline state.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.usable_api_key().map(str::to_owned);
    if api_key.is_none() {
        tracing::warn!("no usable OpenWeatherMap API key configured");
    }

    OpenWeatherClient::new(api_key, config.base_url())
}
