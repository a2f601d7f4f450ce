//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap geocoder and One Call forecast source
//! - The search pipeline and its published state
//! - Background palette derivation from current conditions
//!
//! It is used by `citycast-cli`, but any front end can drive a [`Pipeline`]
//! and render what [`Pipeline::subscribe`] publishes.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod theme;

pub use config::Config;
pub use error::WeatherError;
pub use model::{
    Condition, CurrentConditions, ForecastPoint, GeoResult, PlaceQuery, Temperature,
    WeatherBundle,
};
pub use pipeline::{AppState, Pipeline};
pub use provider::{ForecastSource, Geocoder, openweather::OpenWeatherClient};
pub use theme::{ThemePalette, derive_palette, palette_for};
