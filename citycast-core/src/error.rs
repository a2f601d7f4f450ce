use thiserror::Error;

/// Terminal failure of one pipeline run.
///
/// The `Display` text of every variant is the exact message shown to the user.
/// Underlying causes are logged where the error is produced, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// No usable API key: absent, blank, or still the placeholder value.
    #[error("Please add your OpenWeatherMap API key.")]
    MissingCredential,

    /// Geocoding request could not be sent or returned a non-success status.
    #[error("Failed to fetch city coordinates.")]
    GeocodeTransport,

    /// Geocoding succeeded but matched nothing.
    #[error("Could not find city: \"{0}\"")]
    CityNotFound(String),

    /// One Call request returned a non-success status.
    #[error("API Key Error. Ensure it is valid and authorized for One Call API.")]
    ForecastAuth,

    /// Anything else: malformed payloads, forecast transport failures.
    #[error("An unknown error occurred.")]
    Unknown,
}
