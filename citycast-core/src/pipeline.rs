//! Search pipeline: place name → coordinates → weather bundle → published state.
//!
//! State lives in a single `watch` slot that is replaced wholesale at each
//! transition, so subscribers only ever observe a complete [`AppState`].

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    Config, WeatherError,
    model::{PlaceQuery, WeatherBundle},
    provider::{ForecastSource, Geocoder, client_from_config},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum AppState {
    /// Nothing requested yet.
    Idle,
    Loading { city: String },
    Ready(Box<WeatherBundle>),
    /// User-facing message of the [`WeatherError`] that ended the run.
    Error(String),
}

pub struct Pipeline {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastSource>,
    default_city: PlaceQuery,
    city: Mutex<Option<String>>,
    /// Bumped on every trigger; only the newest run may publish.
    generation: AtomicU64,
    state: watch::Sender<AppState>,
}

impl Pipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastSource>,
        default_city: &str,
    ) -> Self {
        let (state, _) = watch::channel(AppState::Idle);

        Self {
            geocoder,
            forecast,
            default_city: PlaceQuery::parse(default_city).unwrap_or_default(),
            city: Mutex::new(None),
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Pipeline backed by OpenWeatherMap for both stages.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(client_from_config(config)?);
        Ok(Self::new(client.clone(), client, config.default_city()))
    }

    /// Receiver that is notified on every published transition.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn current_city(&self) -> Option<String> {
        self.city.lock().clone()
    }

    /// Initial load with the default city.
    pub async fn mount(&self) -> AppState {
        let query = self.default_city.clone();
        *self.city.lock() = Some(query.to_string());
        self.trigger(query).await
    }

    /// Handle a search submission.
    ///
    /// Blank input, or the city that is already current, is a no-op: nothing
    /// is requested and the state is left untouched. Returns whether a run
    /// was started.
    pub async fn submit(&self, raw: &str) -> bool {
        let Some(query) = PlaceQuery::parse(raw) else {
            debug!("ignoring blank search");
            return false;
        };

        {
            let mut city = self.city.lock();
            if city.as_deref() == Some(query.as_str()) {
                debug!(city = %query, "city unchanged, not refetching");
                return false;
            }
            *city = Some(query.to_string());
        }

        self.trigger(query).await;
        true
    }

    /// Run both stages for `query` and publish the outcome.
    ///
    /// Returns the terminal state this run produced. If another run was
    /// triggered in the meantime, that state is not published.
    pub async fn trigger(&self, query: PlaceQuery) -> AppState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, AppState::Loading { city: query.to_string() });

        let outcome = match self.run(&query).await {
            Ok(bundle) => AppState::Ready(Box::new(bundle)),
            Err(err) => AppState::Error(err.to_string()),
        };

        self.publish(generation, outcome.clone());
        outcome
    }

    async fn run(&self, query: &PlaceQuery) -> Result<WeatherBundle, WeatherError> {
        let place = self.geocoder.resolve(query).await?;
        debug!(
            city = %query,
            name = %place.canonical_name,
            lat = place.latitude,
            lon = place.longitude,
            "resolved"
        );

        let mut bundle = self.forecast.fetch(&place).await?;
        if !bundle.has_conditions() {
            warn!(name = %place.canonical_name, "forecast bundle has an empty condition list");
            return Err(WeatherError::Unknown);
        }
        bundle.name = place.canonical_name;
        Ok(bundle)
    }

    fn publish(&self, generation: u64, next: AppState) -> bool {
        // The generation check and the write happen under the channel's lock,
        // so a newer run's Loading can never be overwritten by an older result.
        self.state.send_if_modified(|slot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "discarding result of superseded run");
                return false;
            }

            match &next {
                AppState::Idle => {}
                AppState::Loading { city } => debug!(%city, "loading"),
                AppState::Ready(bundle) => info!(name = %bundle.name, "weather ready"),
                AppState::Error(message) => warn!(%message, "weather lookup failed"),
            }

            *slot = next;
            true
        })
    }
}
