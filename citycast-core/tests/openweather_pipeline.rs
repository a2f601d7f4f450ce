//! End-to-end pipeline tests running the real OpenWeatherMap client against wiremock.

use std::sync::Arc;

use async_trait::async_trait;
use citycast_core::{
    AppState, Config, GeoResult, Geocoder, OpenWeatherClient, Pipeline, PlaceQuery, ThemePalette,
    WeatherError, palette_for,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "TEST_KEY";

fn config_for(server: &MockServer) -> Config {
    Config {
        api_key: Some(KEY.into()),
        default_city: Some("Irvine".into()),
        base_url: Some(server.uri()),
    }
}

fn condition(main: &str, icon: &str) -> serde_json::Value {
    json!([{ "id": 800, "main": main, "description": main.to_lowercase(), "icon": icon }])
}

/// One Call payload with `dt` between sunrise and sunset.
fn one_call(main: &str) -> serde_json::Value {
    let hourly: Vec<_> = (0..48i64)
        .map(|h| {
            json!({
                "dt": 1_700_000_000 + h * 3600,
                "temp": 70.0 + h as f64 / 10.0,
                "weather": condition(main, "01d"),
            })
        })
        .collect();
    let daily: Vec<_> = (0..8i64)
        .map(|d| json!({
            "dt": 1_699_988_400 + d * 86_400,
            "temp": { "day": 74.0, "min": 58.0, "max": 76.0, "night": 60.0, "eve": 68.0, "morn": 59.0 },
            "weather": condition(main, "01d"),
        }))
        .collect();

    json!({
        "lat": 33.68,
        "lon": -117.82,
        "timezone": "America/Los_Angeles",
        "timezone_offset": -28800,
        "current": {
            "dt": 1_700_000_000,
            "sunrise": 1_699_971_000,
            "sunset": 1_700_009_000,
            "temp": 72.3,
            "feels_like": 71.1,
            "humidity": 35,
            "uvi": 4.2,
            "wind_speed": 6.9,
            "weather": condition(main, "01d"),
        },
        "hourly": hourly,
        "daily": daily,
    })
}

fn irvine() -> serde_json::Value {
    json!([{ "lat": 33.68, "lon": -117.82, "name": "Irvine" }])
}

async fn mount_geocode(server: &MockServer, query: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", query))
        .and(query_param("limit", "1"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_one_call(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("lat", "33.68"))
        .and(query_param("lon", "-117.82"))
        .and(query_param("units", "imperial"))
        .and(query_param("exclude", "minutely,alerts"))
        .and(query_param("appid", KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn mount_with_default_city_reaches_ready() {
    let server = MockServer::start().await;
    let irvine = json!([{ "lat": 33.68, "lon": -117.82, "name": "Irvine", "country": "US" }]);
    mount_geocode(&server, "Irvine", irvine).await;
    mount_one_call(&server, ResponseTemplate::new(200).set_body_json(one_call("Clear"))).await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    let state = pipeline.state();
    let AppState::Ready(bundle) = &state else {
        panic!("expected Ready, got {state:?}");
    };
    assert_eq!(bundle.name, "Irvine");
    assert_eq!(bundle.hourly.len(), 48);
    assert_eq!(bundle.daily.len(), 8);
    assert!(bundle.current.is_day());
    assert_eq!(palette_for(&state), ThemePalette::CLEAR_DAY);
    assert_eq!(palette_for(&state).stops(), ["#4a90e2", "#81c7f5"]);
}

#[tokio::test]
async fn ready_bundle_carries_canonical_name_not_input() {
    let server = MockServer::start().await;
    let matches = json!([{ "lat": 33.68, "lon": -117.82, "name": "New York County" }]);
    mount_geocode(&server, "new york", matches).await;
    mount_one_call(&server, ResponseTemplate::new(200).set_body_json(one_call("Clouds"))).await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    assert!(pipeline.submit("  new york ").await);

    match pipeline.state() {
        AppState::Ready(bundle) => assert_eq!(bundle.name, "New York County"),
        other => panic!("expected Ready, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_city_yields_not_found_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Nowhereville", json!([])).await;
    Mock::given(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.submit("Nowhereville").await;

    assert_eq!(pipeline.state(), AppState::Error("Could not find city: \"Nowhereville\"".into()));
}

#[tokio::test]
async fn unauthorized_forecast_yields_api_key_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Irvine", irvine()).await;
    mount_one_call(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({ "cod": 401, "message": "Invalid API key." })),
    )
    .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    assert_eq!(
        pipeline.state(),
        AppState::Error("API Key Error. Ensure it is valid and authorized for One Call API.".into())
    );
}

#[tokio::test]
async fn geocode_server_error_yields_coordinates_error() {
    let server = MockServer::start().await;
    Mock::given(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("Failed to fetch city coordinates.".into()));
}

#[tokio::test]
async fn unreachable_geocoder_yields_coordinates_error() {
    let cfg = Config {
        api_key: Some(KEY.into()),
        default_city: None,
        base_url: Some("http://127.0.0.1:1".into()),
    };

    let pipeline = Pipeline::from_config(&cfg).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("Failed to fetch city coordinates.".into()));
}

#[tokio::test]
async fn malformed_forecast_yields_unknown_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Irvine", irvine()).await;
    mount_one_call(&server, ResponseTemplate::new(200).set_body_string("{ not json")).await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("An unknown error occurred.".into()));
}

#[tokio::test]
async fn malformed_geocode_body_yields_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{oops"))
        .mount(&server)
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("An unknown error occurred.".into()));
}

#[tokio::test]
async fn range_shaped_hourly_temperature_yields_unknown_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Irvine", irvine()).await;
    let mut body = one_call("Clear");
    body["hourly"][0]["temp"] = json!({ "min": 1.0, "max": 2.0 });
    mount_one_call(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("An unknown error occurred.".into()));
}

/// Resolves every query to Irvine without touching the network.
#[derive(Debug)]
struct IrvineGeocoder;

#[async_trait]
impl Geocoder for IrvineGeocoder {
    async fn resolve(&self, _query: &PlaceQuery) -> Result<GeoResult, WeatherError> {
        Ok(GeoResult { latitude: 33.68, longitude: -117.82, canonical_name: "Irvine".into() })
    }
}

#[tokio::test]
async fn unreachable_forecast_yields_unknown_not_auth_error() {
    let forecast = OpenWeatherClient::new(Some(KEY.into()), "http://127.0.0.1:1").unwrap();
    let pipeline = Pipeline::new(Arc::new(IrvineGeocoder), Arc::new(forecast), "Irvine");

    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("An unknown error occurred.".into()));
}

#[tokio::test]
async fn placeholder_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = Config {
        api_key: Some(citycast_core::config::API_KEY_PLACEHOLDER.into()),
        ..config_for(&server)
    };
    let pipeline = Pipeline::from_config(&cfg).unwrap();
    pipeline.mount().await;

    assert_eq!(pipeline.state(), AppState::Error("Please add your OpenWeatherMap API key.".into()));
}

#[tokio::test]
async fn blank_search_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();

    assert!(!pipeline.submit("   ").await);
    assert_eq!(pipeline.state(), AppState::Idle);
}
