//! HTTP-level tests for the weather-average API
//!
//! The router is driven in-process with a fake upstream and a fixed clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use weather_average::api::{self, AppState};
use weather_average::config::{AppConfig, ServerConfig, UpstreamConfig};
use weather_average::{FetchError, FixedClock, HttpFetch, WeatherService, web};

enum Upstream {
    Json(Value),
    Status(u16, &'static str),
    Down,
}

/// Serves canned geocoding and archive bodies and records requested URLs
struct FakeOpenMeteo {
    geocoding: Upstream,
    archive: Upstream,
    calls: Mutex<Vec<String>>,
}

impl FakeOpenMeteo {
    fn new(geocoding: Upstream, archive: Upstream) -> Arc<Self> {
        Arc::new(Self {
            geocoding,
            archive,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn found(city: &str, temperatures: Value) -> Arc<Self> {
        let count = temperatures.as_array().map_or(0, Vec::len);
        let time: Vec<String> = (0..count)
            .map(|i| format!("2025-05-{:02}", 19 + i))
            .collect();
        Self::new(
            Upstream::Json(json!({
                "results": [{"name": city, "latitude": 40.7128, "longitude": -74.0060}]
            })),
            Upstream::Json(json!({
                "daily": {"time": time, "temperature_2m_mean": temperatures}
            })),
        )
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for FakeOpenMeteo {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = if url.contains("/v1/search") {
            &self.geocoding
        } else {
            &self.archive
        };
        match reply {
            Upstream::Json(body) => Ok(body.clone()),
            Upstream::Status(status, message) => Err(FetchError::Status {
                status: *status,
                message: (*message).to_string(),
            }),
            Upstream::Down => Err(FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

fn app(fake: &Arc<FakeOpenMeteo>) -> axum::Router {
    let upstream = UpstreamConfig {
        geocoding_base_url: "https://geocoding-api.open-meteo.com".into(),
        archive_base_url: "https://archive-api.open-meteo.com".into(),
        ..UpstreamConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2025, 5, 29).unwrap();
    let service = WeatherService::from_config(&upstream, fake.clone(), Arc::new(FixedClock(today)));
    api::router(AppState {
        service: Arc::new(service),
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

#[rstest]
#[case("/weather/average?days=7")]
#[case("/weather/average?city=London")]
#[case("/weather/average?city=London&days=0")]
#[case("/weather/average?city=London&days=366")]
#[case("/weather/average?city=London&days=abc")]
#[case("/weather/average?city=&days=7")]
#[case("/weather/average")]
#[case("/weather/average?city=London&city=Paris&days=7")]
#[case("/weather/average?city=London&days=7&days=8")]
#[tokio::test]
async fn test_invalid_query_is_400_and_never_calls_upstream(#[case] uri: &str) {
    let fake = FakeOpenMeteo::found("London", json!([10.0]));

    let (status, body) = get(app(&fake), uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");
    assert!(body["details"].is_object());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_validation_details_name_fields() {
    let fake = FakeOpenMeteo::found("London", json!([10.0]));

    let (_, body) = get(app(&fake), "/weather/average?days=366").await;

    assert_eq!(body["details"]["city"][0], "City is required.");
    assert_eq!(
        body["details"]["days"][0],
        "Days must be between 1 and 365 for historical data."
    );
}

#[rstest]
#[case(json!([10, 20, 30, 40, 50]), 30.0)]
#[case(json!([10.5, 20.5, 30.5, 40.5]), 25.5)]
#[case(json!([10, null, 30, null, 50]), 30.0)]
#[case(json!([10, 20, 30.555]), 20.18)]
#[tokio::test]
async fn test_average_temperature(#[case] temperatures: Value, #[case] expected: f64) {
    let days = temperatures.as_array().map_or(0, Vec::len);
    let fake = FakeOpenMeteo::found("TestCity", temperatures);

    let (status, body) = get(
        app(&fake),
        &format!("/weather/average?city=TestCity&days={days}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overallAverageTemperature"].as_f64(), Some(expected));
    assert_eq!(body["daysFetched"].as_u64(), Some(days as u64));
    assert_eq!(body["dailyTemperatures"].as_array().map(Vec::len), Some(days));
    assert_eq!(body["fetchedLocationName"], "TestCity");
}

#[tokio::test]
async fn test_success_body_and_outbound_requests() {
    let fake = FakeOpenMeteo::found("São Paulo", json!([21.456, null, 19.0]));

    let (status, body) = get(
        app(&fake),
        "/weather/average?city=S%C3%A3o%20Paulo&days=7",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fetchedLocationName"], "São Paulo");
    // Fewer days than requested came back
    assert_eq!(body["daysFetched"], 3);
    assert_eq!(body["startDate"], "2025-05-19");
    assert_eq!(body["endDate"], "2025-05-21");
    assert_eq!(body["dailyTemperatures"][0]["temperature"], 21.46);
    assert!(body["dailyTemperatures"][1]["temperature"].is_null());
    assert_eq!(body["dailyTemperatures"][2]["date"], "2025-05-21");

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        "https://geocoding-api.open-meteo.com/v1/search?name=S%C3%A3o%20Paulo&count=1&language=en&format=json"
    );
    assert_eq!(
        calls[1],
        "https://archive-api.open-meteo.com/v1/archive?latitude=40.7128&longitude=-74.006&start_date=2025-05-17&end_date=2025-05-23&daily=temperature_2m_mean&timezone=auto"
    );
}

#[tokio::test]
async fn test_repeated_query_key_is_reported_in_details() {
    let fake = FakeOpenMeteo::found("London", json!([10.0]));

    let (status, body) = get(
        app(&fake),
        "/weather/average?city=London&city=Paris&days=7",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["details"]["query"][0].as_str().unwrap();
    assert!(message.contains("city"), "unexpected detail: {message}");
}

#[tokio::test]
async fn test_unknown_location_is_404_without_archive_call() {
    let fake = FakeOpenMeteo::new(
        Upstream::Json(json!({"generationtime_ms": 0.3})),
        Upstream::Json(json!({})),
    );

    let (status, body) = get(
        app(&fake),
        "/weather/average?city=XyZabCdEfGhIjKl&days=7",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Could not find location")
    );
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn test_all_null_series_is_404() {
    let fake = FakeOpenMeteo::found("Oslo", json!([null, null]));

    let (status, body) = get(app(&fake), "/weather/average?city=Oslo&days=2").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("No temperature data points found for Oslo")
    );
}

#[rstest]
#[case(json!({"daily": {"temperature_2m_mean": [1.0]}}))]
#[case(json!({"daily": {"time": ["2025-05-19"]}}))]
#[case(json!({"daily": {"time": ["2025-05-19", "2025-05-20"], "temperature_2m_mean": [1.0]}}))]
#[case(json!({"daily": {"time": [], "temperature_2m_mean": []}}))]
#[case(json!({"reason": "nothing here"}))]
#[tokio::test]
async fn test_incomplete_archive_payload_is_500(#[case] archive: Value) {
    let fake = FakeOpenMeteo::new(
        Upstream::Json(json!({"results": [{"name": "Oslo", "latitude": 59.91, "longitude": 10.75}]})),
        Upstream::Json(archive),
    );

    let (status, body) = get(app(&fake), "/weather/average?city=Oslo&days=2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_upstream_status_is_500_with_reason() {
    let fake = FakeOpenMeteo::new(
        Upstream::Json(json!({"results": [{"name": "Oslo", "latitude": 59.91, "longitude": 10.75}]})),
        Upstream::Status(400, "Parameter 'start_date' is out of allowed range"),
    );

    let (status, body) = get(app(&fake), "/weather/average?city=Oslo&days=2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("API Error:"));
    assert!(error.contains("out of allowed range"));
}

#[tokio::test]
async fn test_geocoder_down_is_500() {
    let fake = FakeOpenMeteo::new(Upstream::Down, Upstream::Down);

    let (status, _) = get(app(&fake), "/weather/average?city=Oslo&days=2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn test_healthcheck() {
    let fake = FakeOpenMeteo::new(Upstream::Down, Upstream::Down);

    let (status, body) = get(app(&fake), "/healthcheck").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_full_app_serves_cors_headers() {
    let fake = FakeOpenMeteo::new(Upstream::Down, Upstream::Down);
    let config = AppConfig {
        server: ServerConfig {
            cors_origin: Some("http://localhost:3001".into()),
            ..ServerConfig::default()
        },
        ..AppConfig::default()
    };
    let service = WeatherService::from_config(
        &UpstreamConfig::default(),
        fake.clone(),
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 5, 29).unwrap())),
    );
    let app = web::app(
        &config,
        AppState {
            service: Arc::new(service),
        },
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthcheck")
                .header("origin", "http://localhost:3001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3001"
    );
}

/// Answers geocoding and archive calls only after `delay`, then reports
/// the archive call as timed out
struct SlowOpenMeteo {
    delay: Duration,
}

#[async_trait]
impl HttpFetch for SlowOpenMeteo {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        tokio::time::sleep(self.delay).await;
        if url.contains("/v1/search") {
            Ok(json!({"results": [{"name": "Oslo", "latitude": 59.91, "longitude": 10.75}]}))
        } else {
            Err(FetchError::Transport {
                url: url.to_string(),
                message: format!("timed out after {}s", self.delay.as_secs()),
            })
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_upstreams_surface_as_500_not_request_timeout() {
    let config = AppConfig {
        upstream: UpstreamConfig {
            timeout_seconds: 16,
            ..UpstreamConfig::default()
        },
        ..AppConfig::default()
    };
    let fetch = Arc::new(SlowOpenMeteo {
        delay: Duration::from_secs(16),
    });
    let service = WeatherService::from_config(
        &config.upstream,
        fetch,
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 5, 29).unwrap())),
    );
    let app = web::app(
        &config,
        AppState {
            service: Arc::new(service),
        },
    )
    .unwrap();

    let (status, body) = get(app, "/weather/average?city=Oslo&days=7").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("API Error:"), "unexpected error: {error}");
    assert!(error.contains("timed out after 16s"));
}
