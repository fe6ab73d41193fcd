//! HTTP API
//!
//! `GET /weather/average?city=&days=` and `GET /healthcheck`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::FieldErrors;
use crate::models::{LocationQuery, WeatherSummary};
use crate::service::WeatherService;
use crate::WeatherError;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

/// Raw query string; validated by [`LocationQuery::parse`]
#[derive(Debug, Deserialize)]
pub struct AverageParams {
    pub city: Option<String>,
    pub days: Option<String>,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = match self {
            WeatherError::InvalidInput { details } => ErrorBody {
                error: "Invalid query parameters".to_string(),
                details: Some(details),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather/average", get(get_average))
        .route("/healthcheck", get(health_check))
        .with_state(state)
}

/// GET /healthcheck - liveness check
async fn health_check() -> &'static str {
    "OK"
}

/// GET /weather/average - average daily mean temperature for a city
async fn get_average(
    State(state): State<AppState>,
    params: Result<Query<AverageParams>, QueryRejection>,
) -> Result<Json<WeatherSummary>, WeatherError> {
    // Repeated keys and other undecodable query strings
    let Query(params) = params.map_err(|rejection| {
        WeatherError::invalid_field("query", rejection.body_text())
    })?;
    let query = LocationQuery::parse(params.city.as_deref(), params.days.as_deref())?;
    let summary = state.service.average(&query).await?;
    Ok(Json(summary))
}
