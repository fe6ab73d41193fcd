//! Open-Meteo geocoding client
//!
//! Resolves a free-text place name to coordinates and the upstream's canonical
//! name. Only the top-ranked match is used.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::WeatherError;
use crate::fetch::HttpFetch;
use crate::models::ResolvedLocation;

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl From<GeocodingResult> for ResolvedLocation {
    fn from(result: GeocodingResult) -> Self {
        ResolvedLocation::new(result.latitude, result.longitude, result.name)
    }
}

/// Client for `<base>/v1/search`
#[derive(Clone)]
pub struct GeocoderClient {
    fetch: Arc<dyn HttpFetch>,
    base_url: String,
}

impl GeocoderClient {
    pub fn new(fetch: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        Self {
            fetch,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, city: &str) -> String {
        format!(
            "{}/v1/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(city)
        )
    }

    /// Resolve `city` to its top-ranked match
    #[instrument(skip(self))]
    pub async fn resolve(&self, city: &str) -> Result<ResolvedLocation, WeatherError> {
        info!("Geocoding location: '{}'", city);
        let start_time = Instant::now();

        let body = self.fetch.get_json(&self.search_url(city)).await?;

        let response: GeocodingResponse = serde_json::from_value(body).map_err(|e| {
            warn!("Failed to parse geocoding response for '{}': {}", city, e);
            WeatherError::unavailable("Invalid geocoding data received from Open-Meteo")
        })?;

        let Some(top) = response.results.and_then(|r| r.into_iter().next()) else {
            warn!("No results found for location '{}'", city);
            return Err(WeatherError::location_not_found(city));
        };

        let location = ResolvedLocation::from(top);
        debug!(
            "Found location: {} ({}) in {:.3}s",
            location.display_name,
            location.format_coordinates(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(location)
    }
}
