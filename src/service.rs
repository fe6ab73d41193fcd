//! Average-temperature pipeline
//!
//! validate → geocode → compute window → fetch and reduce. Each request makes
//! at most two sequential outbound calls and shares no mutable state.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::aggregator::TemperatureAggregator;
use crate::config::UpstreamConfig;
use crate::fetch::HttpFetch;
use crate::geocoding::GeocoderClient;
use crate::models::{LocationQuery, WeatherSummary};
use crate::window::{Clock, compute_window};
use crate::WeatherError;

pub struct WeatherService {
    geocoder: GeocoderClient,
    aggregator: TemperatureAggregator,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(
        geocoder: GeocoderClient,
        aggregator: TemperatureAggregator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            aggregator,
            clock,
        }
    }

    /// Wire both clients to one fetcher using the configured base URLs
    pub fn from_config(
        config: &UpstreamConfig,
        fetch: Arc<dyn HttpFetch>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            GeocoderClient::new(fetch.clone(), config.geocoding_base_url.clone()),
            TemperatureAggregator::new(fetch, config.archive_base_url.clone()),
            clock,
        )
    }

    /// Average daily mean temperature for `query`
    #[instrument(skip(self), fields(city = query.city(), days = query.days()))]
    pub async fn average(&self, query: &LocationQuery) -> Result<WeatherSummary, WeatherError> {
        let location = self.geocoder.resolve(query.city()).await?;

        let today = self.clock.today();
        let window = compute_window(query.days(), today)?;
        debug!(
            "Window for {} days from {}: {} to {}",
            query.days(),
            today,
            window.start_str(),
            window.end_str()
        );

        let summary = self.aggregator.aggregate(&location, &window).await?;
        info!(
            "Average temperature for {} over {} days: {}",
            summary.fetched_location_name, summary.days_fetched, summary.overall_average_temperature
        );

        Ok(summary)
    }
}
