//! Historical temperature fetch-and-reduce
//!
//! Fetches the daily mean temperature series from the Open-Meteo archive and
//! reduces it to rounded per-day values plus an overall average.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::WeatherError;
use crate::fetch::HttpFetch;
use crate::models::{DailyTemperature, DateWindow, ResolvedLocation, WeatherSummary};

/// Archive response; everything optional so gaps map to a typed error
#[derive(Debug, Default, Deserialize)]
pub struct ArchiveResponse {
    pub daily: Option<DailySeries>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    pub time: Option<Vec<String>>,
    pub temperature_2m_mean: Option<Vec<Option<f64>>>,
}

/// Round to 2 decimals, ties away from zero, on the exact value of `value`.
///
/// `2.675` is stored as `2.67499…` and therefore rounds to `2.67`.
#[must_use]
pub fn round_to_two(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Reduce a decoded archive payload to a [`WeatherSummary`]
pub fn summarize(
    response: ArchiveResponse,
    location: &ResolvedLocation,
    window: &DateWindow,
) -> Result<WeatherSummary, WeatherError> {
    let (start, end) = (window.start_str(), window.end_str());

    let (times, temperatures) = match response.daily {
        Some(DailySeries {
            time: Some(time),
            temperature_2m_mean: Some(temps),
        }) => (time, temps),
        _ => {
            return Err(WeatherError::incomplete(
                "Could not fetch historical weather data or data is incomplete from Open-Meteo.",
            ));
        }
    };

    if times.is_empty() || times.len() != temperatures.len() {
        warn!(
            "Archive returned {} dates and {} temperatures",
            times.len(),
            temperatures.len()
        );
        return Err(WeatherError::incomplete(format!(
            "Historical weather data is incomplete or mismatched for the period {start} to {end}."
        )));
    }

    let valid: Vec<f64> = temperatures.iter().flatten().copied().collect();
    if valid.is_empty() {
        return Err(WeatherError::NoTemperatureData {
            location: location.display_name.clone(),
            start_date: start,
            end_date: end,
        });
    }
    let average = round_to_two(valid.iter().sum::<f64>() / valid.len() as f64);

    let daily_temperatures: Vec<DailyTemperature> = times
        .into_iter()
        .zip(temperatures)
        .map(|(date, temperature)| DailyTemperature {
            date,
            temperature: temperature.map(round_to_two),
        })
        .collect();

    let start_date = daily_temperatures
        .first()
        .map_or(start, |d| d.date.clone());
    let end_date = daily_temperatures.last().map_or(end, |d| d.date.clone());

    Ok(WeatherSummary {
        overall_average_temperature: average,
        days_fetched: daily_temperatures.len(),
        daily_temperatures,
        fetched_location_name: location.display_name.clone(),
        start_date,
        end_date,
    })
}

/// Client for `<base>/v1/archive`
#[derive(Clone)]
pub struct TemperatureAggregator {
    fetch: Arc<dyn HttpFetch>,
    base_url: String,
}

impl TemperatureAggregator {
    pub fn new(fetch: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        Self {
            fetch,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn archive_url(&self, location: &ResolvedLocation, window: &DateWindow) -> String {
        format!(
            "{}/v1/archive?latitude={}&longitude={}&start_date={}&end_date={}&daily=temperature_2m_mean&timezone=auto",
            self.base_url,
            location.latitude,
            location.longitude,
            window.start_str(),
            window.end_str()
        )
    }

    /// Fetch the window's daily means and reduce them
    #[instrument(skip(self, location), fields(location = %location.display_name))]
    pub async fn aggregate(
        &self,
        location: &ResolvedLocation,
        window: &DateWindow,
    ) -> Result<WeatherSummary, WeatherError> {
        info!(
            "Fetching daily mean temperatures for {} from {} to {}",
            location.format_coordinates(),
            window.start_str(),
            window.end_str()
        );
        let start_time = Instant::now();

        let body = self
            .fetch
            .get_json(&self.archive_url(location, window))
            .await?;

        let response: ArchiveResponse = serde_json::from_value(body).map_err(|e| {
            warn!("Failed to parse archive response: {}", e);
            WeatherError::incomplete(
                "Could not fetch historical weather data or data is incomplete from Open-Meteo.",
            )
        })?;

        let summary = summarize(response, location, window)?;
        debug!(
            "Reduced {} days to average {} in {:.3}s",
            summary.days_fetched,
            summary.overall_average_temperature,
            start_time.elapsed().as_secs_f64()
        );

        Ok(summary)
    }
}
