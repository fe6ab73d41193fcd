//! Date window, per-day temperatures and the aggregated summary

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days requested from the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateWindow {
    /// `start_date` as `YYYY-MM-DD`
    #[must_use]
    pub fn start_str(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    /// `end_date` as `YYYY-MM-DD`
    #[must_use]
    pub fn end_str(&self) -> String {
        self.end_date.format(DATE_FORMAT).to_string()
    }
}

/// Mean temperature for one day; `None` when the upstream had no reading
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyTemperature {
    pub date: String,
    pub temperature: Option<f64>,
}

/// Final result of one average-temperature request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    /// Mean of all non-null daily values, rounded to 2 decimals
    pub overall_average_temperature: f64,
    pub daily_temperatures: Vec<DailyTemperature>,
    /// Geocoder's canonical name for the place
    pub fetched_location_name: String,
    /// Number of days actually returned upstream
    pub days_fetched: usize,
    pub start_date: String,
    pub end_date: String,
}
