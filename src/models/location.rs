//! Location models: the validated request and the geocoded place

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, WeatherError};

/// Smallest accepted window
pub const MIN_DAYS: u32 = 1;
/// Largest accepted window
pub const MAX_DAYS: u32 = 365;

/// A validated `{city, days}` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    city: String,
    days: u32,
}

impl LocationQuery {
    /// Validate typed input
    pub fn new(city: impl Into<String>, days: u32) -> Result<Self, WeatherError> {
        let city = city.into();
        let mut details = FieldErrors::new();

        let city = match Self::check_city(&city) {
            Ok(city) => Some(city),
            Err(message) => {
                details.entry("city".into()).or_default().push(message);
                None
            }
        };
        if let Err(message) = Self::check_days(days) {
            details.entry("days".into()).or_default().push(message);
        }

        match city {
            Some(city) if details.is_empty() => Ok(Self { city, days }),
            _ => Err(WeatherError::InvalidInput { details }),
        }
    }

    /// Validate raw query-string values, reporting every bad field at once
    pub fn parse(city: Option<&str>, days: Option<&str>) -> Result<Self, WeatherError> {
        let mut details = FieldErrors::new();

        let city = match city.map(Self::check_city) {
            Some(Ok(city)) => Some(city),
            Some(Err(message)) => {
                details.entry("city".into()).or_default().push(message);
                None
            }
            None => {
                details
                    .entry("city".into())
                    .or_default()
                    .push("City is required.".into());
                None
            }
        };

        let days = match days.map(str::trim) {
            None | Some("") => {
                details
                    .entry("days".into())
                    .or_default()
                    .push("Days is required.".into());
                None
            }
            Some(raw) => match raw.parse::<i64>() {
                Ok(value) => {
                    let in_range = u32::try_from(value)
                        .ok()
                        .filter(|days| Self::check_days(*days).is_ok());
                    if in_range.is_none() {
                        details
                            .entry("days".into())
                            .or_default()
                            .push(days_range_message());
                    }
                    in_range
                }
                Err(e) => {
                    let message = match e.kind() {
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                            days_range_message()
                        }
                        _ => "Days must be an integer.".into(),
                    };
                    details.entry("days".into()).or_default().push(message);
                    None
                }
            },
        };

        match (city, days) {
            (Some(city), Some(days)) => Ok(Self { city, days }),
            _ => Err(WeatherError::InvalidInput { details }),
        }
    }

    fn check_city(city: &str) -> Result<String, String> {
        let trimmed = city.trim();
        if trimmed.is_empty() {
            Err("City is required.".into())
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn check_days(days: u32) -> Result<(), String> {
        if (MIN_DAYS..=MAX_DAYS).contains(&days) {
            Ok(())
        } else {
            Err(days_range_message())
        }
    }

    /// The city as supplied by the caller (a hint for the geocoder)
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Requested window length
    #[must_use]
    pub fn days(&self) -> u32 {
        self.days
    }
}

fn days_range_message() -> String {
    format!("Days must be between {MIN_DAYS} and {MAX_DAYS} for historical data.")
}

/// Top-ranked geocoding match
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Upstream canonical name, not the caller's input
    pub display_name: String,
}

impl ResolvedLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            display_name: display_name.into(),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
