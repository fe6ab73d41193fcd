//! Error types and handling for the weather-average service

use std::collections::BTreeMap;

use thiserror::Error;

use crate::fetch::FetchError;

/// Field name → validation messages, in the shape returned to API callers
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main error type for the temperature pipeline
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Malformed or out-of-range `city` / `days`
    #[error("Invalid query parameters")]
    InvalidInput { details: FieldErrors },

    /// The geocoder returned no match
    #[error("Could not find location: {city}")]
    LocationNotFound { city: String },

    /// Archive payload missing series, mismatched, or empty
    #[error("{message}")]
    UpstreamDataIncomplete { message: String },

    /// Every temperature in the window was null
    #[error("No temperature data points found for {location} between {start_date} and {end_date}.")]
    NoTemperatureData {
        location: String,
        start_date: String,
        end_date: String,
    },

    /// Network or HTTP-layer failure of an outbound call
    #[error("API Error: {message}")]
    UpstreamUnavailable { message: String, status: Option<u16> },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    /// Create an invalid-input error for a single field
    pub fn invalid_field<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        let mut details = FieldErrors::new();
        details.insert(field.into(), vec![message.into()]);
        Self::InvalidInput { details }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(city: S) -> Self {
        Self::LocationNotFound { city: city.into() }
    }

    /// Create a new incomplete-data error
    pub fn incomplete<S: Into<String>>(message: S) -> Self {
        Self::UpstreamDataIncomplete {
            message: message.into(),
        }
    }

    /// Create a new upstream error without a known HTTP status
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status code this error is surfaced as
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            WeatherError::InvalidInput { .. } => 400,
            WeatherError::LocationNotFound { .. } | WeatherError::NoTemperatureData { .. } => 404,
            WeatherError::UpstreamDataIncomplete { .. }
            | WeatherError::UpstreamUnavailable { .. }
            | WeatherError::Config { .. } => 500,
        }
    }
}

impl From<FetchError> for WeatherError {
    fn from(err: FetchError) -> Self {
        let status = match &err {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        };
        WeatherError::UpstreamUnavailable {
            message: err.to_string(),
            status,
        }
    }
}
