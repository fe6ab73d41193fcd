//! Weather Average - historical average temperatures for any city
//!
//! This library geocodes a city through Open-Meteo, fetches daily mean
//! temperatures for a trailing window from the Open-Meteo archive, and reduces
//! them to per-day values and an overall average served over HTTP.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocoding;
pub mod models;
pub mod service;
pub mod telemetry;
pub mod web;
pub mod window;

// Re-export core types for public API
pub use aggregator::TemperatureAggregator;
pub use config::AppConfig;
pub use error::WeatherError;
pub use fetch::{FetchError, HttpFetch, ReqwestFetcher};
pub use geocoding::GeocoderClient;
pub use models::{DailyTemperature, DateWindow, LocationQuery, ResolvedLocation, WeatherSummary};
pub use service::WeatherService;
pub use window::{Clock, FixedClock, SystemClock, compute_window};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
