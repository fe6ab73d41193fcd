//! Data models for the weather-average service
//!
//! This module contains the core domain models organized by concern:
//! - Location: the validated request and the geocoded place
//! - Weather: date windows, per-day temperatures and the final summary

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{LocationQuery, MAX_DAYS, MIN_DAYS, ResolvedLocation};
pub use weather::{DailyTemperature, DateWindow, WeatherSummary};
