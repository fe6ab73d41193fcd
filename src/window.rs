//! Date-window computation
//!
//! The archive lags behind real time, so the window ends a fixed number of
//! days before "today". "today" is always supplied by the caller; production
//! code reads it from a [`Clock`].

use chrono::{Days, NaiveDate, Utc};

use crate::WeatherError;
use crate::models::DateWindow;

/// Days between today and the last requested day
pub const ARCHIVE_LAG_DAYS: u64 = 6;

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always returns the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `end = today - 6d`, `start = end - (days - 1)`
pub fn compute_window(days: u32, today: NaiveDate) -> Result<DateWindow, WeatherError> {
    if days == 0 {
        return Err(WeatherError::invalid_field(
            "days",
            "Days must be between 1 and 365 for historical data.",
        ));
    }

    let end_date = today
        .checked_sub_days(Days::new(ARCHIVE_LAG_DAYS))
        .ok_or_else(|| WeatherError::invalid_field("days", "Date window out of range."))?;
    let start_date = end_date
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| WeatherError::invalid_field("days", "Date window out of range."))?;

    Ok(DateWindow {
        start_date,
        end_date,
    })
}
