//! Date handling: day keys and the year/month filter

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Calendar day of an API date or timestamp
pub fn day_key(raw: &str) -> Option<NaiveDate> {
    medserv_source::decode::parse_day(raw)
}

/// Year with an optional month, as selected in the chart filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthFilter {
    pub year: i32,
    pub month: Option<u32>,
}

impl MonthFilter {
    /// Build a filter, rejecting months outside 1-12
    pub fn new(year: i32, month: Option<u32>) -> CoreResult<Self> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(CoreError::InvalidQuery {
                    message: format!("month must be between 1 and 12, got {}", m),
                });
            }
        }
        if !(1900..=9999).contains(&year) {
            return Err(CoreError::InvalidQuery {
                message: format!("year out of range: {}", year),
            });
        }
        Ok(Self { year, month })
    }

    /// Filter for the month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: Some(date.month()),
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        date.year() == self.year && self.month.map_or(true, |m| date.month() == m)
    }

    /// Get a human-readable description of the period
    pub fn description(&self) -> String {
        match self.month {
            Some(m) => format!("{}-{:02}", self.year, m),
            None => format!("{}", self.year),
        }
    }
}

/// Short English month names, January first
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
