//! Month window for target-species queries
//!
//! The window covers `span` consecutive months around a date and may wrap from December
//! into January, in which case `end < begin`.

use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;
use std::fmt;

use birdrank_common::{BirdrankError, Result};

/// Inclusive range of months, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    pub begin: u32,
    pub end: u32,
}

impl MonthWindow {
    /// Window of `span` months around `date`
    ///
    /// Odd spans are centered on the current month. Even spans lean back one month during
    /// the first half of the current month and forward during the second half, so a
    /// two-month window on December 20th is December-January.
    pub fn around(date: NaiveDate, span: u32) -> Result<Self> {
        if !(1..=12).contains(&span) {
            return Err(BirdrankError::config(format!(
                "Month span must be between 1 and 12, got {}",
                span
            )));
        }

        let month = date.month();
        let first_half = date.day() <= days_in_month(month) / 2;
        let lean_back = span % 2 == 0 && first_half;
        let offset = (span - if lean_back { 0 } else { 1 }) / 2;

        let begin = shift(month, -(offset as i32));
        let end = shift(begin, span as i32 - 1);
        Ok(Self { begin, end })
    }

    /// Whether the window crosses the year boundary
    pub fn wraps(&self) -> bool {
        self.end < self.begin
    }

    /// Number of months covered
    pub fn months(&self) -> u32 {
        (self.end + 12 - self.begin) % 12 + 1
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", month_name(self.begin), month_name(self.end))
    }
}

/// Add `delta` months to a 1-based month, wrapping around the year
fn shift(month: u32, delta: i32) -> u32 {
    ((month as i32 - 1 + delta).rem_euclid(12) + 1) as u32
}

/// Length of a month in a non-leap year
fn days_in_month(month: u32) -> u32 {
    match month {
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("?")
}
