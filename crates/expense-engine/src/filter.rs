//! `MM/YYYY` month filter accepted by the category, top-N and report views.

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;

use crate::format::month_name;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthFilter {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Not two integers separated by `/`
    #[error("malformed month filter {0:?}")]
    Malformed(String),
    #[error("month filter out of range: {month}/{year}")]
    OutOfRange { month: i64, year: i64 },
}

impl MonthFilter {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `"April 2025"`
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// Parse and range-check a `MM/YYYY` argument.
///
/// Runs before any fetch or aggregation so a bad argument never costs a
/// backend round trip.
pub fn parse_month_filter(arg: &str) -> Result<MonthFilter, FilterError> {
    let malformed = || FilterError::Malformed(arg.to_string());
    let (month, year) = arg.trim().split_once('/').ok_or_else(malformed)?;
    let month: i64 = month.trim().parse().map_err(|_| malformed())?;
    let year: i64 = year.trim().parse().map_err(|_| malformed())?;

    if !(1..=12).contains(&month) || !(MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
        return Err(FilterError::OutOfRange { month, year });
    }

    Ok(MonthFilter::new(year as i32, month as u32))
}
