//! Field normalization policies.
//!
//! These functions never fail. Malformed values degrade to a defined fallback
//! so one bad spreadsheet row cannot abort a whole batch:
//! - amounts that are not all digits after separator stripping become 0
//! - dates that are not a valid `dd-mm-yyyy` become `None` (caller skips the record)
//! - blank categories become "Lainnya"

use chrono::NaiveDate;

use crate::record::ExpenseRecord;

/// Whole rupiah. The domain has no minor units and no negative amounts.
pub type Amount = u64;

/// Category used when a record has none.
pub const DEFAULT_CATEGORY: &str = "Lainnya";

/// Parse a raw amount such as `"50.000"`, `"50,000"` or `"50000"`.
///
/// Grouping characters are stripped; anything else that is not a digit
/// (letters, signs, decimal fractions written as `"12.5k"`) yields 0.
pub fn parse_amount(raw: &str) -> Amount {
    let digits: String = raw.trim().chars().filter(|c| *c != '.' && *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

pub fn record_amount(record: &ExpenseRecord) -> Amount {
    record.amount.as_deref().map(parse_amount).unwrap_or(0)
}

/// Parse `dd-mm-yyyy` into a calendar date.
///
/// Components may be unpadded (`5-4-2025`). Impossible dates (`31-02-2025`)
/// are rejected along with anything that does not split into three integers.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('-');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn record_date(record: &ExpenseRecord) -> Option<NaiveDate> {
    record.date.as_deref().and_then(parse_date)
}

/// Canonical `dd-mm-yyyy` rendering of a parsed date.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Grouping key plus the human-facing label for a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedCategory {
    /// Lowercase, trimmed
    pub key: String,
    /// Trimmed, first letter upper, rest lower
    pub display: String,
}

pub fn normalize_category(raw: Option<&str>) -> NormalizedCategory {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_CATEGORY);
    NormalizedCategory {
        key: trimmed.to_lowercase(),
        display: capitalize(trimmed),
    }
}

pub fn record_category(record: &ExpenseRecord) -> NormalizedCategory {
    normalize_category(record.category.as_deref())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
