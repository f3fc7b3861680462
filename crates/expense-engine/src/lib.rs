//! Expense aggregation and report rendering.
//!
//! Takes the loosely-typed expense records served by the backend and turns
//! them into normalized totals, grouped buckets, PNG charts and a paginated
//! PDF report. Everything here is request-scoped: callers pass a snapshot in,
//! get an artifact out, and nothing is retained between calls.

pub mod aggregate;
pub mod chart;
pub mod entry;
pub mod error;
pub mod filter;
pub mod format;
pub mod listing;
pub mod normalize;
pub mod record;
pub mod report;
pub mod top;

pub use error::{NoData, ReportError};
pub use filter::MonthFilter;
pub use record::ExpenseRecord;
