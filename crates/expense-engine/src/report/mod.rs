//! The multi-month PDF report.

pub mod pdf;
pub mod plan;

pub use pdf::render_pdf;
pub use plan::{Block, ReportPlan, build_report};

use crate::error::ReportError;
use crate::filter::MonthFilter;
use crate::record::ExpenseRecord;

/// Filename the report is delivered under.
pub const REPORT_FILENAME: &str = "laporan_pengeluaran.pdf";

/// A finished report: the PDF bytes and the caption to send with them.
#[derive(Debug, Clone)]
pub struct Report {
    pub caption: String,
    pub pdf: Vec<u8>,
}

/// Build and render the report in one step.
pub fn generate_report(records: &[ExpenseRecord], filter: Option<MonthFilter>) -> Result<Report, ReportError> {
    let plan = build_report(records, filter)?;
    let pdf = render_pdf(&plan)?;
    Ok(Report {
        caption: plan.caption,
        pdf,
    })
}
