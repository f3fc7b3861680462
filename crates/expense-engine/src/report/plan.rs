//! Report content as an ordered list of layout blocks.
//!
//! Building the plan does all the aggregation and decides every string,
//! table row and chart. Layout and rasterization happen later in
//! [`super::pdf`], so the structure is testable without fonts.

use crate::aggregate::{MonthBucket, MonthKey, by_category, by_day, by_month, peak_day};
use crate::chart::plan::{
    REPORT_DAILY_SIZE, REPORT_MONTHLY_SIZE, REPORT_PIE_SIZE, REPORT_TOP_SIZE, category_pie, daily_chart,
    monthly_chart, top_chart,
};
use crate::chart::ChartSpec;
use crate::error::{NoData, ReportError};
use crate::filter::MonthFilter;
use crate::format::{format_rupiah_spaced, month_name};
use crate::listing::report_caption;
use crate::normalize::{DEFAULT_CATEGORY, format_date, record_amount};
use crate::record::ExpenseRecord;
use crate::top::{DEFAULT_TOP_N, top_categories};

pub const TABLE_HEADER: [&str; 5] = ["NO", "Tanggal", "Kategori", "Nominal", "Keterangan"];
/// Column widths in millimetres.
pub const TABLE_WIDTHS_MM: [f32; 5] = [15.0, 25.0, 30.0, 25.0, 60.0];
/// Column whose cells are right-aligned.
pub const AMOUNT_COLUMN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph { text: String, bold: bool },
    Table { rows: Vec<[String; 5]> },
    Chart { spec: ChartSpec, width_mm: f32, height_mm: f32 },
    /// Vertical gap in millimetres
    Spacer(f32),
    PageBreak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub caption: String,
    /// Every month with at least one dated record, ascending
    pub months: Vec<MonthKey>,
    pub has_comparison: bool,
    pub blocks: Vec<Block>,
}

impl ReportPlan {
    pub fn page_count(&self) -> usize {
        1 + self.blocks.iter().filter(|b| matches!(b, Block::PageBreak)).count()
    }
}

/// Build the multi-month report.
///
/// Every month is included whether or not `filter` is set. The filter only
/// changes the caption and suppresses the cross-month comparison.
pub fn build_report(records: &[ExpenseRecord], filter: Option<MonthFilter>) -> Result<ReportPlan, ReportError> {
    if records.is_empty() {
        return Err(NoData::NoRecords.into());
    }
    let months = by_month(records);
    if months.is_empty() {
        return Err(NoData::NoDatedRecords.into());
    }

    let mut blocks = Vec::new();
    let last = months.len() - 1;
    for (i, (key, bucket)) in months.iter().enumerate() {
        month_section(&mut blocks, *key, bucket);
        if i != last {
            blocks.push(Block::PageBreak);
        }
    }

    let has_comparison = months.len() > 1 && filter.is_none();
    if has_comparison {
        blocks.push(Block::PageBreak);
        blocks.push(Block::Title("PERBANDINGAN BULANAN".to_string()));
        blocks.push(Block::Spacer(4.0));
        blocks.push(Block::Chart {
            spec: ChartSpec::Bars(monthly_chart(&months, REPORT_MONTHLY_SIZE)),
            width_mm: 150.0,
            height_mm: 70.0,
        });
    }

    Ok(ReportPlan {
        caption: report_caption(filter),
        months: months.keys().copied().collect(),
        has_comparison,
        blocks,
    })
}

fn month_section(blocks: &mut Vec<Block>, key: MonthKey, bucket: &MonthBucket<'_>) {
    let name = month_name(key.month);
    let upper = name.to_uppercase();

    blocks.push(Block::Title(format!("LAPORAN PENGELUARAN {upper} {}", key.year)));
    blocks.push(Block::Spacer(4.0));
    blocks.push(Block::Table {
        rows: bucket
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                [
                    (i + 1).to_string(),
                    r.date_or_dash().to_string(),
                    r.category_or_dash().to_string(),
                    format_rupiah_spaced(record_amount(r)),
                    r.note_or_dash().to_string(),
                ]
            })
            .collect(),
    });
    blocks.push(Block::Spacer(4.0));
    blocks.push(Block::Heading(format!(
        "TOTAL PENGELUARAN {upper} {}: {}",
        key.year,
        format_rupiah_spaced(bucket.total)
    )));

    if let Some(peak) = peak_day(&bucket.records) {
        blocks.push(Block::Spacer(4.0));
        blocks.push(Block::Paragraph {
            text: format!(
                "Pengeluaran tertinggi pada bulan {name} terjadi pada tanggal {} dengan total sebesar: {}",
                format_date(peak.date),
                format_rupiah_spaced(peak.total)
            ),
            bold: true,
        });
        blocks.push(Block::Spacer(2.0));
        blocks.push(Block::Paragraph {
            text: "Berikut rincian pengeluarannya:".to_string(),
            bold: true,
        });
        for (i, r) in peak.records.iter().enumerate() {
            let category = r.category.as_deref().map(str::trim).unwrap_or(DEFAULT_CATEGORY);
            blocks.push(Block::Paragraph {
                text: format!(
                    "{}. Kategori: {category}\n    Total: {}\n    Keterangan: {}",
                    i + 1,
                    format_rupiah_spaced(record_amount(r)),
                    r.note_or_dash()
                ),
                bold: false,
            });
            blocks.push(Block::Spacer(2.0));
        }
    }

    // charts start on their own page
    blocks.push(Block::PageBreak);
    blocks.push(Block::Title(format!("ANALISIS PENGELUARAN {upper} {}", key.year)));
    blocks.push(Block::Spacer(4.0));

    let records = bucket.records.iter().copied();
    blocks.push(Block::Chart {
        spec: ChartSpec::Bars(daily_chart(&by_day(records.clone()), "Pengeluaran Harian", REPORT_DAILY_SIZE)),
        width_mm: 150.0,
        height_mm: 70.0,
    });
    blocks.push(Block::Spacer(5.0));

    let totals = by_category(records, None);
    match category_pie(&totals, "Distribusi Kategori", REPORT_PIE_SIZE) {
        Some(pie) => blocks.push(Block::Chart {
            spec: ChartSpec::Pie(pie),
            width_mm: 100.0,
            height_mm: 100.0,
        }),
        None => blocks.push(Block::Paragraph {
            text: "Distribusi kategori tidak tersedia: semua nominal bernilai nol.".to_string(),
            bold: false,
        }),
    }
    blocks.push(Block::Spacer(5.0));

    blocks.push(Block::Chart {
        spec: ChartSpec::Bars(top_chart(
            &top_categories(&totals, DEFAULT_TOP_N),
            "Top 5 Kategori",
            REPORT_TOP_SIZE,
        )),
        width_mm: 150.0,
        height_mm: 50.0,
    });
}
