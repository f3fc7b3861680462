//! Plain-text listing of a snapshot and the captions sent alongside charts.

use crate::aggregate::CategoryTotals;
use crate::error::{NoData, ReportError};
use crate::filter::MonthFilter;
use crate::format::{format_rupiah, format_rupiah_spaced};
use crate::normalize::record_amount;
use crate::record::ExpenseRecord;
use crate::top::RankedCategory;

/// Longest text the chat layer accepts as a single message, in characters.
pub const MAX_INLINE_CHARS: usize = 4096;
pub const ATTACHMENT_FILENAME: &str = "pengeluaran.txt";
const ATTACHMENT_CAPTION: &str = "Data pengeluaran (terlalu panjang untuk pesan biasa)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Inline,
    /// Too long for one message; send as a text file.
    Attachment { filename: String, caption: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub text: String,
    pub delivery: Delivery,
}

/// Every record in snapshot order, followed by the grand total.
///
/// Fields are shown as stored; only the amount is normalized.
pub fn build_listing(records: &[ExpenseRecord]) -> Result<Listing, ReportError> {
    if records.is_empty() {
        return Err(NoData::NoRecords.into());
    }

    let mut text = String::from("*CATATAN PENGELUARAN:*\n\n");
    let mut total = 0;
    for (i, record) in records.iter().enumerate() {
        let amount = record_amount(record);
        total += amount;
        text.push_str(&format!(
            "{}. Tanggal: {}\n   Kategori: {}\n   Nominal: {}\n   Keterangan: {}\n\n",
            i + 1,
            record.date_or_dash(),
            record.category_or_dash(),
            format_rupiah_spaced(amount),
            record.note_or_dash(),
        ));
    }
    text.push_str(&format!("*TOTAL PENGELUARAN:* {}", format_rupiah_spaced(total)));

    let delivery = if text.chars().count() > MAX_INLINE_CHARS {
        Delivery::Attachment {
            filename: ATTACHMENT_FILENAME.to_string(),
            caption: ATTACHMENT_CAPTION.to_string(),
        }
    } else {
        Delivery::Inline
    };

    Ok(Listing { text, delivery })
}

// ── Captions ──

/// Header line plus one bullet per category, largest first.
pub fn category_caption(month: MonthFilter, totals: &CategoryTotals) -> String {
    let mut caption = format!("📊 Distribusi Pengeluaran {}:\n", month.label());
    let lines: Vec<String> = totals
        .sorted_desc()
        .iter()
        .map(|b| format!("• {}: {}", b.label, format_rupiah_spaced(b.total)))
        .collect();
    caption.push_str(&lines.join("\n"));
    caption
}

pub fn top_caption(month: MonthFilter, ranked: &[RankedCategory]) -> String {
    let mut caption = format!("🏆 Top 5 Kategori Pengeluaran {}:\n", month.label());
    for (i, r) in ranked.iter().enumerate() {
        caption.push_str(&format!("{}. {}: {}\n", i + 1, r.label, format_rupiah(r.total)));
    }
    caption
}

pub fn daily_caption(month: MonthFilter) -> String {
    format!("Grafik Pengeluaran Harian Bulan {}", month.label())
}

pub fn report_caption(filter: Option<MonthFilter>) -> String {
    match filter {
        Some(month) => format!("Laporan pengeluaran lengkap untuk {}", month.label()),
        None => "Laporan pengeluaran lengkap".to_string(),
    }
}
