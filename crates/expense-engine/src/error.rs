//! The closed set of outcomes a caller has to present to the user.
//!
//! Malformed *values* never show up here; normalization absorbs them. These
//! are the structural conditions: bad arguments, backend trouble, nothing to
//! show, and rendering failures.

use thiserror::Error;

use crate::entry::EntryError;
use crate::filter::{FilterError, MonthFilter};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error("backend request timed out")]
    Timeout,

    #[error("backend request failed: {0}")]
    Network(String),

    #[error("no internet connectivity")]
    Offline,

    /// Informational: the snapshot (or the requested slice of it) is empty.
    #[error("no data: {0:?}")]
    NoData(NoData),

    #[error("rendering failed: {0}")]
    Render(String),
}

/// Which view came up empty; each has its own wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoData {
    /// The backend returned no records at all
    NoRecords,
    /// Records exist but none fall in the month
    NoRecordsInMonth(MonthFilter),
    /// The month has records but no category survived ranking
    NoCategoriesInMonth(MonthFilter),
    /// Records exist but none has a parsable date
    NoDatedRecords,
}

impl ReportError {
    /// "No data" is a defined result, not a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NoData(_))
    }

    /// The message shown to the end user for this outcome.
    pub fn user_message(&self) -> String {
        match self {
            Self::Filter(FilterError::Malformed(_)) => {
                "Format tidak valid. Gunakan: MM/YYYY (contoh: 04/2025)".to_string()
            }
            Self::Filter(FilterError::OutOfRange { .. }) => {
                "Format bulan/tahun tidak valid. Gunakan: MM/YYYY (contoh: 04/2025)".to_string()
            }
            Self::Entry(EntryError::WrongShape) => {
                "Format salah! Gunakan format: nominal, kategori, keterangan.\n\nKetik --help untuk melihat panduan penggunaan."
                    .to_string()
            }
            Self::Entry(EntryError::NotANumber) => "Nominal harus berupa angka!".to_string(),
            Self::Timeout => "⏱ Waktu koneksi habis, silakan coba lagi".to_string(),
            Self::Network(reason) => format!("⚠️ Gagal mengambil data: {reason}"),
            Self::Offline => "⚠️ Tidak ada koneksi internet".to_string(),
            Self::NoData(kind) => kind.user_message(),
            Self::Render(reason) => format!("⚠️ Gagal membuat grafik atau laporan: {reason}"),
        }
    }
}

impl NoData {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoRecords => "Tidak ada catatan pengeluaran.".to_string(),
            Self::NoRecordsInMonth(month) => format!("Tidak ada data pengeluaran untuk {}.", month.label()),
            Self::NoCategoriesInMonth(month) => format!("Tidak ada data kategori untuk {}.", month.label()),
            Self::NoDatedRecords => "Tidak ada data yang sesuai dengan filter.".to_string(),
        }
    }
}

impl From<NoData> for ReportError {
    fn from(kind: NoData) -> Self {
        Self::NoData(kind)
    }
}
