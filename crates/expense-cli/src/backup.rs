//! Snapshot persistence: dated JSON backups and CSV export

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use expense_engine::ExpenseRecord;
use expense_engine::normalize::record_amount;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// `backup_YYYYMMDD.json`
pub fn backup_filename(date: NaiveDate) -> String {
    format!("backup_{}.json", date.format("%Y%m%d"))
}

/// Write the snapshot to `dir/backup_YYYYMMDD.json`, replacing any backup
/// already taken that day.
pub fn write_backup(dir: &Path, records: &[ExpenseRecord], date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create backup directory: {}", dir.display()))?;
    let path = dir.join(backup_filename(date));
    let json = serde_json::to_vec(records).context("Failed to serialize records")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write backup: {}", path.display()))?;
    info!(path = %path.display(), count = records.len(), "backup created");
    Ok(path)
}

/// Write records as CSV, raw fields followed by the normalized amount.
pub fn write_csv<W: Write>(writer: W, records: &[ExpenseRecord]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    // Header
    wtr.write_record(["tanggal", "kategori", "nominal", "keterangan", "nominal_normalized"])?;

    for record in records {
        wtr.write_record([
            record.date.as_deref().unwrap_or(""),
            record.category.as_deref().unwrap_or(""),
            record.amount.as_deref().unwrap_or(""),
            record.note.as_deref().unwrap_or(""),
            &record_amount(record).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Generate a CSV export at `path`
pub fn export_csv(path: &Path, records: &[ExpenseRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, records).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), count = records.len(), "csv exported");
    Ok(())
}
