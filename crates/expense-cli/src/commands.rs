//! Command handling: argument validation, fetching, rendering and delivery.
//!
//! The `*_view` functions are pure over a record snapshot and return what a
//! chat layer would send (a message plus attachments). [`App`] wires them to
//! the backend, the snapshot cache and the output directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;
use expense_engine::aggregate::{by_category, by_day, records_in_month};
use expense_engine::chart::plan::{DAILY_SIZE, PIE_SIZE, TOP_SIZE, category_pie, daily_chart, top_chart};
use expense_engine::chart::{ChartSpec, render_png};
use expense_engine::entry::parse_entry_message;
use expense_engine::filter::parse_month_filter;
use expense_engine::format::month_name;
use expense_engine::listing::{
    ATTACHMENT_FILENAME, Delivery, build_listing, category_caption, daily_caption, top_caption,
};
use expense_engine::report::{REPORT_FILENAME, generate_report};
use expense_engine::top::{DEFAULT_TOP_N, top_categories};
use expense_engine::{ExpenseRecord, MonthFilter, NoData, ReportError};
use tracing::{error, info};

use crate::backend::{ExpenseBackend, HttpBackend};
use crate::backup::{export_csv, write_backup};
use crate::cache::{Snapshot, SnapshotCache};
use crate::config::Config;
use crate::scheduler;
use crate::telemetry::preview;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every expense with the grand total
    List,
    /// Daily spending chart for the current month
    Daily,
    /// Category pie chart (default: current month)
    Categories {
        /// Month as MM/YYYY
        month: Option<String>,
    },
    /// Five largest categories (default: current month)
    Top {
        /// Month as MM/YYYY
        month: Option<String>,
    },
    /// Multi-month PDF report
    Report {
        /// Narrows the caption and drops the monthly comparison, MM/YYYY
        month: Option<String>,
    },
    /// Submit an expense: "nominal, kategori, keterangan"
    Add { message: String },
    /// Write the snapshot as CSV
    Export { path: PathBuf },
    /// Write backup_YYYYMMDD.json to the backup directory
    Backup {
        /// Keep running and back up every N hours (config default when no value)
        #[arg(long, value_name = "HOURS", num_args = 0..=1)]
        every_hours: Option<Option<u64>>,
    },
    /// Probe internet connectivity and the backend
    Check,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Daily => "daily",
            Self::Categories { .. } => "categories",
            Self::Top { .. } => "top",
            Self::Report { .. } => "report",
            Self::Add { .. } => "add",
            Self::Export { .. } => "export",
            Self::Backup { .. } => "backup",
            Self::Check => "check",
        }
    }
}

// ── Views ──

/// A file sent alongside the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub message: String,
    pub artifacts: Vec<Artifact>,
}

impl CommandOutput {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            artifacts: Vec::new(),
        }
    }
}

/// `None` means the current month.
pub fn resolve_filter(arg: Option<&str>) -> Result<Option<MonthFilter>, ReportError> {
    arg.map(parse_month_filter).transpose().map_err(ReportError::from)
}

pub fn list_view(records: &[ExpenseRecord]) -> Result<CommandOutput, ReportError> {
    let listing = build_listing(records)?;
    Ok(match listing.delivery {
        Delivery::Inline => CommandOutput::text(listing.text),
        Delivery::Attachment { filename, caption } => CommandOutput {
            message: caption,
            artifacts: vec![Artifact {
                filename,
                bytes: listing.text.into_bytes(),
            }],
        },
    })
}

pub fn daily_view(records: &[ExpenseRecord], month: MonthFilter) -> Result<CommandOutput, ReportError> {
    let in_month = records_in_month(records, month);
    if in_month.is_empty() {
        return Err(NoData::NoRecordsInMonth(month).into());
    }

    let chart = daily_chart(&by_day(in_month), "Grafik Pengeluaran Harian", DAILY_SIZE);
    let png = render_png(&ChartSpec::Bars(chart))?;
    Ok(CommandOutput {
        message: daily_caption(month),
        artifacts: vec![Artifact {
            filename: format!("grafik_pengeluaran_{}_{}.png", month_name(month.month), month.year),
            bytes: png,
        }],
    })
}

pub fn category_view(records: &[ExpenseRecord], month: MonthFilter) -> Result<CommandOutput, ReportError> {
    let totals = by_category(records, Some(month));
    if totals.is_empty() {
        return Err(NoData::NoRecordsInMonth(month).into());
    }

    let title = format!("Persentase Pengeluaran per Kategori {}", month.label());
    let pie = category_pie(&totals, &title, PIE_SIZE)
        .ok_or_else(|| ReportError::Render("semua nominal kategori bernilai nol".to_string()))?;
    let png = render_png(&ChartSpec::Pie(pie))?;
    Ok(CommandOutput {
        message: category_caption(month, &totals),
        artifacts: vec![Artifact {
            filename: format!("kategori_{}_{}.png", month.month, month.year),
            bytes: png,
        }],
    })
}

pub fn top_view(records: &[ExpenseRecord], month: MonthFilter) -> Result<CommandOutput, ReportError> {
    let ranked = top_categories(&by_category(records, Some(month)), DEFAULT_TOP_N);
    if ranked.is_empty() {
        return Err(NoData::NoCategoriesInMonth(month).into());
    }

    let title = format!("5 Kategori Pengeluaran Tertinggi {}", month.label());
    let png = render_png(&ChartSpec::Bars(top_chart(&ranked, &title, TOP_SIZE)))?;
    Ok(CommandOutput {
        message: top_caption(month, &ranked),
        artifacts: vec![Artifact {
            filename: format!("top_kategori_{}_{}.png", month.month, month.year),
            bytes: png,
        }],
    })
}

pub fn report_view(records: &[ExpenseRecord], filter: Option<MonthFilter>) -> Result<CommandOutput, ReportError> {
    let report = generate_report(records, filter)?;
    Ok(CommandOutput {
        message: report.caption,
        artifacts: vec![Artifact {
            filename: REPORT_FILENAME.to_string(),
            bytes: report.pdf,
        }],
    })
}

// ── Application ──

pub struct App<B = HttpBackend> {
    config: Config,
    cache: SnapshotCache<B>,
}

impl App<HttpBackend> {
    pub fn new(config: Config) -> Result<Self> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::with_backend(config, backend))
    }
}

impl<B: ExpenseBackend> App<B> {
    pub fn with_backend(config: Config, backend: B) -> Self {
        Self {
            config,
            cache: SnapshotCache::new(backend),
        }
    }

    /// Run one command and report the outcome.
    ///
    /// Engine failures are shown with their user-facing message; "no data"
    /// counts as success.
    pub async fn run(&self, command: Command) -> Result<ExitCode> {
        info!(command = command.name(), "command received");

        match self.execute(&command).await {
            Ok(output) => {
                self.deliver(&output)?;
                info!(
                    command = command.name(),
                    reply = %preview(&output.message),
                    len = output.message.chars().count(),
                    "command answered"
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => match e.downcast_ref::<ReportError>() {
                Some(report_error) if report_error.is_informational() => {
                    info!(command = command.name(), reply = %report_error.user_message(), "no data");
                    println!("{}", report_error.user_message());
                    Ok(ExitCode::SUCCESS)
                }
                Some(report_error) => {
                    error!(command = command.name(), error = %report_error, "command failed");
                    eprintln!("{}", report_error.user_message());
                    Ok(ExitCode::FAILURE)
                }
                None => Err(e),
            },
        }
    }

    /// Produce the reply for `command` without printing or writing anything.
    ///
    /// Month arguments are validated before the backend is contacted.
    pub async fn execute(&self, command: &Command) -> Result<CommandOutput> {
        let output = match command {
            Command::List => {
                let snapshot = self.snapshot(false).await?;
                offload(snapshot, list_view).await?
            }
            Command::Daily => {
                let month = MonthFilter::current();
                let snapshot = self.snapshot(false).await?;
                offload(snapshot, move |r| daily_view(r, month)).await?
            }
            Command::Categories { month } => {
                let month = resolve_filter(month.as_deref())?.unwrap_or_else(MonthFilter::current);
                let snapshot = self.snapshot(true).await?;
                offload(snapshot, move |r| category_view(r, month)).await?
            }
            Command::Top { month } => {
                let month = resolve_filter(month.as_deref())?.unwrap_or_else(MonthFilter::current);
                let snapshot = self.snapshot(true).await?;
                offload(snapshot, move |r| top_view(r, month)).await?
            }
            Command::Report { month } => {
                let filter = resolve_filter(month.as_deref())?;
                let snapshot = self.snapshot(true).await?;
                offload(snapshot, move |r| report_view(r, filter)).await?
            }
            Command::Add { message } => {
                let entry = parse_entry_message(message).map_err(ReportError::from)?;
                let backend = self.cache.source();
                backend.check_connectivity().await?;
                let reply = backend.submit_entry(&entry).await?;
                // the next read must see the new row
                self.cache.invalidate().await;
                CommandOutput::text(reply)
            }
            Command::Export { path } => {
                let snapshot = self.snapshot(false).await?;
                export_csv(path, &snapshot.records)?;
                CommandOutput::text(format!(
                    "{} catatan diekspor ke {}",
                    snapshot.records.len(),
                    path.display()
                ))
            }
            Command::Backup { every_hours } => match every_hours {
                None => {
                    let path = self.backup_once().await?;
                    CommandOutput::text(format!("Backup dibuat: {}", path.display()))
                }
                Some(hours) => {
                    let every = scheduler::hours(hours.unwrap_or(self.config.backup_interval_hours));
                    scheduler::run_every(every, || async { self.backup_once().await.map(|_| ()) }).await;
                    CommandOutput::default()
                }
            },
            Command::Check => self.check().await?,
        };
        Ok(output)
    }

    /// Connectivity first, then the (possibly cached) snapshot.
    async fn snapshot(&self, force_refresh: bool) -> Result<Snapshot, ReportError> {
        self.cache.source().check_connectivity().await?;
        self.cache.get(force_refresh).await
    }

    async fn backup_once(&self) -> Result<PathBuf> {
        let snapshot = self.snapshot(true).await?;
        write_backup(&self.config.backup_dir, &snapshot.records, Local::now().date_naive())
    }

    /// Probe each hop in order, printing as it succeeds; the first failure
    /// ends the check with its own message.
    async fn check(&self) -> Result<CommandOutput> {
        let backend = self.cache.source();

        backend.check_connectivity().await?;
        println!("✅ Berhasil terhubung ke {}", self.config.probe_url);

        let snapshot = self.cache.get(true).await?;
        println!("✅ Backend merespons: {} catatan", snapshot.records.len());

        Ok(CommandOutput::text("Semua koneksi normal"))
    }

    /// Print the message and write attachments to the output directory.
    fn deliver(&self, output: &CommandOutput) -> Result<()> {
        if !output.message.is_empty() {
            println!("{}", output.message);
        }
        if output.artifacts.is_empty() {
            return Ok(());
        }

        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        for artifact in &output.artifacts {
            let path = write_artifact(dir, artifact)?;
            println!("  Generated: {}", path.display());
        }
        Ok(())
    }
}

fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf> {
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");
    Ok(path)
}

/// Run a CPU-bound view on the blocking pool.
async fn offload<F>(snapshot: Snapshot, view: F) -> Result<CommandOutput, ReportError>
where
    F: FnOnce(&[ExpenseRecord]) -> Result<CommandOutput, ReportError> + Send + 'static,
{
    let records: Arc<Vec<ExpenseRecord>> = snapshot.records;
    tokio::task::spawn_blocking(move || view(&records))
        .await
        .map_err(|e| ReportError::Render(format!("render task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn april() -> MonthFilter {
        MonthFilter::new(2025, 4)
    }

    fn records() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new("05-04-2025", "Makanan", "50.000", "Makan siang"),
            ExpenseRecord::new("05-04-2025", "Transport", "20000", "Ojek"),
            ExpenseRecord::new("06-04-2025", "Makanan", "abc", ""),
        ]
    }

    #[test]
    fn test_resolve_filter() {
        assert_eq!(resolve_filter(None).unwrap(), None);
        assert_eq!(resolve_filter(Some("04/2025")).unwrap(), Some(april()));
        assert!(matches!(resolve_filter(Some("13/2025")), Err(ReportError::Filter(_))));
        assert!(matches!(resolve_filter(Some("april")), Err(ReportError::Filter(_))));
    }

    #[test]
    fn test_list_view_inline() {
        let out = list_view(&records()).unwrap();
        assert!(out.artifacts.is_empty());
        assert!(out.message.ends_with("*TOTAL PENGELUARAN:* Rp 70.000"));
    }

    #[test]
    fn test_list_view_attachment() {
        let many: Vec<ExpenseRecord> = (0..80)
            .map(|i| ExpenseRecord::new("05-04-2025", "Makanan", "1.000", &format!("catatan {i}")))
            .collect();
        let out = list_view(&many).unwrap();
        assert_eq!(out.artifacts.len(), 1);
        assert_eq!(out.artifacts[0].filename, ATTACHMENT_FILENAME);
        assert_eq!(out.message, "Data pengeluaran (terlalu panjang untuk pesan biasa)");
    }

    #[test]
    fn test_empty_views_are_informational() {
        let may = MonthFilter::new(2025, 5);
        for result in [
            list_view(&[]),
            daily_view(&records(), may),
            category_view(&records(), may),
            top_view(&records(), may),
            report_view(&[], None),
        ] {
            let err = result.unwrap_err();
            assert!(err.is_informational(), "{err:?}");
        }
    }

    #[test]
    fn test_zero_total_pie_is_a_render_error() {
        let zero = vec![ExpenseRecord::new("05-04-2025", "Makanan", "abc", "")];
        assert!(matches!(category_view(&zero, april()), Err(ReportError::Render(_))));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Report { month: None }.name(), "report");
        assert_eq!(Command::Backup { every_hours: Some(None) }.name(), "backup");
    }

    #[test]
    #[ignore = "needs system fonts for chart rendering"]
    fn test_chart_views_name_their_files() {
        let out = daily_view(&records(), april()).unwrap();
        assert_eq!(out.artifacts[0].filename, "grafik_pengeluaran_April_2025.png");
        assert_eq!(out.message, "Grafik Pengeluaran Harian Bulan April 2025");

        let out = category_view(&records(), april()).unwrap();
        assert_eq!(out.artifacts[0].filename, "kategori_4_2025.png");

        let out = top_view(&records(), april()).unwrap();
        assert_eq!(out.artifacts[0].filename, "top_kategori_4_2025.png");
    }
}
