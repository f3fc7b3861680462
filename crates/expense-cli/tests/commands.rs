use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use expense_cli::backend::ExpenseBackend;
use expense_cli::cache::RecordSource;
use expense_cli::commands::{App, Command};
use expense_cli::config::Config;
use expense_engine::entry::NewEntry;
use expense_engine::{ExpenseRecord, ReportError};

#[derive(Default)]
struct Calls {
    connectivity: AtomicUsize,
    fetches: AtomicUsize,
    submits: AtomicUsize,
    offline: AtomicBool,
}

impl Calls {
    fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

struct FakeBackend {
    calls: Arc<Calls>,
    records: Vec<ExpenseRecord>,
}

impl RecordSource for FakeBackend {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>, ReportError> {
        self.calls.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

impl ExpenseBackend for FakeBackend {
    async fn check_connectivity(&self) -> Result<(), ReportError> {
        self.calls.connectivity.fetch_add(1, Ordering::SeqCst);
        if self.calls.offline.load(Ordering::SeqCst) {
            return Err(ReportError::Offline);
        }
        Ok(())
    }

    async fn submit_entry(&self, entry: &NewEntry) -> Result<String, ReportError> {
        self.calls.submits.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Data berhasil disimpan: {} {}", entry.nominal, entry.kategori))
    }
}

fn config() -> Config {
    Config {
        backend_url: "https://script.example.com/exec".to_string(),
        backend_timeout: Duration::from_secs(10),
        probe_url: "https://google.com".to_string(),
        probe_timeout: Duration::from_secs(5),
        output_dir: PathBuf::from("out"),
        backup_dir: PathBuf::from("backups"),
        backup_interval_hours: 24,
    }
}

fn setup(records: Vec<ExpenseRecord>) -> (Arc<Calls>, App<FakeBackend>) {
    let calls = Arc::new(Calls::default());
    let backend = FakeBackend {
        calls: calls.clone(),
        records,
    };
    (calls, App::with_backend(config(), backend))
}

fn records() -> Vec<ExpenseRecord> {
    vec![
        ExpenseRecord::new("05-04-2025", "Makanan", "50.000", "Makan siang"),
        ExpenseRecord::new("05-04-2025", "Transport", "20000", "Ojek"),
    ]
}

fn report_error(err: &anyhow::Error) -> &ReportError {
    err.downcast_ref::<ReportError>().unwrap()
}

#[tokio::test]
async fn test_invalid_month_never_reaches_the_backend() {
    let (calls, app) = setup(records());
    for command in [
        Command::Report {
            month: Some("13/2025".to_string()),
        },
        Command::Categories {
            month: Some("04-2025".to_string()),
        },
        Command::Top {
            month: Some("01/1999".to_string()),
        },
    ] {
        let err = app.execute(&command).await.unwrap_err();
        assert!(matches!(report_error(&err), ReportError::Filter(_)), "{err:?}");
    }
    assert_eq!(Calls::get(&calls.connectivity), 0);
    assert_eq!(Calls::get(&calls.fetches), 0);
}

#[tokio::test]
async fn test_list_is_served_from_the_cache() {
    let (calls, app) = setup(records());

    let out = app.execute(&Command::List).await.unwrap();
    assert!(out.message.ends_with("*TOTAL PENGELUARAN:* Rp 70.000"));
    app.execute(&Command::List).await.unwrap();
    assert_eq!(Calls::get(&calls.fetches), 1);
    assert_eq!(Calls::get(&calls.connectivity), 2);
}

#[tokio::test]
async fn test_offline_stops_before_fetching() {
    let (calls, app) = setup(records());
    calls.offline.store(true, Ordering::SeqCst);

    let err = app.execute(&Command::List).await.unwrap_err();
    assert!(matches!(report_error(&err), ReportError::Offline));
    assert_eq!(Calls::get(&calls.fetches), 0);
}

#[tokio::test]
async fn test_empty_snapshot_is_informational() {
    let (_, app) = setup(Vec::new());
    let err = app.execute(&Command::List).await.unwrap_err();
    assert!(report_error(&err).is_informational());
}

#[tokio::test]
async fn test_add_validates_then_submits_and_invalidates() {
    let (calls, app) = setup(records());
    app.execute(&Command::List).await.unwrap();

    let err = app
        .execute(&Command::Add {
            message: "abc, Makanan, siang".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(report_error(&err), ReportError::Entry(_)));
    assert_eq!(Calls::get(&calls.submits), 0);

    let out = app
        .execute(&Command::Add {
            message: "15.000, Makanan, Kopi".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(out.message, "Data berhasil disimpan: 15000 Makanan");
    assert_eq!(Calls::get(&calls.submits), 1);

    // the next read fetches again
    app.execute(&Command::List).await.unwrap();
    assert_eq!(Calls::get(&calls.fetches), 2);
}
