//! Integration tests for the runner pipeline.
//!
//! Tests:
//! 1. Loading real files: newest-first CSV, BOM-keyed JSON, unsupported formats.
//! 2. Updater: existing date is a no-op, a new date is inserted in order.
//! 3. Analysis report end to end, JSON round trip and schema guard.
//! 4. SMA CSV export to disk.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use tempfile::TempDir;

use malens_core::domain::PricePoint;
use malens_runner::{
    import_report_json, load_prices, report_json, run_analysis, run_sma, update_price_file,
    write_report_json, write_sma_csv, AnalysisConfig, DataSource, LoadError, PriceProvider,
    ProviderError, UpdateError, UpdateOutcome,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// In-memory provider that counts calls.
struct FixedProvider {
    price: f64,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(price: f64) -> Self {
        Self {
            price,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch_close(&self, date: NaiveDate) -> Result<PricePoint, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PricePoint::new(date, self.price))
    }
}

struct FailingProvider;

impl PriceProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn fetch_close(&self, _date: NaiveDate) -> Result<PricePoint, ProviderError> {
        Err(ProviderError::ResponseFormatChanged("missing market_data".into()))
    }
}

fn rising_csv(days: usize) -> String {
    let start = d("2023-01-01");
    let mut out = String::from("Date,Price\n");
    // newest first, like the dashboard's price file
    for i in (0..days).rev() {
        let date = start + chrono::Duration::days(i as i64);
        out.push_str(&format!("{date},{}\n", 100.0 + i as f64));
    }
    out
}

// ──────────────────────────────────────────────
// 1. Loading
// ──────────────────────────────────────────────

#[test]
fn loads_newest_first_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "btc-price.csv", &rising_csv(5));
    let loaded = load_prices(&path).unwrap();

    assert_eq!(loaded.series.len(), 5);
    assert_eq!(loaded.series.first().unwrap().date, d("2023-01-01"));
    assert_eq!(loaded.series.latest().unwrap().price, 104.0);
    assert_eq!(loaded.source, DataSource::CsvFile { path });
    assert_eq!(loaded.dataset_hash.len(), 64);
}

#[test]
fn loads_json_with_bom_keys() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "prices.json",
        r#"[{"\ufeffDate":"2024-02-02","Price":"43000"},{"\ufeffDate":"2024-02-01","Price":42000.5}]"#,
    );
    let loaded = load_prices(&path).unwrap();
    assert_eq!(loaded.series.len(), 2);
    assert_eq!(loaded.series.first().unwrap().price, 42000.5);
}

#[test]
fn csv_and_json_of_same_data_hash_equal() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "a.csv", "date,price\n2024-01-01,1.5\n2024-01-02,2\n");
    let json = write(
        &dir,
        "a.json",
        r#"[{"date":"2024-01-02","price":2},{"date":"2024-01-01","price":"1.5"}]"#,
    );
    assert_eq!(
        load_prices(&csv).unwrap().dataset_hash,
        load_prices(&json).unwrap().dataset_hash
    );
}

#[test]
fn unsupported_and_missing_files() {
    let dir = TempDir::new().unwrap();
    let txt = write(&dir, "prices.txt", "date,price\n");
    assert!(matches!(
        load_prices(&txt),
        Err(LoadError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        load_prices(&dir.path().join("absent.csv")),
        Err(LoadError::Io { .. })
    ));
    let empty = write(&dir, "empty.csv", "date,price\n");
    assert!(matches!(load_prices(&empty), Err(LoadError::Empty(_))));
}

// ──────────────────────────────────────────────
// 2. Updater
// ──────────────────────────────────────────────

#[test]
fn existing_date_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let original = "Date,Price\n2024-01-02,2\n2024-01-01,1\n";
    let path = write(&dir, "p.csv", original);
    let provider = FixedProvider::new(9.0);

    let outcome = update_price_file(&path, &provider, d("2024-01-02")).unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::AlreadyPresent {
            date: d("2024-01-02")
        }
    );
    assert_eq!(provider.calls(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn new_date_is_inserted_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "p.csv", "Date,Price\n2024-01-03,3\n2024-01-01,1\n");
    let provider = FixedProvider::new(2.25);

    let outcome = update_price_file(&path, &provider, d("2024-01-02")).unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Added {
            date: d("2024-01-02"),
            price: 2.25
        }
    );
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "date,price\n2024-01-01,1\n2024-01-02,2.25\n2024-01-03,3\n"
    );
    assert!(!Path::new(&path.with_extension("csv.tmp")).exists());
}

#[test]
fn update_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new.csv");
    let provider = FixedProvider::new(100.0);
    update_price_file(&path, &provider, d("2024-05-01")).unwrap();
    let loaded = load_prices(&path).unwrap();
    assert_eq!(loaded.series.len(), 1);
}

#[test]
fn provider_failure_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let original = "date,price\n2024-01-01,1\n";
    let path = write(&dir, "p.csv", original);

    let err = update_price_file(&path, &FailingProvider, d("2024-01-02")).unwrap_err();
    assert!(matches!(
        err,
        UpdateError::Provider(ProviderError::ResponseFormatChanged(_))
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

// ──────────────────────────────────────────────
// 3. Reports
// ──────────────────────────────────────────────

#[test]
fn report_end_to_end_and_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "p.csv", &rising_csv(120));
    let loaded = load_prices(&path).unwrap();
    let config = AnalysisConfig::from_toml_str(
        r##"
        [[lines]]
        window = 7
        color = "#111111"
        label = "MA7"

        [[lines]]
        window = 30
        color = "#222222"
        label = "MA30"
        "##,
    )
    .unwrap();

    let run = run_analysis(&loaded, &config).unwrap();
    let report = &run.report;
    assert_eq!(report.cards.len(), 2);
    assert!(report.cards.iter().all(|c| c.price_above == Some(true)));
    assert_eq!(report.latest_price, Some(219.0));
    let cross = report.labelled.iter().find(|r| r.signal == "cross").unwrap();
    assert_eq!(cross.code, "cross.bullish");

    let out = dir.path().join("report.json");
    write_report_json(&out, report).unwrap();
    let restored = import_report_json(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(&restored, report);
}

#[test]
fn future_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "p.csv", &rising_csv(10));
    let run = run_analysis(&load_prices(&path).unwrap(), &AnalysisConfig::default()).unwrap();
    let mut report = run.report;
    report.schema_version = 99;
    let json = report_json(&report).unwrap();
    let err = import_report_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

// ──────────────────────────────────────────────
// 4. SMA export
// ──────────────────────────────────────────────

#[test]
fn sma_csv_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "p.csv", &rising_csv(4));
    let loaded = load_prices(&path).unwrap();
    let (ma, table) = run_sma(&loaded, &[2], &AnalysisConfig::default()).unwrap();

    let out = dir.path().join("sma.csv");
    write_sma_csv(&out, &loaded.series, &ma, &table).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,price,MA2");
    assert_eq!(lines[1], "2023-01-01,100,");
    assert_eq!(lines[4], "2023-01-04,103,102.50");
}
