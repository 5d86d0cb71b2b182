//! Report and SMA table export.
//!
//! - **JSON**: the full `AnalysisReport`, schema-versioned
//! - **CSV**: one row per date with the price and every SMA column; the
//!   "not enough data" sentinel is an empty cell

use std::path::Path;

use anyhow::{bail, Context, Result};

use malens_core::domain::{MaLineTable, PriceSeries};
use malens_core::indicators::MovingAverages;

use crate::report::{AnalysisReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn report_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_report_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let json = report_json(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: `date`, `price`, then one column per line label in window order.
pub fn sma_csv(
    series: &PriceSeries,
    averages: &MovingAverages,
    table: &MaLineTable,
) -> Result<String> {
    let windows: Vec<usize> = averages.windows().collect();
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string(), "price".to_string()];
    header.extend(windows.iter().map(|w| table.label(*w)));
    wtr.write_record(&header)?;

    for (i, point) in series.points().iter().enumerate() {
        let mut row = vec![point.date.to_string(), point.price.to_string()];
        row.extend(windows.iter().map(|w| {
            averages
                .value_at(*w, i)
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default()
        }));
        wtr.write_record(&row)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn write_sma_csv(
    path: &Path,
    series: &PriceSeries,
    averages: &MovingAverages,
    table: &MaLineTable,
) -> Result<()> {
    let csv = sma_csv(series, averages, table)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
