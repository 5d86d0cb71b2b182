//! Analysis runner: wires loaded prices, configuration and the core session.
//!
//! Two entry points:
//! - `run_analysis()`: full report for the configured MA lines and profile.
//! - `run_sma()`: SMA table only, for an explicit set of windows.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use malens_core::domain::{MaLine, MaLineTable, WindowError};
use malens_core::engine::Session;
use malens_core::indicators::MovingAverages;

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::LoadedPrices;
use crate::report::{build_cards, AnalysisReport, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid windows: {0}")]
    Windows(#[from] WindowError),
}

/// Everything one analysis produced.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub averages: MovingAverages,
    pub table: MaLineTable,
}

/// Analyze `loaded` with the lines and profile from `config`.
pub fn run_analysis(loaded: &LoadedPrices, config: &AnalysisConfig) -> Result<AnalysisRun, RunError> {
    let table = config.line_table()?;
    let profile = config.signal_profile()?;

    let mut session = Session::new(table.windows());
    session.set_series(loaded.series.clone());
    let averages = session.moving_averages();
    let signals = session.analyze(&profile);
    let snapshot = session.snapshot();

    let report = AnalysisReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: loaded.source.clone(),
        synthetic: loaded.source.is_synthetic(),
        dataset_hash: loaded.dataset_hash.clone(),
        snapshot_version: snapshot.version,
        points: snapshot.len,
        warmup_days: snapshot.warmup,
        latest_date: snapshot.latest_date,
        latest_price: snapshot.latest_price,
        profile: profile.id,
        cards: build_cards(&loaded.series, &averages, &table),
        labelled: signals.labelled(&profile.labels),
        signals,
    };

    info!(
        profile = %profile.id,
        points = report.points,
        windows = table.lines().len(),
        cache_hits = session.cache().hits(),
        cache_misses = session.cache().misses(),
        "analysis complete"
    );

    Ok(AnalysisRun {
        report,
        averages,
        table,
    })
}

/// SMA table for explicit windows. Lines without a configured color get a neutral one.
pub fn run_sma(
    loaded: &LoadedPrices,
    windows: &[usize],
    config: &AnalysisConfig,
) -> Result<(MovingAverages, MaLineTable), RunError> {
    let configured = config.line_table()?;
    let lines = windows
        .iter()
        .map(|&w| {
            configured
                .get(w)
                .cloned()
                .unwrap_or_else(|| MaLine::new(w, "#888888"))
        })
        .collect();
    let table = MaLineTable::new(lines)?;

    let mut session = Session::new(table.windows());
    session.set_series(loaded.series.clone());
    Ok((session.moving_averages(), table))
}
