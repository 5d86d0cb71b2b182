//! Analysis report: one card per MA line plus the labelled signal set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use malens_core::domain::{MaLine, MaLineTable, PriceSeries, SnapshotVersion};
use malens_core::indicators::{round2, MovingAverages};
use malens_core::profile::ProfileId;
use malens_core::signals::{ratio_pct, LabelledSignal, SignalSet};

use crate::data_loader::DataSource;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Summary of one moving-average line at the latest date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaCard {
    pub window: usize,
    pub label: String,
    pub color: String,
    /// Latest SMA value; `None` while the window is still warming up.
    pub value: Option<f64>,
    /// Percent change of the SMA from the previous day.
    pub change_pct: Option<f64>,
    /// Percent distance of the price from the SMA.
    pub deviation_pct: Option<f64>,
    pub price_above: Option<bool>,
}

impl MaCard {
    /// Not enough history for this line yet.
    pub fn is_loading(&self) -> bool {
        self.value.is_none()
    }
}

fn pct(numer: f64, denom: f64) -> Option<f64> {
    ratio_pct(numer, denom).value().map(round2)
}

/// Build one card per line of `table`, in window order.
pub fn build_cards(
    series: &PriceSeries,
    averages: &MovingAverages,
    table: &MaLineTable,
) -> Vec<MaCard> {
    let price = series.latest().map(|p| p.price);
    table
        .lines()
        .iter()
        .map(|MaLine { window, color, label }| {
            let value = averages.latest(*window);
            let previous = averages.previous(*window);
            let change_pct = match (value, previous) {
                (Some(cur), Some(prev)) => pct(cur - prev, prev),
                _ => None,
            };
            let (deviation_pct, price_above) = match (value, price) {
                (Some(ma), Some(p)) => (pct(p - ma, ma), Some(p > ma)),
                _ => (None, None),
            };
            MaCard {
                window: *window,
                label: label.clone(),
                color: color.clone(),
                value,
                change_pct,
                deviation_pct,
                price_above,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: DataSource,
    pub synthetic: bool,
    pub dataset_hash: String,
    pub snapshot_version: SnapshotVersion,
    pub points: usize,
    /// Days of history needed before every line is defined.
    #[serde(default)]
    pub warmup_days: usize,
    pub latest_date: Option<NaiveDate>,
    pub latest_price: Option<f64>,
    pub profile: ProfileId,
    pub cards: Vec<MaCard>,
    pub signals: SignalSet,
    pub labelled: Vec<LabelledSignal>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}
