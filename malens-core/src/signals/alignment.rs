//! Structure of the SMA fan: ordering (alignment) and spread (congestion).

use serde::{Deserialize, Serialize};

use super::{finite, ratio_pct, Category, Measure, Reading};
use crate::profile::{BandEdge, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// SMA values strictly decrease as the window grows.
    Bullish,
    /// SMA values strictly increase as the window grows.
    Bearish,
    None,
    InsufficientData,
}

impl Category for Alignment {
    fn code(&self) -> &'static str {
        match self {
            Self::Bullish => "alignment.bullish",
            Self::Bearish => "alignment.bearish",
            Self::None => "alignment.none",
            Self::InsufficientData => "insufficient_data",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Congestion {
    ExtremeDense,
    Dense,
    Dispersed,
    HighlyDispersed,
    InsufficientData,
    Undefined,
}

impl Category for Congestion {
    fn code(&self) -> &'static str {
        match self {
            Self::ExtremeDense => "congestion.extreme_dense",
            Self::Dense => "congestion.dense",
            Self::Dispersed => "congestion.dispersed",
            Self::HighlyDispersed => "congestion.highly_dispersed",
            Self::InsufficientData => "insufficient_data",
            Self::Undefined => "undefined",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData | Self::Undefined)
    }
}

/// Collect every `cur(W)`; `None` if fewer than two or any is missing.
fn defined_fan(currents: &[Option<f64>]) -> Option<Vec<f64>> {
    if currents.len() < 2 {
        return None;
    }
    currents.iter().map(|v| finite(*v)).collect()
}

/// Classify the ordering of `cur(W)` given in increasing-window order.
pub fn classify_alignment(currents: &[Option<f64>]) -> Reading<Alignment> {
    let Some(values) = defined_fan(currents) else {
        return Reading::bare(Alignment::InsufficientData);
    };
    let category = if values.windows(2).all(|p| p[0] > p[1]) {
        Alignment::Bullish
    } else if values.windows(2).all(|p| p[0] < p[1]) {
        Alignment::Bearish
    } else {
        Alignment::None
    };
    Reading::bare(category)
}

/// Classify `range = (max cur - min cur) / price * 100` into the profile's bands.
pub fn classify_congestion(
    currents: &[Option<f64>],
    price: Option<f64>,
    thresholds: &Thresholds,
) -> Reading<Congestion> {
    let (Some(values), Some(price)) = (defined_fan(currents), finite(price)) else {
        return Reading::bare(Congestion::InsufficientData);
    };
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let range = match ratio_pct(max - min, price) {
        Measure::Value(v) => v,
        _ => return Reading::bare(Congestion::Undefined),
    };
    Reading::new(
        band_for(range, &thresholds.congestion_bands, thresholds.band_edge),
        Some(range),
    )
}

fn band_for(range: f64, edges: &[f64; 3], edge: BandEdge) -> Congestion {
    if edge.within(range, edges[0]) {
        Congestion::ExtremeDense
    } else if edge.within(range, edges[1]) {
        Congestion::Dense
    } else if edge.within(range, edges[2]) {
        Congestion::Dispersed
    } else {
        Congestion::HighlyDispersed
    }
}
