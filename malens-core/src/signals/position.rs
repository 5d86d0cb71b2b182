//! Price-vs-MA regime classifiers.
//!
//! `PricePosition` compares the price with every configured SMA.
//! `Proximity` measures how far the price sits from the key long-term SMA.

use serde::{Deserialize, Serialize};

use super::{finite, percent_change, Category, Measure, Reading};
use crate::profile::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePosition {
    /// Price above every SMA.
    StrongUp,
    /// Price below every SMA.
    StrongDown,
    RangeBound,
    InsufficientData,
}

impl Category for PricePosition {
    fn code(&self) -> &'static str {
        match self {
            Self::StrongUp => "position.strong_up",
            Self::StrongDown => "position.strong_down",
            Self::RangeBound => "position.range_bound",
            Self::InsufficientData => "insufficient_data",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    FarAbove,
    FarBelow,
    AtKeyLevel,
    Moderate,
    InsufficientData,
    Undefined,
}

impl Category for Proximity {
    fn code(&self) -> &'static str {
        match self {
            Self::FarAbove => "proximity.far_above",
            Self::FarBelow => "proximity.far_below",
            Self::AtKeyLevel => "proximity.at_key_level",
            Self::Moderate => "proximity.moderate",
            Self::InsufficientData => "insufficient_data",
            Self::Undefined => "undefined",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData | Self::Undefined)
    }
}

/// Classify the price against every `cur(W)`.
///
/// Every SMA must be defined. Magnitude: how many SMAs the price is above.
pub fn classify_position(price: Option<f64>, currents: &[Option<f64>]) -> Reading<PricePosition> {
    let Some(price) = finite(price) else {
        return Reading::bare(PricePosition::InsufficientData);
    };
    if currents.is_empty() {
        return Reading::bare(PricePosition::InsufficientData);
    }
    let mut above = 0usize;
    let mut below = 0usize;
    for value in currents {
        let Some(ma) = finite(*value) else {
            return Reading::bare(PricePosition::InsufficientData);
        };
        if price > ma {
            above += 1;
        } else if price < ma {
            below += 1;
        }
    }
    let category = if above == currents.len() {
        PricePosition::StrongUp
    } else if below == currents.len() {
        PricePosition::StrongDown
    } else {
        PricePosition::RangeBound
    };
    Reading::new(category, Some(above as f64))
}

/// Classify the deviation `(price - key) / key * 100`.
///
/// `|dev| <= tolerance` is the key level; `dev >= far` / `dev <= -far` are far
/// above / below; anything else is moderate.
pub fn classify_proximity(
    price: Option<f64>,
    key_ma: Option<f64>,
    thresholds: &Thresholds,
) -> Reading<Proximity> {
    let deviation = match percent_change(key_ma, price) {
        Measure::Value(v) => v,
        Measure::Insufficient => return Reading::bare(Proximity::InsufficientData),
        Measure::Undefined => return Reading::bare(Proximity::Undefined),
    };
    let category = if deviation.abs() <= thresholds.key_level_tolerance_pct {
        Proximity::AtKeyLevel
    } else if deviation >= thresholds.far_deviation_pct {
        Proximity::FarAbove
    } else if deviation <= -thresholds.far_deviation_pct {
        Proximity::FarBelow
    } else {
        Proximity::Moderate
    };
    Reading::new(category, Some(deviation))
}
