//! Slope grading of the cross pair.

use serde::{Deserialize, Serialize};

use super::{percent_change, Category, Measure, SlopeReading};
use crate::profile::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeStrength {
    StrongUp,
    StrongDown,
    Flat,
    ModerateUp,
    ModerateDown,
    InsufficientData,
    Undefined,
}

impl Category for SlopeStrength {
    fn code(&self) -> &'static str {
        match self {
            Self::StrongUp => "slope.strong_up",
            Self::StrongDown => "slope.strong_down",
            Self::Flat => "slope.flat",
            Self::ModerateUp => "slope.moderate_up",
            Self::ModerateDown => "slope.moderate_down",
            Self::InsufficientData => "insufficient_data",
            Self::Undefined => "undefined",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData | Self::Undefined)
    }
}

/// Grade the percent slopes of the short and long SMA.
///
/// Strong when both slopes pass `slope_strong_pct` in the same direction, flat
/// when both are inside `slope_flat_pct`, otherwise moderate in the direction of
/// the summed slopes.
pub fn classify_slope(short: Measure, long: Measure, thresholds: &Thresholds) -> SlopeReading {
    let reading = |category| SlopeReading {
        category,
        short_slope_pct: short.value(),
        long_slope_pct: long.value(),
    };
    let (s, l) = match (short, long) {
        (Measure::Value(s), Measure::Value(l)) => (s, l),
        (Measure::Insufficient, _) | (_, Measure::Insufficient) => {
            return reading(SlopeStrength::InsufficientData)
        }
        _ => return reading(SlopeStrength::Undefined),
    };

    let strong = thresholds.slope_strong_pct;
    let flat = thresholds.slope_flat_pct;
    let category = if s >= strong && l >= strong {
        SlopeStrength::StrongUp
    } else if s <= -strong && l <= -strong {
        SlopeStrength::StrongDown
    } else if s.abs() < flat && l.abs() < flat {
        SlopeStrength::Flat
    } else if s + l > 0.0 {
        SlopeStrength::ModerateUp
    } else if s + l < 0.0 {
        SlopeStrength::ModerateDown
    } else {
        SlopeStrength::Flat
    };
    reading(category)
}
