//! Moving-average cross state and golden/death crossover events.
//!
//! `CrossSignal` reports which side of the long SMA the short SMA is on right
//! now. `CrossoverEvent` reports whether the short SMA changed side between the
//! previous and the current sample.

use serde::{Deserialize, Serialize};

use super::{finite, ratio_pct, Category, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossSignal {
    BullishCross,
    BearishCross,
    InsufficientData,
}

impl Category for CrossSignal {
    fn code(&self) -> &'static str {
        match self {
            Self::BullishCross => "cross.bullish",
            Self::BearishCross => "cross.bearish",
            Self::InsufficientData => "insufficient_data",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverEvent {
    /// Short SMA crossed above the long SMA.
    GoldenCross,
    /// Short SMA crossed below the long SMA.
    DeathCross,
    None,
    InsufficientData,
}

impl Category for CrossoverEvent {
    fn code(&self) -> &'static str {
        match self {
            Self::GoldenCross => "crossover.golden",
            Self::DeathCross => "crossover.death",
            Self::None => "crossover.none",
            Self::InsufficientData => "insufficient_data",
        }
    }

    fn is_degenerate(&self) -> bool {
        matches!(self, Self::InsufficientData)
    }
}

/// Compare `cur(short)` with `cur(long)`.
///
/// Bullish when short > long, bearish otherwise (equality is bearish).
/// Magnitude: spread in percent of the long SMA, when the long SMA is non-zero.
pub fn classify_cross(short_cur: Option<f64>, long_cur: Option<f64>) -> Reading<CrossSignal> {
    let (Some(short), Some(long)) = (finite(short_cur), finite(long_cur)) else {
        return Reading::bare(CrossSignal::InsufficientData);
    };
    let category = if short > long {
        CrossSignal::BullishCross
    } else {
        CrossSignal::BearishCross
    };
    Reading::new(category, ratio_pct(short - long, long).value())
}

/// Classify a crossover from the spread `short - long` at the previous and current sample.
///
/// Golden: `prev <= 0 < cur`. Death: `prev >= 0 > cur`.
pub fn crossover_from_spreads(prev_spread: f64, cur_spread: f64) -> CrossoverEvent {
    if !prev_spread.is_finite() || !cur_spread.is_finite() {
        return CrossoverEvent::InsufficientData;
    }
    if cur_spread > 0.0 && prev_spread <= 0.0 {
        CrossoverEvent::GoldenCross
    } else if cur_spread < 0.0 && prev_spread >= 0.0 {
        CrossoverEvent::DeathCross
    } else {
        CrossoverEvent::None
    }
}

/// Detect a crossover of the short SMA through the long SMA.
///
/// All four samples must be defined. Magnitude: the current spread `short - long`.
pub fn classify_crossover(
    short_prev: Option<f64>,
    long_prev: Option<f64>,
    short_cur: Option<f64>,
    long_cur: Option<f64>,
) -> Reading<CrossoverEvent> {
    let (Some(sp), Some(lp), Some(sc), Some(lc)) = (
        finite(short_prev),
        finite(long_prev),
        finite(short_cur),
        finite(long_cur),
    ) else {
        return Reading::bare(CrossoverEvent::InsufficientData);
    };
    let cur_spread = sc - lc;
    Reading::new(crossover_from_spreads(sp - lp, cur_spread), Some(cur_spread))
}
