//! Trend-signal analyzer.
//!
//! Every signal is a pure classification of the current snapshot: the current
//! price and, per window, the latest and previous SMA values. Nothing looks
//! further back and nothing is remembered between calls.
//!
//! Missing or non-finite inputs produce an explicit insufficient-data category;
//! a zero denominator produces an undefined category. No classifier returns NaN
//! or panics.

pub mod alignment;
pub mod analyzer;
pub mod cross;
pub mod input;
pub mod position;
pub mod slope;

pub use alignment::{classify_alignment, classify_congestion, Alignment, Congestion};
pub use analyzer::{analyze, resolve_windows, ResolvedWindows};
pub use cross::{
    classify_cross, classify_crossover, crossover_from_spreads, CrossSignal, CrossoverEvent,
};
pub use input::{AnalysisInput, MaSample};
pub use position::{classify_position, classify_proximity, PricePosition, Proximity};
pub use slope::{classify_slope, SlopeStrength};

use serde::{Deserialize, Serialize};

use crate::profile::Labels;

/// A categorical signal tag with a stable code used for label lookup.
pub trait Category: Copy {
    fn code(&self) -> &'static str;

    /// Whether this category means the inputs did not support a classification.
    fn is_degenerate(&self) -> bool;
}

/// One signal outcome: a category plus an optional magnitude.
///
/// The unit depends on the signal: a percentage for cross, congestion and
/// proximity, a count of SMAs for position, and the short-minus-long price
/// spread for crossover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading<C> {
    pub category: C,
    pub magnitude: Option<f64>,
}

impl<C: Category> Reading<C> {
    pub fn new(category: C, magnitude: Option<f64>) -> Self {
        Self {
            category,
            magnitude,
        }
    }

    pub fn bare(category: C) -> Self {
        Self::new(category, None)
    }

    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

/// Result of a percentage computation over possibly-missing inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Value(f64),
    Insufficient,
    Undefined,
}

impl Measure {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Drop non-finite values so they are treated as missing.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `numer / denom * 100`, undefined when `denom` is zero.
pub fn ratio_pct(numer: f64, denom: f64) -> Measure {
    if denom == 0.0 {
        return Measure::Undefined;
    }
    let pct = numer / denom * 100.0;
    if pct.is_finite() {
        Measure::Value(pct)
    } else {
        Measure::Undefined
    }
}

/// Percent change from `base` to `value`.
pub(crate) fn percent_change(base: Option<f64>, value: Option<f64>) -> Measure {
    match (finite(base), finite(value)) {
        (Some(base), Some(value)) => ratio_pct(value - base, base),
        _ => Measure::Insufficient,
    }
}

/// Slope of one window's SMA between the previous and the current sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSlope {
    pub window: usize,
    /// Percent change `(cur - prev) / prev * 100`; `None` when insufficient or undefined.
    pub slope_pct: Option<f64>,
}

/// Graded slope of the cross pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeReading {
    pub category: SlopeStrength,
    pub short_slope_pct: Option<f64>,
    pub long_slope_pct: Option<f64>,
}

/// Every signal for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Short vs long SMA; magnitude is the spread in percent of the long SMA.
    pub cross: Reading<CrossSignal>,
    /// Price vs every SMA; magnitude is how many SMAs the price is above.
    pub position: Reading<PricePosition>,
    /// Ordering of the SMAs by window.
    pub alignment: Reading<Alignment>,
    /// Spread of the SMAs; magnitude is the range in percent of price.
    pub congestion: Reading<Congestion>,
    pub slope: SlopeReading,
    /// Crossing of the short and long SMA between the previous and current sample;
    /// magnitude is the current spread `cur(short) - cur(long)` in price units.
    pub crossover: Reading<CrossoverEvent>,
    /// Distance from the key long-term SMA; magnitude is the deviation in percent.
    pub proximity: Reading<Proximity>,
    pub window_slopes: Vec<WindowSlope>,
}

impl SignalSet {
    /// The set reported when there is nothing to analyze.
    pub fn insufficient() -> Self {
        Self {
            cross: Reading::bare(CrossSignal::InsufficientData),
            position: Reading::bare(PricePosition::InsufficientData),
            alignment: Reading::bare(Alignment::InsufficientData),
            congestion: Reading::bare(Congestion::InsufficientData),
            slope: SlopeReading {
                category: SlopeStrength::InsufficientData,
                short_slope_pct: None,
                long_slope_pct: None,
            },
            crossover: Reading::bare(CrossoverEvent::InsufficientData),
            proximity: Reading::bare(Proximity::InsufficientData),
            window_slopes: Vec::new(),
        }
    }

    /// True when no signal could be classified.
    pub fn is_fully_insufficient(&self) -> bool {
        self.cross.category.is_degenerate()
            && self.position.category.is_degenerate()
            && self.alignment.category.is_degenerate()
            && self.congestion.category.is_degenerate()
            && self.slope.category.is_degenerate()
            && self.crossover.category.is_degenerate()
            && self.proximity.category.is_degenerate()
    }

    /// Presentation rows, one per signal, with label text from `labels`.
    pub fn labelled(&self, labels: &Labels) -> Vec<LabelledSignal> {
        let row = |signal: &'static str, code: &'static str, magnitude: Option<f64>| {
            LabelledSignal {
                signal: signal.to_string(),
                code: code.to_string(),
                text: labels.text(code).to_string(),
                magnitude,
            }
        };
        vec![
            row("cross", self.cross.code(), self.cross.magnitude),
            row("position", self.position.code(), self.position.magnitude),
            row("alignment", self.alignment.code(), self.alignment.magnitude),
            row("congestion", self.congestion.code(), self.congestion.magnitude),
            row("slope", self.slope.category.code(), self.slope.short_slope_pct),
            row("crossover", self.crossover.code(), self.crossover.magnitude),
            row("proximity", self.proximity.code(), self.proximity.magnitude),
        ]
    }
}

/// One signal rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledSignal {
    pub signal: String,
    pub code: String,
    pub text: String,
    pub magnitude: Option<f64>,
}
