//! Simple Moving Average (SMA).
//!
//! Rolling mean of daily prices over a trailing window.
//! Lookback: window - 1 (first defined value at index window-1).

use serde::{Deserialize, Serialize};

use super::{round2, Indicator};
use crate::domain::PriceSeries;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, prices: &[f64]) -> Vec<Option<f64>> {
        let n = prices.len();
        let w = self.window;
        let mut result = vec![None; n];

        if n < w {
            return result;
        }

        // Compensated running sum over the finite prices in the window, plus a
        // count of the non-finite ones. A window is reported only when that
        // count is zero, so a stray NaN never leaks into the sum.
        let mut sum = NeumaierSum::default();
        let mut bad = 0usize;

        for i in 0..n {
            let entering = prices[i];
            if entering.is_finite() {
                sum.add(entering);
            } else {
                bad += 1;
            }

            if i >= w {
                let leaving = prices[i - w];
                if leaving.is_finite() {
                    sum.add(-leaving);
                } else {
                    bad -= 1;
                }
            }

            if i + 1 >= w && bad == 0 {
                // Re-sum once per full turnover of the window to bound drift.
                let start = i + 1 - w;
                if start % w == 0 {
                    sum = NeumaierSum::of(&prices[start..=i]);
                }
                result[i] = Some(round2(sum.total() / w as f64));
            }
        }

        result
    }
}

/// Neumaier-compensated sum: low-order bits lost when adding a value of very
/// different magnitude are kept in `comp`, so a huge price leaving the window
/// does not wipe out the small ones still in it.
#[derive(Debug, Clone, Copy, Default)]
struct NeumaierSum {
    sum: f64,
    comp: f64,
}

impl NeumaierSum {
    fn of(values: &[f64]) -> Self {
        let mut acc = Self::default();
        for &v in values {
            acc.add(v);
        }
        acc
    }

    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.comp += (self.sum - t) + x;
        } else {
            self.comp += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.comp
    }
}

/// SMA values for one window, aligned with the source series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaSeries {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl SmaSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the last index (`cur`).
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// Value one index before the last (`prev`).
    pub fn previous(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        self.values[n - 2]
    }

    /// Number of defined entries.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Compute the SMA series of `series` for a single window.
pub fn compute_sma(series: &PriceSeries, window: usize) -> SmaSeries {
    let sma = Sma::new(window);
    SmaSeries {
        window,
        values: sma.compute(&series.prices()),
    }
}
