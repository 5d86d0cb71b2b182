//! Analyzer input: the current price and two SMA samples per window.

use serde::{Deserialize, Serialize};

use super::finite;
use crate::domain::PriceSeries;
use crate::indicators::MovingAverages;

/// Latest and previous SMA value of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaSample {
    pub window: usize,
    pub current: Option<f64>,
    pub previous: Option<f64>,
}

impl MaSample {
    pub fn new(window: usize, current: Option<f64>, previous: Option<f64>) -> Self {
        Self {
            window,
            current,
            previous,
        }
    }

    /// `cur(W)`, with non-finite values treated as missing.
    pub fn cur(&self) -> Option<f64> {
        finite(self.current)
    }

    /// `prev(W)`, with non-finite values treated as missing.
    pub fn prev(&self) -> Option<f64> {
        finite(self.previous)
    }
}

/// Everything the analyzer may read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub price: Option<f64>,
    samples: Vec<MaSample>,
}

impl AnalysisInput {
    /// Samples are kept ascending by window; a repeated window keeps the last sample.
    pub fn new(price: Option<f64>, samples: Vec<MaSample>) -> Self {
        let mut ordered: Vec<MaSample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match ordered.binary_search_by_key(&sample.window, |s| s.window) {
                Ok(pos) => ordered[pos] = sample,
                Err(pos) => ordered.insert(pos, sample),
            }
        }
        Self {
            price,
            samples: ordered,
        }
    }

    /// Take the latest price and the last two values of each SMA series.
    pub fn from_averages(series: &PriceSeries, averages: &MovingAverages) -> Self {
        let samples = averages
            .iter()
            .map(|sma| MaSample::new(sma.window, sma.latest(), sma.previous()))
            .collect();
        Self::new(series.latest().map(|p| p.price), samples)
    }

    /// Current price, with non-finite values treated as missing.
    pub fn current_price(&self) -> Option<f64> {
        finite(self.price)
    }

    pub fn samples(&self) -> &[MaSample] {
        &self.samples
    }

    pub fn sample(&self, window: usize) -> Option<&MaSample> {
        self.samples
            .binary_search_by_key(&window, |s| s.window)
            .ok()
            .map(|pos| &self.samples[pos])
    }

    pub fn windows(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.iter().map(|s| s.window)
    }

    /// `cur(W)` for every window, ascending by window.
    pub fn currents(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(MaSample::cur).collect()
    }
}
