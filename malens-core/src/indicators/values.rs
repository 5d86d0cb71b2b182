//! Container for the SMA series of every configured window.
//!
//! Built once per snapshot, then queried by window (and index) by the
//! analyzer and the presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sma::SmaSeries;

/// Mapping from window length to its SMA series, ordered by window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    series: BTreeMap<usize, SmaSeries>,
}

impl MovingAverages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the series for its window, replacing any previous one.
    pub fn insert(&mut self, sma: SmaSeries) {
        self.series.insert(sma.window, sma);
    }

    /// Full series for a window.
    pub fn series(&self, window: usize) -> Option<&SmaSeries> {
        self.series.get(&window)
    }

    /// Value at a specific index.
    pub fn value_at(&self, window: usize, index: usize) -> Option<f64> {
        self.series.get(&window).and_then(|s| s.get(index))
    }

    /// Most recent value (`cur`).
    pub fn latest(&self, window: usize) -> Option<f64> {
        self.series.get(&window).and_then(SmaSeries::latest)
    }

    /// Value one period before the most recent (`prev`).
    pub fn previous(&self, window: usize) -> Option<f64> {
        self.series.get(&window).and_then(SmaSeries::previous)
    }

    /// Windows present, ascending.
    pub fn windows(&self) -> impl Iterator<Item = usize> + '_ {
        self.series.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmaSeries> {
        self.series.values()
    }

    /// Number of SMA series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<SmaSeries> for MovingAverages {
    fn from_iter<T: IntoIterator<Item = SmaSeries>>(iter: T) -> Self {
        let mut averages = Self::new();
        for sma in iter {
            averages.insert(sma);
        }
        averages
    }
}
