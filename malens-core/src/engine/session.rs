//! Versioned analysis session.
//!
//! A `Session` owns the current price series, the configured windows and an
//! `SmaCache`. Each distinct (series, windows) pair is a snapshot with its own
//! version; re-submitting identical inputs keeps the version and the cache.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::SmaCache;
use super::precompute::{compute_warmup, compute_windows};
use crate::domain::{PriceSeries, SeriesHash, SnapshotVersion, WindowSet};
use crate::indicators::MovingAverages;
use crate::profile::SignalProfile;
use crate::signals::{analyze, AnalysisInput, SignalSet};

/// Identity of the data one analysis was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: SnapshotVersion,
    pub series_hash: SeriesHash,
    pub windows: WindowSet,
    pub len: usize,
    /// Observations needed before every window reports a value.
    pub warmup: usize,
    pub latest_date: Option<NaiveDate>,
    pub latest_price: Option<f64>,
}

#[derive(Debug)]
pub struct Session {
    series: PriceSeries,
    series_hash: SeriesHash,
    windows: WindowSet,
    version: SnapshotVersion,
    cache: SmaCache,
}

impl Session {
    /// A session over an empty series.
    pub fn new(windows: WindowSet) -> Self {
        let series = PriceSeries::empty();
        let series_hash = series.content_hash();
        let mut cache = SmaCache::new();
        cache.bind(&series_hash);
        Self {
            series,
            series_hash,
            windows,
            version: SnapshotVersion::default(),
            cache,
        }
    }

    /// Replace the series. Returns `true` when the content changed and a new
    /// snapshot version was started.
    pub fn set_series(&mut self, series: PriceSeries) -> bool {
        let hash = series.content_hash();
        if hash == self.series_hash {
            debug!(hash = %hash.short(), "series unchanged");
            return false;
        }
        let invalidated = self.cache.bind(&hash);
        self.series = series;
        self.series_hash = hash;
        self.version = self.version.next();
        debug!(
            version = %self.version,
            hash = %self.series_hash.short(),
            points = self.series.len(),
            invalidated,
            "new series snapshot"
        );
        true
    }

    /// Replace the window set. Cached windows stay valid for the same series.
    pub fn set_windows(&mut self, windows: WindowSet) -> bool {
        if windows == self.windows {
            return false;
        }
        self.windows = windows;
        self.version = self.version.next();
        debug!(version = %self.version, windows = ?self.windows.as_slice(), "new window set");
        true
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn windows(&self) -> &WindowSet {
        &self.windows
    }

    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn cache(&self) -> &SmaCache {
        &self.cache
    }

    pub fn snapshot(&self) -> Snapshot {
        let latest = self.series.latest();
        Snapshot {
            version: self.version,
            series_hash: self.series_hash.clone(),
            windows: self.windows.clone(),
            len: self.series.len(),
            warmup: compute_warmup(&self.windows),
            latest_date: latest.map(|p| p.date),
            latest_price: latest.map(|p| p.price),
        }
    }

    /// SMA table for the current snapshot, computing only uncached windows.
    pub fn moving_averages(&mut self) -> MovingAverages {
        let hash = self.series_hash.clone();
        let mut table = MovingAverages::new();
        let mut missing = Vec::new();
        for window in self.windows.iter() {
            match self.cache.get(&hash, window) {
                Some(sma) => table.insert((*sma).clone()),
                None => missing.push(window),
            }
        }
        if !missing.is_empty() {
            debug!(version = %self.version, windows = ?missing, "computing moving averages");
            for sma in compute_windows(&self.series, &missing) {
                let sma = self.cache.put(&hash, sma);
                table.insert((*sma).clone());
            }
        }
        table
    }

    /// Run the analyzer on the current snapshot.
    pub fn analyze(&mut self, profile: &SignalProfile) -> SignalSet {
        let averages = self.moving_averages();
        let input = AnalysisInput::from_averages(&self.series, &averages);
        analyze(&input, profile)
    }
}
