//! Moving-average precomputation.
//!
//! Every configured window is computed once per snapshot. Windows are
//! independent of one another, so they are computed in parallel.

use rayon::prelude::*;

use crate::domain::{PriceSeries, WindowSet};
use crate::indicators::{Indicator, MovingAverages, Sma, SmaSeries};

/// Compute the SMA series for each window in `windows`.
pub fn compute_moving_averages(series: &PriceSeries, windows: &WindowSet) -> MovingAverages {
    compute_windows(series, windows.as_slice()).into_iter().collect()
}

/// Compute the SMA series for an explicit list of windows, in input order.
pub fn compute_windows(series: &PriceSeries, windows: &[usize]) -> Vec<SmaSeries> {
    let prices = series.prices();
    windows
        .par_iter()
        .map(|&window| {
            let values = Sma::new(window).compute(&prices);
            debug_assert_eq!(
                values.len(),
                prices.len(),
                "sma_{window} produced {} values for {} prices",
                values.len(),
                prices.len()
            );
            SmaSeries { window, values }
        })
        .collect()
}

/// Number of observations needed before every window reports a value.
pub fn compute_warmup(windows: &WindowSet) -> usize {
    windows.longest().saturating_sub(1)
}
