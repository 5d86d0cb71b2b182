//! Moving-average indicators.
//!
//! Indicators are pure functions: price history in, value series out. Output
//! is aligned index-for-index with the input; warmup entries are `None`, never
//! a numeric placeholder.

pub mod sma;
pub mod values;

pub use sma::{compute_sma, Sma, SmaSeries};
pub use values::MovingAverages;

/// Trait for price-series indicators.
///
/// # Look-ahead contamination guard
/// No value at index t may depend on a price at index t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_200").
    fn name(&self) -> &str;

    /// Number of observations before the indicator produces a value.
    fn lookback(&self) -> usize;

    /// Compute over the full price slice. Same length as `prices`.
    fn compute(&self, prices: &[f64]) -> Vec<Option<f64>>;
}

/// Round to two decimal places, the reporting precision of every SMA value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build a validated daily series from prices for tests.
#[cfg(test)]
pub fn make_series(prices: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PricePoint, PriceSeries};
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint::new(base_date + chrono::Duration::days(i as i64), price))
        .collect();
    PriceSeries::new(points).unwrap()
}
