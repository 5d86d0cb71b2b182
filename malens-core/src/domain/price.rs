//! PricePoint and PriceSeries: the daily price data the engine works on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::SeriesHash;

/// Closing price of the asset on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Errors raised while building a `PriceSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("invalid price {price} on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, price: f64 },

    #[error("duplicate observation for {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("observations out of order: {date} follows {previous}")]
    OutOfOrder { previous: NaiveDate, date: NaiveDate },
}

/// Ordered sequence of daily observations.
///
/// Invariant: strictly ascending by date, every price finite and positive.
/// The only way to obtain a series is through a validating constructor, so
/// downstream computation can rely on the invariant. A series is immutable;
/// appending a day produces a new series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

/// Outcome of adding one observation to a series.
#[derive(Debug, Clone, PartialEq)]
pub enum Extended {
    /// The date was new; the returned series contains it in date order.
    Added(PriceSeries),
    /// The series already has an observation for that date; nothing changed.
    AlreadyPresent,
}

impl PriceSeries {
    /// Build a series from observations that are already in ascending order.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for point in &points {
            if !point.is_valid() {
                return Err(SeriesError::InvalidPrice {
                    date: point.date,
                    price: point.price,
                });
            }
        }
        for pair in points.windows(2) {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate { date: current });
            }
            if current < previous {
                return Err(SeriesError::OutOfOrder {
                    previous,
                    date: current,
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from observations in any order. Duplicates are still rejected.
    pub fn from_unordered(mut points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raw prices in series order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.points.binary_search_by_key(&date, |p| p.date).is_ok()
    }

    /// Return a new series with `point` inserted at its date position.
    pub fn with_point(&self, point: PricePoint) -> Result<Extended, SeriesError> {
        if !point.is_valid() {
            return Err(SeriesError::InvalidPrice {
                date: point.date,
                price: point.price,
            });
        }
        match self.points.binary_search_by_key(&point.date, |p| p.date) {
            Ok(_) => Ok(Extended::AlreadyPresent),
            Err(pos) => {
                let mut points = Vec::with_capacity(self.points.len() + 1);
                points.extend_from_slice(&self.points[..pos]);
                points.push(point);
                points.extend_from_slice(&self.points[pos..]);
                Ok(Extended::Added(Self { points }))
            }
        }
    }

    /// Content hash over dates and price bits.
    pub fn content_hash(&self) -> SeriesHash {
        let mut hasher = blake3::Hasher::new();
        for point in &self.points {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.price.to_le_bytes());
        }
        SeriesHash::from_hash(hasher.finalize().to_hex().as_str())
    }
}
