//! Daily closing-price provider trait and structured error types.
//!
//! The trait abstracts over remote sources so the updater can be tested with
//! an in-memory provider.

use chrono::NaiveDate;
use thiserror::Error;

use malens_core::domain::PricePoint;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no price for {date}")]
    NoPrice { date: NaiveDate },

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("provider error: {0}")]
    Other(String),
}

/// Source of one closing price per calendar day.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the closing price for `date`.
    fn fetch_close(&self, date: NaiveDate) -> Result<PricePoint, ProviderError>;
}
