//! CoinGecko price provider.
//!
//! Fetches a coin's USD price for a calendar day from the public
//! `/coins/{id}/history` endpoint. Handles rate limiting and retries with
//! exponential backoff.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use malens_core::domain::PricePoint;

use crate::provider::{PriceProvider, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Longest `retry-after` worth waiting for; beyond it the request gives up.
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// CoinGecko `/coins/{id}/history` response (only the fields we read).
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: Option<CurrentPrice>,
}

#[derive(Debug, Deserialize)]
struct CurrentPrice {
    usd: Option<f64>,
}

pub struct CoinGeckoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    coin: String,
    max_retries: u32,
    base_delay: Duration,
}

impl CoinGeckoProvider {
    pub fn new(coin: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(coin, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        coin: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("malens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            coin: coin.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn coin(&self) -> &str {
        &self.coin
    }

    /// Build the history URL. The endpoint expects `DD-MM-YYYY`.
    fn history_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/coins/{}/history?date={}&localization=false",
            self.base_url,
            self.coin,
            date.format("%d-%m-%Y")
        )
    }

    /// Extract `market_data.current_price.usd`.
    fn parse_response(date: NaiveDate, resp: HistoryResponse) -> Result<PricePoint, ProviderError> {
        let usd = resp
            .market_data
            .ok_or_else(|| ProviderError::ResponseFormatChanged("missing market_data".into()))?
            .current_price
            .ok_or_else(|| ProviderError::ResponseFormatChanged("missing current_price".into()))?
            .usd
            .ok_or_else(|| ProviderError::ResponseFormatChanged("missing current_price.usd".into()))?;

        if !usd.is_finite() || usd <= 0.0 {
            return Err(ProviderError::NoPrice { date });
        }
        Ok(PricePoint::new(date, usd))
    }

    /// Delay before retry `attempt` (1-based): exponential backoff, but never
    /// shorter than the server's `retry-after`.
    fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.base_delay * 2u32.pow(attempt.saturating_sub(1));
        retry_after.map_or(backoff, |wait| wait.max(backoff))
    }

    /// `retry-after` to honour, or `None` when it is too long to wait for.
    fn rate_limit_wait(retry_after_secs: u64) -> Option<Duration> {
        let wait = Duration::from_secs(retry_after_secs);
        (wait <= MAX_RATE_LIMIT_WAIT).then_some(wait)
    }

    fn fetch_with_retry(&self, date: NaiveDate) -> Result<PricePoint, ProviderError> {
        let url = self.history_url(date);
        let mut last_error = None;
        let mut retry_after = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt, retry_after.take());
                debug!(attempt, ?delay, "retrying price request");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        warn!(retry_after_secs, "rate limited by CoinGecko");
                        let err = ProviderError::RateLimited { retry_after_secs };
                        match Self::rate_limit_wait(retry_after_secs) {
                            Some(wait) => {
                                retry_after = Some(wait);
                                last_error = Some(err);
                                continue;
                            }
                            None => return Err(err),
                        }
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ProviderError::Other(format!(
                            "unknown coin '{}'",
                            self.coin
                        )));
                    }

                    if !status.is_success() {
                        last_error = Some(ProviderError::Other(format!("HTTP {status}")));
                        continue;
                    }

                    let body: HistoryResponse = resp.json().map_err(|e| {
                        ProviderError::ResponseFormatChanged(format!(
                            "failed to parse history response: {e}"
                        ))
                    })?;
                    return Self::parse_response(date, body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(ProviderError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(ProviderError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Other("max retries exceeded".into())))
    }
}

impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch_close(&self, date: NaiveDate) -> Result<PricePoint, ProviderError> {
        self.fetch_with_retry(date)
    }
}
