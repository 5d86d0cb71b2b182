//! Price file loading and data provenance.
//!
//! Two on-disk formats are accepted:
//! - CSV with a `date,price` header (case-insensitive, so `Date,Price` works)
//! - JSON: an array of `{date, price}` records; the date key may carry a UTF-8
//!   byte order mark and `price` may be a string or a number
//!
//! Rows may arrive in any order; the loader sorts them ascending and rejects
//! duplicate dates. Synthetic data is a developer-only mode and is tagged.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use malens_core::domain::{PricePoint, PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported price file extension for '{0}' (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("CSV header must contain 'date' and 'price' columns, got {0:?}")]
    MissingColumns(Vec<String>),

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    #[error("'{0}' contains no price rows")]
    Empty(PathBuf),
}

/// Where the series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    CsvFile { path: PathBuf },
    JsonFile { path: PathBuf },
    Synthetic { seed: u64 },
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CsvFile { path } | Self::JsonFile { path } => write!(f, "{}", path.display()),
            Self::Synthetic { seed } => write!(f, "synthetic (seed {seed})"),
        }
    }
}

/// A loaded series with provenance.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub series: PriceSeries,
    pub source: DataSource,
    /// BLAKE3 over dates and prices, for provenance in reports.
    pub dataset_hash: String,
}

impl LoadedPrices {
    pub fn new(series: PriceSeries, source: DataSource) -> Self {
        let dataset_hash = series.content_hash().0;
        Self {
            series,
            source,
            dataset_hash,
        }
    }
}

/// Load a price file, choosing the parser by extension.
pub fn load_prices(path: &Path) -> Result<LoadedPrices, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (series, source) = match ext.as_deref() {
        Some("csv") => (
            parse_csv(&content)?,
            DataSource::CsvFile {
                path: path.to_path_buf(),
            },
        ),
        Some("json") => (
            parse_json(&content)?,
            DataSource::JsonFile {
                path: path.to_path_buf(),
            },
        ),
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    if series.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    let loaded = LoadedPrices::new(series, source);
    info!(
        source = %loaded.source,
        points = loaded.series.len(),
        first = ?loaded.series.first().map(|p| p.date),
        latest = ?loaded.series.latest().map(|p| p.date),
        "loaded price series"
    );
    Ok(loaded)
}

fn parse_date(row: usize, raw: &str) -> Result<NaiveDate, LoadError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| LoadError::Row {
        row,
        reason: format!("invalid date '{}': {e}", raw.trim()),
    })
}

fn parse_price(row: usize, raw: &str) -> Result<f64, LoadError> {
    let trimmed = raw.trim();
    let price: f64 = trimmed.parse().map_err(|_| LoadError::Row {
        row,
        reason: format!("invalid price '{trimmed}'"),
    })?;
    check_price(row, price)
}

fn check_price(row: usize, price: f64) -> Result<f64, LoadError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(LoadError::Row {
            row,
            reason: format!("price must be finite and positive, got {price}"),
        });
    }
    Ok(price)
}

/// Strip a leading byte order mark and compare case-insensitively.
fn is_column(header: &str, name: &str) -> bool {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .eq_ignore_ascii_case(name)
}

/// Parse CSV text with a `date,price` header.
pub fn parse_csv(content: &str) -> Result<PriceSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let date_col = headers.iter().position(|h| is_column(h, "date"));
    let price_col = headers.iter().position(|h| is_column(h, "price"));
    let (Some(date_col), Some(price_col)) = (date_col, price_col) else {
        return Err(LoadError::MissingColumns(headers));
    };

    let mut points = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // header is row 1
        let row = i + 2;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let date = parse_date(row, record.get(date_col).unwrap_or(""))?;
        let price = parse_price(row, record.get(price_col).unwrap_or(""))?;
        points.push(PricePoint::new(date, price));
    }
    Ok(PriceSeries::from_unordered(points)?)
}

/// A JSON price that may be quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPrice {
    Number(f64),
    Text(String),
}

/// Parse a JSON array of `{date, price}` records.
pub fn parse_json(content: &str) -> Result<PriceSeries, LoadError> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(content.trim_start_matches('\u{feff}'))?;

    let mut points = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let row = i + 1;
        let field = |name: &str| {
            record
                .iter()
                .find(|(k, _)| is_column(k, name))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| LoadError::Row {
                    row,
                    reason: format!("missing '{name}' field"),
                })
        };

        let date = match field("date")? {
            serde_json::Value::String(s) => parse_date(row, &s)?,
            other => {
                return Err(LoadError::Row {
                    row,
                    reason: format!("date must be a string, got {other}"),
                })
            }
        };
        let price = match serde_json::from_value::<JsonPrice>(field("price")?) {
            Ok(JsonPrice::Number(p)) => check_price(row, p)?,
            Ok(JsonPrice::Text(s)) => parse_price(row, &s)?,
            Err(_) => {
                return Err(LoadError::Row {
                    row,
                    reason: "price must be a number or a numeric string".into(),
                })
            }
        };
        points.push(PricePoint::new(date, price));
    }
    Ok(PriceSeries::from_unordered(points)?)
}

/// Generate a seeded random-walk daily series ending at `end`.
///
/// Produces a geometric walk from 100.0 with daily returns in ±3%. Output is
/// clearly fake and tagged as synthetic.
pub fn generate_synthetic(days: usize, end: NaiveDate, seed: u64) -> LoadedPrices {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    warn!(days, seed, "generating synthetic prices; results are tagged as synthetic");

    let mut rng = StdRng::seed_from_u64(seed);
    let start = end - chrono::Duration::days(days.saturating_sub(1) as i64);
    let mut price = 100.0_f64;
    let points = (0..days)
        .map(|i| {
            if i > 0 {
                let daily_return: f64 = rng.gen_range(-0.03..0.03);
                price *= 1.0 + daily_return;
            }
            PricePoint::new(start + chrono::Duration::days(i as i64), price)
        })
        .collect();

    let series = PriceSeries::new(points).unwrap_or_default();
    LoadedPrices::new(series, DataSource::Synthetic { seed })
}
