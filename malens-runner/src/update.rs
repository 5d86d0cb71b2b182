//! Daily price-file updater.
//!
//! Appends one day's closing price to a `date,price` CSV file. An existing
//! date is left untouched and nothing is written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use malens_core::domain::{Extended, PriceSeries, SeriesError};

use crate::data_loader::{parse_csv, LoadError};
use crate::provider::{PriceProvider, ProviderError};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("cannot read price file: {0}")]
    Load(#[from] LoadError),

    #[error("price fetch failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("provider returned a price for {got}, expected {expected}")]
    DateMismatch { expected: NaiveDate, got: NaiveDate },

    #[error("cannot insert price: {0}")]
    Series(#[from] SeriesError),

    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Added { date: NaiveDate, price: f64 },
    AlreadyPresent { date: NaiveDate },
}

/// The calendar day before `now` in the `offset` timezone.
pub fn previous_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive() - Duration::days(1)
}

/// Yesterday in the `offset` timezone.
pub fn yesterday(offset: FixedOffset) -> NaiveDate {
    previous_day(Utc::now(), offset)
}

fn read_series(path: &Path) -> Result<PriceSeries, UpdateError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_csv(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PriceSeries::empty()),
        Err(source) => Err(LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

/// Render a series as `date,price` CSV, ascending by date.
pub fn price_csv(series: &PriceSeries) -> Result<Vec<u8>, UpdateError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "price"])?;
    for point in series.points() {
        wtr.write_record([point.date.to_string(), point.price.to_string()])?;
    }
    wtr.into_inner()
        .map_err(|e| UpdateError::Csv(csv::Error::from(e.into_error())))
}

/// Write a series to `path`, replacing it via a sibling temp file.
pub fn write_price_file(path: &Path, series: &PriceSeries) -> Result<(), UpdateError> {
    let bytes = price_csv(series)?;
    let tmp = path.with_extension("csv.tmp");
    let write_err = |source| UpdateError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, bytes).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

/// Fetch the price for `date` and insert it into the CSV at `path`.
///
/// The file is checked before the provider is called, so an existing date
/// costs no network request.
pub fn update_price_file(
    path: &Path,
    provider: &dyn PriceProvider,
    date: NaiveDate,
) -> Result<UpdateOutcome, UpdateError> {
    let series = read_series(path)?;
    if series.contains_date(date) {
        info!(%date, path = %path.display(), "price already present");
        return Ok(UpdateOutcome::AlreadyPresent { date });
    }

    let point = provider.fetch_close(date)?;
    if point.date != date {
        return Err(UpdateError::DateMismatch {
            expected: date,
            got: point.date,
        });
    }

    match series.with_point(point)? {
        Extended::AlreadyPresent => Ok(UpdateOutcome::AlreadyPresent { date }),
        Extended::Added(updated) => {
            write_price_file(path, &updated)?;
            info!(
                %date,
                price = point.price,
                provider = provider.name(),
                points = updated.len(),
                "price file updated"
            );
            Ok(UpdateOutcome::Added {
                date,
                price: point.price,
            })
        }
    }
}
