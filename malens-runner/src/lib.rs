//! Malens Runner: everything around the core that touches the outside world.
//!
//! This crate builds on `malens-core` to provide:
//! - Price file loading (CSV / JSON) with provenance and a synthetic fallback
//! - TOML analysis configuration (MA lines, profile, threshold/label overrides)
//! - Daily price updater backed by a pluggable `PriceProvider` (CoinGecko)
//! - Analysis reports and JSON / CSV export

pub mod coingecko;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod provider;
pub mod report;
pub mod runner;
pub mod update;

pub use coingecko::CoinGeckoProvider;
pub use config::{AnalysisConfig, ConfigError, ThresholdOverrides};
pub use data_loader::{
    generate_synthetic, load_prices, parse_csv, parse_json, DataSource, LoadError, LoadedPrices,
};
pub use export::{import_report_json, report_json, sma_csv, write_report_json, write_sma_csv};
pub use provider::{PriceProvider, ProviderError};
pub use report::{build_cards, AnalysisReport, MaCard, SCHEMA_VERSION};
pub use runner::{run_analysis, run_sma, AnalysisRun, RunError};
pub use update::{
    previous_day, update_price_file, write_price_file, yesterday, UpdateError, UpdateOutcome,
};
