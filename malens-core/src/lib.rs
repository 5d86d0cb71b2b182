//! Malens Core: moving-average engine and trend-signal analyzer.
//!
//! This crate contains the pure computation:
//! - Domain types (price points and series, window sets, MA line table)
//! - Sliding-window SMA indicator with an explicit "not enough data" sentinel
//! - Parallel per-window precomputation, SMA cache and versioned session
//! - Signal profiles (thresholds + labels) and a single rule engine
//!
//! Nothing here performs I/O. Loading, fetching and reporting live in `malens-runner`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod profile;
pub mod signals;
