//! Moving-average engine: precomputation, caching and snapshot versioning.

pub mod cache;
pub mod precompute;
pub mod session;

pub use cache::SmaCache;
pub use precompute::{compute_moving_averages, compute_warmup, compute_windows};
pub use session::{Session, Snapshot};
