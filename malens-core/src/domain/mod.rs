//! Domain types: price observations, window configuration, identities.

pub mod ids;
pub mod price;
pub mod window;

pub use ids::{SeriesHash, SnapshotVersion};
pub use price::{Extended, PricePoint, PriceSeries, SeriesError};
pub use window::{MaLine, MaLineTable, WindowError, WindowSet};
