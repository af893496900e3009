//! Typed transformations over in-memory ridership batches.
//!
//! Each step is a pure function so its invariants can be checked without a
//! warehouse:
//!
//! - [`stations`]: first-seen station metadata per station id
//! - [`hourly`]: parsed, hour-truncated ridership sums
//! - [`interpolation`]: integer-preserving hourly to per-minute fan-out
//! - [`consistency`]: minute to hourly round-trip check

pub mod consistency;
pub mod hourly;
pub mod interpolation;
pub mod stations;

pub use consistency::{find_discrepancies, reaggregate_minutes};
pub use hourly::{aggregate_hourly, truncate_to_hour};
pub use interpolation::{interpolate_minutes, minute_share, spread_hour, MINUTES_PER_HOUR};
pub use stations::dedup_stations;
