//! Synthetic bus network generation.
//!
//! Two independent seeded generators are used: [`FakeData`] for addresses,
//! amenity flags and line codes, and the route generator inside
//! [`BusNetworkGenerator`] for stop counts, stop sampling and frequencies.

pub mod anonymize;
pub mod bus_network;
pub mod error;
pub mod faker;
pub mod rng;

pub use anonymize::{anonymize_station, anonymize_stations};
pub use bus_network::{BusNetworkConfig, BusNetworkGenerator};
pub use error::{GenerationError, GenerationResult};
pub use faker::FakeData;
pub use rng::{resolve_seed, seeded_rng, DEFAULT_FAKE_SEED};
