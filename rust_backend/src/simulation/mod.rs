//! Bus occupancy simulation over the generated bus network.
//!
//! Riders waiting at a station come from the minute-level ridership of that
//! station; buses of each line pick them up in departure order.

pub mod bus_rides;
pub mod demand;

pub use bus_rides::{BusRideSimulator, SimulationConfig, SimulationError};
pub use demand::{split_share, RidershipIndex};
