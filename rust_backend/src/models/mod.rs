//! Domain records shared by the pipeline, the simulation and the query service.

pub mod bus;
pub mod ridership;
pub mod station;

pub use bus::*;
pub use ridership::*;
pub use station::*;
