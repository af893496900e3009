use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ridership::StationId;

/// A synthetic bus line: an ordered, repetition-free list of stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusLine {
    pub bus_line_id: i64,
    pub bus_line: String,
    pub number_of_stops: usize,
    pub stops: Vec<StationId>,
    pub frequency_minutes: u32,
}

impl BusLine {
    /// Whether the line visits `station`.
    pub fn serves(&self, station: StationId) -> bool {
        self.stops.contains(&station)
    }
}

/// Vehicle classes available to the ride simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusSize {
    Minibus,
    Standard,
    Articulated,
}

impl BusSize {
    pub const ALL: [BusSize; 3] = [BusSize::Minibus, BusSize::Standard, BusSize::Articulated];

    pub fn seating_capacity(&self) -> u32 {
        match self {
            BusSize::Minibus => 20,
            BusSize::Standard => 40,
            BusSize::Articulated => 60,
        }
    }

    pub fn standing_capacity(&self) -> u32 {
        match self {
            BusSize::Minibus => 10,
            BusSize::Standard => 30,
            BusSize::Articulated => 60,
        }
    }

    pub fn total_capacity(&self) -> u32 {
        self.seating_capacity() + self.standing_capacity()
    }
}

impl std::fmt::Display for BusSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusSize::Minibus => "minibus",
            BusSize::Standard => "standard",
            BusSize::Articulated => "articulated",
        };
        f.write_str(name)
    }
}

/// State of one bus at one stop of its ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRide {
    pub bus_ride_id: String,
    pub bus_line_id: i64,
    pub bus_line: String,
    pub bus_size: BusSize,
    pub seating_capacity: u32,
    pub standing_capacity: u32,
    pub total_capacity: u32,
    pub bus_stop_id: StationId,
    pub bus_stop_index: usize,
    pub num_of_bus_stops: usize,
    pub last_stop: bool,
    pub timestamp_at_stop: DateTime<Utc>,
    pub passengers_in_stop: u64,
    pub passengers_alighting: u64,
    pub passengers_boarding: u64,
    pub remaining_capacity: u64,
    pub remaining_at_stop: u64,
    pub total_passengers: u64,
}

/// Format a ride id as `<line id>_<YYYY-MM-DD>_<HH-MM-SS>` of the departure.
pub fn format_ride_id(bus_line_id: i64, departure: DateTime<Utc>) -> String {
    format!("{}_{}", bus_line_id, departure.format("%Y-%m-%d_%H-%M-%S"))
}
