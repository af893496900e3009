use serde::{Deserialize, Serialize};

use super::ridership::StationId;

/// Station metadata taken from the first-seen raw record of each station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: StationId,
    pub station_complex: String,
    pub borough: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Anonymized bus stop derived one-to-one from a [`Station`].
///
/// Identifying fields are replaced by fakes; geography is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStation {
    pub bus_stop_id: StationId,
    pub address: String,
    pub school_zone: bool,
    pub seating: bool,
    pub borough: String,
    pub latitude: f64,
    pub longitude: f64,
}
