use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized station identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub i64);

impl StationId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StationId {
    fn from(v: i64) -> Self {
        StationId(v)
    }
}

impl From<StationId> for i64 {
    fn from(s: StationId) -> Self {
        s.0
    }
}

/// One row of the raw hourly ridership snapshot, loaded verbatim.
///
/// The timestamp stays in its original US-locale text form
/// (`MM/DD/YYYY hh:mm:ss AM`) and the station id is still unnormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRidershipRecord {
    pub transit_timestamp: String,
    pub transit_mode: String,
    pub station_complex_id: String,
    pub station_complex: String,
    pub borough: String,
    pub payment_method: String,
    pub fare_class_category: String,
    pub ridership: u64,
    pub transfers: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub georeference: String,
}

/// Ridership summed per station for one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyRidership {
    pub transit_timestamp: DateTime<Utc>,
    pub station_id: StationId,
    pub ridership: u64,
}

/// Ridership for a single synthetic one-minute bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteRidership {
    pub transit_timestamp: DateTime<Utc>,
    pub station_id: StationId,
    pub ridership: u64,
}

/// An (hour, station) pair whose re-aggregated minute total disagrees with
/// the hourly source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub transit_timestamp: DateTime<Utc>,
    pub station_id: StationId,
    pub ridership_agg: u64,
    pub ridership: u64,
}
