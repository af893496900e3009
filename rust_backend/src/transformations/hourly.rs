use anyhow::Result;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::collections::HashMap;

use crate::models::{HourlyRidership, RawRidershipRecord, StationId};
use crate::parsing::{normalize_station_id, parse_transit_timestamp};

/// Truncate a timestamp to the start of its hour.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    // Hour truncation of a UTC timestamp cannot overflow
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// Group raw records by (hour, station id) and sum their ridership.
///
/// Output is ordered by station id, then timestamp.
pub fn aggregate_hourly(records: &[RawRidershipRecord]) -> Result<Vec<HourlyRidership>> {
    let mut sums: HashMap<(StationId, DateTime<Utc>), u64> = HashMap::new();

    for record in records {
        let station_id = normalize_station_id(&record.station_complex_id)?;
        let hour = truncate_to_hour(parse_transit_timestamp(&record.transit_timestamp)?);
        *sums.entry((station_id, hour)).or_insert(0) += record.ridership;
    }

    let mut hourly: Vec<HourlyRidership> = sums
        .into_iter()
        .map(|((station_id, transit_timestamp), ridership)| HourlyRidership {
            transit_timestamp,
            station_id,
            ridership,
        })
        .collect();
    hourly.sort_by_key(|h| (h.station_id, h.transit_timestamp));

    Ok(hourly)
}
