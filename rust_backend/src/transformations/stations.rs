use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{RawRidershipRecord, Station, StationId};
use crate::parsing::{normalize_station_id, parse_transit_timestamp};

/// Derive one [`Station`] per normalized station id.
///
/// The record with the earliest parsed timestamp wins; on equal timestamps
/// the record seen first in the input is kept. Output is sorted by station id.
pub fn dedup_stations(records: &[RawRidershipRecord]) -> Result<Vec<Station>> {
    let mut first_seen: HashMap<StationId, (DateTime<Utc>, &RawRidershipRecord)> = HashMap::new();

    for record in records {
        let station_id = normalize_station_id(&record.station_complex_id)?;
        let timestamp = parse_transit_timestamp(&record.transit_timestamp)?;

        first_seen
            .entry(station_id)
            .and_modify(|current| {
                if timestamp < current.0 {
                    *current = (timestamp, record);
                }
            })
            .or_insert((timestamp, record));
    }

    let mut stations: Vec<Station> = first_seen
        .into_iter()
        .map(|(station_id, (_, record))| Station {
            station_id,
            station_complex: record.station_complex.clone(),
            borough: record.borough.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        })
        .collect();
    stations.sort_by_key(|s| s.station_id);

    Ok(stations)
}
