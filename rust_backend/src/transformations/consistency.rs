use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::hourly::truncate_to_hour;
use crate::models::{Discrepancy, HourlyRidership, MinuteRidership, StationId};

/// Sum minute rows back to (hour, station) totals, ordered by station then hour.
pub fn reaggregate_minutes(minutes: &[MinuteRidership]) -> Vec<HourlyRidership> {
    let mut sums: HashMap<(StationId, DateTime<Utc>), u64> = HashMap::new();
    for minute in minutes {
        *sums
            .entry((minute.station_id, truncate_to_hour(minute.transit_timestamp)))
            .or_insert(0) += minute.ridership;
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
    hourly
}

/// Join re-aggregated minute data with the hourly source on (hour, station)
/// and return the pairs whose totals differ.
///
/// Pairs present on only one side are not reported. An empty result means
/// the minute table is consistent.
pub fn find_discrepancies(
    minutes: &[MinuteRidership],
    hourly: &[HourlyRidership],
) -> Vec<Discrepancy> {
    let source: HashMap<(StationId, DateTime<Utc>), u64> = hourly
        .iter()
        .map(|h| ((h.station_id, h.transit_timestamp), h.ridership))
        .collect();

    reaggregate_minutes(minutes)
        .into_iter()
        .filter_map(|agg| {
            let expected = *source.get(&(agg.station_id, agg.transit_timestamp))?;
            (agg.ridership != expected).then(|| Discrepancy {
                transit_timestamp: agg.transit_timestamp,
                station_id: agg.station_id,
                ridership_agg: agg.ridership,
                ridership: expected,
            })
        })
        .collect()
}
