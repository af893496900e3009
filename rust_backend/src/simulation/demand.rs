use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use std::collections::HashMap;

use crate::models::{HourlyRidership, StationId};
use crate::transformations::{minute_share, truncate_to_hour};

/// Hourly ridership indexed by (station, hour), answering minute-level
/// queries through the interpolation rule without materializing minute rows.
#[derive(Debug, Clone, Default)]
pub struct RidershipIndex {
    hourly: HashMap<(StationId, DateTime<Utc>), u64>,
}

impl RidershipIndex {
    pub fn from_hourly(hourly: &[HourlyRidership]) -> Self {
        let mut index = HashMap::with_capacity(hourly.len());
        for row in hourly {
            *index
                .entry((row.station_id, truncate_to_hour(row.transit_timestamp)))
                .or_insert(0) += row.ridership;
        }
        Self { hourly: index }
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty()
    }

    /// Earliest hour present in the index.
    pub fn first_hour(&self) -> Option<DateTime<Utc>> {
        self.hourly.keys().map(|(_, hour)| *hour).min()
    }

    /// Riders arriving at `station` during the minute starting at `minute`.
    pub fn riders_at_minute(&self, station: StationId, minute: DateTime<Utc>) -> u64 {
        let hour = truncate_to_hour(minute);
        self.hourly
            .get(&(station, hour))
            .map(|&ridership| minute_share(ridership, minute.minute()))
            .unwrap_or(0)
    }

    /// Riders arriving at `station` in the minutes of `[from, to)`.
    pub fn riders_between(&self, station: StationId, from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
        let step = TimeDelta::minutes(1);
        let mut minute = from.duration_trunc(step).unwrap_or(from);
        let mut total = 0;
        while minute < to {
            total += self.riders_at_minute(station, minute);
            minute += step;
        }
        total
    }
}

/// Portion of `total` assigned to participant `rank` out of `participants`.
///
/// Every participant gets `total / participants` and the first
/// `total % participants` ranks get one more, so the portions sum to `total`.
pub fn split_share(total: u64, participants: usize, rank: usize) -> u64 {
    if participants == 0 {
        return 0;
    }
    let n = participants as u64;
    let base = total / n;
    if (rank as u64) < total % n {
        base + 1
    } else {
        base
    }
}
