//! Hourly to per-minute ridership fan-out.
//!
//! An hourly count `r` is spread over 60 buckets: every bucket gets
//! `r / 60` and the first `r % 60` minutes of the hour get one more, so the
//! buckets always sum back to `r`.

use chrono::TimeDelta;

use crate::models::{HourlyRidership, MinuteRidership};

pub const MINUTES_PER_HOUR: u32 = 60;

/// Count allocated to minute offset `minute` (0..60) of an hour with `ridership` riders.
#[inline]
pub fn minute_share(ridership: u64, minute: u32) -> u64 {
    let per_minute = MINUTES_PER_HOUR as u64;
    let base = ridership / per_minute;
    if (minute as u64) < ridership % per_minute {
        base + 1
    } else {
        base
    }
}

/// The 60 minute rows of one hourly row, in minute order.
pub fn spread_hour(hour: &HourlyRidership) -> impl Iterator<Item = MinuteRidership> + '_ {
    (0..MINUTES_PER_HOUR).map(move |minute| MinuteRidership {
        transit_timestamp: hour.transit_timestamp + TimeDelta::minutes(minute as i64),
        station_id: hour.station_id,
        ridership: minute_share(hour.ridership, minute),
    })
}

/// Fan every hourly row out to 60 minute rows.
///
/// Output holds exactly `60 * hourly.len()` rows ordered by station id, then timestamp.
pub fn interpolate_minutes(hourly: &[HourlyRidership]) -> Vec<MinuteRidership> {
    let mut minutes = Vec::with_capacity(hourly.len() * MINUTES_PER_HOUR as usize);
    for hour in hourly {
        minutes.extend(spread_hour(hour));
    }
    minutes.sort_by_key(|m| (m.station_id, m.transit_timestamp));
    minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationId;
    use chrono::{TimeZone, Utc};

    fn hour(ridership: u64) -> HourlyRidership {
        HourlyRidership {
            transit_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            station_id: StationId(7),
            ridership,
        }
    }

    #[test]
    fn test_example_125_riders() {
        let minutes: Vec<_> = spread_hour(&hour(125)).collect();
        assert_eq!(minutes.len(), 60);
        assert!(minutes[..5].iter().all(|m| m.ridership == 3));
        assert!(minutes[5..].iter().all(|m| m.ridership == 2));
        assert_eq!(minutes.iter().map(|m| m.ridership).sum::<u64>(), 125);
        assert_eq!(
            minutes[59].transit_timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_zero_riders() {
        assert!(spread_hour(&hour(0)).all(|m| m.ridership == 0));
    }

    #[test]
    fn test_less_than_sixty_riders() {
        let shares: Vec<u64> = (0..60).map(|m| minute_share(7, m)).collect();
        assert_eq!(shares.iter().filter(|&&s| s == 1).count(), 7);
        assert_eq!(&shares[..7], &[1; 7]);
        assert!(shares[7..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_exact_multiple_of_sixty() {
        assert!((0..60).all(|m| minute_share(180, m) == 3));
    }

    #[test]
    fn test_interpolate_fan_out_and_order() {
        let hourly = vec![
            HourlyRidership {
                transit_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
                station_id: StationId(7),
                ridership: 61,
            },
            HourlyRidership {
                transit_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
                station_id: StationId(7),
                ridership: 59,
            },
            HourlyRidership {
                transit_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
                station_id: StationId(1),
                ridership: 1,
            },
        ];

        let minutes = interpolate_minutes(&hourly);
        assert_eq!(minutes.len(), 180);
        assert_eq!(minutes[0].station_id, StationId(1));
        assert_eq!(minutes[60].station_id, StationId(7));
        assert_eq!(
            minutes[60].transit_timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
        );
        assert!(minutes
            .windows(2)
            .all(|w| (w[0].station_id, w[0].transit_timestamp)
                <= (w[1].station_id, w[1].transit_timestamp)));
    }
}
