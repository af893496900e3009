//! Conversions from pipeline records to polars frames.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::models::{BusLine, BusStation, MinuteRidership};

fn datetime_column(name: &str, millis: Vec<i64>) -> Result<Column> {
    let series = Series::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .with_context(|| format!("Failed to cast {} to datetime", name))?;
    Ok(series.into())
}

pub fn bus_stations_frame(stations: &[BusStation]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            "bus_stop_id".into(),
            stations.iter().map(|s| s.bus_stop_id.value()).collect::<Vec<i64>>(),
        ),
        Column::new(
            "address".into(),
            stations.iter().map(|s| s.address.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            "school_zone".into(),
            stations.iter().map(|s| s.school_zone).collect::<Vec<bool>>(),
        ),
        Column::new(
            "seating".into(),
            stations.iter().map(|s| s.seating).collect::<Vec<bool>>(),
        ),
        Column::new(
            "borough".into(),
            stations.iter().map(|s| s.borough.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            "latitude".into(),
            stations.iter().map(|s| s.latitude).collect::<Vec<f64>>(),
        ),
        Column::new(
            "longitude".into(),
            stations.iter().map(|s| s.longitude).collect::<Vec<f64>>(),
        ),
    ])?;
    Ok(df)
}

/// `stops` becomes a `List(Int64)` column.
pub fn bus_lines_frame(lines: &[BusLine]) -> Result<DataFrame> {
    let stops: Vec<Series> = lines
        .iter()
        .map(|line| {
            Series::new(
                "".into(),
                line.stops.iter().map(|s| s.value()).collect::<Vec<i64>>(),
            )
        })
        .collect();

    let df = DataFrame::new(vec![
        Column::new(
            "bus_line_id".into(),
            lines.iter().map(|l| l.bus_line_id).collect::<Vec<i64>>(),
        ),
        Column::new(
            "bus_line".into(),
            lines.iter().map(|l| l.bus_line.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            "number_of_stops".into(),
            lines
                .iter()
                .map(|l| l.number_of_stops as u32)
                .collect::<Vec<u32>>(),
        ),
        Series::new("stops".into(), stops).into(),
        Column::new(
            "frequency_minutes".into(),
            lines.iter().map(|l| l.frequency_minutes).collect::<Vec<u32>>(),
        ),
    ])?;
    Ok(df)
}

pub fn minute_ridership_frame(minutes: &[MinuteRidership]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        datetime_column(
            "transit_timestamp",
            minutes
                .iter()
                .map(|m| m.transit_timestamp.timestamp_millis())
                .collect(),
        )?,
        Column::new(
            "station_id".into(),
            minutes.iter().map(|m| m.station_id.value()).collect::<Vec<i64>>(),
        ),
        Column::new(
            "ridership".into(),
            minutes.iter().map(|m| m.ridership).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bus_lines_frame_has_list_column() {
        let lines = vec![BusLine {
            bus_line_id: 4,
            bus_line: "M-042".to_string(),
            number_of_stops: 3,
            stops: vec![StationId(3), StationId(1), StationId(2)],
            frequency_minutes: 15,
        }];
        let df = bus_lines_frame(&lines).unwrap();
        assert_eq!(df.shape(), (1, 5));
        assert!(matches!(df.column("stops").unwrap().dtype(), DataType::List(_)));
    }

    #[test]
    fn test_minute_frame_uses_datetime() {
        let minutes = vec![MinuteRidership {
            transit_timestamp: Utc.with_ymd_and_hms(2024, 3, 7, 6, 1, 0).unwrap(),
            station_id: StationId(9),
            ridership: 4,
        }];
        let df = minute_ridership_frame(&minutes).unwrap();
        assert!(matches!(
            df.column("transit_timestamp").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, _)
        ));
        assert_eq!(df.column("ridership").unwrap().u64().unwrap().get(0), Some(4));
    }

    #[test]
    fn test_bus_stations_frame_column_order() {
        let df = bus_stations_frame(&[]).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "bus_stop_id",
                "address",
                "school_zone",
                "seating",
                "borough",
                "latitude",
                "longitude"
            ]
        );
    }
}
