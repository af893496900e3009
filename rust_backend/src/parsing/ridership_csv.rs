use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;
use std::path::Path;

use crate::models::{RawRidershipRecord, StationId};

/// Header of the raw hourly ridership export, in file order.
pub const RAW_FIELDNAMES: [&str; 15] = [
    "transit_timestamp",
    "transit_mode",
    "station_complex_id",
    "station_complex",
    "borough",
    "payment_method",
    "fare_class_category",
    "ridership",
    "transfers",
    "latitude",
    "longitude",
    "georeference",
    ":@computed_region_kjdx_g34t",
    ":@computed_region_yamh_8v7k",
    ":@computed_region_wbg7_3whc",
];

/// Textual station id used by the tramway complex.
const TRAM_SENTINEL: &str = "TRAM";

/// Numeric id substituted for [`TRAM_SENTINEL`].
pub const TRAM_STATION_ID: i64 = 98765;

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Parse a US-locale transit timestamp (`MM/DD/YYYY hh:mm:ss AM`) as UTC.
pub fn parse_transit_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid transit timestamp '{}'", raw))?;
    Ok(naive.and_utc())
}

/// Normalize a raw station complex id to an integer id.
///
/// Every occurrence of the `TRAM` sentinel is replaced by `98765` before the
/// value is parsed.
pub fn normalize_station_id(raw: &str) -> Result<StationId> {
    let replaced = raw.trim().replace(TRAM_SENTINEL, &TRAM_STATION_ID.to_string());
    let id = replaced
        .parse::<i64>()
        .with_context(|| format!("Station id '{}' is not an integer", raw))?;
    Ok(StationId(id))
}

/// Read the raw CSV into a DataFrame with every column kept as text.
///
/// Schema inference is disabled: station ids mix digits and sentinels and the
/// timestamp format is not recognized by the reader.
pub fn read_ridership_frame(csv_path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV {}", csv_path.display()))?;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    // The computed region columns are opaque and may be absent
    for required in &RAW_FIELDNAMES[..12] {
        if !column_names.iter().any(|c| c == required) {
            anyhow::bail!("Missing required column: {}", required);
        }
    }

    Ok(df)
}

/// Parse the raw CSV file into typed records.
pub fn parse_ridership_csv(csv_path: &Path) -> Result<Vec<RawRidershipRecord>> {
    let df = read_ridership_frame(csv_path)?;
    dataframe_to_records(&df)
}

/// Convert a text-typed ridership DataFrame into records.
pub fn dataframe_to_records(df: &DataFrame) -> Result<Vec<RawRidershipRecord>> {
    let timestamps = df.column("transit_timestamp")?.str()?;
    let modes = df.column("transit_mode")?.str()?;
    let station_ids = df.column("station_complex_id")?.str()?;
    let station_names = df.column("station_complex")?.str()?;
    let boroughs = df.column("borough")?.str()?;
    let payment_methods = df.column("payment_method")?.str()?;
    let fare_classes = df.column("fare_class_category")?.str()?;
    let riderships = df.column("ridership")?.str()?;
    let transfers = df.column("transfers")?.str()?;
    let latitudes = df.column("latitude")?.str()?;
    let longitudes = df.column("longitude")?.str()?;
    let georeferences = df.column("georeference")?.str()?;

    let mut records = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let transit_timestamp = timestamps
            .get(i)
            .with_context(|| format!("Missing transit_timestamp at row {}", i))?
            .to_string();
        let station_complex_id = station_ids
            .get(i)
            .with_context(|| format!("Missing station_complex_id at row {}", i))?
            .to_string();

        let ridership = parse_count(riderships.get(i))
            .with_context(|| format!("Invalid ridership at row {}", i))?;
        let transfer_count = parse_count(transfers.get(i))
            .with_context(|| format!("Invalid transfers at row {}", i))?;
        let latitude = parse_coordinate(latitudes.get(i))
            .with_context(|| format!("Invalid latitude at row {}", i))?;
        let longitude = parse_coordinate(longitudes.get(i))
            .with_context(|| format!("Invalid longitude at row {}", i))?;

        records.push(RawRidershipRecord {
            transit_timestamp,
            transit_mode: text(modes.get(i)),
            station_complex_id,
            station_complex: text(station_names.get(i)),
            borough: text(boroughs.get(i)),
            payment_method: text(payment_methods.get(i)),
            fare_class_category: text(fare_classes.get(i)),
            ridership,
            transfers: transfer_count,
            latitude,
            longitude,
            georeference: text(georeferences.get(i)),
        });
    }

    Ok(records)
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn parse_count(value: Option<&str>) -> Result<u64> {
    let raw = value.context("value is missing")?.trim();
    // Some exports write integral counts with a trailing ".0"
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse::<u64>()
        .with_context(|| format!("'{}' is not a non-negative integer", raw))
}

fn parse_coordinate(value: Option<&str>) -> Result<f64> {
    let raw = value.context("value is missing")?.trim();
    raw.parse::<f64>()
        .with_context(|| format!("'{}' is not a number", raw))
}
