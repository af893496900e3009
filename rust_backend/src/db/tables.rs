//! Table names used across the pipeline and the query service.

/// Raw snapshot rows, all fields as loaded.
pub const RAW_MTA_DATA: &str = "raw_mta_data";
/// One row per station, earliest record wins.
pub const MTA_DATA_STATIONS: &str = "mta_data_stations";
/// Hourly ridership per station.
pub const MTA_DATA_PARSED: &str = "mta_data_parsed";
/// Minute ridership per station.
pub const RIDERSHIP: &str = "ridership";
pub const BUS_LINES: &str = "bus_lines";
pub const BUS_STATIONS: &str = "bus_stations";
pub const BUS_RIDES: &str = "bus_rides";
