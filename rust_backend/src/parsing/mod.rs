//! Parsers for the raw ridership snapshot.
//!
//! - [`ridership_csv`]: load the hourly ridership CSV and normalize its fields
//!
//! # Example
//!
//! ```no_run
//! use ridership_lakehouse::parsing::ridership_csv::parse_ridership_csv;
//! use std::path::Path;
//!
//! let records = parse_ridership_csv(Path::new("raw-mta-data.csv"))
//!     .expect("Failed to parse ridership CSV");
//! println!("{} raw records", records.len());
//! ```

pub mod ridership_csv;


pub use ridership_csv::{
    normalize_station_id, parse_ridership_csv, parse_transit_timestamp, RAW_FIELDNAMES,
    TRAM_STATION_ID,
};
