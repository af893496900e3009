//! Columnar and CSV exports into the lakehouse directory.
//!
//! Everything lands below `<output>/mta_staging_data/`:
//!
//! ```text
//! mta_staging_data/
//! ├── bus_stations.csv
//! ├── bus_lines/
//! │   ├── bus_lines.parquet
//! │   └── bus_lines.ndjson
//! └── ridership/
//!     ├── part-00000.parquet
//!     └── ...
//! ```
//!
//! Each prefix is cleared before it is written.

pub mod frames;
pub mod writer;

pub use frames::{bus_lines_frame, bus_stations_frame, minute_ridership_frame};
pub use writer::{
    clear_prefix, part_file_name, write_bus_lines, write_bus_lines_ndjson,
    write_bus_stations_csv, write_minute_ridership, ExportLayout, DEFAULT_ROWS_PER_FILE,
};
