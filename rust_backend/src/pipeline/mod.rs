//! Batch pipeline: raw snapshot in, warehouse tables and lakehouse files out.
//!
//! Steps, in order:
//!
//! 1. fail fast on a missing input file
//! 2. load the raw rows into the staging dataset
//! 3. derive stations, hourly and minute ridership
//! 4. verify the minute split against the hourly source
//! 5. anonymize stations, generate bus lines, load the serving tables
//! 6. simulate bus rides (optional)
//! 7. export parquet and CSV files
//! 8. drop the staging dataset (optional)

mod error;
mod run;

pub use error::{PipelineError, PipelineResult};
pub use run::{LakehousePipeline, PipelineReport};
