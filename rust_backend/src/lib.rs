//! # Ridership Lakehouse
//!
//! Batch pipeline and query service for the open-lakehouse transit demo.
//!
//! The crate turns an hourly subway ridership snapshot into minute-level
//! ridership, builds a synthetic bus network on top of the station list,
//! simulates bus occupancy along the generated routes and exports the
//! resulting tables as CSV and parquet files. A small axum server exposes the
//! generated state to dashboards.
//!
//! ## Architecture
//!
//! - [`parsing`]: raw CSV loading and field normalization
//! - [`transformations`]: station dedup, hourly aggregation, minute interpolation, consistency check
//! - [`generation`]: seeded fake data, anonymized bus stations, bus lines
//! - [`simulation`]: bus ride occupancy simulation
//! - [`db`]: warehouse repository pattern and the query service
//! - [`export`]: columnar and CSV exports into the lakehouse directory
//! - [`pipeline`]: end-to-end generation run
//! - [`ingest`]: paged bulk download with back-off
//! - [`notebooks`]: notebook output scrubbing
//! - [`http`]: axum router and handlers

// RepositoryError carries an ErrorContext for every variant
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod export;
pub mod generation;
pub mod ingest;
pub mod models;
pub mod notebooks;
pub mod parsing;
pub mod pipeline;
pub mod simulation;
pub mod transformations;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::LakehouseConfig;
pub use pipeline::{LakehousePipeline, PipelineError, PipelineReport};
