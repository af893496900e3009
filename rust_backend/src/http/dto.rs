//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Row;
use crate::models::{BusLine, BusRide};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub warehouse: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusLinesResponse {
    pub bus_lines: Vec<BusLine>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub table: String,
    pub rows: Vec<Row>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearStateResponse {
    pub table: String,
    pub rows_removed: usize,
}

/// Query parameters of `GET /v1/rides`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RidesQuery {
    /// Look-back in days; the configured window when absent
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidesResponse {
    pub rides: Vec<BusRide>,
    pub total: usize,
    /// Window bounds in the data year
    pub window_start: DateTime<Utc>,
    pub window_stop: DateTime<Utc>,
}
