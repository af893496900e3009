//! High-level warehouse service layer.
//!
//! Repository-agnostic operations used by the pipeline and the HTTP layer.
//! These functions hold the query rules (what a dashboard sees, how the
//! simulated rides are moved into the present) so they stay the same across
//! storage backends.
//!
//! # Usage
//!
//! ```no_run
//! use ridership_lakehouse::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let lines = services::get_all_bus_lines(&repo, "serving").await?;
//!     println!("Found {} bus lines", lines.len());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::repository::{
    from_rows, to_rows, DatasetRepository, ErrorContext, RepositoryError, RepositoryResult, Row,
    TableRef, TableRepository, WarehouseRepository,
};
use super::tables;
use crate::models::{BusLine, BusRide};

static RIDE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)_(\d{4})-(\d{2})-(\d{2})_(\d{2})-(\d{2})-(\d{2})$")
        .expect("ride id pattern is valid")
});

/// Which slice of the simulated rides the dashboard sees.
///
/// The simulation runs on the snapshot's dates; queries look back `days`
/// from "now" projected into `data_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidesWindow {
    #[serde(default = "default_days_to_query")]
    pub days: u32,
    #[serde(default = "default_data_year")]
    pub data_year: i32,
}

fn default_days_to_query() -> u32 {
    10
}

fn default_data_year() -> i32 {
    2024
}

impl Default for RidesWindow {
    fn default() -> Self {
        Self {
            days: default_days_to_query(),
            data_year: default_data_year(),
        }
    }
}

impl RidesWindow {
    /// `[start, stop]` in the data year for a query made at `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> RepositoryResult<(DateTime<Utc>, DateTime<Utc>)> {
        let stop = with_year(now, self.data_year)?;
        let earliest = TimeDelta::try_days(i64::from(self.days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                RepositoryError::validation_with_context(
                    format!("A {} day window before {} is out of range", self.days, now),
                    ErrorContext::new("rides_window"),
                )
            })?;
        let start = with_year(earliest, self.data_year)?;
        Ok((start, stop))
    }
}

/// Move `ts` into `year`, mapping Feb 29 to Feb 28 when `year` is not a leap year.
fn with_year(ts: DateTime<Utc>, year: i32) -> RepositoryResult<DateTime<Utc>> {
    ts.with_year(year)
        .or_else(|| {
            ts.checked_sub_signed(TimeDelta::days(1))
                .and_then(|day_before| day_before.with_year(year))
        })
        .ok_or_else(|| {
            RepositoryError::validation_with_context(
                format!("Cannot move {} into year {}", ts, year),
                ErrorContext::new("rides_window"),
            )
        })
}

/// Replace the year inside a `<line>_<YYYY-MM-DD>_<HH-MM-SS>` ride id.
///
/// Ids that do not follow the pattern are returned unchanged.
pub fn rewrite_ride_id_year(ride_id: &str, year: i32) -> String {
    RIDE_ID_PATTERN
        .replace(ride_id, format!("${{1}}_{:04}-${{3}}-${{4}}_${{5}}-${{6}}-${{7}}", year))
        .into_owned()
}

// ==================== Health & Datasets ====================

/// Check if the warehouse is healthy.
pub async fn health_check<R: WarehouseRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Drop a dataset, treating a missing dataset as already clean.
///
/// Returns whether anything was dropped.
pub async fn drop_dataset_if_exists<R: WarehouseRepository + ?Sized>(
    repo: &R,
    dataset: &str,
) -> RepositoryResult<bool> {
    match repo.drop_dataset(dataset).await {
        Ok(()) => {
            info!("Dropped dataset {}", dataset);
            Ok(true)
        }
        Err(e) if e.is_not_found() => {
            debug!("Dataset {} already absent", dataset);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

// ==================== Typed tables ====================

/// Replace a table with typed records.
pub async fn store_records<R, T>(repo: &R, table: &TableRef, records: &[T]) -> RepositoryResult<usize>
where
    R: WarehouseRepository + ?Sized,
    T: Serialize,
{
    let rows = to_rows(records)?;
    let count = repo
        .replace_table(table, rows)
        .await
        .map_err(|e| e.with_operation("store_records"))?;
    info!("Loaded {} rows into {}", count, table);
    Ok(count)
}

/// Read a table as typed records.
pub async fn load_records<R, T>(repo: &R, table: &TableRef) -> RepositoryResult<Vec<T>>
where
    R: WarehouseRepository + ?Sized,
    T: DeserializeOwned,
{
    from_rows(repo.read_table(table).await?)
}

// ==================== Query service ====================

/// All bus lines of the serving dataset.
pub async fn get_all_bus_lines<R: WarehouseRepository + ?Sized>(
    repo: &R,
    dataset: &str,
) -> RepositoryResult<Vec<BusLine>> {
    load_records(repo, &TableRef::new(dataset, tables::BUS_LINES)).await
}

/// All rows of an arbitrary table; empty when the table does not exist.
pub async fn get_bus_state<R: WarehouseRepository + ?Sized>(
    repo: &R,
    dataset: &str,
    table: &str,
) -> RepositoryResult<Vec<Row>> {
    let table = TableRef::new(dataset, table);
    table.validate()?;
    match repo.read_table(&table).await {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_not_found() => {
            debug!("State table {} missing, returning empty state", table);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Rides inside the query window, moved into the present.
///
/// Rows whose `timestamp_at_stop` lies in `[start, stop]` of
/// [`RidesWindow::bounds`] are kept. Each returned ride gets its id year
/// set to `now`'s year and its timestamp shifted forward by the whole days
/// between `stop` and `now`. A missing rides table yields no rides.
pub async fn get_rides_data<R: WarehouseRepository + ?Sized>(
    repo: &R,
    dataset: &str,
    window: &RidesWindow,
    now: DateTime<Utc>,
) -> RepositoryResult<Vec<BusRide>> {
    let (start, stop) = window.bounds(now)?;
    let table = TableRef::new(dataset, tables::BUS_RIDES);
    let rides: Vec<BusRide> = match load_records(repo, &table).await {
        Ok(rides) => rides,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e.with_operation("get_rides_data")),
    };

    let shift = TimeDelta::days((now - stop).num_days());
    let mut selected: Vec<BusRide> = rides
        .into_iter()
        .filter(|ride| ride.timestamp_at_stop >= start && ride.timestamp_at_stop <= stop)
        .map(|mut ride| {
            ride.bus_ride_id = rewrite_ride_id_year(&ride.bus_ride_id, now.year());
            ride.timestamp_at_stop += shift;
            ride
        })
        .collect();
    selected.sort_by(|a, b| {
        a.timestamp_at_stop
            .cmp(&b.timestamp_at_stop)
            .then_with(|| a.bus_ride_id.cmp(&b.bus_ride_id))
            .then_with(|| a.bus_stop_index.cmp(&b.bus_stop_index))
    });

    debug!(
        "Rides window {} .. {} returned {} rows (shift {} days)",
        start,
        stop,
        selected.len(),
        shift.num_days()
    );
    Ok(selected)
}

/// Delete all rows of a table, keeping the table.
pub async fn clear_table<R: WarehouseRepository + ?Sized>(
    repo: &R,
    dataset: &str,
    table: &str,
) -> RepositoryResult<usize> {
    let table = TableRef::new(dataset, table);
    table.validate()?;
    let removed = repo.clear_table(&table).await?;
    info!("Cleared {} rows from {}", removed, table);
    Ok(removed)
}
