//! Repository trait definitions for warehouse operations.
//!
//! The warehouse is a two-level namespace: datasets contain tables, tables
//! contain rows. Rows are JSON objects so one store can hold raw snapshot
//! rows, typed pipeline outputs and simulation results alike.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`dataset`]: Dataset lifecycle and health
//! - [`table`]: Table contents
//!
//! # Convenience Trait Bound
//!
//! Services that need both capabilities take a [`WarehouseRepository`]:
//!
//! ```ignore
//! async fn reload<R: WarehouseRepository + ?Sized>(repo: &R, table: &TableRef) -> RepositoryResult<()> {
//!     repo.create_dataset(&table.dataset).await?;
//!     repo.replace_table(table, Vec::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod table;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

pub use dataset::DatasetRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use table::TableRepository;

/// One table row.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Composite trait bound for a complete warehouse implementation.
pub trait WarehouseRepository: DatasetRepository + TableRepository {}

impl<T> WarehouseRepository for T where T: DatasetRepository + TableRepository + ?Sized {}

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Check both parts with [`validate_identifier`].
    pub fn validate(&self) -> RepositoryResult<()> {
        validate_identifier("dataset", &self.dataset)?;
        validate_identifier("table", &self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

/// Accept only `[A-Za-z0-9_]+`.
///
/// Dataset and table names end up as directory and file names in the file
/// backend, and come straight from request paths in the HTTP layer.
pub fn validate_identifier(kind: &str, name: &str) -> RepositoryResult<()> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::validation_with_context(
            format!("Invalid {} name '{}'", kind, name),
            ErrorContext::default().with_entity(kind).with_entity_id(name),
        ))
    }
}

/// Serialize typed records into rows.
pub fn to_rows<T: Serialize>(items: &[T]) -> RepositoryResult<Vec<Row>> {
    items
        .iter()
        .map(|item| match serde_json::to_value(item)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(RepositoryError::validation(format!(
                "Expected a JSON object per row, got {}",
                other
            ))),
        })
        .collect()
}

/// Deserialize rows into typed records.
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> RepositoryResult<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| {
                RepositoryError::validation_with_context(
                    e.to_string(),
                    ErrorContext::new("from_rows").with_details(format!("row={}", i)),
                )
            })
        })
        .collect()
}
