//! Table contents.

use async_trait::async_trait;

use super::error::RepositoryResult;
use super::{Row, TableRef};

#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Whether the table exists. A missing dataset means the table is missing.
    async fn table_exists(&self, table: &TableRef) -> RepositoryResult<bool>;

    /// Drop and recreate `table` with exactly `rows`.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    /// `NotFound` when the dataset does not exist.
    async fn replace_table(&self, table: &TableRef, rows: Vec<Row>) -> RepositoryResult<usize>;

    /// All rows, in insertion order.
    ///
    /// # Errors
    /// `NotFound` when the dataset or the table does not exist.
    async fn read_table(&self, table: &TableRef) -> RepositoryResult<Vec<Row>>;

    /// Remove all rows but keep the table. Returns the number of rows removed.
    ///
    /// # Errors
    /// `NotFound` when the dataset or the table does not exist.
    async fn clear_table(&self, table: &TableRef) -> RepositoryResult<usize>;
}
