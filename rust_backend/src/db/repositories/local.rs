//! In-memory local repository implementation.
//!
//! Suitable for unit tests and single-process runs. All data lives in nested
//! `BTreeMap`s behind an `Arc<RwLock<..>>`, so clones share state.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::repository::*;

/// In-memory warehouse.
///
/// # Example
/// ```
/// use ridership_lakehouse::db::repositories::LocalRepository;
/// use ridership_lakehouse::db::repository::{DatasetRepository, TableRef, TableRepository};
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// repo.create_dataset("serving").await.unwrap();
/// repo.replace_table(&TableRef::new("serving", "bus_lines"), Vec::new()).await.unwrap();
/// assert_eq!(repo.list_tables("serving").await.unwrap(), vec!["bus_lines"]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

type Dataset = BTreeMap<String, Vec<Row>>;

struct LocalData {
    datasets: BTreeMap<String, Dataset>,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            datasets: BTreeMap::new(),
            is_healthy: true,
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut data) = self.data.write() {
            data.is_healthy = healthy;
        }
    }

    /// Number of datasets currently held.
    pub fn dataset_count(&self) -> usize {
        self.data.read().map(|d| d.datasets.len()).unwrap_or(0)
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, LocalData>> {
        let data = self
            .data
            .read()
            .map_err(|e| RepositoryError::internal(format!("Lock poisoned: {}", e)))?;
        if !data.is_healthy {
            return Err(RepositoryError::connection("Local repository is not healthy"));
        }
        Ok(data)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, LocalData>> {
        let data = self
            .data
            .write()
            .map_err(|e| RepositoryError::internal(format!("Lock poisoned: {}", e)))?;
        if !data.is_healthy {
            return Err(RepositoryError::connection("Local repository is not healthy"));
        }
        Ok(data)
    }
}

fn missing_dataset(operation: &str, dataset: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Dataset '{}' does not exist", dataset),
        ErrorContext::new(operation)
            .with_entity("dataset")
            .with_entity_id(dataset),
    )
}

fn missing_table(operation: &str, table: &TableRef) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Table '{}' does not exist", table),
        ErrorContext::new(operation)
            .with_entity("table")
            .with_entity_id(table),
    )
}

#[async_trait]
impl DatasetRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| RepositoryError::internal(format!("Lock poisoned: {}", e)))?;
        Ok(data.is_healthy)
    }

    async fn create_dataset(&self, dataset: &str) -> RepositoryResult<()> {
        validate_identifier("dataset", dataset)?;
        let mut data = self.write()?;
        data.datasets.entry(dataset.to_string()).or_default();
        Ok(())
    }

    async fn drop_dataset(&self, dataset: &str) -> RepositoryResult<()> {
        let mut data = self.write()?;
        data.datasets
            .remove(dataset)
            .map(|_| ())
            .ok_or_else(|| missing_dataset("drop_dataset", dataset))
    }

    async fn dataset_exists(&self, dataset: &str) -> RepositoryResult<bool> {
        Ok(self.read()?.datasets.contains_key(dataset))
    }

    async fn list_tables(&self, dataset: &str) -> RepositoryResult<Vec<String>> {
        let data = self.read()?;
        let tables = data
            .datasets
            .get(dataset)
            .ok_or_else(|| missing_dataset("list_tables", dataset))?;
        Ok(tables.keys().cloned().collect())
    }
}

#[async_trait]
impl TableRepository for LocalRepository {
    async fn table_exists(&self, table: &TableRef) -> RepositoryResult<bool> {
        let data = self.read()?;
        Ok(data
            .datasets
            .get(&table.dataset)
            .is_some_and(|tables| tables.contains_key(&table.table)))
    }

    async fn replace_table(&self, table: &TableRef, rows: Vec<Row>) -> RepositoryResult<usize> {
        table.validate()?;
        let mut data = self.write()?;
        let tables = data
            .datasets
            .get_mut(&table.dataset)
            .ok_or_else(|| missing_dataset("replace_table", &table.dataset))?;
        let count = rows.len();
        tables.insert(table.table.clone(), rows);
        Ok(count)
    }

    async fn read_table(&self, table: &TableRef) -> RepositoryResult<Vec<Row>> {
        let data = self.read()?;
        data.datasets
            .get(&table.dataset)
            .ok_or_else(|| missing_dataset("read_table", &table.dataset))?
            .get(&table.table)
            .cloned()
            .ok_or_else(|| missing_table("read_table", table))
    }

    async fn clear_table(&self, table: &TableRef) -> RepositoryResult<usize> {
        let mut data = self.write()?;
        let rows = data
            .datasets
            .get_mut(&table.dataset)
            .ok_or_else(|| missing_dataset("clear_table", &table.dataset))?
            .get_mut(&table.table)
            .ok_or_else(|| missing_table("clear_table", table))?;
        let removed = rows.len();
        rows.clear();
        Ok(removed)
    }
}
