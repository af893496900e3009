//! Dataset lifecycle operations.

use async_trait::async_trait;

use super::error::RepositoryResult;

/// Datasets group tables; staging data lives in its own dataset so it can be
/// dropped wholesale after a run.
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// `Ok(false)` when the store is reachable but not usable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Create a dataset. Creating an existing dataset is a no-op.
    async fn create_dataset(&self, dataset: &str) -> RepositoryResult<()>;

    /// Drop a dataset with all of its tables.
    ///
    /// # Errors
    /// `NotFound` when the dataset does not exist.
    async fn drop_dataset(&self, dataset: &str) -> RepositoryResult<()>;

    /// Whether the dataset exists.
    async fn dataset_exists(&self, dataset: &str) -> RepositoryResult<bool>;

    /// Table names of a dataset, sorted.
    ///
    /// # Errors
    /// `NotFound` when the dataset does not exist.
    async fn list_tables(&self, dataset: &str) -> RepositoryResult<Vec<String>>;
}
