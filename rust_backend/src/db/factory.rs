//! Repository factory for dependency injection.
//!
//! Builds repository instances from runtime configuration so the pipeline,
//! the CLI and the server never name a concrete backend.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repositories::{FileRepository, LocalRepository};
use super::repository::{RepositoryError, RepositoryResult, WarehouseRepository};

/// Default warehouse directory for the file backend.
pub const DEFAULT_WAREHOUSE_PATH: &str = "warehouse";

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// NDJSON files under a warehouse directory
    #[default]
    File,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "memory", "file").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "fs" => Ok(Self::File),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use ridership_lakehouse::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
/// # let _ = repo;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `path` is the warehouse root for the file backend; it defaults to
    /// [`DEFAULT_WAREHOUSE_PATH`] and is ignored by the local backend.
    pub fn create(
        repo_type: RepositoryType,
        path: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn WarehouseRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::File => {
                let root = path
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_WAREHOUSE_PATH));
                Ok(Arc::new(FileRepository::new(root)?))
            }
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn WarehouseRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a repository from `REPOSITORY_TYPE` and `REPOSITORY_PATH`.
    pub fn from_env() -> RepositoryResult<Arc<dyn WarehouseRepository>> {
        let repo_type = match std::env::var("REPOSITORY_TYPE") {
            Ok(raw) => raw.parse().map_err(RepositoryError::configuration)?,
            Err(_) => RepositoryType::default(),
        };
        let path = std::env::var("REPOSITORY_PATH").ok().map(PathBuf::from);
        Self::create(repo_type, path.as_deref())
    }
}
