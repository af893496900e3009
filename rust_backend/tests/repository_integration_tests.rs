//! Integration tests for repository implementations.
//!
//! Every backend must behave the same through the trait object.

mod support;

use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use ridership_lakehouse::db::repository::{DatasetRepository, TableRepository};
use ridership_lakehouse::db::services::{drop_dataset_if_exists, get_bus_state};
use ridership_lakehouse::db::{
    RepositoryError, RepositoryFactory, RepositoryType, Row, TableRef, WarehouseRepository,
};
use ridership_lakehouse::LakehouseConfig;

fn row(id: i64) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), json!(id));
    row
}

fn backends(dir: &TempDir) -> Vec<(&'static str, Arc<dyn WarehouseRepository>)> {
    vec![
        ("local", RepositoryFactory::create_local()),
        (
            "file",
            RepositoryFactory::create(RepositoryType::File, Some(&dir.path().join("wh"))).unwrap(),
        ),
    ]
}

#[tokio::test]
async fn test_repository_health_check() {
    let dir = TempDir::new().unwrap();
    for (name, repo) in backends(&dir) {
        assert!(repo.health_check().await.unwrap(), "{} unhealthy", name);
    }
}

#[tokio::test]
async fn test_table_lifecycle() {
    let dir = TempDir::new().unwrap();
    for (name, repo) in backends(&dir) {
        let table = TableRef::new("serving", "bus_rides");
        repo.create_dataset("serving").await.unwrap();
        assert!(!repo.table_exists(&table).await.unwrap(), "{}", name);

        repo.replace_table(&table, vec![row(1), row(2), row(3)])
            .await
            .unwrap();
        assert_eq!(repo.read_table(&table).await.unwrap().len(), 3, "{}", name);

        assert_eq!(repo.clear_table(&table).await.unwrap(), 3, "{}", name);
        assert!(repo.table_exists(&table).await.unwrap(), "{}", name);

        repo.drop_dataset("serving").await.unwrap();
        assert!(!repo.table_exists(&table).await.unwrap(), "{}", name);
    }
}

#[tokio::test]
async fn test_not_found_error() {
    let dir = TempDir::new().unwrap();
    for (name, repo) in backends(&dir) {
        let result = repo.read_table(&TableRef::new("absent", "t")).await;
        assert!(
            matches!(result, Err(RepositoryError::NotFound { .. })),
            "{}",
            name
        );
        assert!(matches!(
            repo.drop_dataset("absent").await,
            Err(RepositoryError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_missing_state_and_teardown_are_clean() {
    let dir = TempDir::new().unwrap();
    for (name, repo) in backends(&dir) {
        repo.create_dataset("serving").await.unwrap();
        let rows = get_bus_state(repo.as_ref(), "serving", "nothing_here")
            .await
            .unwrap();
        assert!(rows.is_empty(), "{}", name);
        assert!(!drop_dataset_if_exists(repo.as_ref(), "staging").await.unwrap());
    }
}

#[tokio::test]
async fn test_factory_from_env() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("env_wh");
    let root_str = root.to_str().unwrap().to_string();

    let repo = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("file")),
            ("REPOSITORY_PATH", Some(root_str.as_str())),
        ],
        RepositoryFactory::from_env,
    )
    .unwrap();

    repo.create_dataset("serving").await.unwrap();
    assert!(root.join("serving").is_dir());
}

#[test]
fn test_factory_rejects_unknown_type() {
    let result = support::with_scoped_env(
        &[("REPOSITORY_TYPE", Some("spreadsheet"))],
        RepositoryFactory::from_env,
    );
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_config_load_applies_env_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lakehouse.toml");
    std::fs::write(
        &path,
        "[repository]\ntype = \"file\"\npath = \"from_file\"\n\n[server]\nport = 9000\n",
    )
    .unwrap();

    let config = support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("REPOSITORY_PATH", None),
            ("HOST", None),
            ("PORT", Some("9100")),
        ],
        || LakehouseConfig::load(Some(&path)),
    )
    .unwrap();

    assert_eq!(config.repository.repo_type, RepositoryType::Local);
    assert_eq!(config.repository.path, Some(PathBuf::from("from_file")));
    assert_eq!(config.server.port, 9100);
}
