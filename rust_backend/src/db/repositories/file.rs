//! Directory-backed repository.
//!
//! Layout: one directory per dataset under the root, one newline-delimited
//! JSON file per table (`<root>/<dataset>/<table>.ndjson`). The pipeline and
//! the HTTP server can share a warehouse this way across processes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::db::repository::*;

const TABLE_EXTENSION: &str = "ndjson";

#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    /// Open (and create if needed) a warehouse rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            RepositoryError::configuration(format!(
                "Cannot create warehouse root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, dataset: &str) -> RepositoryResult<PathBuf> {
        validate_identifier("dataset", dataset)?;
        Ok(self.root.join(dataset))
    }

    fn table_path(&self, table: &TableRef) -> RepositoryResult<PathBuf> {
        table.validate()?;
        Ok(self
            .root
            .join(&table.dataset)
            .join(format!("{}.{}", table.table, TABLE_EXTENSION)))
    }

    async fn require_dataset(&self, operation: &str, dataset: &str) -> RepositoryResult<PathBuf> {
        let dir = self.dataset_dir(dataset)?;
        if fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            Ok(dir)
        } else {
            Err(RepositoryError::not_found_with_context(
                format!("Dataset '{}' does not exist", dataset),
                ErrorContext::new(operation)
                    .with_entity("dataset")
                    .with_entity_id(dataset),
            ))
        }
    }

    async fn require_table(&self, operation: &str, table: &TableRef) -> RepositoryResult<PathBuf> {
        self.require_dataset(operation, &table.dataset).await?;
        let path = self.table_path(table)?;
        if fs::try_exists(&path).await? {
            Ok(path)
        } else {
            Err(RepositoryError::not_found_with_context(
                format!("Table '{}' does not exist", table),
                ErrorContext::new(operation)
                    .with_entity("table")
                    .with_entity_id(table),
            ))
        }
    }

    async fn write_rows(&self, path: &Path, rows: &[Row]) -> RepositoryResult<()> {
        let mut buf = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buf, row)?;
            buf.push(b'\n');
        }
        // Write next to the target and rename so readers never see a half-written table.
        let tmp = path.with_extension(format!("{}.tmp", TABLE_EXTENSION));
        fs::write(&tmp, &buf).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn parse_rows(content: &str, table: &TableRef) -> RepositoryResult<Vec<Row>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Row>(line).map_err(|e| {
                RepositoryError::query_with_context(
                    format!("Corrupt row: {}", e),
                    ErrorContext::new("read_table")
                        .with_entity("table")
                        .with_entity_id(table)
                        .with_details(format!("line={}", i + 1)),
                )
            })
        })
        .collect()
}

#[async_trait]
impl DatasetRepository for FileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn create_dataset(&self, dataset: &str) -> RepositoryResult<()> {
        let dir = self.dataset_dir(dataset)?;
        fs::create_dir_all(&dir).await?;
        Ok(())
    }

    async fn drop_dataset(&self, dataset: &str) -> RepositoryResult<()> {
        let dir = self.require_dataset("drop_dataset", dataset).await?;
        fs::remove_dir_all(&dir).await?;
        debug!("Dropped dataset directory {}", dir.display());
        Ok(())
    }

    async fn dataset_exists(&self, dataset: &str) -> RepositoryResult<bool> {
        let dir = self.dataset_dir(dataset)?;
        Ok(fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false))
    }

    async fn list_tables(&self, dataset: &str) -> RepositoryResult<Vec<String>> {
        let dir = self.require_dataset("list_tables", dataset).await?;
        let mut entries = fs::read_dir(&dir).await?;
        let mut tables = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TABLE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.push(stem.to_string());
            }
        }
        tables.sort();
        Ok(tables)
    }
}

#[async_trait]
impl TableRepository for FileRepository {
    async fn table_exists(&self, table: &TableRef) -> RepositoryResult<bool> {
        let path = self.table_path(table)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn replace_table(&self, table: &TableRef, rows: Vec<Row>) -> RepositoryResult<usize> {
        self.require_dataset("replace_table", &table.dataset).await?;
        let path = self.table_path(table)?;
        self.write_rows(&path, &rows).await?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }

    async fn read_table(&self, table: &TableRef) -> RepositoryResult<Vec<Row>> {
        let path = self.require_table("read_table", table).await?;
        let content = fs::read_to_string(&path).await?;
        parse_rows(&content, table)
    }

    async fn clear_table(&self, table: &TableRef) -> RepositoryResult<usize> {
        let path = self.require_table("clear_table", table).await?;
        let content = fs::read_to_string(&path).await?;
        let removed = parse_rows(&content, table)?.len();
        self.write_rows(&path, &[]).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(id: i64, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("name".into(), json!(name));
        row
    }

    #[tokio::test]
    async fn test_tables_are_ndjson_files() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path()).unwrap();
        repo.create_dataset("serving").await.unwrap();
        let table = TableRef::new("serving", "bus_lines");
        repo.replace_table(&table, vec![row(1, "a"), row(2, "b")])
            .await
            .unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("serving").join("bus_lines.ndjson")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(repo.read_table(&table).await.unwrap()[1], row(2, "b"));
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let table = TableRef::new("serving", "bus_rides");
        {
            let repo = FileRepository::new(dir.path()).unwrap();
            repo.create_dataset("serving").await.unwrap();
            repo.replace_table(&table, vec![row(1, "a")]).await.unwrap();
        }
        let reopened = FileRepository::new(dir.path()).unwrap();
        assert_eq!(reopened.read_table(&table).await.unwrap().len(), 1);
        assert_eq!(reopened.list_tables("serving").await.unwrap(), vec!["bus_rides"]);
    }

    #[tokio::test]
    async fn test_clear_and_drop() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path()).unwrap();
        repo.create_dataset("staging").await.unwrap();
        let table = TableRef::new("staging", "ridership");
        repo.replace_table(&table, vec![row(1, "a"), row(2, "b")])
            .await
            .unwrap();

        assert_eq!(repo.clear_table(&table).await.unwrap(), 2);
        assert!(repo.table_exists(&table).await.unwrap());
        assert!(repo.read_table(&table).await.unwrap().is_empty());

        repo.drop_dataset("staging").await.unwrap();
        assert!(!dir.path().join("staging").exists());
        assert!(repo.drop_dataset("staging").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_missing_objects_are_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path()).unwrap();
        let table = TableRef::new("serving", "bus_lines");
        assert!(repo.read_table(&table).await.unwrap_err().is_not_found());
        assert!(repo.list_tables("serving").await.unwrap_err().is_not_found());

        repo.create_dataset("serving").await.unwrap();
        assert!(repo.read_table(&table).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path()).unwrap();
        let err = repo.create_dataset("../escape").await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::new(dir.path()).unwrap();
        repo.create_dataset("serving").await.unwrap();
        std::fs::write(
            dir.path().join("serving").join("broken.ndjson"),
            "{\"id\":1}\nnot json\n",
        )
        .unwrap();

        let err = repo
            .read_table(&TableRef::new("serving", "broken"))
            .await
            .unwrap_err();
        assert_eq!(err.context().details.as_deref(), Some("line=2"));
    }
}
