//! Notebook output scrubbing.
//!
//! Clears execution counts and code cell outputs from `.ipynb` documents so
//! notebooks can be committed without results.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Scrub a notebook document in place. Returns the number of cells touched.
pub fn clean_notebook_value(notebook: &mut Value) -> Result<usize> {
    let cells = notebook
        .get_mut("cells")
        .and_then(Value::as_array_mut)
        .context("Notebook has no 'cells' array")?;

    for cell in cells.iter_mut() {
        let Some(cell) = cell.as_object_mut() else {
            continue;
        };
        cell.insert("execution_count".to_string(), Value::Null);
        if cell.get("cell_type").and_then(Value::as_str) == Some("code") {
            cell.insert("outputs".to_string(), Value::Array(Vec::new()));
        }
    }
    Ok(cells.len())
}

/// Scrub the notebook at `path` and write it back.
pub fn clean_notebook(path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut notebook: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    clean_notebook_value(&mut notebook).with_context(|| format!("In {}", path.display()))?;
    fs::write(path, serde_json::to_string(&notebook)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Scrub every `.ipynb` file below `dir`. Returns the cleaned paths, sorted.
pub fn clean_notebooks_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut notebooks = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(NOTEBOOK_EXTENSION)
        {
            notebooks.push(entry.into_path());
        }
    }
    notebooks.sort();
    for path in &notebooks {
        info!("Cleaning outputs from {}", path.display());
        clean_notebook(path)?;
    }
    Ok(notebooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "cells": [
                {"cell_type": "markdown", "execution_count": 3, "source": ["# Title"]},
                {"cell_type": "code", "execution_count": 7, "outputs": [{"text": "42"}], "source": ["6*7"]}
            ],
            "metadata": {},
            "nbformat": 4
        })
    }

    #[test]
    fn test_clean_value() {
        let mut nb = sample();
        assert_eq!(clean_notebook_value(&mut nb).unwrap(), 2);
        assert_eq!(nb["cells"][0]["execution_count"], Value::Null);
        assert!(nb["cells"][0].get("outputs").is_none());
        assert_eq!(nb["cells"][1]["execution_count"], Value::Null);
        assert_eq!(nb["cells"][1]["outputs"], json!([]));
        assert_eq!(nb["cells"][1]["source"], json!(["6*7"]));
    }

    #[test]
    fn test_missing_cells_is_an_error() {
        let mut nb = json!({"metadata": {}});
        assert!(clean_notebook_value(&mut nb).is_err());
    }

    #[test]
    fn test_clean_directory_recursively() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("part1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a.ipynb"), sample().to_string()).unwrap();
        fs::write(nested.join("b.ipynb"), sample().to_string()).unwrap();
        fs::write(nested.join("notes.txt"), "untouched").unwrap();

        let cleaned = clean_notebooks_in(dir.path()).unwrap();
        assert_eq!(
            cleaned,
            vec![dir.path().join("a.ipynb"), nested.join("b.ipynb")]
        );

        let b: Value =
            serde_json::from_str(&fs::read_to_string(nested.join("b.ipynb")).unwrap()).unwrap();
        assert_eq!(b["cells"][1]["outputs"], json!([]));
        assert_eq!(fs::read_to_string(nested.join("notes.txt")).unwrap(), "untouched");
    }

    #[test]
    fn test_directory_named_like_a_notebook_is_skipped() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("archive.ipynb");
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("c.ipynb"), sample().to_string()).unwrap();

        let cleaned = clean_notebooks_in(dir.path()).unwrap();
        assert_eq!(cleaned, vec![odd.join("c.ipynb")]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(clean_notebooks_in(&dir.path().join("absent")).is_err());
    }
}
