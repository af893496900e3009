//! Paged bulk download into a local CSV.
//!
//! The upstream API is slow and times out on large pages. The downloader
//! starts at the largest allowed page and shrinks it by a fixed step after
//! each timeout. Downloads resume from the rows already in the target file.

use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;
use tracing::{info, warn};

use crate::db::Row;
use crate::parsing::RAW_FIELDNAMES;

/// Rows in the complete hourly ridership export.
pub const TOTAL_NUMBER_OF_RECORDS: usize = 110_696_370;
/// Largest page the API accepts.
pub const DEFAULT_PAGE_SIZE: usize = 50_000;
pub const DEFAULT_DECREMENT: usize = 1_000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Fetch(FetchError),
    #[error("page size dropped to zero after repeated timeouts at offset {offset}")]
    PageSizeExhausted { offset: usize },
    #[error("{path} has an unexpected header, refusing to append")]
    UnexpectedHeader { path: String },
    #[error("file task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// A paged, offset-addressed row source.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Up to `limit` rows starting at row `offset`.
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Row>, FetchError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Rows already in the file when the download started.
    pub resumed_from: usize,
    pub rows_written: usize,
    pub total_rows: usize,
    pub timeouts: usize,
    pub final_page_size: usize,
    /// False when the source ran dry before `total_records`.
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct PagedDownloader {
    pub total_records: usize,
    pub page_size: usize,
    pub decrement: usize,
    pub force_clear: bool,
}

impl Default for PagedDownloader {
    fn default() -> Self {
        Self {
            total_records: TOTAL_NUMBER_OF_RECORDS,
            page_size: DEFAULT_PAGE_SIZE,
            decrement: DEFAULT_DECREMENT,
            force_clear: false,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DownloadError + '_ {
    move |source| DownloadError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Render one JSON value as a CSV field. Missing and null become empty.
fn field_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Rows already downloaded into `path`, or `None` when the file has no
/// header yet. Any other header is an error.
fn existing_progress(path: &Path) -> Result<Option<usize>, DownloadError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));
    let headers = reader.headers()?;
    if headers.is_empty() {
        return Ok(None);
    }
    if !headers.iter().eq(RAW_FIELDNAMES.iter().copied()) {
        return Err(DownloadError::UnexpectedHeader {
            path: path.display().to_string(),
        });
    }
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(Some(count))
}

/// Data rows (header excluded) in an existing download.
pub fn count_existing_rows(path: &Path) -> Result<usize, DownloadError> {
    Ok(existing_progress(path)?.unwrap_or(0))
}

/// Truncate `target` to a bare header row.
fn write_header(target: &Path) -> Result<(), DownloadError> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let file = File::create(target).map_err(io_error(target))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(RAW_FIELDNAMES)?;
    writer.flush().map_err(io_error(target))?;
    Ok(())
}

/// Starting offset: 0 for a fresh file (header written), otherwise the
/// number of rows already present.
fn prepare_target(
    target: &Path,
    resume: bool,
    total_records: usize,
) -> Result<usize, DownloadError> {
    if resume && target.exists() {
        match existing_progress(target)? {
            Some(existing) => {
                info!(
                    "Starting from existing data, already got {} records ({:.2}%)",
                    existing,
                    percent(existing, total_records)
                );
                return Ok(existing);
            }
            None => warn!("{} exists without a header, starting over", target.display()),
        }
    }
    write_header(target)?;
    Ok(0)
}

fn append_rows(target: &Path, rows: &[Row]) -> Result<(), DownloadError> {
    let file = OpenOptions::new()
        .append(true)
        .open(target)
        .map_err(io_error(target))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for row in rows {
        writer.write_record(RAW_FIELDNAMES.iter().map(|name| field_text(row.get(*name))))?;
    }
    writer.flush().map_err(io_error(target))?;
    Ok(())
}

impl PagedDownloader {
    pub fn new(total_records: usize) -> Self {
        Self {
            total_records,
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_decrement(mut self, decrement: usize) -> Self {
        self.decrement = decrement;
        self
    }

    pub fn with_force_clear(mut self, force_clear: bool) -> Self {
        self.force_clear = force_clear;
        self
    }

    /// Download until `total_records` rows are in `target`.
    pub async fn download<S: PageSource + ?Sized>(
        &self,
        source: &S,
        target: &Path,
    ) -> Result<DownloadReport, DownloadError> {
        let path: PathBuf = target.to_path_buf();
        let (resume, total_records) = (!self.force_clear, self.total_records);
        let resumed_from =
            task::spawn_blocking(move || prepare_target(&path, resume, total_records)).await??;
        let mut report = DownloadReport {
            resumed_from,
            total_rows: resumed_from,
            final_page_size: self.page_size,
            ..Default::default()
        };

        let mut page_size = self.page_size;
        while report.total_rows < self.total_records {
            if page_size == 0 {
                return Err(DownloadError::PageSizeExhausted {
                    offset: report.total_rows,
                });
            }
            match source.fetch(page_size, report.total_rows).await {
                Err(FetchError::Timeout) => {
                    report.timeouts += 1;
                    page_size = page_size.saturating_sub(self.decrement);
                    warn!("Got timeout, adjusting limit to {}", page_size);
                }
                Err(e) => return Err(DownloadError::Fetch(e)),
                Ok(rows) if rows.is_empty() => {
                    warn!(
                        "Source returned no rows at offset {}, stopping",
                        report.total_rows
                    );
                    report.final_page_size = page_size;
                    return Ok(report);
                }
                Ok(rows) => {
                    let fetched = rows.len();
                    let path = target.to_path_buf();
                    task::spawn_blocking(move || append_rows(&path, &rows)).await??;
                    report.rows_written += fetched;
                    report.total_rows += fetched;
                    info!(
                        "Got {} rows so far ({:.2}%)",
                        report.total_rows,
                        percent(report.total_rows, self.total_records)
                    );
                }
            }
        }

        report.final_page_size = page_size;
        report.complete = true;
        Ok(report)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
