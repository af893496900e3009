//! Application state for the HTTP server.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::{RidesWindow, WarehouseRepository};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Warehouse the pipeline writes into
    pub repository: Arc<dyn WarehouseRepository>,
    /// Serving dataset
    pub dataset: String,
    pub rides_window: RidesWindow,
    /// Pinned "now" for the rides window; wall clock when unset
    pub fixed_now: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn WarehouseRepository>, dataset: impl Into<String>) -> Self {
        Self {
            repository,
            dataset: dataset.into(),
            rides_window: RidesWindow::default(),
            fixed_now: None,
        }
    }

    pub fn with_rides_window(mut self, window: RidesWindow) -> Self {
        self.rides_window = window;
        self
    }

    pub fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }
}
