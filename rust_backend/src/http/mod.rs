//! HTTP server module.
//!
//! An axum router over the warehouse query service, consumed by the
//! dashboards.
//!
//! ```text
//! GET    /health
//! GET    /v1/bus-lines
//! GET    /v1/state/{table}
//! DELETE /v1/state/{table}
//! GET    /v1/rides?days=N
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
