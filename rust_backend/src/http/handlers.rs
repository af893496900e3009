//! HTTP handlers for the REST API.
//!
//! Each handler delegates to the warehouse service layer.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    BusLinesResponse, ClearStateResponse, HealthResponse, RidesQuery, RidesResponse, StateResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::validate_identifier;
use crate::db::services as db_services;
use crate::db::RidesWindow;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn checked_table(table: &str) -> Result<(), AppError> {
    validate_identifier("table", table)
        .map_err(|_| AppError::BadRequest(format!("Invalid table name '{}'", table)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let warehouse = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        warehouse,
    }))
}

// =============================================================================
// Bus network
// =============================================================================

/// GET /v1/bus-lines
pub async fn list_bus_lines(State(state): State<AppState>) -> HandlerResult<BusLinesResponse> {
    let bus_lines = db_services::get_all_bus_lines(state.repository.as_ref(), &state.dataset).await?;
    let total = bus_lines.len();
    Ok(Json(BusLinesResponse { bus_lines, total }))
}

// =============================================================================
// Dashboard state tables
// =============================================================================

/// GET /v1/state/{table}
///
/// A table that was never written reads as empty.
pub async fn get_state(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> HandlerResult<StateResponse> {
    checked_table(&table)?;
    let rows = db_services::get_bus_state(state.repository.as_ref(), &state.dataset, &table).await?;
    let total = rows.len();
    Ok(Json(StateResponse { table, rows, total }))
}

/// DELETE /v1/state/{table}
pub async fn clear_state(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> HandlerResult<ClearStateResponse> {
    checked_table(&table)?;
    let rows_removed =
        db_services::clear_table(state.repository.as_ref(), &state.dataset, &table).await?;
    Ok(Json(ClearStateResponse {
        table,
        rows_removed,
    }))
}

// =============================================================================
// Rides
// =============================================================================

/// GET /v1/rides?days=N
pub async fn get_rides(
    State(state): State<AppState>,
    Query(query): Query<RidesQuery>,
) -> HandlerResult<RidesResponse> {
    let window = RidesWindow {
        days: query.days.unwrap_or(state.rides_window.days),
        ..state.rides_window
    };
    let now = state.now();
    let (window_start, window_stop) = window.bounds(now)?;
    let rides =
        db_services::get_rides_data(state.repository.as_ref(), &state.dataset, &window, now)
            .await?;
    let total = rides.len();

    Ok(Json(RidesResponse {
        rides,
        total,
        window_start,
        window_stop,
    }))
}
