//! Query API over a warehouse produced by a pipeline run.

#![cfg(feature = "http-server")]

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use ridership_lakehouse::db::{LocalRepository, RidesWindow};
use ridership_lakehouse::http::{create_router, AppState};
use ridership_lakehouse::{LakehouseConfig, LakehousePipeline};

async fn populated_app(dir: &TempDir) -> Router {
    let mut config = LakehouseConfig::default();
    config.pipeline.input_csv = support::write_sample_csv(dir.path(), 12);
    config.pipeline.output_dir = dir.path().join("out");
    config.generation.network.line_count = 3;
    config.generation.network.mean_stops = 4.0;
    config.generation.network.std_dev_stops = 0.5;
    config.generation.network.route_seed = Some(3);
    config.simulation.hours = 1;
    config.simulation.seed = Some(5);

    let repo = LocalRepository::new();
    LakehousePipeline::new(Arc::new(repo.clone()), config.clone())
        .run()
        .await
        .unwrap();

    // Snapshot is 2024-03-07; "now" a few days later, two years on
    let now = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
    let state = AppState::new(Arc::new(repo), config.pipeline.dataset)
        .with_rides_window(RidesWindow::default())
        .with_fixed_now(now);
    create_router(state)
}

async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_bus_lines_endpoint() {
    let dir = TempDir::new().unwrap();
    let (status, body) = call(populated_app(&dir).await, Method::GET, "/v1/bus-lines").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert!(body["bus_lines"][0]["stops"].is_array());
}

#[tokio::test]
async fn test_rides_are_moved_into_the_present() {
    let dir = TempDir::new().unwrap();
    let (status, body) = call(populated_app(&dir).await, Method::GET, "/v1/rides").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_u64().unwrap() > 0);
    assert_eq!(body["window_stop"], "2024-03-09T12:00:00Z");

    let ride = &body["rides"][0];
    assert!(ride["bus_ride_id"].as_str().unwrap().contains("_2026-03-07_"));
    assert!(ride["timestamp_at_stop"]
        .as_str()
        .unwrap()
        .starts_with("2026-03-07T"));
}

#[tokio::test]
async fn test_short_window_excludes_snapshot() {
    let dir = TempDir::new().unwrap();
    let (status, body) = call(populated_app(&dir).await, Method::GET, "/v1/rides?days=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_state_read_and_clear() {
    let dir = TempDir::new().unwrap();
    let app = populated_app(&dir).await;

    let (status, body) = call(app.clone(), Method::GET, "/v1/state/bus_stations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);

    let (status, body) = call(app.clone(), Method::DELETE, "/v1/state/bus_rides").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["rows_removed"].as_u64().unwrap() > 0);

    let (_, body) = call(app, Method::GET, "/v1/rides").await;
    assert_eq!(body["total"], 0);
}
