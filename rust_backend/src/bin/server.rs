//! Lakehouse HTTP server.
//!
//! Serves the warehouse written by `lakehouse generate`.
//!
//! # Environment Variables
//!
//! - `LAKEHOUSE_CONFIG`: configuration file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `file` (default) or `local`
//! - `REPOSITORY_PATH`: warehouse root for the file backend
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ridership_lakehouse::db::RepositoryFactory;
use ridership_lakehouse::http::{create_router, AppState};
use ridership_lakehouse::LakehouseConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting lakehouse HTTP server");

    let config = LakehouseConfig::load(None)?;
    let repository = RepositoryFactory::create(
        config.repository.repo_type,
        config.repository.path.as_deref(),
    )?;
    info!(
        "Repository initialized ({:?}), serving dataset {}",
        config.repository.repo_type, config.pipeline.dataset
    );

    let state = AppState::new(repository, config.pipeline.dataset.clone())
        .with_rides_window(config.rides);
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
