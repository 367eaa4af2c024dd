// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::load_app_config;
use crate::infrastructure::file_repositories::{
    FileDashboardRepository, FileKpiRepository, FileMetricRepository,
};
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let data_dir = config.storage.data_dir;

    // Create repositories (infrastructure layer)
    let metrics = Arc::new(FileMetricRepository::new(&data_dir));
    let kpis = Arc::new(FileKpiRepository::new(&data_dir));
    let dashboards = Arc::new(FileDashboardRepository::new(&data_dir));

    // Create services (application layer)
    let state = Arc::new(AppState::new(metrics, kpis, dashboards));

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting kpi-dashboard on {} (data in {})", addr, data_dir.display());

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
