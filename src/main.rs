// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! KICKR Planner API Server
//!
//! Lets a connected frontend compose interval running workouts and upload
//! them to the Wahoo Cloud, where they appear on the paired treadmill.

use kickr_planner::{
    config::Config,
    services::{UploadService, WahooClient},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting KICKR Planner API");

    // Initialize Wahoo client and upload service
    let wahoo_client = WahooClient::new(
        config.wahoo_client_id.clone(),
        config.wahoo_client_secret.clone(),
        config.wahoo_redirect_uri.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )
    .expect("Failed to initialize Wahoo client");
    let upload_service = UploadService::new(wahoo_client);

    // In-memory session store, scoped to this process lifetime
    let sessions = Arc::new(dashmap::DashMap::new());
    tracing::info!("Session store initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
        upload_service,
    });

    // Build router
    let app = kickr_planner::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kickr_planner=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
