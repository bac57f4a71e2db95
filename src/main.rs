// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride front-end host
//!
//! Serves the JSON view API the browser shell renders, backed by the hosted
//! Supabase project named in the environment.

use std::sync::Arc;
use stride::{config::Config, db::SupabaseBackend, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Missing backend configuration is fatal
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
    })?;
    tracing::info!(port = config.port, "Starting Stride");

    let backend = Arc::new(SupabaseBackend::from_config(&config));
    tracing::info!(url = %config.supabase_url, "Backend client initialized");

    // Build shared state; the session store starts resolving immediately
    let state = Arc::new(AppState::new(config.clone(), backend));

    let app = stride::routes::create_router(state);

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

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stride=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
