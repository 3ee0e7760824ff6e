//! Weight Progress Backend
//!
//! Pulls weight-tracking history from MyFitnessPal for the configured
//! profiles and derives progress reports, either printed once to stdout
//! (`mode = "cli"`) or served over HTTP with a periodic background
//! refresh (`mode = "server"`).

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weight_progress_backend::client::{MfpClient, SnapshotSource};
use weight_progress_backend::config::{AppConfig, Mode};
use weight_progress_backend::state::AppState;
use weight_progress_backend::{fetcher, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting Weight Progress Backend"
    );

    config.validate()?;

    let client: Arc<dyn SnapshotSource> =
        Arc::new(MfpClient::new(&config.mfp.base_url, &config.mfp.api_url)?);

    let mode = config.mode;
    let state = AppState::new(config);

    match mode {
        Mode::Cli => run_once(state, client).await,
        Mode::Server => serve(state, client).await,
    }
}

/// One-shot mode: fetch every profile, print all reports as JSON.
///
/// Individual failures show up inside the document; the exit code is
/// non-zero only when every profile failed.
async fn run_once(state: AppState, source: Arc<dyn SnapshotSource>) -> Result<()> {
    let outcomes = fetcher::refresh_all(&state, source).await;

    let registry = state.registry.read().await;
    let document = routes::progress_document(&registry, Utc::now().date_naive());
    println!("{}", serde_json::to_string_pretty(&document)?);

    if !outcomes.is_empty() && outcomes.iter().all(|(_, result)| result.is_err()) {
        anyhow::bail!("every profile fetch failed");
    }
    Ok(())
}

/// Server mode: background refresh loop plus the HTTP surface.
async fn serve(state: AppState, source: Arc<dyn SnapshotSource>) -> Result<()> {
    let interval = Duration::from_secs(state.config.fetch.interval_secs);
    tokio::spawn(fetcher::run_periodic(state.clone(), source, interval));

    let app = routes::create_router(state.clone());

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "weight_progress_backend=info,tower_http=info".into()
        } else {
            "weight_progress_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
