//! Fitness tracker API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ axum router ──▶ logging middleware ──▶ handlers
//!                                                        │
//!                                                        ▼
//!                                                  RecordStore (ArcSwap snapshot)
//!                                                        │ upsert / reload
//!                                                        ▼
//!                              RecordBackend: memory | file | tree | github
//!                                               (+ optional GitHub mirror)
//!
//!     RefreshTask ── every N seconds ──▶ RecordStore::reload
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use fitness_tracker::config::{load_config, load_env_file};
use fitness_tracker::http::HttpServer;
use fitness_tracker::lifecycle::{prepare_store, signals, Shutdown};
use fitness_tracker::observability::{logging, metrics};
use fitness_tracker::records::RefreshTask;

#[derive(Parser)]
#[command(name = "fitness-tracker", version, about = "Personal fitness tracking API")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let env_file = load_env_file(Path::new(".env"));
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("fitness-tracker v{} starting", env!("CARGO_PKG_VERSION"));

    match env_file {
        Ok(true) => tracing::info!("Loaded variables from .env"),
        Ok(false) => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = ?config.storage.backend,
        storage_path = %config.storage.path,
        mirror_to_github = config.storage.mirror_to_github,
        refresh_secs = config.refresh.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = prepare_store(&config).await?;
    let shutdown = Shutdown::new();

    let refresh = RefreshTask::new(
        store.clone(),
        Duration::from_secs(config.refresh.interval_secs),
    );
    let refresh_handle = tokio::spawn(refresh.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store);
    let server_handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();

    server_handle.await??;
    let _ = refresh_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
