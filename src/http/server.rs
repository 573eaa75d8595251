//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, request ID, tracing, logging, timeout, limits)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TrackerConfig;
use crate::http::handlers::{self, AppState};
use crate::http::middleware::{log_requests, LogSettings};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::timeout_as_json;
use crate::records::RecordStore;

/// HTTP server for the fitness API.
pub struct HttpServer {
    router: Router,
    config: TrackerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving records from `store`.
    pub fn new(config: TrackerConfig, store: Arc<RecordStore>) -> Self {
        let state = AppState { store };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TrackerConfig, state: AppState) -> Router {
        let log_settings = LogSettings {
            body_limit: config.observability.log_body_limit,
            max_body_size: config.security.max_body_size,
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any);

        Router::new()
            .route(
                "/api/fitness",
                get(handlers::list_records).post(handlers::upsert_record),
            )
            .route("/api/fitness/all", get(handlers::list_records))
            .route("/api/fitness/year/{year}", get(handlers::get_by_year))
            .route(
                "/api/fitness/year/{year}/month/{month}",
                get(handlers::get_by_month),
            )
            .route("/api/fitness/{date}", get(handlers::get_by_date))
            .route("/get", get(handlers::get_raw))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(middleware::from_fn_with_state(log_settings, log_requests))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(timeout_as_json))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
            .layer(cors)
    }

    /// The configured router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
