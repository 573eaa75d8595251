//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign / propagate x-request-id)
//!     → middleware/logging.rs (REQ / RES log lines, request metrics)
//!     → handlers.rs (record store lookups and upserts)
//!     → response.rs (errors as JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::HttpServer;
