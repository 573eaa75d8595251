//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Write to the remote store:
//!     → read current SHA
//!     → PUT with SHA
//!     → On conflict / 5xx / network error: retries.rs (retryable?)
//!     → backoff.rs (exponential delay with jitter) → try again
//! ```
//!
//! # Design Decisions
//! - Every remote call has a client-level timeout
//! - A stale SHA is treated like any other transient failure: re-read, retry
//! - Attempts are bounded; the final error is surfaced to the caller

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::RetryPolicy;
