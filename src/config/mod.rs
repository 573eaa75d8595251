//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional, exported into the process environment)
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → loader.rs (PORT / DATA_DIR / GITHUB_* overrides)
//!     → validation.rs (semantic checks)
//!     → TrackerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_env_file, ConfigError};
pub use schema::TrackerConfig;
pub use schema::{GithubConfig, ListenerConfig, StorageBackendKind, StorageConfig};
