//! Personal fitness tracking API library

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod records;
pub mod resilience;
pub mod storage;

pub use config::schema::TrackerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use records::{FitnessRecord, RecordStore};
