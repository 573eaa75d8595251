//! Fitness record subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/fitness
//!     → model.rs (deserialize FitnessRecord)
//!     → date.rs (validate YYYY-MM-DD key)
//!     → store.rs (upsert by date, atomic snapshot swap)
//!     → storage backend (persist the changed partition)
//!
//! GET /api/fitness/...
//!     → store.rs (linear scan over the current snapshot)
//!
//! refresh.rs:
//!     Periodic timer → store.reload() → snapshot swap
//! ```
//!
//! # Design Decisions
//! - Date is the natural key; at most one record per date after any write
//! - Readers work on an immutable snapshot and never wait for writers
//! - The API trusts caller-computed totals; nothing is recomputed

pub mod date;
pub mod model;
pub mod refresh;
pub mod store;

pub use date::{Partition, PartitionLayout};
pub use model::{
    AiEvaluation, DailyTotalStats, ExerciseSession, ExerciseSummary, FitnessRecord, FoodItem,
    UserProfile,
};
pub use refresh::RefreshTask;
pub use store::{RecordStore, Upserted};
