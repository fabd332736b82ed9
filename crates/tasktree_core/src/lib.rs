//! Core domain logic for the task tree.
//! This crate is the single source of truth for scheduling invariants.

pub mod engine;
pub mod logging;
pub mod model;
pub mod sync;
pub mod tree;

pub use engine::EngineError;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::date::{DateError, FuzzyDate, TaskDate};
pub use model::tag::Tag;
pub use model::task::{ModelError, Task, TaskStatus, PLACEHOLDER_TITLE};
pub use sync::SuspendedSync;
pub use tree::{TaskEvent, TaskId, TaskTree, TreeError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
