//! Domain model for the task tree.
//!
//! # Responsibility
//! - Define the value types carried by tree nodes: dates, task payloads,
//!   tag registry entries.
//!
//! # Invariants
//! - Model types hold no references to other tasks; relationships live in
//!   the tree component.

pub mod date;
pub mod tag;
pub mod task;
