//! MRMon Monitor
//!
//! Watches a bounded set of MapReduce jobs and reports only what changed.
//!
//! Architecture:
//! - Store: last known job and task documents, with per-entry modified flags
//! - Strategy: per-generation endpoint ordering, fallback and pagination
//! - Scheduler: round-robin job selection and the single-task run loop
//! - Emitter: per-cycle flush of modified entries onto three channels

pub mod config;
pub mod emitter;
pub mod scheduler;
pub mod store;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use scheduler::StatusPoller;
