//! Scheduler layer for the monitor
//!
//! This layer decides which watched job is refreshed next and serializes
//! command handling, idle-period polling and cycle flushes on a single task.

pub mod poller;
pub mod round_robin;

pub use poller::StatusPoller;
pub use round_robin::RoundRobin;
