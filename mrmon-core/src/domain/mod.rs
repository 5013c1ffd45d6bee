//! Core domain types
//!
//! These types describe what is being watched. They are shared between the
//! HTTP client (which builds endpoint URLs from them) and the monitor
//! (which caches state keyed by them).

pub mod job;
pub mod task;
