//! Data Transfer Objects
//!
//! This module contains the records that cross the monitor's boundary:
//! inbound commands (watch / delete / clear) and outbound emissions on the
//! job, map-task and reduce-task channels.

pub mod command;
pub mod emission;
