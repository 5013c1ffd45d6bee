//! MRMon Core
//!
//! Core types shared by the MapReduce job monitor crates.
//!
//! This crate contains:
//! - Domain types: watched job targets, cluster API generations, task kinds
//! - DTOs: inbound watch commands and outbound change emissions

pub mod domain;
pub mod dto;
