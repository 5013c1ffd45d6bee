//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Cluster status-reporting protocol used by a job's cluster
///
/// The two generations expose incompatible REST surfaces, so every fetch
/// decision is made by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Generation {
    /// Hadoop 1.x JobTracker pages (`jobdetails.jsp`, `jobtasks.jsp`)
    Legacy,
    /// Hadoop 2.x resource manager proxy with history server fallback
    Current,
}

/// Raised when a numeric generation is neither 1 nor 2
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported cluster API generation: {0}")]
pub struct UnsupportedGeneration(pub u8);

impl Generation {
    /// Numeric wire value (`hadoopVersion` in commands)
    pub fn as_u8(self) -> u8 {
        match self {
            Generation::Legacy => 1,
            Generation::Current => 2,
        }
    }
}

impl TryFrom<u8> for Generation {
    type Error = UnsupportedGeneration;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Generation::Legacy),
            2 => Ok(Generation::Current),
            other => Err(UnsupportedGeneration(other)),
        }
    }
}

impl From<Generation> for u8 {
    fn from(generation: Generation) -> Self {
        generation.as_u8()
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Legacy => write!(f, "legacy (1)"),
            Generation::Current => write!(f, "current (2)"),
        }
    }
}

/// Identity and connection parameters of one watched job
///
/// Ids are stored without their `job_` / `application_` prefixes; the
/// endpoint builders add those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTarget {
    pub job_id: String,
    pub app_id: String,
    pub generation: Generation,
    pub host: String,
    pub rm_port: u16,
    pub history_port: u16,
}
