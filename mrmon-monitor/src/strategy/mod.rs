//! Status fetch strategies
//!
//! One strategy per cluster API generation. Each strategy knows which
//! endpoints to read for a job, in which order to fall back between them,
//! and how to pull task documents out of the payloads. Results are fed into
//! the [`SnapshotStore`], which decides what actually changed.

mod current;
mod legacy;

pub use current::CurrentApiStrategy;
pub use legacy::LegacyApiStrategy;

use async_trait::async_trait;
use mrmon_client::StatusSource;
use mrmon_core::domain::job::{Generation, JobTarget};
use mrmon_core::domain::task::TaskKind;
use serde_json::Value;
use thiserror::Error;

use crate::store::{DiffOutcome, SnapshotStore, StoreError};

/// Errors that abandon the rest of a job's refresh
///
/// Unreachable endpoints are not errors; they simply produce no update.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// A payload parsed but lacked a field the refresh depends on
    #[error("malformed payload: missing or invalid `{0}`")]
    MalformedPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RefreshError {
    fn malformed(field: impl Into<String>) -> Self {
        Self::MalformedPayload(field.into())
    }
}

/// What a single refresh changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// `None` when no job document could be fetched
    pub job: Option<DiffOutcome>,
    pub map_updates: usize,
    pub reduce_updates: usize,
}

impl RefreshReport {
    fn record_task(&mut self, kind: TaskKind, outcome: DiffOutcome) {
        if outcome.is_updated() {
            match kind {
                TaskKind::Map => self.map_updates += 1,
                TaskKind::Reduce => self.reduce_updates += 1,
            }
        }
    }
}

/// Refreshes one job's cached state from its cluster
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn refresh(
        &self,
        source: &dyn StatusSource,
        store: &mut SnapshotStore,
        target: &JobTarget,
    ) -> Result<RefreshReport, RefreshError>;
}

/// Strategy lookup by generation
pub struct Strategies {
    current: CurrentApiStrategy,
    legacy: LegacyApiStrategy,
}

impl Strategies {
    pub fn new(legacy_page_size: usize) -> Self {
        Self {
            current: CurrentApiStrategy,
            legacy: LegacyApiStrategy::new(legacy_page_size),
        }
    }

    pub fn for_generation(&self, generation: Generation) -> &dyn FetchStrategy {
        match generation {
            Generation::Current => &self.current,
            Generation::Legacy => &self.legacy,
        }
    }
}

/// Reads a required string field of a task entry
fn string_field<'a>(value: &'a Value, field: &str) -> Result<&'a str, RefreshError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| RefreshError::malformed(field))
}
