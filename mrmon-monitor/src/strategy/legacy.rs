//! Legacy-generation strategy (JobTracker JSP pages)

use async_trait::async_trait;
use mrmon_client::{StatusSource, endpoints};
use mrmon_core::domain::job::JobTarget;
use mrmon_core::domain::task::TaskKind;
use serde_json::Value;
use tracing::debug;

use super::{FetchStrategy, RefreshError, RefreshReport, string_field};
use crate::store::{DiffOutcome, SnapshotStore, StoreError};

/// Task id field of a `tasksInfo` entry
const LEGACY_TASK_ID: &str = "taskId";

/// Fetches the legacy job detail page and, when it changed, the paged task
/// listings for map and reduce tasks
///
/// There is no fallback source for legacy jobs. An unchanged job document is
/// taken to mean unchanged tasks, which spares the expensive paged listing.
#[derive(Debug, Clone)]
pub struct LegacyApiStrategy {
    page_size: usize,
}

impl LegacyApiStrategy {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Number of listing pages for `total_tasks` tasks
    ///
    /// Always one more than the full pages, so an exact multiple still asks
    /// for a trailing (possibly empty) page.
    pub fn page_count(&self, total_tasks: usize) -> usize {
        total_tasks / self.page_size + 1
    }

    /// Walks the task pages of one kind in order
    ///
    /// Stops quietly at the first page that cannot be fetched; pages already
    /// processed keep their updates.
    async fn refresh_tasks(
        &self,
        source: &dyn StatusSource,
        store: &mut SnapshotStore,
        target: &JobTarget,
        kind: TaskKind,
        report: &mut RefreshReport,
    ) -> Result<(), RefreshError> {
        let total_tasks = {
            let document = store
                .get(&target.job_id)
                .and_then(|watch| watch.last_snapshot())
                .ok_or_else(|| StoreError::UnknownJob(target.job_id.clone()))?;
            total_tasks(document, kind)?
        };

        for page in 1..=self.page_count(total_tasks) {
            let url = endpoints::legacy_tasks_url(target, kind, page);
            let Some(listing) = source.fetch_document(&url).await else {
                debug!(
                    "Stopping {} task refresh for job {} at page {}",
                    kind, target.job_id, page
                );
                return Ok(());
            };

            let entries = listing
                .get("tasksInfo")
                .and_then(Value::as_array)
                .ok_or_else(|| RefreshError::malformed("tasksInfo"))?;

            for entry in entries {
                let task_id = string_field(entry, LEGACY_TASK_ID)?;
                let outcome = store.diff_task(&target.job_id, kind, task_id, entry.clone())?;
                report.record_task(kind, outcome);
            }
        }

        Ok(())
    }
}

/// Reads `{kind}TaskSummary.taskStats.numTotalTasks` from a job document
fn total_tasks(document: &Value, kind: TaskKind) -> Result<usize, RefreshError> {
    let field = format!("{}TaskSummary", kind);
    document
        .get(&field)
        .and_then(|summary| summary.get("taskStats"))
        .and_then(|stats| stats.get("numTotalTasks"))
        .and_then(Value::as_u64)
        .map(|total| total as usize)
        .ok_or_else(|| RefreshError::malformed(format!("{}.taskStats.numTotalTasks", field)))
}

#[async_trait]
impl FetchStrategy for LegacyApiStrategy {
    async fn refresh(
        &self,
        source: &dyn StatusSource,
        store: &mut SnapshotStore,
        target: &JobTarget,
    ) -> Result<RefreshReport, RefreshError> {
        let mut report = RefreshReport::default();

        let Some(document) = source
            .fetch_document(&endpoints::legacy_job_url(target))
            .await
        else {
            debug!("Legacy job {} unavailable", target.job_id);
            return Ok(report);
        };

        let outcome = store.diff_job(&target.job_id, document)?;
        report.job = Some(outcome);

        if outcome == DiffOutcome::Unchanged {
            return Ok(report);
        }

        for kind in TaskKind::ALL {
            self.refresh_tasks(source, store, target, kind, &mut report)
                .await?;
        }

        Ok(report)
    }
}
