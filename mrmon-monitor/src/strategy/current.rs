//! Current-generation strategy (resource manager proxy, history server fallback)

use async_trait::async_trait;
use mrmon_client::{StatusSource, endpoints};
use mrmon_core::domain::job::JobTarget;
use mrmon_core::domain::task::TaskKind;
use serde_json::Value;
use tracing::debug;

use super::{FetchStrategy, RefreshError, RefreshReport, string_field};
use crate::store::SnapshotStore;

/// Fetches job and task documents through the RM proxy, falling back to
/// the history server once the RM stops serving the job
///
/// Tasks are re-read on every poll, even when the job document is stable:
/// task progress moves independently of the job summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentApiStrategy;

async fn fetch_with_fallback(
    source: &dyn StatusSource,
    primary: &str,
    fallback: &str,
) -> Option<Value> {
    if let Some(document) = source.fetch_document(primary).await {
        return Some(document);
    }
    debug!("Falling back to {}", fallback);
    source.fetch_document(fallback).await
}

#[async_trait]
impl FetchStrategy for CurrentApiStrategy {
    async fn refresh(
        &self,
        source: &dyn StatusSource,
        store: &mut SnapshotStore,
        target: &JobTarget,
    ) -> Result<RefreshReport, RefreshError> {
        let mut report = RefreshReport::default();

        let Some(document) = fetch_with_fallback(
            source,
            &endpoints::proxy_job_url(target),
            &endpoints::history_job_url(target),
        )
        .await
        else {
            debug!("Job {} unavailable from RM and history server", target.job_id);
            return Ok(report);
        };

        report.job = Some(store.diff_job(&target.job_id, document)?);

        let Some(listing) = fetch_with_fallback(
            source,
            &endpoints::proxy_tasks_url(target),
            &endpoints::history_tasks_url(target),
        )
        .await
        else {
            debug!("Task list for job {} unavailable", target.job_id);
            return Ok(report);
        };

        let tasks = listing
            .get("tasks")
            .and_then(|tasks| tasks.get("task"))
            .and_then(Value::as_array)
            .ok_or_else(|| RefreshError::malformed("tasks.task"))?;

        for task in tasks {
            let task_id = string_field(task, "id")?;
            let kind = TaskKind::from_type_field(string_field(task, "type")?);
            let outcome = store.diff_task(&target.job_id, kind, task_id, task.clone())?;
            report.record_task(kind, outcome);
        }

        Ok(report)
    }
}
