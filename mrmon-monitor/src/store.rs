//! Job/task snapshot store
//!
//! Bounded cache of the last known status document for every watched job and
//! each of its tasks. Each entry carries a `modified` flag that is raised when
//! a fetched document differs from the cached one and lowered when the cycle
//! emitter flushes it. No I/O happens here.

use indexmap::IndexMap;
use mrmon_core::domain::job::JobTarget;
use mrmon_core::domain::task::TaskKind;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Store error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("job {0} is not being watched")]
    UnknownJob(String),
}

/// Result of comparing a freshly fetched document with the cached one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutcome {
    Unchanged,
    /// The cached document was replaced and the entry flagged as modified
    Updated,
}

impl DiffOutcome {
    pub fn is_updated(self) -> bool {
        self == DiffOutcome::Updated
    }
}

/// Outcome of a watch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    /// Job already cached; the existing entry was left untouched
    Duplicate,
    /// Cache full; the request was dropped
    AtCapacity,
}

/// Last known state of one task
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    document: Value,
    modified: bool,
}

impl TaskSnapshot {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Last known state of one watched job
#[derive(Debug, Clone)]
pub struct JobWatch {
    target: JobTarget,
    last_snapshot: Option<Value>,
    modified: bool,
    map_tasks: BTreeMap<String, TaskSnapshot>,
    reduce_tasks: BTreeMap<String, TaskSnapshot>,
    idle_cycles: u32,
}

impl JobWatch {
    fn new(target: JobTarget) -> Self {
        Self {
            target,
            last_snapshot: None,
            modified: false,
            map_tasks: BTreeMap::new(),
            reduce_tasks: BTreeMap::new(),
            idle_cycles: 0,
        }
    }

    pub fn target(&self) -> &JobTarget {
        &self.target
    }

    pub fn job_id(&self) -> &str {
        &self.target.job_id
    }

    /// Last successfully fetched job document, if any
    pub fn last_snapshot(&self) -> Option<&Value> {
        self.last_snapshot.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Tasks of one kind, ordered by task id
    pub fn tasks(&self, kind: TaskKind) -> &BTreeMap<String, TaskSnapshot> {
        match kind {
            TaskKind::Map => &self.map_tasks,
            TaskKind::Reduce => &self.reduce_tasks,
        }
    }

    fn tasks_mut(&mut self, kind: TaskKind) -> &mut BTreeMap<String, TaskSnapshot> {
        match kind {
            TaskKind::Map => &mut self.map_tasks,
            TaskKind::Reduce => &mut self.reduce_tasks,
        }
    }

    /// Number of consecutive flushed cycles without any change
    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }

    /// Returns the job document if it changed since the last flush, clearing the flag
    pub fn take_modified_document(&mut self) -> Option<Value> {
        if !self.modified {
            return None;
        }
        self.modified = false;
        self.last_snapshot.clone()
    }

    /// Returns every modified task document of one kind, clearing their flags
    pub fn take_modified_tasks(&mut self, kind: TaskKind) -> Vec<Value> {
        self.tasks_mut(kind)
            .values_mut()
            .filter(|task| task.modified)
            .map(|task| {
                task.modified = false;
                task.document.clone()
            })
            .collect()
    }

    /// Records whether the job had any activity in a flushed cycle
    ///
    /// Returns the updated idle streak.
    pub fn record_cycle(&mut self, active: bool) -> u32 {
        if active {
            self.idle_cycles = 0;
        } else {
            self.idle_cycles = self.idle_cycles.saturating_add(1);
        }
        self.idle_cycles
    }
}

/// Bounded, keyed cache of [`JobWatch`] entries
///
/// Jobs iterate in watch order. Every change to the set of cached job ids
/// bumps [`SnapshotStore::epoch`], which lets round-robin cursors detect
/// that they are walking stale identities.
#[derive(Debug)]
pub struct SnapshotStore {
    jobs: IndexMap<String, JobWatch>,
    max_jobs: usize,
    epoch: u64,
}

impl SnapshotStore {
    /// Creates an empty store holding at most `max_jobs` jobs
    pub fn new(max_jobs: usize) -> Self {
        Self {
            jobs: IndexMap::new(),
            max_jobs,
            epoch: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// Membership version, bumped on every insert, delete and clear
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.contains_key(job_id)
    }

    pub fn get(&self, job_id: &str) -> Option<&JobWatch> {
        self.jobs.get(job_id)
    }

    /// Cached job ids in watch order
    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub(crate) fn watches_mut(&mut self) -> impl Iterator<Item = &mut JobWatch> {
        self.jobs.values_mut()
    }

    /// Inserts a watch for `target` if it is new and the cache has room
    ///
    /// An existing entry is never overwritten.
    pub fn upsert_job(&mut self, target: JobTarget) -> Admission {
        if self.jobs.contains_key(&target.job_id) {
            return Admission::Duplicate;
        }
        if self.jobs.len() >= self.max_jobs {
            return Admission::AtCapacity;
        }

        self.jobs.insert(target.job_id.clone(), JobWatch::new(target));
        self.epoch += 1;
        Admission::Inserted
    }

    /// Compares `document` with the job's cached snapshot and replaces it on change
    pub fn diff_job(&mut self, job_id: &str, document: Value) -> Result<DiffOutcome, StoreError> {
        let watch = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::UnknownJob(job_id.to_string()))?;

        if watch.last_snapshot.as_ref() == Some(&document) {
            return Ok(DiffOutcome::Unchanged);
        }

        watch.last_snapshot = Some(document);
        watch.modified = true;
        Ok(DiffOutcome::Updated)
    }

    /// Task-level counterpart of [`SnapshotStore::diff_job`]
    ///
    /// A task seen for the first time counts as updated.
    pub fn diff_task(
        &mut self,
        job_id: &str,
        kind: TaskKind,
        task_id: &str,
        document: Value,
    ) -> Result<DiffOutcome, StoreError> {
        let watch = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StoreError::UnknownJob(job_id.to_string()))?;
        let tasks = watch.tasks_mut(kind);

        match tasks.get_mut(task_id) {
            Some(existing) if existing.document == document => Ok(DiffOutcome::Unchanged),
            Some(existing) => {
                existing.document = document;
                existing.modified = true;
                Ok(DiffOutcome::Updated)
            }
            None => {
                tasks.insert(
                    task_id.to_string(),
                    TaskSnapshot {
                        document,
                        modified: true,
                    },
                );
                Ok(DiffOutcome::Updated)
            }
        }
    }

    /// Removes a job together with all of its tasks
    pub fn delete_job(&mut self, job_id: &str) -> bool {
        let removed = self.jobs.shift_remove(job_id).is_some();
        if removed {
            self.epoch += 1;
        }
        removed
    }

    /// Removes every job
    pub fn clear(&mut self) {
        self.jobs.clear();
        self.epoch += 1;
    }
}
