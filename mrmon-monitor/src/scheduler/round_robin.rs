//! Round-robin cursor over the watched jobs

use std::collections::VecDeque;

use crate::store::SnapshotStore;

/// Sweeps the store's jobs one at a time, in watch order
///
/// The cursor holds a snapshot of job ids taken at the start of a sweep. When
/// the store's membership epoch moves (insert, delete, clear, eviction) the
/// snapshot is discarded and a fresh sweep starts, so a removed job is never
/// handed out.
#[derive(Debug, Default)]
pub struct RoundRobin {
    pending: VecDeque<String>,
    epoch: u64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next job to refresh, or `None` if the store is empty
    pub fn next_job(&mut self, store: &SnapshotStore) -> Option<String> {
        if self.epoch != store.epoch() {
            self.pending.clear();
            self.epoch = store.epoch();
        }

        if self.pending.is_empty() {
            self.pending.extend(store.job_ids().map(str::to_string));
        }

        self.pending.pop_front()
    }
}
