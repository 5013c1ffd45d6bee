//! Cycle emitter
//!
//! At every cycle boundary, walks the store and turns everything flagged as
//! modified into emissions, lowering the flags as it goes. Jobs are visited
//! in watch order; per job the job document comes first, then the map batch,
//! then the reduce batch.

use mrmon_core::domain::task::TaskKind;
use mrmon_core::dto::emission::{Emission, TaskDelta};
use tracing::{debug, info};

use crate::store::SnapshotStore;

/// Everything produced by one flush
#[derive(Debug, Default)]
pub struct CycleFlush {
    pub emissions: Vec<Emission>,
    /// Jobs with no change at all this cycle
    pub idle_jobs: Vec<String>,
    /// Jobs removed by the idle eviction policy
    pub evicted: Vec<String>,
}

/// Flushes modified jobs and tasks from `store`
///
/// When `evict_after_idle_cycles` is set, jobs whose idle streak reaches it
/// are removed from the store after the walk.
pub fn flush_cycle(store: &mut SnapshotStore, evict_after_idle_cycles: Option<u32>) -> CycleFlush {
    let mut flush = CycleFlush::default();

    for watch in store.watches_mut() {
        let mut active = false;

        if let Some(document) = watch.take_modified_document() {
            flush.emissions.push(Emission::Job(document));
            active = true;
        }

        for kind in TaskKind::ALL {
            let tasks = watch.take_modified_tasks(kind);
            if tasks.is_empty() {
                continue;
            }
            active = true;
            flush.emissions.push(Emission::tasks(
                kind,
                TaskDelta {
                    id: watch.job_id().to_string(),
                    tasks,
                },
            ));
        }

        let idle_streak = watch.record_cycle(active);
        if active {
            continue;
        }

        flush.idle_jobs.push(watch.job_id().to_string());
        if evict_after_idle_cycles.is_some_and(|limit| idle_streak >= limit) {
            flush.evicted.push(watch.job_id().to_string());
        }
    }

    for job_id in &flush.evicted {
        info!("Evicting idle job {}", job_id);
        store.delete_job(job_id);
    }

    if !flush.emissions.is_empty() {
        debug!("Cycle flushed {} emission(s)", flush.emissions.len());
    }

    flush
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::current_target;
    use serde_json::json;

    #[test]
    fn test_flush_emits_only_modified_entries() {
        let mut store = SnapshotStore::new(10);
        store.upsert_job(current_target("1"));
        store.upsert_job(current_target("2"));

        store.diff_job("1", json!({"state": "RUNNING"})).unwrap();
        store.diff_task("1", TaskKind::Map, "m2", json!({"id": "m2"})).unwrap();
        store.diff_task("1", TaskKind::Map, "m1", json!({"id": "m1"})).unwrap();
        store.diff_task("2", TaskKind::Reduce, "r1", json!({"id": "r1"})).unwrap();

        let flush = flush_cycle(&mut store, None);

        assert_eq!(
            flush.emissions,
            vec![
                Emission::Job(json!({"state": "RUNNING"})),
                Emission::MapTasks(TaskDelta {
                    id: "1".to_string(),
                    tasks: vec![json!({"id": "m1"}), json!({"id": "m2"})],
                }),
                Emission::ReduceTasks(TaskDelta {
                    id: "2".to_string(),
                    tasks: vec![json!({"id": "r1"})],
                }),
            ]
        );
        assert!(flush.idle_jobs.is_empty());

        let second = flush_cycle(&mut store, None);
        assert!(second.emissions.is_empty());
        assert_eq!(second.idle_jobs, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_only_changed_tasks_are_batched() {
        let mut store = SnapshotStore::new(10);
        store.upsert_job(current_target("1"));
        store.diff_task("1", TaskKind::Map, "m1", json!({"id": "m1", "p": 1})).unwrap();
        store.diff_task("1", TaskKind::Map, "m2", json!({"id": "m2", "p": 1})).unwrap();
        flush_cycle(&mut store, None);

        store.diff_task("1", TaskKind::Map, "m1", json!({"id": "m1", "p": 1})).unwrap();
        store.diff_task("1", TaskKind::Map, "m2", json!({"id": "m2", "p": 2})).unwrap();

        let flush = flush_cycle(&mut store, None);
        assert_eq!(
            flush.emissions,
            vec![Emission::MapTasks(TaskDelta {
                id: "1".to_string(),
                tasks: vec![json!({"id": "m2", "p": 2})],
            })]
        );
    }

    #[test]
    fn test_idle_eviction_is_opt_in() {
        let mut store = SnapshotStore::new(10);
        store.upsert_job(current_target("quiet"));
        store.upsert_job(current_target("busy"));

        for round in 0..3 {
            store
                .diff_job("busy", json!({"round": round}))
                .unwrap();
            let flush = flush_cycle(&mut store, Some(2));
            if round == 1 {
                assert_eq!(flush.evicted, vec!["quiet".to_string()]);
            } else {
                assert!(flush.evicted.is_empty());
            }
        }

        assert!(!store.contains("quiet"));
        assert!(store.contains("busy"));
    }

    #[test]
    fn test_activity_resets_idle_streak() {
        let mut store = SnapshotStore::new(10);
        store.upsert_job(current_target("1"));

        flush_cycle(&mut store, Some(2));
        store.diff_job("1", json!({"state": "RUNNING"})).unwrap();
        flush_cycle(&mut store, Some(2));
        let flush = flush_cycle(&mut store, Some(2));

        assert!(flush.evicted.is_empty());
        assert_eq!(store.get("1").unwrap().idle_cycles(), 1);
    }
}
