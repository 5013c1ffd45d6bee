//! Status poller
//!
//! Owns the snapshot store and drives everything that touches it: inbound
//! commands, one job refresh per idle period, and the per-cycle flush. All of
//! it runs on one task, so no locking is involved.

use anyhow::{Context, Result};
use mrmon_client::StatusSource;
use mrmon_core::dto::command::Command;
use mrmon_core::dto::emission::Emission;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::emitter::flush_cycle;
use crate::scheduler::RoundRobin;
use crate::store::{Admission, SnapshotStore};
use crate::strategy::Strategies;

/// Watches a bounded set of jobs and reports what changed
pub struct StatusPoller {
    config: Config,
    source: Arc<dyn StatusSource>,
    strategies: Strategies,
    store: SnapshotStore,
    cursor: RoundRobin,
}

impl StatusPoller {
    /// Creates a new poller reading status through `source`
    pub fn new(config: Config, source: Arc<dyn StatusSource>) -> Self {
        let strategies = Strategies::new(config.legacy_page_size);
        let store = SnapshotStore::new(config.max_jobs);
        Self {
            config,
            source,
            strategies,
            store,
            cursor: RoundRobin::new(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Applies one inbound command
    ///
    /// A new watch is fetched right away. A watch for a job that is already
    /// cached echoes the cached document on the job channel instead.
    pub async fn handle_command(&mut self, command: Command) -> Vec<Emission> {
        match command {
            Command::Watch(target) => {
                let job_id = target.job_id.clone();
                match self.store.upsert_job(target) {
                    Admission::Inserted => {
                        info!("Watching job {}", job_id);
                        self.refresh_job(&job_id).await;
                        Vec::new()
                    }
                    Admission::Duplicate => {
                        debug!("Job {} already watched, echoing cached status", job_id);
                        self.store
                            .get(&job_id)
                            .and_then(|watch| watch.last_snapshot())
                            .cloned()
                            .map(Emission::Job)
                            .into_iter()
                            .collect()
                    }
                    Admission::AtCapacity => {
                        warn!(
                            "Dropping watch for job {}: {} jobs already watched",
                            job_id,
                            self.store.max_jobs()
                        );
                        Vec::new()
                    }
                }
            }
            Command::Delete(job_id) => {
                if self.store.delete_job(&job_id) {
                    info!("Stopped watching job {}", job_id);
                } else {
                    debug!("Delete for unknown job {}", job_id);
                }
                Vec::new()
            }
            Command::Clear => {
                info!("Clearing {} watched job(s)", self.store.len());
                self.store.clear();
                Vec::new()
            }
        }
    }

    /// Waits out the idle delay, then refreshes the next job in the sweep
    pub async fn idle_tick(&mut self) -> Option<String> {
        time::sleep(self.config.poll_delay).await;
        self.poll_next().await
    }

    /// Refreshes the next job in the sweep without waiting
    ///
    /// Returns the id of the refreshed job, or `None` if nothing is watched.
    pub async fn poll_next(&mut self) -> Option<String> {
        let job_id = self.cursor.next_job(&self.store)?;
        self.refresh_job(&job_id).await;
        Some(job_id)
    }

    /// Flushes everything modified since the previous cycle
    pub fn end_cycle(&mut self) -> Vec<Emission> {
        flush_cycle(&mut self.store, self.config.evict_after_idle_cycles).emissions
    }

    async fn refresh_job(&mut self, job_id: &str) {
        let Some(target) = self.store.get(job_id).map(|watch| watch.target().clone()) else {
            debug!("Job {} no longer watched", job_id);
            return;
        };

        let strategy = self.strategies.for_generation(target.generation);
        match strategy
            .refresh(self.source.as_ref(), &mut self.store, &target)
            .await
        {
            Ok(report) => debug!(
                "Refreshed job {}: job={:?}, map updates={}, reduce updates={}",
                job_id, report.job, report.map_updates, report.reduce_updates
            ),
            Err(e) => info!("Refresh of job {} abandoned: {}", job_id, e),
        }
    }

    /// Runs until the emission receiver goes away
    ///
    /// Cycle flushes take priority over commands, and commands over polling.
    /// A job is refreshed once `poll_delay` has passed since the previous
    /// refresh or command; cycle flushes do not delay it. A closed command
    /// channel leaves polling and flushing running.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        emissions: mpsc::Sender<Emission>,
    ) -> Result<()> {
        info!(
            "Starting status poller (poll delay: {:?}, cycle: {:?}, max jobs: {})",
            self.config.poll_delay, self.config.cycle_interval, self.config.max_jobs
        );

        let mut cycle = time::interval(self.config.cycle_interval);
        cycle.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        // Cycle ticks leave the idle timer running; only a poll or a command restarts it.
        let idle = time::sleep(self.config.poll_delay);
        tokio::pin!(idle);

        loop {
            let pending = tokio::select! {
                biased;

                _ = cycle.tick() => self.end_cycle(),
                command = commands.recv(), if commands_open => {
                    let pending = match command {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!("Command channel closed, continuing to poll watched jobs");
                            commands_open = false;
                            Vec::new()
                        }
                    };
                    idle.as_mut().reset(Instant::now() + self.config.poll_delay);
                    pending
                },
                _ = &mut idle => {
                    self.poll_next().await;
                    idle.as_mut().reset(Instant::now() + self.config.poll_delay);
                    Vec::new()
                }
            };

            for emission in pending {
                emissions
                    .send(emission)
                    .await
                    .context("Emission receiver dropped")?;
            }
        }
    }
}
