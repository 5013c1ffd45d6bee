//! Monitor configuration
//!
//! Defines the pacing, capacity and transport knobs of the job monitor.

use std::time::Duration;

/// Delay before each idle-period refresh
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(100);

/// Maximum number of jobs watched at once
pub const DEFAULT_MAX_JOBS: usize = 100;

/// Tasks per page of the legacy `jobtasks.jsp` listing
pub const DEFAULT_LEGACY_PAGE_SIZE: usize = 100;

/// Length of one emission cycle
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(500);

/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long each idle period waits before refreshing the next job
    pub poll_delay: Duration,

    /// Watch requests beyond this many cached jobs are dropped
    pub max_jobs: usize,

    /// Page size used to compute the number of legacy task pages
    pub legacy_page_size: usize,

    /// How often modified jobs and tasks are flushed downstream
    pub cycle_interval: Duration,

    /// Timeout applied to every status request
    pub request_timeout: Duration,

    /// Evict a job after this many consecutive cycles without any change
    ///
    /// `None` keeps jobs until an explicit delete or clear.
    pub evict_after_idle_cycles: Option<u32>,
}

impl Config {
    /// Sets the idle poll delay
    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    /// Sets the job capacity
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    /// Sets the legacy task page size
    pub fn with_legacy_page_size(mut self, legacy_page_size: usize) -> Self {
        self.legacy_page_size = legacy_page_size;
        self
    }

    /// Enables idle eviction after `cycles` quiet cycles
    pub fn with_idle_eviction(mut self, cycles: u32) -> Self {
        self.evict_after_idle_cycles = Some(cycles);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_delay.is_zero() {
            anyhow::bail!("poll_delay must be greater than 0");
        }

        if self.max_jobs == 0 {
            anyhow::bail!("max_jobs must be greater than 0");
        }

        if self.legacy_page_size == 0 {
            anyhow::bail!("legacy_page_size must be greater than 0");
        }

        if self.cycle_interval.is_zero() {
            anyhow::bail!("cycle_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.evict_after_idle_cycles == Some(0) {
            anyhow::bail!("evict_after_idle_cycles must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_delay: DEFAULT_POLL_DELAY,
            max_jobs: DEFAULT_MAX_JOBS,
            legacy_page_size: DEFAULT_LEGACY_PAGE_SIZE,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            evict_after_idle_cycles: None,
        }
    }
}
