//! Scripted status source for tests

use async_trait::async_trait;
use mrmon_client::{ClientError, StatusSource};
use mrmon_core::domain::job::{Generation, JobTarget};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned bodies by URL and records every request
///
/// Unscripted URLs answer 404.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as JSON at `url`
    pub fn serve(&self, url: impl Into<String>, body: &Value) {
        self.serve_raw(url, body.to_string());
    }

    /// Serves a raw body at `url`
    pub fn serve_raw(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses.lock().unwrap().insert(url.into(), body.into());
    }

    /// Makes `url` answer 404 again
    pub fn remove(&self, url: &str) {
        self.responses.lock().unwrap().remove(url);
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_text(&self, url: &str) -> mrmon_client::Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ClientError::api_error(404, "not found"))
    }
}

/// Current-generation target on host `h` (RM 8088, history 19888)
pub fn current_target(job_id: &str) -> JobTarget {
    JobTarget {
        job_id: job_id.to_string(),
        app_id: job_id.to_string(),
        generation: Generation::Current,
        host: "h".to_string(),
        rm_port: 8088,
        history_port: 19888,
    }
}

/// Legacy target on host `jt` (JobTracker 50030)
pub fn legacy_target(job_id: &str) -> JobTarget {
    JobTarget {
        job_id: job_id.to_string(),
        app_id: String::new(),
        generation: Generation::Legacy,
        host: "jt".to_string(),
        rm_port: 50030,
        history_port: 0,
    }
}
