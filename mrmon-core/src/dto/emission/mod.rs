//! Outbound emission DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::task::TaskKind;

/// Batch of changed task documents for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDelta {
    /// Job id the tasks belong to
    pub id: String,
    pub tasks: Vec<Value>,
}

/// One message on one of the three output channels
///
/// Serialized as `{"channel": "...", "payload": ...}` so a single stream can
/// carry all three channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "snake_case")]
pub enum Emission {
    /// Current job-level document
    Job(Value),
    MapTasks(TaskDelta),
    ReduceTasks(TaskDelta),
}

impl Emission {
    /// Wraps a task batch in the channel matching its kind
    pub fn tasks(kind: TaskKind, delta: TaskDelta) -> Self {
        match kind {
            TaskKind::Map => Emission::MapTasks(delta),
            TaskKind::Reduce => Emission::ReduceTasks(delta),
        }
    }

    /// Name of the channel this emission belongs to
    pub fn channel(&self) -> &'static str {
        match self {
            Emission::Job(_) => "job",
            Emission::MapTasks(_) => "map_tasks",
            Emission::ReduceTasks(_) => "reduce_tasks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emission_envelope() {
        let emission = Emission::tasks(
            TaskKind::Reduce,
            TaskDelta {
                id: "42".to_string(),
                tasks: vec![json!({"id": "t1"})],
            },
        );

        assert_eq!(emission.channel(), "reduce_tasks");
        assert_eq!(
            serde_json::to_value(&emission).unwrap(),
            json!({"channel": "reduce_tasks", "payload": {"id": "42", "tasks": [{"id": "t1"}]}})
        );

        let job = Emission::Job(json!({"state": "RUNNING"}));
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({"channel": "job", "payload": {"state": "RUNNING"}})
        );
    }
}
