//! Inbound command DTOs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::job::{Generation, JobTarget, UnsupportedGeneration};

/// Errors raised while turning a raw command record into a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Generation(#[from] UnsupportedGeneration),
}

/// What a command record asks the monitor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CommandKind {
    #[default]
    Watch,
    Delete,
    Clear,
}

impl TryFrom<String> for CommandKind {
    type Error = CommandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("watch") {
            Ok(CommandKind::Watch)
        } else if value.eq_ignore_ascii_case("delete") {
            Ok(CommandKind::Delete)
        } else if value.eq_ignore_ascii_case("clear") {
            Ok(CommandKind::Clear)
        } else {
            Err(CommandError::UnknownCommand(value))
        }
    }
}

impl From<CommandKind> for String {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Watch => "watch",
            CommandKind::Delete => "delete",
            CommandKind::Clear => "clear",
        }
        .to_string()
    }
}

/// One inbound message, as it arrives on the wire
///
/// Accepts both the camelCase keys (`appId`, `hadoopVersion`, ...) and the
/// short snake_case keys (`app_id`, `hs_port`, `rm_port`, ...). Every field
/// is optional at this level because delete and clear need almost none of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    #[serde(default, alias = "app_id")]
    pub app_id: String,
    #[serde(default, alias = "hadoop_version")]
    pub hadoop_version: u8,
    #[serde(default, alias = "api_version", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<serde_json::Value>,
    #[serde(default)]
    pub command: CommandKind,
    #[serde(default)]
    pub hostname: String,
    #[serde(default, alias = "hs_port")]
    pub history_server_port: u16,
    #[serde(default, alias = "rm_port")]
    pub resource_manager_port: u16,
    #[serde(default, alias = "job_id")]
    pub job_id: String,
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Watch(JobTarget),
    Delete(String),
    Clear,
}

impl TryFrom<CommandRecord> for Command {
    type Error = CommandError;

    fn try_from(record: CommandRecord) -> Result<Self, Self::Error> {
        match record.command {
            CommandKind::Clear => Ok(Command::Clear),
            CommandKind::Delete => {
                if record.job_id.is_empty() {
                    return Err(CommandError::MissingField("jobId"));
                }
                Ok(Command::Delete(record.job_id))
            }
            CommandKind::Watch => {
                let generation = Generation::try_from(record.hadoop_version)?;
                if record.job_id.is_empty() {
                    return Err(CommandError::MissingField("jobId"));
                }
                if record.hostname.is_empty() {
                    return Err(CommandError::MissingField("hostname"));
                }
                // Only the proxy URL needs the application id.
                if generation == Generation::Current && record.app_id.is_empty() {
                    return Err(CommandError::MissingField("appId"));
                }
                Ok(Command::Watch(JobTarget {
                    job_id: record.job_id,
                    app_id: record.app_id,
                    generation,
                    host: record.hostname,
                    rm_port: record.resource_manager_port,
                    history_port: record.history_server_port,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_watch() {
        let record: CommandRecord = serde_json::from_str(
            r#"{"appId":"1400_0001","hadoopVersion":2,"apiVersion":"v1","command":"watch",
                "hostname":"h","historyServerPort":19888,"resourceManagerPort":8088,"jobId":"1400_0001"}"#,
        )
        .unwrap();

        let command = Command::try_from(record).unwrap();
        assert_eq!(
            command,
            Command::Watch(JobTarget {
                job_id: "1400_0001".to_string(),
                app_id: "1400_0001".to_string(),
                generation: Generation::Current,
                host: "h".to_string(),
                rm_port: 8088,
                history_port: 19888,
            })
        );
    }

    #[test]
    fn test_parse_snake_case_aliases() {
        let record: CommandRecord = serde_json::from_str(
            r#"{"app_id":"a","hadoop_version":1,"hostname":"jt","hs_port":0,"rm_port":50030,"job_id":"7"}"#,
        )
        .unwrap();

        assert_eq!(record.command, CommandKind::Watch);
        assert_eq!(record.resource_manager_port, 50030);

        match Command::try_from(record).unwrap() {
            Command::Watch(target) => assert_eq!(target.generation, Generation::Legacy),
            other => panic!("expected watch, got {:?}", other),
        }
    }

    #[test]
    fn test_command_kind_is_case_insensitive() {
        let record: CommandRecord =
            serde_json::from_str(r#"{"command":"DELETE","jobId":"42"}"#).unwrap();
        assert_eq!(Command::try_from(record).unwrap(), Command::Delete("42".to_string()));

        let record: CommandRecord = serde_json::from_str(r#"{"command":"Clear"}"#).unwrap();
        assert_eq!(Command::try_from(record).unwrap(), Command::Clear);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(serde_json::from_str::<CommandRecord>(r#"{"command":"restart"}"#).is_err());
    }

    #[test]
    fn test_watch_validation() {
        let record = CommandRecord {
            hadoop_version: 3,
            job_id: "1".to_string(),
            hostname: "h".to_string(),
            ..Default::default()
        };
        assert_eq!(
            Command::try_from(record),
            Err(CommandError::Generation(UnsupportedGeneration(3)))
        );

        let record = CommandRecord {
            hadoop_version: 2,
            job_id: "1".to_string(),
            hostname: "h".to_string(),
            ..Default::default()
        };
        assert_eq!(
            Command::try_from(record),
            Err(CommandError::MissingField("appId"))
        );

        let record = CommandRecord {
            command: CommandKind::Delete,
            ..Default::default()
        };
        assert_eq!(
            Command::try_from(record),
            Err(CommandError::MissingField("jobId"))
        );
    }
}
