//! Task domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a MapReduce job a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Map,
    Reduce,
}

impl TaskKind {
    /// Both kinds, in the order legacy task pages are requested
    pub const ALL: [TaskKind; 2] = [TaskKind::Map, TaskKind::Reduce];

    /// Lowercase name used by the legacy `jobtasks.jsp?type=` parameter
    /// and as the prefix of the `{kind}TaskSummary` job field
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Map => "map",
            TaskKind::Reduce => "reduce",
        }
    }

    /// Classifies a current-generation task by its `type` field
    ///
    /// Only `REDUCE` (any case) is a reduce task; everything else counts as map.
    pub fn from_type_field(value: &str) -> Self {
        if value.eq_ignore_ascii_case("reduce") {
            TaskKind::Reduce
        } else {
            TaskKind::Map
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_type_field() {
        assert_eq!(TaskKind::from_type_field("REDUCE"), TaskKind::Reduce);
        assert_eq!(TaskKind::from_type_field("reduce"), TaskKind::Reduce);
        assert_eq!(TaskKind::from_type_field("MAP"), TaskKind::Map);
        assert_eq!(TaskKind::from_type_field("SETUP"), TaskKind::Map);
    }
}
