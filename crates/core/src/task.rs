//! Task taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of work categories a task description is classified into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Feature,
    Bugfix,
    Refactor,
    Test,
    Documentation,
    Performance,
    Security,
    Infrastructure,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::Feature,
        TaskType::Bugfix,
        TaskType::Refactor,
        TaskType::Test,
        TaskType::Documentation,
        TaskType::Performance,
        TaskType::Security,
        TaskType::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bugfix => "bugfix",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Documentation => "documentation",
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Infrastructure => "infrastructure",
        }
    }

    /// Human-readable label used in rendered context.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Feature => "New feature",
            Self::Bugfix => "Bug fix",
            Self::Refactor => "Refactoring",
            Self::Test => "Testing",
            Self::Documentation => "Documentation",
            Self::Performance => "Performance",
            Self::Security => "Security",
            Self::Infrastructure => "Infrastructure",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type '{0}' (expected one of: feature, bugfix, refactor, test, documentation, performance, security, infrastructure)")]
pub struct UnknownTaskType(pub String);

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or(UnknownTaskType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Bugfix".parse::<TaskType>().unwrap(), TaskType::Bugfix);
        assert_eq!(" security ".parse::<TaskType>().unwrap(), TaskType::Security);
        assert!("chore".parse::<TaskType>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&TaskType::Infrastructure).unwrap();
        assert_eq!(json, "\"infrastructure\"");
        let parsed: TaskType = serde_json::from_str("\"refactor\"").unwrap();
        assert_eq!(parsed, TaskType::Refactor);
    }
}
