//! Guardrails — advisory rule lists handed to a coding agent.

use serde::{Deserialize, Serialize};

use crate::task::TaskType;

/// Merged guardrails for one task type. Built-in rules come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailSet {
    pub task_type: TaskType,
    pub mandatory: Vec<String>,
    pub recommended: Vec<String>,
    pub avoid: Vec<String>,
}

/// Project rule addendum attached to a specific kind of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAddendum {
    pub title: String,
    pub rules: Vec<String>,
}

/// Project-specific rules, surfaced separately from [`GuardrailSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRules {
    pub always: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addendum: Option<RuleAddendum>,
}

impl ProjectRules {
    pub fn is_empty(&self) -> bool {
        self.always.is_empty() && self.addendum.as_ref().is_none_or(|a| a.rules.is_empty())
    }
}
