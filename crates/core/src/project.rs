//! Project-supplied overrides, read from `.codeward.json` at a project root.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::profile::QualityThresholds;
use crate::task::TaskType;

/// File name of the project override document.
pub const PROJECT_CONFIG_FILE: &str = ".codeward.json";

/// Rule additions for one task type. Appended after the built-in rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardrailAdditions {
    pub mandatory: Vec<String>,
    pub recommended: Vec<String>,
    pub avoid: Vec<String>,
}

/// Numeric overrides for profile thresholds. Unset fields keep the
/// profile's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_method_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_class_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parameters: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cyclomatic_complexity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_test_coverage: Option<u32>,
}

impl ThresholdOverrides {
    pub fn apply(&self, base: QualityThresholds) -> QualityThresholds {
        QualityThresholds {
            max_method_lines: self.max_method_lines.unwrap_or(base.max_method_lines),
            max_class_lines: self.max_class_lines.unwrap_or(base.max_class_lines),
            max_file_lines: self.max_file_lines.unwrap_or(base.max_file_lines),
            max_parameters: self.max_parameters.unwrap_or(base.max_parameters),
            max_cyclomatic_complexity: self
                .max_cyclomatic_complexity
                .unwrap_or(base.max_cyclomatic_complexity),
            min_test_coverage: self.min_test_coverage.unwrap_or(base.min_test_coverage),
        }
    }
}

/// Project rule channel: always-on rules plus per-activity addenda.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectRuleConfig {
    pub always: Vec<String>,
    pub new_files: Vec<String>,
    pub tests: Vec<String>,
    pub refactoring: Vec<String>,
}

/// The project override document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Profile id to use instead of the detected or default one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    pub guardrails: BTreeMap<TaskType, GuardrailAdditions>,

    pub thresholds: ThresholdOverrides,

    /// Pre-made technical decisions, category → choice.
    pub decisions: BTreeMap<String, String>,

    pub rules: ProjectRuleConfig,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Defaults are all valid, so any failure comes from an override.
        self.thresholds
            .apply(QualityThresholds::default())
            .validate()
            .map_err(|e| format!("thresholds.{e}"))?;
        if self.profile.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err("profile must not be empty".into());
        }
        Ok(())
    }

    /// Example document shown when a project has no override file.
    pub fn usage_example() -> String {
        let mut example = ProjectConfig {
            profile: Some("java-spring".into()),
            ..Default::default()
        };
        example.guardrails.insert(
            TaskType::Feature,
            GuardrailAdditions {
                mandatory: vec!["Publish a domain event for every state change".into()],
                recommended: vec![],
                avoid: vec!["Calling other services synchronously from controllers".into()],
            },
        );
        example.thresholds.min_test_coverage = Some(90);
        example
            .decisions
            .insert("persistence".into(), "PostgreSQL via Spring Data JPA".into());
        example.rules.always = vec!["All public APIs are versioned under /api/v1".into()];
        example.rules.tests = vec!["Use Testcontainers for repository tests".into()];
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_document() {
        let json = r#"{
            "profile": "python-fastapi",
            "guardrails": { "bugfix": { "mandatory": ["Link the incident ticket"] } },
            "thresholds": { "max_method_lines": 30 }
        }"#;
        let config: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.profile.as_deref(), Some("python-fastapi"));
        assert_eq!(
            config.guardrails[&TaskType::Bugfix].mandatory,
            ["Link the incident ticket"]
        );
        assert!(config.rules.always.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_task_type_key_is_rejected() {
        let json = r#"{ "guardrails": { "chore": {} } }"#;
        assert!(serde_json::from_str::<ProjectConfig>(json).is_err());
    }

    #[test]
    fn threshold_overrides_apply_selectively() {
        let overrides = ThresholdOverrides {
            max_method_lines: Some(30),
            ..Default::default()
        };
        let applied = overrides.apply(QualityThresholds::default());
        assert_eq!(applied.max_method_lines, 30);
        assert_eq!(applied.max_class_lines, QualityThresholds::default().max_class_lines);
    }

    #[test]
    fn zero_and_out_of_range_overrides_are_rejected() {
        for json in [
            r#"{ "thresholds": { "max_method_lines": 0 } }"#,
            r#"{ "thresholds": { "max_parameters": 0 } }"#,
            r#"{ "thresholds": { "max_cyclomatic_complexity": 0 } }"#,
        ] {
            let config: ProjectConfig = serde_json::from_str(json).unwrap();
            let err = config.validate().unwrap_err();
            assert!(err.starts_with("thresholds.max_"), "{json}: {err}");
            assert!(err.ends_with("must be greater than 0"), "{json}: {err}");
        }

        let config: ProjectConfig =
            serde_json::from_str(r#"{ "thresholds": { "min_test_coverage": 101 } }"#).unwrap();
        assert_eq!(config.validate().unwrap_err(), "thresholds.min_test_coverage must be <= 100");

        let config: ProjectConfig =
            serde_json::from_str(r#"{ "thresholds": { "min_test_coverage": 0 } }"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn usage_example_parses_back() {
        let example = ProjectConfig::usage_example();
        let parsed: ProjectConfig = serde_json::from_str(&example).unwrap();
        assert_eq!(parsed.profile.as_deref(), Some("java-spring"));
        assert!(parsed.validate().is_ok());
    }
}
