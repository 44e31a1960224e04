//! Detected technology stacks.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// The outcome of stack detection for one project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedStack {
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,

    pub confidence: Confidence,

    /// Marker files that were present, in signature order.
    pub markers: Vec<String>,

    pub suggested_profile: String,
}

impl DetectedStack {
    /// One-line description, e.g. `TypeScript / NestJS (npm, Jest)`.
    pub fn describe(&self) -> String {
        let mut out = self.language.clone();
        if let Some(framework) = &self.framework {
            out.push_str(" / ");
            out.push_str(framework);
        }
        let tools: Vec<&str> = [self.build_tool.as_deref(), self.test_framework.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !tools.is_empty() {
            out.push_str(&format!(" ({})", tools.join(", ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_optional_parts() {
        let stack = DetectedStack {
            language: "TypeScript".into(),
            framework: Some("NestJS".into()),
            build_tool: Some("npm".into()),
            test_framework: Some("Jest".into()),
            confidence: Confidence::High,
            markers: vec!["tsconfig.json".into()],
            suggested_profile: "typescript-nestjs".into(),
        };
        assert_eq!(stack.describe(), "TypeScript / NestJS (npm, Jest)");
    }

    #[test]
    fn confidence_orders_low_to_high() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
    }
}
