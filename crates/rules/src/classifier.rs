//! Task classifier — ordered keyword matching over a task description.
//!
//! Categories are checked in a fixed order and the first one with a
//! matching keyword wins, so "fix the flaky test" is a bugfix, not a test
//! task. Keywords match whole words: `perf` does not match `perform`.
//! A keyword ending in `*` is a stem and matches any word it starts:
//! `fix*` matches `fixing`, but never `prefix`.

use codeward_core::TaskType;
use serde::Serialize;
use tracing::debug;

/// Keyword table in evaluation order. Feature is the fallback.
const KEYWORDS: &[(TaskType, &[&str])] = &[
    (
        TaskType::Bugfix,
        &[
            "fix*", "bug*", "broken", "crash*", "defect*", "error*", "exception*", "failing",
            "fails", "hotfix*", "issue", "issues", "null pointer", "npe", "regression*", "wrong",
        ],
    ),
    (
        TaskType::Refactor,
        &[
            "refactor*", "restructur*", "reorganiz*", "clean up", "cleanup", "simplif*",
            "extract*", "rename*", "decouple*", "split*", "deduplicat*", "tech debt",
        ],
    ),
    (
        TaskType::Test,
        &[
            "test", "tests", "tested", "testing", "testable", "coverage", "unit test",
            "integration test", "e2e", "mock", "mocks", "mocking", "tdd", "assert",
            "assertion", "assertions",
        ],
    ),
    (
        TaskType::Documentation,
        &[
            "document", "documentation", "documented", "docs", "readme", "javadoc", "rustdoc",
            "docstring*", "code comment*", "changelog", "adr",
        ],
    ),
    (
        TaskType::Performance,
        &[
            "performance", "perf", "optimiz*", "optimis*", "slow*", "latency", "throughput",
            "speed up", "faster", "memory leak*", "profiling", "profiler", "benchmark*",
        ],
    ),
    (
        TaskType::Security,
        &[
            "security", "secure", "vulnerab*", "cve", "xss", "csrf", "injection",
            "authenticat*", "authoriz*", "encrypt*", "secret", "secrets", "owasp", "sanitiz*",
            "permission*",
        ],
    ),
    (
        TaskType::Infrastructure,
        &[
            "docker*", "kubernetes", "k8s", "helm", "terraform", "deploy*", "pipeline*",
            "ci/cd", "github actions", "infrastructure", "container*", "provision*",
        ],
    ),
];

/// A classification result together with the keyword that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<&'static str>,
}

/// Classify a task description. Total: every input yields one task type.
pub fn classify(description: &str) -> TaskType {
    explain(description).task_type
}

/// Classify and report the deciding keyword.
pub fn explain(description: &str) -> Classification {
    let text = description.to_lowercase();
    for (task_type, keywords) in KEYWORDS {
        if let Some(&keyword) = keywords.iter().find(|k| matches_keyword(&text, k)) {
            let keyword = keyword.trim_end_matches('*');
            debug!(task_type = %task_type, keyword, "Task classified");
            return Classification {
                task_type: *task_type,
                keyword: Some(keyword),
            };
        }
    }
    debug!("No keyword matched, defaulting to feature");
    Classification {
        task_type: TaskType::Feature,
        keyword: None,
    }
}

/// The keyword occurs with a word boundary before it and, unless it is a
/// `*` stem, after it.
fn matches_keyword(text: &str, keyword: &str) -> bool {
    let (word, stem) = match keyword.strip_suffix('*') {
        Some(word) => (word, true),
        None => (keyword, false),
    };
    let boundary = |c: Option<char>| c.is_none_or(|c| !c.is_alphanumeric());
    text.match_indices(word).any(|(at, _)| {
        boundary(text[..at].chars().next_back())
            && (stem || boundary(text[at + word.len()..].chars().next()))
    })
}
