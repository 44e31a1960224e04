//! Context assembly — renders one bounded, ordered text bundle.
//!
//! Sections, in fixed order:
//!
//! 1. **Task summary** (description, task type, profile, detected stack)
//! 2. **Guardrails** (mandatory, then avoid; each list capped)
//! 3. **Project rules** (only when the project supplies any, with decisions)
//! 4. **Quick reference** (thresholds after project overrides, architecture)
//! 5. **Naming conventions**
//! 6. **Workflow reminder**
//! 7. **Relevant standards** (full variant only; excerpts capped in size and count)
//!
//! # Determinism
//!
//! Identical inputs always produce identical output. Nothing here reads the
//! clock, the environment or the filesystem, and every collection rendered
//! is already ordered.

use codeward_core::{
    DetectedStack, GuardrailSet, Profile, ProjectConfig, ProjectRules, StandardDocument, TaskType,
};
use serde::{Deserialize, Serialize};

// ── Types ─────────────────────────────────────────────────────────────────

/// Which rendering to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Everything except the standards excerpts.
    Compact,
    /// All sections, including excerpts from relevant standards.
    #[default]
    Full,
}

/// Size bounds applied during assembly.
#[derive(Debug, Clone)]
pub struct AssemblyLimits {
    /// Maximum entries rendered per guardrail list.
    pub max_guardrails: usize,
    /// Characters kept from each standards document.
    pub max_excerpt_chars: usize,
    /// Maximum standards documents rendered.
    pub max_documents: usize,
}

impl Default for AssemblyLimits {
    fn default() -> Self {
        Self {
            max_guardrails: 8,
            max_excerpt_chars: 1_500,
            max_documents: 4,
        }
    }
}

/// Everything the assembler needs for one bundle.
pub struct AssemblyInput<'a> {
    /// The task description as given by the caller.
    pub description: &'a str,
    pub task_type: TaskType,
    pub profile: &'a Profile,
    pub guardrails: &'a GuardrailSet,
    pub project_rules: &'a ProjectRules,
    /// Source of threshold overrides and technical decisions.
    pub project: Option<&'a ProjectConfig>,
    pub stack: Option<&'a DetectedStack>,
    /// Candidate documents, already filtered and in relevance order.
    pub documents: &'a [StandardDocument],
}

/// The rendered bundle plus a description of what went into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    pub text: String,
    pub metadata: AssemblyMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    pub task_type: TaskType,
    pub profile_id: String,
    pub variant: Variant,
    /// Section titles in rendering order.
    pub sections: Vec<String>,
    /// Ids of the standards documents included.
    pub documents: Vec<String>,
    /// Guardrail entries cut by the per-list cap.
    pub guardrails_omitted: usize,
    /// Documents whose excerpt was cut at the character budget.
    pub excerpts_truncated: usize,
}

/// Languages that have a standards category of their own.
const LANGUAGE_CATEGORIES: &[&str] = &["java", "typescript", "javascript", "python", "rust", "go", "kotlin"];

/// Standards categories relevant to a task type, plus the detected
/// language's category when it has one.
pub fn relevant_categories(task_type: TaskType, stack: Option<&DetectedStack>) -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = match task_type {
        TaskType::Feature => vec!["architecture", "ddd", "api", "patterns"],
        TaskType::Bugfix => vec!["testing", "error-handling", "logging"],
        TaskType::Refactor => vec!["architecture", "clean-code", "patterns", "testing"],
        TaskType::Test => vec!["testing"],
        TaskType::Documentation => vec!["documentation", "api"],
        TaskType::Performance => vec!["performance", "database", "caching"],
        TaskType::Security => vec!["security"],
        TaskType::Infrastructure => vec!["containerization", "orchestration", "ci-cd", "docker", "kubernetes"],
    };
    if let Some(language) = stack.and_then(|s| {
        let lang = s.language.to_lowercase();
        LANGUAGE_CATEGORIES.iter().find(|l| **l == lang).copied()
    }) {
        if !categories.contains(&language) {
            categories.push(language);
        }
    }
    categories
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    limits: AssemblyLimits,
}

impl ContextAssembler {
    pub fn new(limits: AssemblyLimits) -> Self {
        Self { limits }
    }

    pub fn with_default_limits() -> Self {
        Self::default()
    }

    pub fn limits(&self) -> &AssemblyLimits {
        &self.limits
    }

    /// Render the bundle for `input`.
    pub fn assemble(&self, input: &AssemblyInput<'_>, variant: Variant) -> AssembledContext {
        let mut sections: Vec<(String, String)> = Vec::new();
        let mut guardrails_omitted = 0;

        sections.push(("Task".into(), Self::render_task_summary(input)));

        let (guardrails, omitted) = self.render_guardrails(input.guardrails);
        guardrails_omitted += omitted;
        sections.push(("Guardrails".into(), guardrails));

        if let Some(rules) = Self::render_project_rules(input.project_rules, input.project) {
            sections.push(("Project Rules".into(), rules));
        }

        sections.push(("Quick Reference".into(), Self::render_quick_reference(input)));
        sections.push(("Naming Conventions".into(), Self::render_naming(input.profile)));
        sections.push(("Workflow".into(), Self::render_workflow(input.task_type)));

        let mut documents = Vec::new();
        let mut excerpts_truncated = 0;
        if variant == Variant::Full {
            let (standards, included, truncated) = self.render_standards(input.documents);
            documents = included;
            excerpts_truncated = truncated;
            if let Some(standards) = standards {
                sections.push(("Relevant Standards".into(), standards));
            }
        }

        let text = sections
            .iter()
            .map(|(_, body)| body.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n");

        AssembledContext {
            text: format!("{text}\n"),
            metadata: AssemblyMetadata {
                task_type: input.task_type,
                profile_id: input.profile.id.clone(),
                variant,
                sections: sections.into_iter().map(|(title, _)| title).collect(),
                documents,
                guardrails_omitted,
                excerpts_truncated,
            },
        }
    }

    // ── Private section renderers ─────────────────────────────────────────

    fn render_task_summary(input: &AssemblyInput<'_>) -> String {
        let profile = input.profile;
        let mut out = format!("# Coding Context: {}\n\n", input.task_type.label());
        out.push_str(&format!("- **Task:** {}\n", input.description.trim()));
        out.push_str(&format!("- **Task type:** {}\n", input.task_type));
        out.push_str(&format!(
            "- **Profile:** {} (`{}`), {} architecture\n",
            profile.name, profile.id, profile.architecture.style
        ));
        if let Some(language) = &profile.language {
            out.push_str(&format!("- **Language:** {language}\n"));
        }
        if let Some(stack) = input.stack {
            out.push_str(&format!(
                "- **Detected stack:** {} ({} confidence)\n",
                stack.describe(),
                stack.confidence
            ));
        }
        out
    }

    fn render_guardrails(&self, set: &GuardrailSet) -> (String, usize) {
        let mut out = String::from("## Guardrails\n");
        let mut omitted = 0;
        for (title, rules) in [("Mandatory", &set.mandatory), ("Avoid", &set.avoid)] {
            if rules.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {title}\n"));
            omitted += push_capped(&mut out, rules, self.limits.max_guardrails);
        }
        (out, omitted)
    }

    fn render_project_rules(rules: &ProjectRules, project: Option<&ProjectConfig>) -> Option<String> {
        let decisions = project.map(|p| &p.decisions).filter(|d| !d.is_empty());
        if rules.is_empty() && decisions.is_none() {
            return None;
        }

        let mut out = String::from("## Project Rules\n");
        if !rules.always.is_empty() {
            out.push_str("\n### Always\n");
            push_list(&mut out, &rules.always);
        }
        if let Some(addendum) = rules.addendum.as_ref().filter(|a| !a.rules.is_empty()) {
            out.push_str(&format!("\n### {}\n", addendum.title));
            push_list(&mut out, &addendum.rules);
        }
        if let Some(decisions) = decisions {
            out.push_str("\n### Technical Decisions\n");
            for (category, choice) in decisions {
                out.push_str(&format!("- **{category}:** {choice}\n"));
            }
        }
        Some(out)
    }

    fn render_quick_reference(input: &AssemblyInput<'_>) -> String {
        let base = input.profile.code_quality;
        let overrides = input.project.map(|p| &p.thresholds);
        let effective = overrides.map_or(base, |o| o.apply(base));

        let mut out = String::from("## Quick Reference\n\n");
        let rows = [
            ("Max method lines", base.max_method_lines, effective.max_method_lines),
            ("Max class lines", base.max_class_lines, effective.max_class_lines),
            ("Max file lines", base.max_file_lines, effective.max_file_lines),
            ("Max parameters", base.max_parameters, effective.max_parameters),
            (
                "Max cyclomatic complexity",
                base.max_cyclomatic_complexity,
                effective.max_cyclomatic_complexity,
            ),
        ];
        for (label, before, after) in rows {
            out.push_str(&threshold_line(label, before, after, ""));
        }
        out.push_str(&threshold_line(
            "Min test coverage",
            base.min_test_coverage,
            effective.min_test_coverage,
            "%",
        ));

        let architecture = &input.profile.architecture;
        out.push_str(&format!("\n**Architecture:** {}\n", architecture.style));
        for layer in &architecture.layers {
            let deps = if layer.allowed_dependencies.is_empty() {
                "nothing".to_string()
            } else {
                layer.allowed_dependencies.join(", ")
            };
            out.push_str(&format!("- `{}` may depend on {deps}", layer.name));
            if !layer.description.is_empty() {
                out.push_str(&format!(" ({})", layer.description));
            }
            out.push('\n');
        }

        let patterns = input.profile.ddd.enabled();
        if !patterns.is_empty() {
            out.push_str(&format!("\n**DDD patterns:** {}\n", patterns.join(", ")));
        }
        out
    }

    fn render_naming(profile: &Profile) -> String {
        let mut out = String::from("## Naming Conventions\n");
        let groups = profile.naming.groups();
        if groups.is_empty() {
            out.push_str("\nNo naming conventions are defined for this profile.\n");
            return out;
        }
        for (label, entries) in groups {
            out.push_str(&format!("\n### {label}\n"));
            for (key, rule) in entries {
                out.push_str(&format!("- {key}: {rule}\n"));
            }
        }
        out
    }

    fn render_workflow(task_type: TaskType) -> String {
        let first = match task_type {
            TaskType::Feature => "Identify the use case and the layer that owns it",
            TaskType::Bugfix => "Reproduce the bug with a failing test",
            TaskType::Refactor => "Confirm the code is covered by tests",
            TaskType::Test => "List the behaviors and edge cases to cover",
            TaskType::Documentation => "Read the code being documented",
            TaskType::Performance => "Measure and record a baseline",
            TaskType::Security => "Identify the trust boundaries involved",
            TaskType::Infrastructure => "Review the current deployment configuration",
        };
        format!(
            "## Workflow\n\n\
             1. {first}.\n\
             2. Make the change in small steps within the thresholds above.\n\
             3. Run the test suite and fix every failure.\n\
             4. Review the result against the guardrails before finishing.\n"
        )
    }

    /// Returns the section (if any document was rendered), the included ids
    /// and the number of truncated excerpts.
    fn render_standards(&self, documents: &[StandardDocument]) -> (Option<String>, Vec<String>, usize) {
        let selected: Vec<&StandardDocument> = documents.iter().take(self.limits.max_documents).collect();
        if selected.is_empty() {
            return (None, Vec::new(), 0);
        }

        let mut out = String::from("## Relevant Standards\n");
        let mut truncated = 0;
        for doc in &selected {
            out.push_str(&format!("\n### {} (`{}`)\n\n", doc.name, doc.id));
            let (excerpt, cut) = truncate_chars(doc.content.trim(), self.limits.max_excerpt_chars);
            out.push_str(excerpt);
            if cut {
                truncated += 1;
                out.push_str("\n\n_(excerpt truncated)_");
            }
            out.push('\n');
        }
        let ids = selected.iter().map(|d| d.id.clone()).collect();
        (Some(out), ids, truncated)
    }
}

fn push_list(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

/// Push at most `max` items and a marker for the rest. Returns how many
/// were left out.
fn push_capped(out: &mut String, items: &[String], max: usize) -> usize {
    push_list(out, &items[..items.len().min(max)]);
    let rest = items.len().saturating_sub(max);
    if rest > 0 {
        out.push_str(&format!("- … and {rest} more\n"));
    }
    rest
}

fn threshold_line(label: &str, base: u32, effective: u32, unit: &str) -> String {
    if base == effective {
        format!("- {label}: {effective}{unit}\n")
    } else {
        format!("- {label}: {effective}{unit} (project override, profile: {base}{unit})\n")
    }
}

/// Cut `text` after `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
