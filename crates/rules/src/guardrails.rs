//! Guardrail resolver — built-in rules per task type plus project additions.
//!
//! Resolution is additive: project additions for the same task type are
//! appended to each list, nothing built-in is ever removed or reordered,
//! and repeated entries are kept.

use codeward_core::{GuardrailSet, ProjectConfig, ProjectRules, RuleAddendum, TaskType};

struct BuiltinRules {
    mandatory: &'static [&'static str],
    recommended: &'static [&'static str],
    avoid: &'static [&'static str],
}

fn table(task_type: TaskType) -> BuiltinRules {
    match task_type {
        TaskType::Feature => BuiltinRules {
            mandatory: &[
                "Place new code in the layer that owns the behavior; respect the allowed layer dependencies",
                "Model business rules in the domain, not in controllers or adapters",
                "Write tests for every new public behavior",
                "Validate all external input at the boundary",
                "Follow the profile's naming conventions for new types and files",
            ],
            recommended: &[
                "Start from the use case and work outward to adapters",
                "Keep methods small and single-purpose",
                "Prefer immutable value objects for domain concepts",
            ],
            avoid: &[
                "Leaking framework or persistence types into the domain layer",
                "God classes and catch-all service objects",
                "Copy-pasting existing code instead of extracting shared behavior",
                "Adding dependencies without checking for an existing equivalent",
            ],
        },
        TaskType::Bugfix => BuiltinRules {
            mandatory: &[
                "Reproduce the bug with a failing test before changing code",
                "Identify and fix the root cause, not only the symptom",
                "Keep the change minimal and scoped to the defect",
                "Verify the failing test passes and the existing suite stays green",
            ],
            recommended: &[
                "Check for the same defect pattern elsewhere in the codebase",
                "Add logging or assertions that would have exposed the bug earlier",
                "Reference the issue or ticket in the commit message",
            ],
            avoid: &[
                "Refactoring unrelated code in the same change",
                "Swallowing exceptions or errors to hide the failure",
                "Changing public contracts as part of a fix",
                "Fixing without a regression test",
            ],
        },
        TaskType::Refactor => BuiltinRules {
            mandatory: &[
                "Ensure tests cover the code before restructuring it",
                "Preserve externally observable behavior",
                "Refactor in small steps and keep the build green after each one",
            ],
            recommended: &[
                "Extract methods and types to reduce complexity below the thresholds",
                "Move code toward the layer that owns it",
                "Remove dead code uncovered by the refactoring",
            ],
            avoid: &[
                "Mixing behavior changes with structural changes",
                "Big-bang rewrites",
                "Renaming public APIs without a migration path",
            ],
        },
        TaskType::Test => BuiltinRules {
            mandatory: &[
                "Test behavior through public interfaces, not implementation details",
                "Give each test one clear reason to fail",
                "Use descriptive test names that state the expected behavior",
                "Keep tests deterministic and independent of execution order",
            ],
            recommended: &[
                "Follow the arrange, act, assert structure",
                "Use builders or fixtures for test data",
                "Cover edge cases and error paths, not only the happy path",
            ],
            avoid: &[
                "Mocking types you do not own",
                "Sleeping or depending on wall-clock time in tests",
                "Asserting on log output or private state",
                "Sharing mutable state between tests",
            ],
        },
        TaskType::Documentation => BuiltinRules {
            mandatory: &[
                "Keep documentation consistent with the current code",
                "Document public APIs with purpose, parameters, and failure modes",
                "Record significant design decisions as ADRs",
            ],
            recommended: &[
                "Include a runnable example for each public entry point",
                "Link related documents instead of duplicating content",
            ],
            avoid: &[
                "Comments that restate what the code does",
                "Documenting internal details that change frequently",
                "Leaving stale TODOs without an owner",
            ],
        },
        TaskType::Performance => BuiltinRules {
            mandatory: &[
                "Measure before optimizing and record a baseline",
                "Optimize the measured bottleneck only",
                "Verify the improvement with the same measurement after the change",
                "Keep existing tests green",
            ],
            recommended: &[
                "Add a benchmark or load test that guards the improvement",
                "Check database queries for N+1 patterns and missing indexes",
                "Consider caching only with a clear invalidation strategy",
            ],
            avoid: &[
                "Premature optimization without profiling data",
                "Trading readability for negligible gains",
                "Unbounded caches and unbounded queues",
            ],
        },
        TaskType::Security => BuiltinRules {
            mandatory: &[
                "Validate and sanitize all untrusted input",
                "Use parameterized queries for every database access",
                "Enforce authorization on every protected operation",
                "Keep secrets out of source code, logs, and error messages",
            ],
            recommended: &[
                "Apply the principle of least privilege",
                "Add tests for the abuse cases, not only the valid ones",
                "Check dependencies for known vulnerabilities",
            ],
            avoid: &[
                "Rolling your own cryptography",
                "Logging credentials, tokens, or personal data",
                "Trusting client-side validation",
                "Disabling TLS verification",
            ],
        },
        TaskType::Infrastructure => BuiltinRules {
            mandatory: &[
                "Define infrastructure as code and keep it under version control",
                "Pin image and dependency versions",
                "Provide health checks for every deployed service",
                "Supply configuration and secrets through the environment, never baked into images",
            ],
            recommended: &[
                "Use multi-stage builds to keep images small",
                "Run containers as a non-root user",
                "Make pipelines fail fast on lint and test errors",
            ],
            avoid: &[
                "Manual changes to managed environments",
                "Using the latest tag in deployments",
                "Sharing credentials between environments",
            ],
        },
    }
}

fn owned(rules: &[&str]) -> Vec<String> {
    rules.iter().map(|r| r.to_string()).collect()
}

/// The built-in guardrails for a task type, without project additions.
pub fn builtin(task_type: TaskType) -> GuardrailSet {
    let rules = table(task_type);
    GuardrailSet {
        task_type,
        mandatory: owned(rules.mandatory),
        recommended: owned(rules.recommended),
        avoid: owned(rules.avoid),
    }
}

/// Built-in guardrails with the project's additions for the same task type
/// appended to each list.
pub fn resolve(task_type: TaskType, project: Option<&ProjectConfig>) -> GuardrailSet {
    let mut set = builtin(task_type);
    if let Some(additions) = project.and_then(|p| p.guardrails.get(&task_type)) {
        set.mandatory.extend(additions.mandatory.iter().cloned());
        set.recommended.extend(additions.recommended.iter().cloned());
        set.avoid.extend(additions.avoid.iter().cloned());
    }
    set
}

/// The project's always-apply rules plus the addendum for this kind of work.
pub fn project_rules(task_type: TaskType, project: Option<&ProjectConfig>) -> ProjectRules {
    let Some(project) = project else {
        return ProjectRules::default();
    };

    let addendum = match task_type {
        TaskType::Feature => Some(("New files", &project.rules.new_files)),
        TaskType::Test => Some(("Writing tests", &project.rules.tests)),
        TaskType::Refactor => Some(("Refactoring safety", &project.rules.refactoring)),
        _ => None,
    }
    .filter(|(_, rules)| !rules.is_empty())
    .map(|(title, rules)| RuleAddendum {
        title: title.to_string(),
        rules: rules.clone(),
    });

    ProjectRules {
        always: project.rules.always.clone(),
        addendum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeward_core::GuardrailAdditions;

    fn project() -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.guardrails.insert(
            TaskType::Bugfix,
            GuardrailAdditions {
                mandatory: vec!["Link the incident ticket".into()],
                recommended: vec![],
                avoid: vec!["Fixing without a regression test".into()],
            },
        );
        config.rules.always = vec!["Use the shared error envelope".into()];
        config.rules.new_files = vec!["Add the license header".into()];
        config.rules.tests = vec!["Use Testcontainers for repositories".into()];
        config
    }

    #[test]
    fn every_task_type_has_rules() {
        for task_type in TaskType::ALL {
            let set = builtin(task_type);
            assert_eq!(set.task_type, task_type);
            assert!(!set.mandatory.is_empty(), "{task_type}");
            assert!(!set.avoid.is_empty(), "{task_type}");
        }
    }

    #[test]
    fn additions_are_appended_without_dedup() {
        let base = builtin(TaskType::Bugfix);
        let merged = resolve(TaskType::Bugfix, Some(&project()));

        assert_eq!(merged.mandatory[..base.mandatory.len()], base.mandatory[..]);
        assert_eq!(merged.mandatory.last().unwrap(), "Link the incident ticket");
        assert_eq!(merged.recommended, base.recommended);
        assert_eq!(merged.avoid.len(), base.avoid.len() + 1);
        // Same text as a built-in entry, still kept.
        let repeated = merged
            .avoid
            .iter()
            .filter(|r| *r == "Fixing without a regression test")
            .count();
        assert_eq!(repeated, 2);
    }

    #[test]
    fn additions_for_other_task_types_are_ignored() {
        assert_eq!(resolve(TaskType::Feature, Some(&project())), builtin(TaskType::Feature));
        assert_eq!(resolve(TaskType::Bugfix, None), builtin(TaskType::Bugfix));
    }

    #[test]
    fn resolution_is_pure() {
        let config = project();
        let first = resolve(TaskType::Bugfix, Some(&config));
        let second = resolve(TaskType::Bugfix, Some(&config));
        assert_eq!(first, second);
    }

    #[test]
    fn project_rules_pick_the_matching_addendum() {
        let config = project();

        let feature = project_rules(TaskType::Feature, Some(&config));
        assert_eq!(feature.always, ["Use the shared error envelope"]);
        let addendum = feature.addendum.unwrap();
        assert_eq!(addendum.title, "New files");
        assert_eq!(addendum.rules, ["Add the license header"]);

        let test = project_rules(TaskType::Test, Some(&config));
        assert_eq!(test.addendum.unwrap().title, "Writing tests");

        // No refactoring rules configured, so no addendum.
        assert!(project_rules(TaskType::Refactor, Some(&config)).addendum.is_none());
        assert!(project_rules(TaskType::Security, Some(&config)).addendum.is_none());
    }

    #[test]
    fn no_project_means_no_project_rules() {
        assert!(project_rules(TaskType::Feature, None).is_empty());
    }

    #[test]
    fn guardrail_set_serializes_task_type_lowercase() {
        let json = serde_json::to_value(builtin(TaskType::Security)).unwrap();
        assert_eq!(json["task_type"], "security");
    }
}
