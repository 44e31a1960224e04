//! `codeward guardrails` — Show the guardrails for a task type.

use std::path::{Path, PathBuf};

use codeward_context::GuardrailReport;
use codeward_core::TaskType;

pub async fn run(
    config: Option<&Path>,
    task: Option<TaskType>,
    description: Option<String>,
    project: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;
    let task_type = match (task, description) {
        (Some(task), _) => task,
        (None, Some(description)) => engine.classify(&description).task_type,
        (None, None) => return Err("pass --task <type> or a task description".into()),
    };

    let report = engine.guardrails(task_type, project.as_deref()).await?;
    print!("{}", render(&report));
    Ok(())
}

fn render(report: &GuardrailReport) -> String {
    let set = &report.guardrails;
    let mut out = format!("🛡️  Guardrails: {}\n", set.task_type.label());
    for (title, items) in [
        ("Mandatory", &set.mandatory),
        ("Recommended", &set.recommended),
        ("Avoid", &set.avoid),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{title}:\n"));
        for item in items {
            out.push_str(&format!("  - {item}\n"));
        }
    }

    let rules = &report.project_rules;
    if !rules.always.is_empty() {
        out.push_str("\nProject rules (always):\n");
        for rule in &rules.always {
            out.push_str(&format!("  - {rule}\n"));
        }
    }
    if let Some(addendum) = &rules.addendum {
        out.push_str(&format!("\nProject rules ({}):\n", addendum.title));
        for rule in &addendum.rules {
            out.push_str(&format!("  - {rule}\n"));
        }
    }
    out
}
