//! `codeward context` — Resolve the coding context for a task.

use std::path::{Path, PathBuf};

use codeward_context::Variant;

pub struct ContextArgs {
    pub description: String,
    pub project: Option<PathBuf>,
    pub profile: Option<String>,
    pub compact: bool,
    pub json: bool,
}

pub async fn run(config: Option<&Path>, args: ContextArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;
    let variant = if args.compact {
        Variant::Compact
    } else {
        Variant::Full
    };

    let resolved = engine
        .resolve(
            &args.description,
            args.project.as_deref(),
            args.profile.as_deref(),
            variant,
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    tracing::info!(
        task_type = %resolved.task_type,
        profile = %resolved.profile_id,
        selection = ?resolved.profile_selection,
        sections = resolved.metadata.sections.len(),
        "Context resolved"
    );
    println!("{}", resolved.text);
    Ok(())
}
