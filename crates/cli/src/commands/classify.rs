//! `codeward classify` — Classify a task description.

use std::path::Path;

pub async fn run(config: Option<&Path>, description: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;
    let classification = engine.classify(description);

    match classification.keyword {
        Some(keyword) => println!(
            "{} ({}), matched \"{keyword}\"",
            classification.task_type,
            classification.task_type.label()
        ),
        None => println!(
            "{} ({}), no keyword matched",
            classification.task_type,
            classification.task_type.label()
        ),
    }
    Ok(())
}
