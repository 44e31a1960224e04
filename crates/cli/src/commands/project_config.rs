//! `codeward project-config` — Show a project's `.codeward.json`.

use std::path::Path;

use codeward_core::PROJECT_CONFIG_FILE;
use codeward_store::ProjectConfigLookup;

pub async fn run(config: Option<&Path>, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;

    match engine.load_project_config(dir).await? {
        ProjectConfigLookup::Found { config } => {
            println!("✅ {} in {}", PROJECT_CONFIG_FILE, dir.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ProjectConfigLookup::Absent { usage_example } => {
            println!("No {} in {}", PROJECT_CONFIG_FILE, dir.display());
            println!("\nCreate one like this:\n\n{usage_example}");
        }
    }
    Ok(())
}
