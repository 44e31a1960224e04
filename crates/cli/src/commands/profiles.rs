//! `codeward profiles` — List profiles, or show one.

use std::path::Path;

use codeward_core::ProfileSummary;

pub async fn run(config: Option<&Path>, show: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;

    if let Some(id) = show {
        let profile = engine.describe_profile(&id).await?;
        println!("{}", serde_json::to_string_pretty(profile.as_ref())?);
        return Ok(());
    }

    let profiles = engine.list_profiles().await?;
    if profiles.is_empty() {
        println!("No profiles found. Run `codeward doctor` to check the data directory.");
        return Ok(());
    }
    print!("{}", render(&profiles, engine.default_profile()));
    Ok(())
}

fn render(profiles: &[ProfileSummary], default_profile: &str) -> String {
    let width = profiles.iter().map(|p| p.id.len()).max().unwrap_or(0);
    let mut out = format!("📚 {} profile(s)\n\n", profiles.len());
    for profile in profiles {
        let marker = if profile.id == default_profile { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<width$}  {:<14} {}\n",
            profile.id,
            profile.architecture.as_str(),
            profile.name
        ));
    }
    out.push_str("\n* default profile\n");
    out
}
