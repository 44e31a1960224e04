//! `codeward doctor` — Diagnose configuration, data directories and profiles.

use std::path::{Path, PathBuf};

use codeward_config::AppConfig;
use codeward_context::ContextEngine;

pub async fn run(config_override: Option<&Path>, init: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Codeward Doctor");
    println!("==================\n");

    let mut issues = 0;

    let config_path = config_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    if init && !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  ✅ Wrote default config to {}", config_path.display());
    }

    if config_path.exists() {
        println!("  ✅ Config file: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file at {} (defaults in use; `codeward doctor --init` writes one)", config_path.display());
    }

    let config = match AppConfig::load_with_env(&config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config and re-run.");
            return Ok(());
        }
    };

    let mut dirs: Vec<(&str, PathBuf)> = config
        .profile_base_dirs()
        .into_iter()
        .map(|dir| ("Profile templates", dir))
        .collect();
    dirs.push(("Custom profiles", config.profile_custom_dir()));
    dirs.push(("Standards", config.standards_root()));
    for (label, dir) in &dirs {
        if dir.is_dir() {
            println!("  ✅ {label}: {}", dir.display());
        } else {
            println!("  ⚠️  {label} missing: {}", dir.display());
            issues += 1;
        }
    }

    issues += check_engine(&ContextEngine::from_config(&config)).await;

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

async fn check_engine(engine: &ContextEngine) -> usize {
    let mut issues = 0;

    match engine.profile_store().load_report().await {
        Ok(report) => {
            println!("  ✅ {} profile(s) loaded", report.loaded.len());
            for rejected in &report.rejected {
                println!("  ❌ Profile '{}' rejected: {}", rejected.id, rejected.reason);
                issues += 1;
            }
            if report.loaded.contains_key(engine.default_profile()) {
                println!("  ✅ Default profile '{}' present", engine.default_profile());
            } else {
                println!("  ❌ Default profile '{}' not found", engine.default_profile());
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Profiles failed to load: {e}");
            issues += 1;
        }
    }

    match engine.categories().await {
        Ok(categories) if categories.is_empty() => {
            println!("  ⚠️  No standards documents found");
            issues += 1;
        }
        Ok(categories) => println!("  ✅ Standards categories: {}", categories.join(", ")),
        Err(e) => {
            println!("  ❌ Standards failed to load: {e}");
            issues += 1;
        }
    }

    issues
}
