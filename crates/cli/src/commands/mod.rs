pub mod classify;
pub mod context;
pub mod detect;
pub mod doctor;
pub mod guardrails;
pub mod profiles;
pub mod project_config;
pub mod search;
pub mod serve;

use std::path::Path;

use codeward_config::AppConfig;
use codeward_context::ContextEngine;

/// Load the config from `--config` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

pub fn engine(path: Option<&Path>) -> Result<ContextEngine, Box<dyn std::error::Error>> {
    Ok(ContextEngine::from_config(&load_config(path)?))
}
