//! Codeward CLI — the main entry point.
//!
//! Commands:
//! - `context`        — Resolve the coding context for a task
//! - `classify`       — Classify a task description
//! - `detect`         — Detect a project's technology stack
//! - `guardrails`     — Show guardrails for a task type
//! - `profiles`       — List or show profiles
//! - `search`         — Search the standards corpus
//! - `project-config` — Show a project's `.codeward.json`
//! - `serve`          — Start the HTTP gateway
//! - `doctor`         — Diagnose configuration and data

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codeward_core::TaskType;

mod commands;

#[derive(Parser)]
#[command(
    name = "codeward",
    about = "Codeward — coding-standards context for AI coding agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.codeward/config.toml
    #[arg(long, global = true, env = "CODEWARD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the coding context for a task description
    Context {
        /// What you are about to do, e.g. "fix the null pointer bug"
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,

        /// Project directory to detect the stack and read .codeward.json from
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Use this profile regardless of project or detection
        #[arg(long)]
        profile: Option<String>,

        /// Leave out standards excerpts
        #[arg(long)]
        compact: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a task description into a task type
    Classify {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Detect the technology stack of a project
    Detect {
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Show the guardrails for a task type
    Guardrails {
        /// Task type (feature, bugfix, refactor, test, documentation,
        /// performance, security, infrastructure)
        #[arg(short, long)]
        task: Option<TaskType>,

        /// Classify this description when no task type is given
        description: Vec<String>,

        /// Merge additions from this project's .codeward.json
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// List profiles, or show one
    Profiles {
        /// Profile id to show in full
        #[arg(long)]
        show: Option<String>,
    },

    /// Search the standards corpus
    Search {
        query: Vec<String>,

        /// List categories instead of searching
        #[arg(long, conflicts_with = "query")]
        categories: bool,
    },

    /// Show a project's .codeward.json
    ProjectConfig {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Diagnose configuration, data directories and profiles
    Doctor {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Context {
            description,
            project,
            profile,
            compact,
            json,
        } => {
            let args = commands::context::ContextArgs {
                description: description.join(" "),
                project,
                profile,
                compact,
                json,
            };
            commands::context::run(config_path, args).await?
        }
        Commands::Classify { description } => {
            commands::classify::run(config_path, &description.join(" ")).await?
        }
        Commands::Detect { dir, json } => commands::detect::run(config_path, &dir, json).await?,
        Commands::Guardrails {
            task,
            description,
            project,
        } => {
            let description = (!description.is_empty()).then(|| description.join(" "));
            commands::guardrails::run(config_path, task, description, project).await?
        }
        Commands::Profiles { show } => commands::profiles::run(config_path, show).await?,
        Commands::Search { query, categories } => {
            commands::search::run(config_path, &query.join(" "), categories).await?
        }
        Commands::ProjectConfig { dir } => commands::project_config::run(config_path, &dir).await?,
        Commands::Serve { port, host } => commands::serve::run(config_path, port, host).await?,
        Commands::Doctor { init } => commands::doctor::run(config_path, init).await?,
    }

    Ok(())
}
