//! # Codeward Core
//!
//! Domain types and error definitions for the Codeward context engine.
//! This crate defines the data model (profiles, standard documents, task
//! types, guardrails, detected stacks, project overrides) that every other
//! crate builds against, plus the small shared plumbing they all need:
//! an injectable clock and retrying filesystem reads.

pub mod clock;
pub mod document;
pub mod error;
pub mod guardrail;
pub mod io;
pub mod profile;
pub mod project;
pub mod stack;
pub mod task;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{SearchHit, StandardDocument};
pub use error::{Error, IoError, NotFoundError, Result, ValidationError};
pub use guardrail::{GuardrailSet, ProjectRules, RuleAddendum};
pub use io::RetryPolicy;
pub use profile::{
    Architecture, ArchitectureStyle, DddPatterns, InvalidProfilePolicy, Layer, NamingConventions, Profile,
    ProfileDocument, ProfileSummary, QualityThresholds,
};
pub use project::{GuardrailAdditions, PROJECT_CONFIG_FILE, ProjectConfig, ThresholdOverrides};
pub use stack::{Confidence, DetectedStack};
pub use task::TaskType;
