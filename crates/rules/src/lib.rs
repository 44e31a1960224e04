//! Rule resolution for Codeward.
//!
//! - [`classifier`] maps a free-text task description to a [`TaskType`](codeward_core::TaskType).
//! - [`guardrails`] merges the built-in guardrail table with project additions.

pub mod classifier;
pub mod guardrails;

pub use classifier::{Classification, classify, explain};
pub use guardrails::{builtin, project_rules, resolve};
