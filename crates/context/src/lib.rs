//! Context resolution for Codeward.
//!
//! | Step | Source | Notes |
//! |------|--------|-------|
//! | Stack detection | project marker files | fresh on every call |
//! | Project overrides | `.codeward.json` | fresh on every call |
//! | Profile | profile store | override, project, detected, default |
//! | Task type | classifier | keyword order decides |
//! | Guardrails | built-in table + project | additive only |
//! | Rendering | [`assembler`] | deterministic, size-bounded |

pub mod assembler;
pub mod engine;

pub use assembler::{
    AssembledContext, AssemblyInput, AssemblyLimits, AssemblyMetadata, ContextAssembler, Variant,
    relevant_categories,
};
pub use engine::{ContextEngine, GuardrailReport, ProfileSelection, ResolvedContext};
