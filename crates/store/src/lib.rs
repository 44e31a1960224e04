//! Stores for Codeward: layered profiles, the standards document tree and
//! per-project override files.

pub mod cache;
pub mod documents;
pub mod profiles;
pub mod project;

pub use cache::TtlCache;
pub use documents::DocumentStore;
pub use profiles::{LoadReport, ProfileSources, ProfileStore, RejectedProfile, SourceKind};
pub use project::{ProjectConfigLoader, ProjectConfigLookup};
