//! Error types for the Codeward domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each failure class (absence, validation, I/O) has its own error enum.

use thiserror::Error;

/// The top-level error type for all Codeward operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Absence ---
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    // --- Malformed configuration ---
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    // --- Storage ---
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error means "the requested thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when the error comes from a document that failed validation.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("profile '{0}' does not exist")]
    Profile(String),

    #[error("standards category '{0}' does not exist")]
    Category(String),

    #[error("standards document '{0}' does not exist")]
    Document(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("profile '{id}' is invalid: {reason}")]
    Profile { id: String, reason: String },

    #[error("project config '{file}' is invalid: {reason}")]
    ProjectConfig { file: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("transient failure reading '{resource}' after {attempts} attempt(s): {reason}")]
    Transient {
        resource: String,
        attempts: u32,
        reason: String,
    },

    #[error("failed to read '{resource}': {reason}")]
    Failed { resource: String, reason: String },
}
