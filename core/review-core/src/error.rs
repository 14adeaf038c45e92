//! Error types for review-core operations.
//!
//! None of these reach the host runtime: the hook binary logs them and still
//! approves. They exist so each layer can say precisely what went wrong.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    // ─────────────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Hook input malformed: {0}")]
    InputMalformed(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    // ─────────────────────────────────────────────────────────────────────
    // State Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("State write failed: {path}: {details}")]
    StateWriteFailed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to spawn review agent {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

impl From<ReviewError> for String {
    fn from(err: ReviewError) -> String {
        err.to_string()
    }
}
