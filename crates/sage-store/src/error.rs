//! Store error types for sage-store.

use thiserror::Error;

/// Errors from local persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No project with the given id exists.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Input rejected before anything was written.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored or imported document is not valid JSON for its type.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The autosave worker is gone.
    #[error("Autosaver stopped")]
    AutosaverStopped,

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
