//! Cross-cutting error types for Sage.
//!
//! Domain-specific errors (e.g., `StoreError`, `ClientError`) are defined in
//! their respective crates. They converge into `anyhow` in `sage-cli`.

use thiserror::Error;

/// Errors that can be raised by any Sage crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        from: String,
        to: String,
    },

    /// The wizard refused an edit because the owning stage is finalized
    /// or a prerequisite stage is not.
    #[error("Stage locked: {stage}: {reason}")]
    StageLocked { stage: String, reason: String },

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub(crate) fn locked(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StageLocked {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
