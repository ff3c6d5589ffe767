//! Wizard session error types.

use sage_client::{ClientError, Retryable};
use sage_core::errors::CoreError;
use sage_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("backend request failed: {0}")]
    Client(#[from] ClientError),

    /// The current wizard data lacks something the operation needs.
    #[error("{0}")]
    Precondition(String),
}

impl WizardError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

impl Retryable for WizardError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_rate_limited())
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Client(e) => e.retry_after_secs(),
            _ => None,
        }
    }
}
