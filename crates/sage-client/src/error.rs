//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the generation backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// `detail` field of the error body, or the raw body.
        message: String,
    },

    /// The backend returned 429 Too Many Requests.
    #[error("rate limited by backend")]
    RateLimited {
        /// Value of the `Retry-After` header, when present and numeric.
        retry_after_secs: Option<u64>,
    },

    /// Failed to parse a backend response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backend implementation does not provide this operation.
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// The configured base URL could not be used.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The request throttle was shut down while waiting for a slot.
    #[error("throttle closed: {0}")]
    Throttle(#[from] tokio::sync::AcquireError),
}

/// Errors that can tell whether a backoff-and-retry may succeed.
pub trait Retryable: std::fmt::Display {
    fn is_rate_limited(&self) -> bool;

    /// Server-requested wait before the next attempt, if any.
    fn retry_after_secs(&self) -> Option<u64> {
        None
    }
}

impl Retryable for ClientError {
    /// Rate-limit class: 429, 503, or a message mentioning a rate limit.
    fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, message } => {
                *status == 429 || *status == 503 || mentions_rate_limit(message)
            }
            Self::Http(e) => e
                .status()
                .is_some_and(|s| s.as_u16() == 429 || s.as_u16() == 503)
                || mentions_rate_limit(&e.to_string()),
            Self::Parse(_) | Self::Unsupported(_) | Self::InvalidUrl(_) | Self::Throttle(_) => {
                false
            }
        }
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    message.to_ascii_lowercase().contains("rate limit")
}
