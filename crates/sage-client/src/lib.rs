//! # sage-client
//!
//! Typed access to the Sage generation backend.
//!
//! - [`GenerationBackend`]: the async seam the wizard talks to
//! - [`BackendClient`]: `reqwest` implementation with rate-limit-aware retry
//! - [`batch_with_retry`]: fixed-size concurrent batches
//! - [`Throttle`]: in-flight bound plus minimum spacing between starts

mod backend;
mod batch;
mod client;
mod error;
mod http;
mod retry;
mod throttle;
pub mod wire;

pub use backend::GenerationBackend;
pub use batch::{BatchOptions, DEFAULT_STAGGER, batch_with_retry};
pub use client::BackendClient;
pub use error::{ClientError, Retryable};
pub use retry::{RetryPolicy, with_retry};
pub use throttle::{Throttle, ThrottlePermit};
