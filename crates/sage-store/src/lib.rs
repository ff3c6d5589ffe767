//! # sage-store
//!
//! Local persistence for Sage projects.
//!
//! - [`kv`]: the `KeyValueStore` contract with file and in-memory backends
//! - [`projects`]: the saved-projects collection, active project pointer, and
//!   structure cache
//! - [`scheduler`]: the single-slot debounce queue with injectable clocks
//! - [`autosaver`]: the background worker that drives the scheduler

pub mod autosaver;
pub mod error;
pub mod kv;
pub mod projects;
pub mod scheduler;

pub use autosaver::{Autosaver, ProjectSnapshot, SaveSink};
pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use projects::ProjectStore;
pub use scheduler::{AutosaveScheduler, Clock, ManualClock, TokioClock};
