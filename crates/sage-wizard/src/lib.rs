//! # sage-wizard
//!
//! The research-paper wizard as a library.
//!
//! - [`WizardSession`]: one open project with its backend and autosave
//! - [`outline`]: the sequential subsection / question / citation passes
//! - [`drafts`]: per-citation and fused draft responses
//! - [`document`]: Markdown export with outline markers and references

mod context;
pub mod document;
pub mod drafts;
mod error;
pub mod outline;
mod session;

pub use context::{CITATIONS_PER_QUESTION, methodology_summary};
pub use error::WizardError;
pub use outline::{OutlinePipeline, PassOutcome, PassReport, Phase, Progress, ProgressFn};
pub use session::{DraftSummary, RefineSummary, SessionOptions, WizardSession};
