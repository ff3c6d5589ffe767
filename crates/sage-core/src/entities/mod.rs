//! Entity structs for all Sage domain objects.
//!
//! Every struct derives `Serialize`, `Deserialize`, and `JsonSchema`. Field
//! names are camelCase on disk; older snake_case names are accepted as
//! aliases so that records written by earlier clients still load.

mod draft;
mod methodology;
mod outline;
mod project;
mod structure;
mod synthesis;
mod wizard_data;

pub use draft::{DraftData, DraftResponse};
pub use methodology::{Methodology, MethodologyOption, MethodologyType};
pub use outline::{
    Citation, Question, QuestionPath, Section, Subsection, find_question, question_at, questions,
};
pub use project::{ProjectRecord, ProjectSummary};
pub use structure::PaperStructure;
pub use synthesis::{FinalDocument, FusedOutline, FusedSection, FusedSubsection};
pub use wizard_data::{CategoryChoice, WizardData};
