mod config;
mod draft;
mod final_doc;
mod methodology;
mod outline;
mod paper;
mod project;
mod sources;
mod thesis;

pub use config::ConfigCommands;
pub use draft::DraftCommands;
pub use final_doc::FinalCommands;
pub use methodology::MethodologyCommands;
pub use outline::OutlineCommands;
pub use paper::{CitationCommands, PaperTypeCommands};
pub use project::ProjectCommands;
pub use sources::SourcesCommands;
pub use thesis::ThesisCommands;
