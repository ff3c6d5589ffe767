use clap::Subcommand;

/// Thesis stage commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ThesisCommands {
    /// Replace the thesis draft.
    Edit { text: String },
    /// Generate probing questions about the draft.
    Questions,
    /// Answer the probing questions, in order, and apply the refined thesis.
    Answer {
        #[arg(required = true)]
        answers: Vec<String>,
    },
    /// Refine the draft from free-form responses.
    Refine {
        #[arg(required = true)]
        responses: Vec<String>,
    },
    /// Let the backend refine the draft on its own.
    AutoRefine,
    /// Finalize the thesis and unlock source categories.
    Finalize,
    /// Reopen the thesis for editing.
    Unlock,
}
