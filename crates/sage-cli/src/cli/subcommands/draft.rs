use clap::Subcommand;

/// Drafting commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DraftCommands {
    /// List draftable questions with their ids and draft status.
    List,
    /// Draft one question.
    Answer { question_id: String },
    /// Draft every question that has citations, in batches.
    Generate {
        /// Also redraft questions that already have a draft.
        #[arg(long)]
        redraft: bool,
    },
    /// Select a draft candidate by its 1-based number.
    Select { question_id: String, number: usize },
    /// Mark draft one complete.
    CompleteOne,
    /// Fuse the drafted data sections into a restructured outline.
    Fuse,
    /// Mark draft two complete.
    CompleteTwo,
}
