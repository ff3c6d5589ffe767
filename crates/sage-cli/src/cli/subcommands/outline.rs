use clap::Subcommand;

/// Outline framework commands.
#[derive(Clone, Debug, Subcommand)]
pub enum OutlineCommands {
    /// Fetch the paper structure for the selected type and methodology.
    Preview,
    /// Generate sections and subsections; `--all` also runs the question
    /// and citation passes.
    Generate {
        #[arg(long)]
        all: bool,
    },
    /// Generate questions for data-section subsections.
    Questions,
    /// Generate citations for data-section questions.
    Citations,
    /// Discard the outline and start over.
    Reset,
    /// Mark the framework complete and open drafting.
    Complete,
    /// Print the outline.
    Show,
}
