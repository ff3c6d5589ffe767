use clap::Subcommand;

/// Source category commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SourcesCommands {
    /// Show the category candidates and whether each is selected.
    List,
    /// Replace the candidates with a fresh recommendation.
    Recommend,
    /// Ask for categories not already listed.
    More,
    /// Flip the selection of one candidate.
    Toggle { name: String },
    /// Add a custom category (selected).
    Add { name: String },
    /// Finalize the selected categories.
    Finalize,
    /// Reopen the categories for editing.
    Unlock,
}
