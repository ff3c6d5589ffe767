use clap::Subcommand;

/// Paper type commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PaperTypeCommands {
    /// List the paper type catalog.
    List,
    /// Select a paper type by id; also resets the length to its default.
    Select { id: String },
}

/// Citation lookup commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CitationCommands {
    /// Resolve bibliographic fields to a formatted citation.
    Identify {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        source: String,
        #[arg(long, default_value = "")]
        year: String,
        #[arg(long, default_value = "")]
        author: String,
    },
}
