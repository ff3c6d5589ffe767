use clap::Subcommand;

/// Final document commands, available once draft two is complete.
#[derive(Clone, Debug, Subcommand)]
pub enum FinalCommands {
    /// Generate one paragraph: `abstract`, `methodology`, or `conclusion`.
    Generate { part: String },
    /// Generate transitions between outline items.
    Transitions,
    /// Rewrite each drafted subsection as continuous prose.
    Refine {
        /// Also refine subsections that already have refined text.
        #[arg(long)]
        redo: bool,
    },
}
