use clap::Subcommand;

/// Methodology commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MethodologyCommands {
    /// List the backend methodology catalog.
    Catalog,
    /// Generate options for a catalog family.
    Generate {
        #[arg(long = "type")]
        methodology_type: String,
    },
    /// Show the generated options.
    Options,
    /// Choose an option by its 1-based number.
    Select { number: usize },
    /// Finalize the methodology and open the outline framework.
    Finalize,
    /// Reopen the methodology for editing.
    Unlock,
}
