use std::path::PathBuf;

use clap::Subcommand;

/// Project store commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create an empty project and make it active.
    New {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List saved projects.
    List,
    /// Show a project (default: the active one).
    Show { id: Option<String> },
    /// Make a saved project the active one.
    Load { id: String },
    /// Copy the active project under a new record.
    SaveAs {
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a saved project.
    Delete { id: String },
    /// Write a project to a JSON file.
    Export {
        id: Option<String>,
        /// File or directory (default: current directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add a project from an exported JSON file and make it active.
    Import { path: PathBuf },
    /// Wizard progress of the active project.
    Status,
}
