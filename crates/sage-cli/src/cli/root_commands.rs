use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CitationCommands, ConfigCommands, DraftCommands, FinalCommands, MethodologyCommands,
    OutlineCommands, PaperTypeCommands, ProjectCommands, SourcesCommands, ThesisCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Saved projects: create, load, copy, delete, export, import.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Paper type catalog and selection.
    PaperType {
        #[command(subcommand)]
        action: PaperTypeCommands,
    },
    /// Set the paper length: a page count, `adjusted`, or `max`.
    Length(LengthArgs),
    /// Thesis drafting and refinement.
    Thesis {
        #[command(subcommand)]
        action: ThesisCommands,
    },
    /// Source category recommendation and selection.
    Sources {
        #[command(subcommand)]
        action: SourcesCommands,
    },
    /// Methodology catalog, generation and selection.
    Methodology {
        #[command(subcommand)]
        action: MethodologyCommands,
    },
    /// Outline framework generation.
    Outline {
        #[command(subcommand)]
        action: OutlineCommands,
    },
    /// Draft answers to outline questions.
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Final document text: abstract, methodology, conclusion, transitions.
    Final {
        #[command(subcommand)]
        action: FinalCommands,
    },
    /// Switch the workspace tab: framework, draft1, draft2, final.
    Tab(TabArgs),
    /// Render the final document as Markdown.
    ExportDocument(ExportDocumentArgs),
    /// Send a free-form prompt to the backend.
    Ai(AiArgs),
    /// Query the backend knowledge base.
    Kb(KbArgs),
    /// Citation lookup.
    Citation {
        #[command(subcommand)]
        action: CitationCommands,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct LengthArgs {
    /// Page count, `adjusted`, or `max`.
    pub value: String,
}

#[derive(Clone, Debug, Args)]
pub struct TabArgs {
    pub tab: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportDocumentArgs {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct AiArgs {
    pub prompt: String,
}

#[derive(Clone, Debug, Args)]
pub struct KbArgs {
    pub query: String,
}
