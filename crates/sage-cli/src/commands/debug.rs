//! Direct backend calls that do not touch wizard state.

use serde_json::json;
use sage_client::GenerationBackend;
use sage_client::wire::{CitationSearchRequest, PromptRequest};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{AiArgs, KbArgs};
use crate::cli::subcommands::CitationCommands;
use crate::commands::shared::waiting;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sage ai`.
pub async fn handle_ai(args: &AiArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = PromptRequest {
        prompt: args.prompt.clone(),
    };
    let response = waiting("Asking the backend", ctx.backend.ai_response(&request)).await?;
    output(&json!({ "response": response }), flags.format)
}

/// Handle `sage kb`.
pub async fn handle_kb(args: &KbArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let results = waiting("Querying knowledge base", ctx.backend.query_kb(&args.query)).await?;
    output(&results, flags.format)
}

/// Handle `sage citation`.
pub async fn handle_citation(
    action: &CitationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CitationCommands::Identify {
            title,
            source,
            year,
            author,
        } => {
            if [title, source, year, author].iter().all(|f| f.trim().is_empty()) {
                anyhow::bail!("give at least one of --title, --source, --year, --author");
            }
            let request = CitationSearchRequest {
                title: title.clone(),
                source: source.clone(),
                year: year.clone(),
                author: author.clone(),
            };
            let citation =
                waiting("Identifying citation", ctx.backend.identify_citation(&request)).await?;
            output(&citation, flags.format)
        }
    }
}
