use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::PaperType { action } => {
            commands::paper::handle_paper_type(&action, ctx, flags).await
        }
        Commands::Length(args) => commands::paper::handle_length(&args, ctx, flags).await,
        Commands::Tab(args) => commands::paper::handle_tab(&args, ctx, flags).await,
        Commands::Thesis { action } => commands::thesis::handle(&action, ctx, flags).await,
        Commands::Sources { action } => commands::sources::handle(&action, ctx, flags).await,
        Commands::Methodology { action } => {
            commands::methodology::handle(&action, ctx, flags).await
        }
        Commands::Outline { action } => commands::outline::handle(&action, ctx, flags).await,
        Commands::Draft { action } => commands::draft::handle(&action, ctx, flags).await,
        Commands::Final { action } => commands::final_doc::handle(&action, ctx, flags).await,
        Commands::ExportDocument(args) => commands::document::handle(&args, ctx, flags).await,
        Commands::Ai(args) => commands::debug::handle_ai(&args, ctx, flags).await,
        Commands::Kb(args) => commands::debug::handle_kb(&args, ctx, flags).await,
        Commands::Citation { action } => {
            commands::debug::handle_citation(&action, ctx, flags).await
        }
        Commands::Config { action } => commands::config::handle(&action, ctx, flags),
    }
}
