use serde_json::json;
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SourcesCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;

/// Handle `sage sources`.
pub async fn handle(
    action: &SourcesCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &SourcesCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SourcesCommands::List => output(&session.data().category_candidates, flags.format),
        SourcesCommands::Recommend => {
            waiting("Recommending source categories", session.recommend_sources()).await?;
            output(&session.data().category_candidates, flags.format)
        }
        SourcesCommands::More => {
            let added = waiting("Finding more categories", session.more_sources()).await?;
            output(&json!({ "added": added }), flags.format)
        }
        SourcesCommands::Toggle { name } => {
            session.apply(WizardEvent::ToggleCategory(name.clone())).await?;
            output(&session.data().category_candidates, flags.format)
        }
        SourcesCommands::Add { name } => {
            session.apply(WizardEvent::AddCustomCategory(name.clone())).await?;
            output(&session.data().category_candidates, flags.format)
        }
        SourcesCommands::Finalize => {
            shared::applied(session, WizardEvent::FinalizeCategories, flags).await
        }
        SourcesCommands::Unlock => {
            shared::applied(session, WizardEvent::UnlockCategories, flags).await
        }
    }
}
