use serde_json::json;
use sage_core::enums::FinalPart;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FinalCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;

/// Handle `sage final`.
pub async fn handle(
    action: &FinalCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &FinalCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FinalCommands::Generate { part } => {
            let part: FinalPart = part.parse()?;
            let message = format!("Generating {}", part.title().to_lowercase());
            let text = waiting(&message, session.generate_final_text(part)).await?;
            output(&json!({ "part": part, "text": text }), flags.format)
        }
        FinalCommands::Transitions => {
            let transitions =
                waiting("Generating transitions", session.generate_transitions()).await?;
            output(&transitions, flags.format)
        }
        FinalCommands::Refine { redo } => {
            let summary = waiting("Refining subsections", session.refine_subsections(*redo)).await?;
            output(
                &json!({
                    "refined": summary.refined,
                    "skipped": summary.skipped,
                    "failed": summary.failed,
                }),
                flags.format,
            )
        }
    }
}
