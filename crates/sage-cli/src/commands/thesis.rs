use serde_json::json;
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ThesisCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;

/// Handle `sage thesis`.
pub async fn handle(
    action: &ThesisCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &ThesisCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ThesisCommands::Edit { text } => {
            shared::applied(session, WizardEvent::EditThesis(text.clone()), flags).await
        }
        ThesisCommands::Questions => {
            let questions = waiting(
                "Generating probing questions",
                session.generate_probing_questions(),
            )
            .await?;
            output(&json!({ "questions": questions }), flags.format)
        }
        ThesisCommands::Answer { answers } => {
            let asked = session.data().probing_questions.len();
            if asked != 0 && answers.len() != asked {
                anyhow::bail!(
                    "expected {asked} answers, one per probing question, got {}",
                    answers.len()
                );
            }
            let thesis = waiting(
                "Refining thesis",
                session.answer_probing_questions(answers.clone()),
            )
            .await?;
            output(&json!({ "thesis": thesis }), flags.format)
        }
        ThesisCommands::Refine { responses } => {
            let thesis =
                waiting("Refining thesis", session.refine_thesis(responses.clone())).await?;
            output(&json!({ "thesis": thesis }), flags.format)
        }
        ThesisCommands::AutoRefine => {
            let thesis = waiting("Refining thesis", session.auto_refine_thesis()).await?;
            output(&json!({ "thesis": thesis }), flags.format)
        }
        ThesisCommands::Finalize => {
            shared::applied(session, WizardEvent::FinalizeThesis, flags).await
        }
        ThesisCommands::Unlock => shared::applied(session, WizardEvent::UnlockThesis, flags).await,
    }
}
