use serde::Serialize;
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MethodologyCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;

#[derive(Debug, Serialize)]
struct OptionRow<'a> {
    number: usize,
    title: &'a str,
    variant: Option<&'a str>,
    description: &'a str,
    selected: bool,
}

/// Handle `sage methodology`.
pub async fn handle(
    action: &MethodologyCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &MethodologyCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MethodologyCommands::Catalog => {
            let catalog =
                waiting("Loading methodology catalog", session.methodology_catalog()).await?;
            output(&catalog, flags.format)
        }
        MethodologyCommands::Generate { methodology_type } => {
            waiting(
                "Generating methodology options",
                session.generate_methodologies(methodology_type),
            )
            .await?;
            print_options(session, flags)
        }
        MethodologyCommands::Options => print_options(session, flags),
        MethodologyCommands::Select { number } => {
            let index = shared::index_from_number(*number, "option")?;
            session.apply(WizardEvent::SelectMethodology(index)).await?;
            print_options(session, flags)
        }
        MethodologyCommands::Finalize => {
            shared::applied(session, WizardEvent::FinalizeMethodology, flags).await
        }
        MethodologyCommands::Unlock => {
            shared::applied(session, WizardEvent::UnlockMethodology, flags).await
        }
    }
}

fn print_options(session: &Session, flags: &GlobalFlags) -> anyhow::Result<()> {
    let data = session.data();
    let chosen = data.methodology.as_ref().map(|m| m.title.as_str());
    let rows: Vec<OptionRow<'_>> = data
        .methodology_options
        .iter()
        .enumerate()
        .map(|(i, option)| OptionRow {
            number: i + 1,
            title: &option.title,
            variant: option.variant.as_deref(),
            description: &option.description,
            selected: chosen == Some(option.title.as_str()),
        })
        .collect();
    output(&rows, flags.format)
}
