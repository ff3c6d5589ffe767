use serde::Serialize;
use sage_core::catalog::PAPER_TYPES;
use sage_core::enums::{PaperLength, Tab};
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{LengthArgs, TabArgs};
use crate::cli::subcommands::PaperTypeCommands;
use crate::commands::shared;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PaperTypeRow {
    id: &'static str,
    name: &'static str,
    default_length: String,
    purpose: &'static str,
}

/// Handle `sage paper-type`.
pub async fn handle_paper_type(
    action: &PaperTypeCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        PaperTypeCommands::List => {
            let rows: Vec<PaperTypeRow> = PAPER_TYPES
                .iter()
                .map(|pt| PaperTypeRow {
                    id: pt.id,
                    name: pt.name,
                    default_length: pt.default_length.to_string(),
                    purpose: pt.purpose,
                })
                .collect();
            output(&rows, flags.format)
        }
        PaperTypeCommands::Select { id } => {
            apply(ctx, flags, WizardEvent::SelectPaperType(id.clone())).await
        }
    }
}

/// Handle `sage length`.
pub async fn handle_length(
    args: &LengthArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let length: PaperLength = args.value.parse()?;
    apply(ctx, flags, WizardEvent::SetPaperLength(length)).await
}

/// Handle `sage tab`.
pub async fn handle_tab(
    args: &TabArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let tab = parse_tab(&args.tab)?;
    apply(ctx, flags, WizardEvent::SelectTab(tab)).await
}

fn parse_tab(value: &str) -> anyhow::Result<Tab> {
    let wanted = value.trim().to_ascii_lowercase();
    Tab::ALL
        .into_iter()
        .find(|tab| tab.as_str() == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = Tab::ALL.iter().map(|t| t.as_str()).collect();
            anyhow::anyhow!("unknown tab '{value}'; expected one of: {}", known.join(", "))
        })
}

async fn apply(ctx: &AppContext, flags: &GlobalFlags, event: WizardEvent) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = shared::applied(&mut session, event, flags).await;
    shared::finish(session, result).await
}
