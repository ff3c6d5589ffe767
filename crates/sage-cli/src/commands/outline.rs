use serde::Serialize;
use sage_core::entities::WizardData;
use sage_core::enums::OutlineStage;
use sage_core::wizard::WizardEvent;
use sage_wizard::document::marker;
use sage_wizard::{PassOutcome, Phase, Progress as PassProgress};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::OutlineCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct PassRow {
    phase: &'static str,
    requested: usize,
    failed: usize,
    stage: OutlineStage,
}

impl From<&PassOutcome> for PassRow {
    fn from(outcome: &PassOutcome) -> Self {
        Self {
            phase: outcome.phase.as_str(),
            requested: outcome.report.requested,
            failed: outcome.report.failed,
            stage: outcome.stage,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct OutlineRow {
    marker: String,
    kind: String,
    text: String,
    id: String,
    citations: usize,
}

/// Handle `sage outline`.
pub async fn handle(
    action: &OutlineCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &OutlineCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        OutlineCommands::Preview => {
            let structure = waiting("Fetching paper structure", session.preview_structure()).await?;
            output(&structure, flags.format)
        }
        OutlineCommands::Generate { all: true } => {
            let bar = Progress::bar("Generating outline");
            let on_progress = |p: &PassProgress| bar.update(p);
            let passes = session.generate_outline(Some(&on_progress)).await;
            finish_bar(&bar, passes.is_ok());
            let rows: Vec<PassRow> = passes?.iter().map(PassRow::from).collect();
            output(&rows, flags.format)
        }
        OutlineCommands::Generate { all: false } => {
            if matches!(
                session.data().outline_stage,
                OutlineStage::NoOutline | OutlineStage::StructureDrafted
            ) {
                waiting("Generating sections", session.generate_sections()).await?;
            }
            run_pass(session, Phase::Subsections, flags).await
        }
        OutlineCommands::Questions => run_pass(session, Phase::Questions, flags).await,
        OutlineCommands::Citations => run_pass(session, Phase::Citations, flags).await,
        OutlineCommands::Reset => {
            session.reset_outline().await?;
            shared::report(session, None, flags)
        }
        OutlineCommands::Complete => {
            shared::applied(session, WizardEvent::CompleteFramework, flags).await
        }
        OutlineCommands::Show => output(&outline_rows(session.data()), flags.format),
    }
}

async fn run_pass(session: &mut Session, phase: Phase, flags: &GlobalFlags) -> anyhow::Result<()> {
    let bar = Progress::bar(&format!("Generating {}", phase.as_str()));
    let on_progress = |p: &PassProgress| bar.update(p);
    let outcome = session.run_outline_pass(phase, Some(&on_progress)).await;
    finish_bar(&bar, outcome.is_ok());
    output(&PassRow::from(&outcome?), flags.format)
}

fn finish_bar(bar: &Progress, ok: bool) {
    if ok {
        bar.finish_ok("done");
    } else {
        bar.finish_err("failed");
    }
}

/// One row per section, subsection and question, with outline markers.
fn outline_rows(data: &WizardData) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    for (si, section) in data.outline_data.iter().enumerate() {
        let s_marker = marker(0, si);
        rows.push(OutlineRow {
            marker: s_marker.clone(),
            kind: section.kind.to_string(),
            text: section.title.clone(),
            id: section.id.clone(),
            citations: 0,
        });
        for (ssi, subsection) in section.subsections.iter().enumerate() {
            let ss_marker = format!("{s_marker}{}", marker(1, ssi));
            rows.push(OutlineRow {
                marker: ss_marker.clone(),
                kind: "subsection".into(),
                text: subsection.title.clone(),
                id: subsection.id.clone(),
                citations: 0,
            });
            for (qi, question) in subsection.questions.iter().enumerate() {
                rows.push(OutlineRow {
                    marker: format!("{ss_marker}{}", marker(2, qi)),
                    kind: "question".into(),
                    text: question.text.clone(),
                    id: question.id.clone(),
                    citations: question.citations.len(),
                });
            }
        }
    }
    rows
}
