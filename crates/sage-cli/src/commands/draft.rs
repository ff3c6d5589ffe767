use serde::Serialize;
use serde_json::json;
use sage_core::entities::WizardData;
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DraftCommands;
use crate::commands::shared::{self, waiting};
use crate::context::{AppContext, Session};
use crate::output::output;

#[derive(Debug, Serialize)]
struct QuestionRow {
    id: String,
    section: String,
    question: String,
    citations: usize,
    candidates: usize,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct FusedRow {
    number: usize,
    title: String,
    subsections: usize,
    citations: usize,
}

#[derive(Debug, Serialize)]
struct CandidateRow<'a> {
    number: usize,
    selected: bool,
    text: &'a str,
}

/// Handle `sage draft`.
pub async fn handle(
    action: &DraftCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    let result = run(action, &mut session, flags).await;
    shared::finish(session, result).await
}

async fn run(
    action: &DraftCommands,
    session: &mut Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DraftCommands::List => output(&question_rows(session.data()), flags.format),
        DraftCommands::Answer { question_id } => {
            waiting("Drafting", session.draft_question(question_id)).await?;
            print_candidates(session, question_id, flags)
        }
        DraftCommands::Generate { redraft } => {
            let summary = waiting("Drafting all questions", session.draft_all(*redraft)).await?;
            output(
                &json!({ "drafted": summary.drafted, "failed": summary.failed }),
                flags.format,
            )
        }
        DraftCommands::Select {
            question_id,
            number,
        } => {
            let index = shared::index_from_number(*number, "candidate")?;
            session
                .apply(WizardEvent::SelectDraftCandidate {
                    question_id: question_id.clone(),
                    index,
                })
                .await?;
            print_candidates(session, question_id, flags)
        }
        DraftCommands::CompleteOne => {
            shared::applied(session, WizardEvent::CompleteDraftOne, flags).await
        }
        DraftCommands::Fuse => {
            let fused = waiting("Fusing data sections", session.generate_fused_outline()).await?;
            let rows: Vec<FusedRow> = fused
                .sections
                .iter()
                .enumerate()
                .map(|(i, s)| FusedRow {
                    number: i + 1,
                    title: s.title.clone(),
                    subsections: s.subsections.len(),
                    citations: s.subsections.iter().map(|sub| sub.citations.len()).sum(),
                })
                .collect();
            output(&rows, flags.format)
        }
        DraftCommands::CompleteTwo => {
            shared::applied(session, WizardEvent::CompleteDraftTwo, flags).await
        }
    }
}

fn print_candidates(
    session: &Session,
    question_id: &str,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let Some(response) = session.data().draft_data.responses.get(question_id) else {
        anyhow::bail!("question {question_id} has no draft");
    };
    let rows: Vec<CandidateRow<'_>> = response
        .candidates
        .iter()
        .enumerate()
        .map(|(i, text)| CandidateRow {
            number: i + 1,
            selected: i == response.selected,
            text,
        })
        .collect();
    output(&rows, flags.format)
}

/// Questions of data sections, where drafting applies.
fn question_rows(data: &WizardData) -> Vec<QuestionRow> {
    let mut rows = Vec::new();
    for section in data.outline_data.iter().filter(|s| s.kind.is_data()) {
        for question in section.subsections.iter().flat_map(|sub| &sub.questions) {
            let candidates = data
                .draft_data
                .responses
                .get(&question.id)
                .map_or(0, |r| r.candidates.len());
            let status = if question.citations.is_empty() {
                "missing"
            } else if candidates == 0 {
                "pending"
            } else {
                "drafted"
            };
            rows.push(QuestionRow {
                id: question.id.clone(),
                section: section.title.clone(),
                question: question.text.clone(),
                citations: question.citations.len(),
                candidates,
                status,
            });
        }
    }
    rows
}
