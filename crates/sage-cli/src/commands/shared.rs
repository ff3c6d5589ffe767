use std::future::Future;

use serde::Serialize;
use sage_core::enums::{OutlineStage, Tab, WizardStage};
use sage_core::wizard::WizardEvent;

use crate::cli::GlobalFlags;
use crate::context::Session;
use crate::output::output;
use crate::progress::Progress;

/// Wizard progress as printed after state-changing commands.
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub project_id: String,
    pub project_name: String,
    pub stage: WizardStage,
    pub outline_stage: OutlineStage,
    pub paper_type: Option<String>,
    pub paper_length: String,
    pub thesis: String,
    pub source_categories: Vec<String>,
    pub methodology: Option<String>,
    pub enabled_tabs: Vec<Tab>,
    pub active_tab: Tab,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl StatusView {
    pub fn of(session: &Session, warning: Option<String>) -> Self {
        let state = session.state();
        let data = state.data();
        let thesis = if data.final_thesis.is_empty() {
            data.thesis_draft.clone()
        } else {
            data.final_thesis.clone()
        };
        Self {
            project_id: session.project_id().to_string(),
            project_name: session.project_name().to_string(),
            stage: state.current_stage(),
            outline_stage: data.outline_stage,
            paper_type: data.selected_paper_type.clone(),
            paper_length: data.paper_length.to_string(),
            thesis,
            source_categories: data.source_categories.clone(),
            methodology: data.methodology.as_ref().map(|m| m.title.clone()),
            enabled_tabs: state.enabled_tabs(),
            active_tab: data.active_tab,
            warning,
        }
    }
}

/// Print the session status, carrying an unlock warning if one was raised.
pub fn report(
    session: &Session,
    warning: Option<String>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    output(&StatusView::of(session, warning), flags.format)
}

/// Apply a local event and print the resulting status.
pub async fn applied(
    session: &mut Session,
    event: WizardEvent,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let warning = session.apply(event).await?;
    report(session, warning, flags)
}

/// Await a backend round trip behind a spinner.
pub async fn waiting<T, E>(
    message: &str,
    work: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let spinner = Progress::spinner(message);
    let result = work.await;
    match &result {
        Ok(_) => spinner.finish_clear(),
        Err(_) => spinner.finish_err("failed"),
    }
    result
}

/// Close the session (flushing pending saves) and return `result`. A command
/// error takes precedence over a flush error.
pub async fn finish<T>(session: Session, result: anyhow::Result<T>) -> anyhow::Result<T> {
    let closed = session.close().await;
    let value = result?;
    closed?;
    Ok(value)
}

/// Convert a 1-based number from the command line to an index.
pub fn index_from_number(number: usize, what: &str) -> anyhow::Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("{what} numbers start at 1"))
}
