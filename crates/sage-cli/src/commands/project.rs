use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use serde_json::json;
use sage_core::entities::{ProjectSummary, WizardData};
use sage_store::{FileStore, ProjectStore};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::commands::shared;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ProjectRow {
    active: bool,
    #[serde(flatten)]
    summary: ProjectSummary,
}

/// Handle `sage project`.
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = &ctx.store;
    match action {
        ProjectCommands::New { name, description } => {
            let record = store.save_new(
                name,
                description.as_deref().unwrap_or(""),
                WizardData::default(),
            )?;
            store.set_active(&record.id)?;
            output(&record.summary(), flags.format)
        }
        ProjectCommands::List => {
            let active = store.active_id()?;
            let rows: Vec<ProjectRow> = store
                .list()?
                .iter()
                .map(|record| ProjectRow {
                    active: active.as_deref() == Some(record.id.as_str()),
                    summary: record.summary(),
                })
                .collect();
            output(&rows, flags.format)
        }
        ProjectCommands::Show { id } => {
            let id = resolve_id(store, id.as_deref())?;
            output(&store.get(&id)?, flags.format)
        }
        ProjectCommands::Load { id } => {
            let record = store.get(id)?;
            store.set_active(&record.id)?;
            output(&record.summary(), flags.format)
        }
        ProjectCommands::SaveAs { name } => {
            let source = resolve_id(store, None)?;
            let data = store.get(&source)?.data;
            let record = store.save_as(&source, name.as_deref(), data)?;
            store.set_active(&record.id)?;
            output(&record.summary(), flags.format)
        }
        ProjectCommands::Delete { id } => {
            store.delete(id)?;
            output(&json!({ "deleted": id }), flags.format)
        }
        ProjectCommands::Export { id, output: dest } => {
            let id = resolve_id(store, id.as_deref())?;
            let dest = match dest {
                Some(path) => path.clone(),
                None => std::env::current_dir().context("failed to determine current directory")?,
            };
            let path: PathBuf = store.export(&id, &dest)?;
            output(&json!({ "id": id, "path": path.display().to_string() }), flags.format)
        }
        ProjectCommands::Import { path } => {
            let record = store
                .import(path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            store.set_active(&record.id)?;
            output(&record.summary(), flags.format)
        }
        ProjectCommands::Status => {
            let session = ctx.session()?;
            let result = shared::report(&session, None, flags);
            shared::finish(session, result).await
        }
    }
}

/// `id` when given, else the active project.
fn resolve_id(store: &ProjectStore<FileStore>, id: Option<&str>) -> anyhow::Result<String> {
    if let Some(id) = id {
        return Ok(id.to_string());
    }
    store
        .active_id()?
        .context("no active project; create one with `sage project new` or load one")
}
