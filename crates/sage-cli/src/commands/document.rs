use anyhow::Context;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportDocumentArgs;
use crate::commands::shared;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sage export-document`: Markdown to a file, or to stdout as-is.
pub async fn handle(
    args: &ExportDocumentArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let markdown = session.export_document();
    let result = match &args.output {
        Some(path) => std::fs::write(path, &markdown)
            .with_context(|| format!("failed to write {}", path.display()))
            .and_then(|()| {
                output(
                    &json!({ "path": path.display().to_string(), "bytes": markdown.len() }),
                    flags.format,
                )
            }),
        None => {
            print!("{markdown}");
            Ok(())
        }
    };
    shared::finish(session, result).await
}
