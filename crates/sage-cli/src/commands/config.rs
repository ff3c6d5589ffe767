use crate::cli::subcommands::ConfigCommands;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

/// Handle `sage config`. Table format prints TOML, the same shape the
/// config files use.
pub fn handle(
    action: &ConfigCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => match flags.format {
            OutputFormat::Table => {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
                Ok(())
            }
            OutputFormat::Json | OutputFormat::Raw => output(&ctx.config, flags.format),
        },
    }
}
