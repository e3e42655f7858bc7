use chart_config::{ResolutionPipeline, ResolvedConfiguration, ResolverSettings, ValueTree};
use clap::Args;
use tracing::{debug, instrument};

use crate::commands::InputArgs;
use crate::config::OutputFormat;
use crate::errors::Error;

#[cfg(test)]
#[path = "resolve_cmd_tests.rs"]
mod tests;

/// Arguments for the `resolve` command
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format (defaults to the settings file, then json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the resolve command
#[instrument]
pub fn execute(args: &ResolveArgs) -> Result<(), Error> {
    let (tree, config) = args.input.load()?;
    let format = args.format.unwrap_or(config.output.format);

    let resolved = resolve_values(&tree, &config.resolver)?;
    let output = render(&resolved, format)?;

    debug!(format = ?format, bytes = output.len(), "Rendered resolved configuration");
    println!("{}", output.trim_end());
    Ok(())
}

/// Runs the full pipeline over `tree`.
pub fn resolve_values(
    tree: &ValueTree,
    settings: &ResolverSettings,
) -> Result<ResolvedConfiguration, Error> {
    let resolved = ResolutionPipeline::new(settings.clone()).run(tree)?;
    Ok(resolved)
}

pub fn render(resolved: &ResolvedConfiguration, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(resolved).map_err(|e| Error::Serialize(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(resolved).map_err(|e| Error::Serialize(e.to_string()))
        }
    }
}
