use chart_config::{
    ConfigurationError, ResolutionPipeline, ResolverSettings, ValidationFailure, ValueTree,
};
use clap::Args;
use colored::Colorize;
use tracing::{info, instrument};

use crate::commands::InputArgs;
use crate::errors::Error;

#[cfg(test)]
#[path = "check_cmd_tests.rs"]
mod tests;

/// Arguments for the `check` command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Evaluate every rule and report all failures, not just the first
    #[arg(long)]
    pub all: bool,
}

/// Execute the check command
///
/// With `--all`, or `report_all_failures` in the settings file, every failure
/// is returned in catalogue order; otherwise only the first.
#[instrument]
pub fn execute(args: &CheckArgs) -> Result<(), Error> {
    let (tree, config) = args.input.load()?;

    let mut failures = collect_failures(&tree, &config.resolver, args.all);
    match failures.len() {
        0 => {
            info!(message = "Values passed all validation rules");
            println!("{}", "Configuration is valid".green());
            Ok(())
        }
        1 => Err(ConfigurationError::ConfigurationInvalid(failures.remove(0)).into()),
        _ => Err(Error::ValidationFailures(failures)),
    }
}

/// Failures of the standard catalogue in evaluation order.
///
/// Only the first failure is returned unless `all` or the settings'
/// `report_all_failures` asks for every one.
pub fn collect_failures(
    tree: &ValueTree,
    settings: &ResolverSettings,
    all: bool,
) -> Vec<ValidationFailure> {
    let pipeline = ResolutionPipeline::new(settings.clone());
    if all || settings.report_all_failures {
        return pipeline.engine().validate_all(tree).failures;
    }

    match pipeline.engine().validate(tree) {
        Ok(()) => Vec::new(),
        Err(error) => error.validation_failure().cloned().into_iter().collect(),
    }
}
