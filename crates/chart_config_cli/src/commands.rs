//! Command modules for the chart-config CLI.
//!
//! - `check_cmd`: validate values against the rule catalogue
//! - `resolve_cmd`: validate, then print the resolved configuration
//! - `rules_cmd`: list the rule catalogue

use std::path::PathBuf;

use chart_config::ValueTree;
use clap::Args;

use crate::config::CliConfig;
use crate::errors::Error;
use crate::values::load_values;

pub mod check_cmd;
pub mod resolve_cmd;
pub mod rules_cmd;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Input options shared by the commands that read values.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Values file to read; repeat to merge several files left to right
    #[arg(short = 'f', long = "values", required = true)]
    pub values: Vec<PathBuf>,

    /// Release name used for generated hosts and secret names
    #[arg(long)]
    pub release_name: Option<String>,

    /// Settings file (defaults to ./chart-config.toml when present)
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

impl InputArgs {
    /// Loads the merged values and the settings, with flags taking precedence.
    pub fn load(&self) -> Result<(ValueTree, CliConfig), Error> {
        let mut config = CliConfig::load_or_default(self.settings.as_deref())?;
        if let Some(release_name) = &self.release_name {
            config.resolver.release_name = release_name.clone();
        }

        let values = load_values(&self.values)?;
        Ok((values, config))
    }
}
