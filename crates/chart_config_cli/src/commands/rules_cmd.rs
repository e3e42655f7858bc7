use chart_config::RuleCatalogue;
use clap::Args;
use tracing::instrument;

use crate::errors::Error;

#[cfg(test)]
#[path = "rules_cmd_tests.rs"]
mod tests;

/// Arguments for the `rules` command
#[derive(Args, Debug, Clone, Default)]
pub struct RulesArgs {
    /// Also print each rule's message template
    #[arg(long)]
    pub verbose: bool,
}

/// Execute the rules command
#[instrument]
pub fn execute(args: &RulesArgs) -> Result<(), Error> {
    for line in list_rules(&RuleCatalogue::standard(), args.verbose) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per rule, in evaluation order.
pub fn list_rules(catalogue: &RuleCatalogue, verbose: bool) -> Vec<String> {
    catalogue
        .rules()
        .iter()
        .map(|rule| {
            if verbose {
                format!("{}\t{}", rule.id(), rule.template().as_str())
            } else {
                rule.id().to_string()
            }
        })
        .collect()
}
