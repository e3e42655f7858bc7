use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chart_config_cli::commands::{
    check_cmd::{self, CheckArgs},
    resolve_cmd::{self, ResolveArgs},
    rules_cmd::{self, RulesArgs},
};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// chart-config: validate chart values and resolve multi-instance services
#[derive(Parser, Debug)]
#[command(name = "chart-config")]
#[command(about = "Validate chart values and resolve multi-instance services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate values files against the rule catalogue
    Check(CheckArgs),

    /// Validate values files and print the resolved configuration
    Resolve(ResolveArgs),

    /// List the validation rules in evaluation order
    Rules(RulesArgs),

    /// Show the CLI version
    Version,
}

fn main() {
    // Logs go to stderr so stdout only ever carries command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("CHART_CONFIG_LOG"))
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Check(args) => check_cmd::execute(args),
        Commands::Resolve(args) => resolve_cmd::execute(args),
        Commands::Rules(args) => rules_cmd::execute(args),
        Commands::Version => {
            println!(
                "chart-config version {}",
                option_env!("CHART_CONFIG_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("{}", e.to_string().red());
        std::process::exit(e.exit_code());
    }
}
