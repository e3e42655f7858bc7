use super::*;
use std::path::PathBuf;

#[test]
fn test_parse_check_with_multiple_values_files() {
    let cli = Cli::try_parse_from([
        "chart-config",
        "check",
        "--values",
        "base.yaml",
        "-f",
        "override.yaml",
        "--release-name",
        "gitlab",
        "--all",
    ])
    .unwrap();

    match cli.command {
        Commands::Check(args) => {
            assert_eq!(
                args.input.values,
                vec![PathBuf::from("base.yaml"), PathBuf::from("override.yaml")]
            );
            assert_eq!(args.input.release_name.as_deref(), Some("gitlab"));
            assert!(args.all);
        }
        other => panic!("Expected check command, got {:?}", other),
    }
}

#[test]
fn test_parse_check_requires_values() {
    assert!(Cli::try_parse_from(["chart-config", "check"]).is_err());
}

#[test]
fn test_parse_resolve_format() {
    let cli = Cli::try_parse_from([
        "chart-config",
        "resolve",
        "--values",
        "values.yaml",
        "--format",
        "yaml",
        "--settings",
        "settings.toml",
    ])
    .unwrap();

    match cli.command {
        Commands::Resolve(args) => {
            assert_eq!(
                args.format,
                Some(chart_config_cli::config::OutputFormat::Yaml)
            );
            assert_eq!(args.input.settings, Some(PathBuf::from("settings.toml")));
        }
        other => panic!("Expected resolve command, got {:?}", other),
    }
}

#[test]
fn test_parse_resolve_rejects_unknown_format() {
    let result = Cli::try_parse_from([
        "chart-config",
        "resolve",
        "--values",
        "values.yaml",
        "--format",
        "xml",
    ]);

    assert!(result.is_err());
}

#[test]
fn test_parse_rules() {
    let cli = Cli::try_parse_from(["chart-config", "rules", "--verbose"]).unwrap();

    assert!(matches!(cli.command, Commands::Rules(RulesArgs { verbose: true })));
}

#[test]
fn test_cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
