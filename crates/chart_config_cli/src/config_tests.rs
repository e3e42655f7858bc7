use super::*;
use chart_config::EvaluationStrategy;
use tempfile::TempDir;

#[test]
fn test_cli_config_default() {
    let config = CliConfig::default();

    assert_eq!(config.resolver, ResolverSettings::default());
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_cli_config_load_full_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("chart-config.toml");
    fs::write(
        &config_path,
        r#"
[resolver]
release_name = "gitlab"
evaluation = "parallel"
workers = 8
report_all_failures = true

[output]
format = "yaml"
"#,
    )
    .expect("Failed to write settings");

    let config = CliConfig::load(&config_path).expect("Failed to load settings");

    assert_eq!(config.resolver.release_name, "gitlab");
    assert_eq!(config.resolver.evaluation, EvaluationStrategy::Parallel);
    assert_eq!(config.resolver.workers, 8);
    assert!(config.resolver.report_all_failures);
    assert_eq!(config.output.format, OutputFormat::Yaml);
}

#[test]
fn test_cli_config_load_partial_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("chart-config.toml");
    fs::write(&config_path, "[resolver]\nrelease_name = \"prod\"\n")
        .expect("Failed to write settings");

    let config = CliConfig::load(&config_path).expect("Failed to load settings");

    assert_eq!(config.resolver.release_name, "prod");
    assert_eq!(config.resolver.evaluation, EvaluationStrategy::Sequential);
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_cli_config_load_invalid_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("invalid.toml");
    fs::write(&config_path, "invalid = toml = syntax").expect("Failed to write settings");

    let result = CliConfig::load(&config_path);

    assert!(matches!(result, Err(Error::ParseTomlFile { .. })));
}

#[test]
fn test_cli_config_load_unknown_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("chart-config.toml");
    fs::write(&config_path, "[output]\nformat = \"xml\"\n").expect("Failed to write settings");

    let result = CliConfig::load(&config_path);

    assert!(matches!(result, Err(Error::ParseTomlFile { .. })));
}

#[test]
fn test_cli_config_load_nonexistent_file() {
    let result = CliConfig::load(Path::new("nonexistent_settings.toml"));

    assert!(matches!(result, Err(Error::LoadFile { .. })));
}

#[test]
fn test_load_or_default_requires_explicit_file() {
    let result = CliConfig::load_or_default(Some(Path::new("nonexistent_settings.toml")));

    assert!(matches!(result, Err(Error::LoadFile { .. })));
}

#[test]
fn test_default_config_path() {
    assert_eq!(default_config_path(), PathBuf::from("chart-config.toml"));
}
