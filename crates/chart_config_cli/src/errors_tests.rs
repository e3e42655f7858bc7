use super::*;
use chart_config::ValidationFailure;

#[test]
fn test_invalid_arguments_error_display() {
    let error = Error::InvalidArguments("--values is required".to_string());
    assert_eq!(error.to_string(), "Invalid arguments: --values is required");
}

#[test]
fn test_load_file_error_display() {
    let error = Error::LoadFile {
        path: PathBuf::from("values.yaml"),
        source: io::Error::new(io::ErrorKind::NotFound, "File not found"),
    };
    assert_eq!(
        error.to_string(),
        "Failed to load file \"values.yaml\": File not found"
    );
}

#[test]
fn test_parse_toml_file_error_display() {
    let parse_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
    let error = Error::ParseTomlFile {
        path: PathBuf::from("chart-config.toml"),
        source: parse_error,
    };
    assert!(error
        .to_string()
        .starts_with("Failed to parse TOML settings file \"chart-config.toml\""));
}

#[test]
fn test_configuration_error_shows_rendered_message() {
    let failure = ValidationFailure::new(
        "certmanager-issuer.email",
        "Please set certmanager-issuer.email",
    );
    let error = Error::from(ConfigurationError::ConfigurationInvalid(failure));

    assert!(error
        .to_string()
        .contains("Please set certmanager-issuer.email"));
}

#[test]
fn test_exit_codes() {
    let invalid = Error::from(ConfigurationError::ConfigurationInvalid(
        ValidationFailure::new("redis.port", "bad port"),
    ));
    let unknown = Error::from(ConfigurationError::UnknownService {
        service: "memcached".to_string(),
    });
    let setup = Error::InvalidValues("not a mapping".to_string());

    assert_eq!(invalid.exit_code(), EXIT_INVALID_CONFIGURATION);
    assert_eq!(unknown.exit_code(), EXIT_SETUP_ERROR);
    assert_eq!(setup.exit_code(), EXIT_SETUP_ERROR);
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}

#[test]
fn test_validation_failures_listed_in_order() {
    let error = Error::ValidationFailures(vec![
        ValidationFailure::new("certmanager-issuer.email", "Please set certmanager-issuer.email"),
        ValidationFailure::new("geo.database", "Geo was configured but no database was provided"),
    ]);

    assert_eq!(
        error.to_string(),
        "certmanager-issuer.email: Please set certmanager-issuer.email\ngeo.database: Geo was configured but no database was provided"
    );
    assert_eq!(error.exit_code(), EXIT_INVALID_CONFIGURATION);
}
