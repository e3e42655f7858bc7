use super::*;

#[test]
fn test_defaults() {
    let settings = ResolverSettings::default();

    assert_eq!(settings.release_name, "test");
    assert_eq!(settings.evaluation, EvaluationStrategy::Sequential);
    assert_eq!(settings.workers, 4);
    assert!(!settings.report_all_failures);
    assert_eq!(settings.evaluation_mode(), EvaluationMode::Sequential);
}

#[test]
fn test_empty_document_deserializes_to_defaults() {
    let settings: ResolverSettings = serde_json::from_str("{}").unwrap();

    assert_eq!(settings, ResolverSettings::default());
}

#[test]
fn test_partial_document_keeps_other_defaults() {
    let settings: ResolverSettings =
        serde_json::from_str(r#"{ "evaluation": "parallel", "workers": 8 }"#).unwrap();

    assert_eq!(settings.release_name, "test");
    assert_eq!(
        settings.evaluation_mode(),
        EvaluationMode::Parallel { workers: 8 }
    );
}

#[test]
fn test_zero_workers_is_clamped() {
    let settings = ResolverSettings {
        evaluation: EvaluationStrategy::Parallel,
        workers: 0,
        ..ResolverSettings::default()
    };

    assert_eq!(
        settings.evaluation_mode(),
        EvaluationMode::Parallel { workers: 1 }
    );
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let result: Result<ResolverSettings, _> = serde_json::from_str(r#"{ "evaluation": "eager" }"#);

    assert!(result.is_err());
}

#[test]
fn test_with_release_name() {
    let settings = ResolverSettings::default().with_release_name("gitlab");

    assert_eq!(settings.release_name, "gitlab");
}
