use std::sync::Once;

use pretty_assertions::assert_eq;
use tokenplan_core::{DurationEstimator, EstimateError, ModelDescriptor};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::placeholder("All models"),
        ModelDescriptor::new("qwen")
            .with_method("full", 100.0, 4)
            .with_method("lora", 400.0, 1),
        ModelDescriptor::new("broken")
            .with_method("full", 0.0, 8)
            .with_method("lora", 50.0, 0),
    ]
}

#[test]
fn literal_throughput_yields_exact_seconds() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    let estimate = estimator.estimate(120_000, "qwen", "full", 1).unwrap();

    assert_eq!(estimate.seconds, 300.0);
    assert_eq!(estimate.worker_count, 4);
    assert_eq!(estimate.throughput, 100.0);
    assert_eq!(estimate.total_tokens, 120_000);
    assert_eq!(estimate.formatted(), "5 minutes");
}

#[test]
fn epochs_multiply_processed_tokens() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    let estimate = estimator.estimate(120_000, "qwen", "lora", 3).unwrap();

    assert_eq!(estimate.total_tokens, 360_000);
    assert_eq!(estimate.seconds, 900.0);
    assert_eq!(estimate.formatted(), "15 minutes");
    assert_eq!(estimate.tokens_per_day(), 400.0 * 86_400.0);
}

#[test]
fn placeholder_and_missing_models_are_unknown() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    assert_eq!(
        estimator.estimate(10, "All models", "full", 1),
        Err(EstimateError::UnknownModel("All models".to_string()))
    );
    assert_eq!(
        estimator.estimate(10, "llama", "full", 1),
        Err(EstimateError::UnknownModel("llama".to_string()))
    );
}

#[test]
fn missing_method_is_reported() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    assert_eq!(
        estimator.estimate(10, "qwen", "qlora", 1),
        Err(EstimateError::UnknownMethod {
            model: "qwen".to_string(),
            method: "qlora".to_string(),
        })
    );
}

#[test]
fn non_positive_throughput_and_world_size_are_rejected() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    assert!(matches!(
        estimator.estimate(10, "broken", "full", 1),
        Err(EstimateError::InvalidThroughput { .. })
    ));
    assert!(matches!(
        estimator.estimate(10, "broken", "lora", 1),
        Err(EstimateError::InvalidWorldSize { world_size: 0, .. })
    ));
}

#[test]
fn zero_tokens_or_epochs_never_produce_a_duration() {
    init_logging();
    let models = models();
    let estimator = DurationEstimator::new(&models);

    assert_eq!(
        estimator.estimate(0, "qwen", "full", 1),
        Err(EstimateError::InvalidSize {
            tokens: 0,
            epochs: 1
        })
    );
    assert_eq!(
        estimator.estimate(10, "qwen", "full", 0),
        Err(EstimateError::InvalidSize {
            tokens: 10,
            epochs: 0
        })
    );
}
