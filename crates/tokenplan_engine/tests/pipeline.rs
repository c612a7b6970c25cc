use std::fs;
use std::path::Path;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokenplan_core::{plan_loads, DatasetDescriptor, ModelDescriptor};
use tokenplan_engine::{
    measure, EngineEvent, FetchSettings, HubTokenizerLoader, LoadError, MeasureError,
    ProgressSink, ResourceResolver, Stage,
};

#[derive(Default)]
struct StageSink {
    stages: Mutex<Vec<Stage>>,
}

impl ProgressSink for StageSink {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::Stage(stage) = event {
            self.stages.lock().unwrap().push(stage);
        }
    }
}

fn workspace() -> (TempDir, ResourceResolver, HubTokenizerLoader) {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("corpus.jsonl"),
        "{\"text\": \"hello world\"}\n{\"text\": \"the quick brown fox\"}\n",
    )
    .unwrap();
    fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tokenizer.json"),
        temp.path().join("tiny.json"),
    )
    .unwrap();
    let resolver = ResourceResolver::new(temp.path(), None);
    let settings = FetchSettings {
        endpoint: "http://127.0.0.1:9".to_string(),
        ..FetchSettings::default()
    };
    let loader = HubTokenizerLoader::new(resolver.clone(), settings).unwrap();
    (temp, resolver, loader)
}

#[test]
fn measures_dataset_with_loadable_models_only() {
    let (_temp, resolver, loader) = workspace();
    let models = vec![
        ModelDescriptor::placeholder("All models"),
        ModelDescriptor::new("tiny").with_local_path("tiny.json"),
        ModelDescriptor::new("nowhere"),
        ModelDescriptor::new("gated")
            .with_model_name("org/gated")
            .with_auth_required(),
    ];
    let plan = plan_loads(&models, &["1"]).unwrap();
    let dataset = DatasetDescriptor::local("corpus", "corpus.jsonl");
    let sink = StageSink::default();

    let measurement = measure(&dataset, &plan, &resolver, &loader, &sink).unwrap();

    assert_eq!(measurement.accounting.sample_count, 2);
    assert_eq!(measurement.accounting.total_bytes, 11 + 19);
    assert_eq!(measurement.accounting.model("tiny").unwrap().total_tokens, 6);
    assert_eq!(measurement.skipped_auth, vec!["gated".to_string()]);
    assert_eq!(measurement.failed.len(), 1);
    assert!(matches!(&measurement.failed[0].1, LoadError::NoSource { .. }));
    assert_eq!(
        *sink.stages.lock().unwrap(),
        vec![Stage::Extracting, Stage::Loading, Stage::Tokenizing, Stage::Done]
    );
}

#[test]
fn broken_dataset_stops_before_loading() {
    let (_temp, resolver, loader) = workspace();
    let models = vec![ModelDescriptor::new("tiny").with_local_path("tiny.json")];
    let plan = plan_loads::<&str>(&models, &[]).unwrap();
    let dataset = DatasetDescriptor::local("absent", "absent.jsonl");
    let sink = StageSink::default();

    let err = measure(&dataset, &plan, &resolver, &loader, &sink).unwrap_err();

    assert!(matches!(err, MeasureError::Extract(_)));
    assert_eq!(*sink.stages.lock().unwrap(), vec![Stage::Extracting]);
}

#[test]
fn no_loadable_tokenizer_is_an_error() {
    let (_temp, resolver, loader) = workspace();
    let models = vec![ModelDescriptor::new("nowhere")];
    let plan = plan_loads::<&str>(&models, &[]).unwrap();
    let dataset = DatasetDescriptor::local("corpus", "corpus.jsonl");

    let err = measure(&dataset, &plan, &resolver, &loader, &StageSink::default()).unwrap_err();
    assert!(matches!(err, MeasureError::NoTokenizers { failed } if failed.len() == 1));
}
