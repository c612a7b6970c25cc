use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokenplan_engine::{load_config, ConfigError, ResourceResolver};

const CONFIG: &str = r#"
datasets:
  - name: sample
    local_path: data/sample.jsonl
  - name: hub-only
    dataset_id: org/corpus
models:
  - name: All models
    is_all_option: true
  - name: Qwen2.5-7B
    model_name: Qwen/Qwen2.5-7B
    full:
      throughput: 1200
      world_size: 8
    lora:
      throughput: 3000
  - name: Local
    local_path: tokenizers/local
"#;

#[test]
fn loads_config_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("budget.yaml");
    fs::write(&path, CONFIG).unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.datasets.len(), 2);
    assert_eq!(config.default_dataset().map(|d| d.name.as_str()), Some("sample"));
    let qwen = config.model("Qwen2.5-7B").unwrap();
    assert_eq!(qwen.method_names().collect::<Vec<_>>(), vec!["full", "lora"]);
    assert_eq!(qwen.method("lora").unwrap().world_size, 1);
}

#[test]
fn missing_config_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let err = load_config(&temp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn relative_paths_resolve_beside_the_config_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("budget.yaml");
    fs::create_dir(temp.path().join("data")).unwrap();
    fs::write(temp.path().join("data/sample.jsonl"), "").unwrap();

    let resolver = ResourceResolver::for_config(&config_path);

    assert_eq!(resolver.working_dir(), temp.path());
    assert_eq!(
        resolver.resolve("data/sample.jsonl".as_ref()),
        temp.path().join("data/sample.jsonl")
    );
}

#[test]
fn bundle_root_is_consulted_when_working_dir_lacks_the_file() {
    let work = TempDir::new().unwrap();
    let bundle = TempDir::new().unwrap();
    fs::write(bundle.path().join("bundled.txt"), "x").unwrap();
    fs::write(work.path().join("both.txt"), "x").unwrap();
    fs::write(bundle.path().join("both.txt"), "x").unwrap();

    let resolver = ResourceResolver::new(work.path(), Some(bundle.path().to_path_buf()));

    assert_eq!(
        resolver.resolve("bundled.txt".as_ref()),
        bundle.path().join("bundled.txt")
    );
    assert_eq!(resolver.resolve("both.txt".as_ref()), work.path().join("both.txt"));
    assert_eq!(resolver.resolve("nowhere.txt".as_ref()), work.path().join("nowhere.txt"));
    assert_eq!(
        resolver.resolve(bundle.path().join("bundled.txt").as_path()),
        bundle.path().join("bundled.txt")
    );
}
