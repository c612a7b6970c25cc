use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

/// A dataset entry from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Remote dataset identifier, used when no local copy is configured.
    #[serde(default)]
    pub dataset_id: Option<String>,
}

impl DatasetDescriptor {
    pub fn local(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: Some(path.into()),
            dataset_id: None,
        }
    }
}

/// Throughput profile of one fine-tune method for one model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodProfile {
    /// Tokens per second per worker.
    #[serde(default)]
    pub throughput: f64,
    #[serde(default = "default_world_size")]
    pub world_size: u32,
}

fn default_world_size() -> u32 {
    1
}

/// A model entry from the configuration file.
///
/// Fine-tune methods are keys of the model mapping itself, e.g.
/// `full: { throughput: 1200, world_size: 8 }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Directory holding `tokenizer.json`, or the file itself.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Remote identifier used to fetch the tokenizer.
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub trust_remote_code: bool,
    #[serde(default)]
    pub auth_required: bool,
    /// Marks the "all models" placeholder entry.
    #[serde(default)]
    pub is_all_option: bool,
    #[serde(flatten, deserialize_with = "deserialize_methods")]
    pub methods: BTreeMap<String, MethodProfile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodEntry {
    Profile(MethodProfile),
    Other(IgnoredAny),
}

fn deserialize_methods<'de, D>(deserializer: D) -> Result<BTreeMap<String, MethodProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, MethodEntry>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            MethodEntry::Profile(profile) => Some((key, profile)),
            MethodEntry::Other(_) => None,
        })
        .collect())
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_path: None,
            model_name: None,
            trust_remote_code: false,
            auth_required: false,
            is_all_option: false,
            methods: BTreeMap::new(),
        }
    }

    /// The "all models" placeholder entry.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            is_all_option: true,
            ..Self::new(name)
        }
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn with_auth_required(mut self) -> Self {
        self.auth_required = true;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>, throughput: f64, world_size: u32) -> Self {
        self.methods.insert(
            method.into(),
            MethodProfile {
                throughput,
                world_size,
            },
        );
        self
    }

    pub fn method(&self, method: &str) -> Option<&MethodProfile> {
        self.methods.get(method)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

/// Immutable configuration produced by one explicit load step.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BudgetConfig {
    #[serde(default)]
    pub datasets: Vec<DatasetDescriptor>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl BudgetConfig {
    /// The first configured dataset is the default measurement corpus.
    pub fn default_dataset(&self) -> Option<&DatasetDescriptor> {
        self.datasets.first()
    }

    /// Finds a dataset by exact name or 1-based index.
    pub fn find_dataset(&self, key: &str) -> Option<&DatasetDescriptor> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| self.datasets.get(i));
        }
        self.datasets.iter().find(|d| d.name == key)
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }
}
