use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use tokenplan_core::BudgetConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reads and validates a YAML budget configuration.
pub fn load_config(path: &Path) -> Result<BudgetConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    engine_info!(
        "Loaded {} datasets and {} models from {:?}",
        config.datasets.len(),
        config.models.len(),
        path
    );
    Ok(config)
}

pub fn parse_config(text: &str) -> Result<BudgetConfig, ConfigError> {
    let config: BudgetConfig = serde_yaml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &BudgetConfig) -> Result<(), ConfigError> {
    for (index, dataset) in config.datasets.iter().enumerate() {
        if dataset.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "dataset #{} has an empty name",
                index + 1
            )));
        }
        if dataset.local_path.is_none() && dataset.dataset_id.is_none() {
            return Err(ConfigError::Invalid(format!(
                "dataset {:?} needs local_path or dataset_id",
                dataset.name
            )));
        }
    }

    let mut seen = HashSet::new();
    for (index, model) in config.models.iter().enumerate() {
        if model.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "model #{} has an empty name",
                index + 1
            )));
        }
        if !seen.insert(model.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "model {:?} is listed twice",
                model.name
            )));
        }
    }
    Ok(())
}
