use serde::{Deserialize, Serialize};

/// Per-tokenizer totals over one corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTally {
    pub name: String,
    pub total_tokens: u64,
    pub error_count: u64,
}

impl ModelTally {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_tokens: 0,
            error_count: 0,
        }
    }

    pub fn record_success(&mut self, tokens: usize) {
        self.total_tokens += tokens as u64;
    }

    pub fn record_failure(&mut self) {
        self.error_count += 1;
    }

    /// Bytes per token, or `None` when nothing was tokenized.
    pub fn compression_ratio(&self, total_bytes: u64) -> Option<f64> {
        if self.total_tokens == 0 {
            None
        } else {
            Some(total_bytes as f64 / self.total_tokens as f64)
        }
    }
}

/// Byte and token statistics for one corpus.
///
/// `total_bytes` and `sample_count` are fixed when the result is created and
/// do not depend on how any tokenizer fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingResult {
    pub total_bytes: u64,
    pub sample_count: usize,
    pub models: Vec<ModelTally>,
}

impl AccountingResult {
    pub fn new<I, S>(total_bytes: u64, sample_count: usize, model_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            total_bytes,
            sample_count,
            models: model_names.into_iter().map(ModelTally::new).collect(),
        }
    }

    pub fn model(&self, name: &str) -> Option<&ModelTally> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Token totals in model order, the input shape of [`crate::scale`].
    pub fn token_counts(&self) -> Vec<(String, u64)> {
        self.models
            .iter()
            .map(|m| (m.name.clone(), m.total_tokens))
            .collect()
    }
}
