use crate::duration::format_duration;
use crate::ModelDescriptor;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error("unknown model {0:?}")]
    UnknownModel(String),
    #[error("model {model:?} has no {method:?} fine-tune profile")]
    UnknownMethod { model: String, method: String },
    #[error("invalid throughput for {model:?}/{method:?}: {throughput}")]
    InvalidThroughput {
        model: String,
        method: String,
        throughput: String,
    },
    #[error("invalid world size for {model:?}/{method:?}: {world_size}")]
    InvalidWorldSize {
        model: String,
        method: String,
        world_size: u32,
    },
    #[error("token count and epochs must be positive (tokens {tokens}, epochs {epochs})")]
    InvalidSize { tokens: u64, epochs: u32 },
}

/// Estimated wall-clock time for one model and fine-tune method.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationEstimate {
    pub model_name: String,
    pub method: String,
    pub seconds: f64,
    pub worker_count: u32,
    /// Tokens per second per worker.
    pub throughput: f64,
    /// Tokens processed over all epochs.
    pub total_tokens: u64,
}

impl DurationEstimate {
    pub fn formatted(&self) -> String {
        format_duration(self.seconds)
    }

    /// Tokens the configured workers get through in one day.
    pub fn tokens_per_day(&self) -> f64 {
        self.throughput * f64::from(self.worker_count) * SECONDS_PER_DAY
    }
}

/// Converts token counts into training time using the literal per-model
/// throughput figures from the configuration. No efficiency discount is
/// applied on top of them.
#[derive(Debug, Clone, Copy)]
pub struct DurationEstimator<'a> {
    models: &'a [ModelDescriptor],
}

impl<'a> DurationEstimator<'a> {
    pub fn new(models: &'a [ModelDescriptor]) -> Self {
        Self { models }
    }

    pub fn estimate(
        &self,
        token_count: u64,
        model_name: &str,
        method: &str,
        epochs: u32,
    ) -> Result<DurationEstimate, EstimateError> {
        let model = self
            .models
            .iter()
            .find(|m| m.name == model_name && !m.is_all_option)
            .ok_or_else(|| EstimateError::UnknownModel(model_name.to_string()))?;

        let profile = model
            .method(method)
            .ok_or_else(|| EstimateError::UnknownMethod {
                model: model_name.to_string(),
                method: method.to_string(),
            })?;

        if !(profile.throughput.is_finite() && profile.throughput > 0.0) {
            return Err(EstimateError::InvalidThroughput {
                model: model_name.to_string(),
                method: method.to_string(),
                throughput: profile.throughput.to_string(),
            });
        }
        if profile.world_size == 0 {
            return Err(EstimateError::InvalidWorldSize {
                model: model_name.to_string(),
                method: method.to_string(),
                world_size: profile.world_size,
            });
        }
        if token_count == 0 || epochs == 0 {
            return Err(EstimateError::InvalidSize {
                tokens: token_count,
                epochs,
            });
        }

        let total_tokens = token_count.saturating_mul(u64::from(epochs));
        let rate = profile.throughput * f64::from(profile.world_size);
        let seconds = token_count as f64 * f64::from(epochs) / rate;

        Ok(DurationEstimate {
            model_name: model.name.clone(),
            method: method.to_string(),
            seconds,
            worker_count: profile.world_size,
            throughput: profile.throughput,
            total_tokens,
        })
    }
}
