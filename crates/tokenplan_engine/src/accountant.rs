use engine_logging::{engine_debug, engine_warn};
use tokenplan_core::AccountingResult;

use crate::token::LoadedTokenizer;
use crate::{EngineEvent, ProgressSink};

/// Runs every sample through every owned tokenizer and tallies the results.
#[derive(Debug)]
pub struct Accountant {
    tokenizers: Vec<LoadedTokenizer>,
}

impl Accountant {
    pub fn new(tokenizers: Vec<LoadedTokenizer>) -> Self {
        Self { tokenizers }
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.tokenizers.iter().map(LoadedTokenizer::name)
    }

    /// Byte totals are fixed before any tokenization. A failure increments the
    /// tokenizer's error count and never stops other samples or tokenizers.
    pub fn account(&self, samples: &[String], sink: &dyn ProgressSink) -> AccountingResult {
        let total_bytes: u64 = samples.iter().map(|s| s.len() as u64).sum();
        let mut result = AccountingResult::new(total_bytes, samples.len(), self.model_names());

        let mut processed_bytes = 0u64;
        for (index, sample) in samples.iter().enumerate() {
            for (tokenizer, tally) in self.tokenizers.iter().zip(result.models.iter_mut()) {
                match tokenizer.count(sample) {
                    Ok(tokens) => tally.record_success(tokens),
                    Err(err) => {
                        engine_debug!("Sample {} failed for {:?}: {}", index, tokenizer.name(), err);
                        tally.record_failure();
                    }
                }
            }
            processed_bytes += sample.len() as u64;
            sink.emit(EngineEvent::Tokenizing {
                processed_bytes,
                total_bytes,
            });
        }

        for tally in result.models.iter().filter(|t| t.error_count > 0) {
            engine_warn!(
                "{:?} failed on {} of {} samples",
                tally.name,
                tally.error_count,
                result.sample_count
            );
        }
        result
    }
}
