use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn};
use tokenplan_core::{AccountingResult, DatasetDescriptor, SelectionPlan};

use crate::accountant::Accountant;
use crate::dataset::{load_dataset, ExtractError};
use crate::loader::{load_all, LoadError, TokenizerLoader};
use crate::resource::ResourceResolver;
use crate::{EngineEvent, ProgressSink, Stage};

#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("cannot read dataset: {0}")]
    Extract(#[from] ExtractError),
    #[error("no tokenizer could be loaded")]
    NoTokenizers { failed: Vec<(String, LoadError)> },
}

/// Result of measuring one dataset against the selected tokenizers.
#[derive(Debug)]
pub struct Measurement {
    pub dataset_path: PathBuf,
    pub accounting: AccountingResult,
    /// Models whose tokenizer failed to load, with the cause.
    pub failed: Vec<(String, LoadError)>,
    /// Models left out because they need authentication.
    pub skipped_auth: Vec<String>,
}

/// Extract, load, account. Extraction runs first so a broken dataset never
/// triggers tokenizer downloads.
pub fn measure(
    dataset: &DatasetDescriptor,
    plan: &SelectionPlan<'_>,
    resolver: &ResourceResolver,
    loader: &dyn TokenizerLoader,
    sink: &dyn ProgressSink,
) -> Result<Measurement, MeasureError> {
    sink.emit(EngineEvent::Stage(Stage::Extracting));
    let (dataset_path, samples) = load_dataset(dataset, resolver)?;
    if samples.is_empty() {
        engine_warn!("Dataset {:?} produced no samples", dataset.name);
    }

    for model in &plan.skipped_auth {
        engine_info!("Skipping {:?}: authentication required", model.name);
    }

    sink.emit(EngineEvent::Stage(Stage::Loading));
    let report = load_all(&plan.load, loader, sink);
    if report.loaded.is_empty() {
        sink.emit(EngineEvent::Stage(Stage::Done));
        return Err(MeasureError::NoTokenizers {
            failed: report.failed,
        });
    }

    sink.emit(EngineEvent::Stage(Stage::Tokenizing));
    let accountant = Accountant::new(report.loaded);
    let accounting = accountant.account(&samples, sink);
    sink.emit(EngineEvent::Stage(Stage::Done));

    Ok(Measurement {
        dataset_path,
        accounting,
        failed: report.failed,
        skipped_auth: plan.skipped_auth.iter().map(|m| m.name.clone()).collect(),
    })
}
