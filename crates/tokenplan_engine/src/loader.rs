use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use tokenplan_core::ModelDescriptor;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher, TOKENIZER_FILE};
use crate::resource::ResourceResolver;
use crate::token::{HfTokenCounter, LoadedTokenizer};
use crate::{FetchError, ProgressSink};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("model {model:?} has neither a local tokenizer nor a remote model name")]
    NoSource { model: String },
    #[error("failed to fetch tokenizer for {model:?}: {source}")]
    Fetch {
        model: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to parse tokenizer for {model:?} from {origin}: {message}")]
    Parse {
        model: String,
        origin: String,
        message: String,
    },
}

/// Turns a model descriptor into a ready tokenizer.
pub trait TokenizerLoader {
    fn load(
        &self,
        model: &ModelDescriptor,
        sink: &dyn ProgressSink,
    ) -> Result<LoadedTokenizer, LoadError>;
}

/// Loads `tokenizer.json` from the descriptor's local path when present,
/// otherwise downloads it from the hub by remote model name.
pub struct HubTokenizerLoader {
    resolver: ResourceResolver,
    fetcher: Arc<dyn Fetcher>,
    settings: FetchSettings,
    runtime: tokio::runtime::Runtime,
}

impl HubTokenizerLoader {
    pub fn new(resolver: ResourceResolver, settings: FetchSettings) -> io::Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.clone()));
        Self::with_fetcher(resolver, settings, fetcher)
    }

    pub fn with_fetcher(
        resolver: ResourceResolver,
        settings: FetchSettings,
        fetcher: Arc<dyn Fetcher>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            resolver,
            fetcher,
            settings,
            runtime,
        })
    }

    fn local_definition(&self, local_path: &Path) -> Option<PathBuf> {
        let path = self.resolver.resolve(local_path);
        if path.is_dir() {
            let candidate = path.join(TOKENIZER_FILE);
            return candidate.is_file().then_some(candidate);
        }
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        (path.is_file() && is_json).then_some(path)
    }

    fn load_from_disk(
        &self,
        model: &ModelDescriptor,
        path: &Path,
    ) -> Result<LoadedTokenizer, LoadError> {
        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|err| LoadError::Parse {
            model: model.name.clone(),
            origin: path.display().to_string(),
            message: err.to_string(),
        })?;
        engine_info!("Loaded tokenizer for {:?} from {:?}", model.name, path);
        Ok(LoadedTokenizer::new(
            model.name.clone(),
            Box::new(HfTokenCounter::new(tokenizer)),
        ))
    }

    fn load_from_hub(
        &self,
        model: &ModelDescriptor,
        model_id: &str,
        sink: &dyn ProgressSink,
    ) -> Result<LoadedTokenizer, LoadError> {
        let url = self.settings.tokenizer_url(model_id);
        let output = self
            .runtime
            .block_on(self.fetcher.fetch(&model.name, &url, sink))
            .map_err(|source| LoadError::Fetch {
                model: model.name.clone(),
                source,
            })?;
        let tokenizer =
            tokenizers::Tokenizer::from_bytes(&output.bytes).map_err(|err| LoadError::Parse {
                model: model.name.clone(),
                origin: output.final_url.clone(),
                message: err.to_string(),
            })?;
        engine_info!(
            "Fetched tokenizer for {:?} from {} ({} bytes)",
            model.name,
            output.final_url,
            output.bytes.len()
        );
        Ok(LoadedTokenizer::new(
            model.name.clone(),
            Box::new(HfTokenCounter::new(tokenizer)),
        ))
    }
}

impl TokenizerLoader for HubTokenizerLoader {
    fn load(
        &self,
        model: &ModelDescriptor,
        sink: &dyn ProgressSink,
    ) -> Result<LoadedTokenizer, LoadError> {
        if model.trust_remote_code {
            engine_warn!(
                "{:?} asks for trust_remote_code; only the tokenizer definition is loaded",
                model.name
            );
        }

        if let Some(local_path) = model.local_path.as_deref() {
            match self.local_definition(local_path) {
                Some(path) => return self.load_from_disk(model, &path),
                None => engine_info!(
                    "No {} under {:?} for {:?}, trying the hub",
                    TOKENIZER_FILE,
                    local_path,
                    model.name
                ),
            }
        }

        match model.model_name.as_deref() {
            Some(model_id) => self.load_from_hub(model, model_id, sink),
            None => Err(LoadError::NoSource {
                model: model.name.clone(),
            }),
        }
    }
}

/// Outcome of loading every planned model.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedTokenizer>,
    pub failed: Vec<(String, LoadError)>,
}

/// Loads each model in turn; a failure only excludes that model.
pub fn load_all(
    models: &[&ModelDescriptor],
    loader: &dyn TokenizerLoader,
    sink: &dyn ProgressSink,
) -> LoadReport {
    let mut report = LoadReport::default();
    for model in models {
        match loader.load(model, sink) {
            Ok(tokenizer) => report.loaded.push(tokenizer),
            Err(err) => {
                engine_warn!("Skipping {:?}: {}", model.name, err);
                report.failed.push((model.name.clone(), err));
            }
        }
    }
    report
}
