//! Tokenplan engine: dataset extraction, tokenizer loading and accounting.
mod accountant;
mod config;
mod dataset;
mod decode;
mod extract;
mod fetch;
mod loader;
mod pipeline;
mod resource;
mod store;
mod token;
mod types;

pub use accountant::Accountant;
pub use config::{load_config, parse_config, ConfigError};
pub use dataset::{
    extract_samples, extract_samples_with, load_dataset, DatasetFormat, ExtractError,
};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use extract::{extract_text, HeuristicExtractor, RecordExtractor};
pub use fetch::{FetchOutput, FetchSettings, Fetcher, ReqwestFetcher, TOKENIZER_FILE};
pub use loader::{load_all, HubTokenizerLoader, LoadError, LoadReport, TokenizerLoader};
pub use pipeline::{measure, MeasureError, Measurement};
pub use resource::ResourceResolver;
pub use store::{ensure_output_dir, report_filename, MeasurementRecord, PersistError, ReportStore};
pub use token::{HfTokenCounter, LoadedTokenizer, TokenCounter, TokenizeError};
pub use types::{EngineEvent, FailureKind, FetchError, NullProgressSink, ProgressSink, Stage};
