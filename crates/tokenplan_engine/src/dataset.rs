use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use serde_json::Value;
use tokenplan_core::DatasetDescriptor;

use crate::decode::{decode_text, DecodeError};
use crate::extract::{HeuristicExtractor, RecordExtractor};
use crate::resource::ResourceResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// One JSON record per line (`.jsonl`).
    JsonLines,
    /// A single JSON document (`.json`).
    JsonDocument,
    /// One sample per line (`.txt`).
    PlainText,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" => Some(Self::JsonLines),
            "json" => Some(Self::JsonDocument),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Reads the samples of a configured dataset, resolving its local path.
///
/// Descriptors that only name a remote dataset are reported as unavailable.
pub fn load_dataset(
    dataset: &DatasetDescriptor,
    resolver: &ResourceResolver,
) -> Result<(PathBuf, Vec<String>), ExtractError> {
    let Some(local_path) = dataset.local_path.as_deref() else {
        let source = dataset.dataset_id.as_deref().unwrap_or("no source");
        return Err(ExtractError::DatasetUnavailable(format!(
            "{} ({source}) has no local copy",
            dataset.name
        )));
    };
    let path = resolver.resolve(local_path);
    let samples = extract_samples(&path)?;
    engine_info!(
        "Loaded {} samples from dataset {:?} at {:?}",
        samples.len(),
        dataset.name,
        path
    );
    Ok((path, samples))
}

pub fn extract_samples(path: &Path) -> Result<Vec<String>, ExtractError> {
    extract_samples_with(path, &HeuristicExtractor)
}

/// Turns one dataset file into an ordered list of text samples.
pub fn extract_samples_with(
    path: &Path,
    extractor: &dyn RecordExtractor,
) -> Result<Vec<String>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::DatasetUnavailable(path.display().to_string()));
    }
    if !path.is_file() {
        return Err(ExtractError::UnsupportedFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let format = DatasetFormat::from_path(path).ok_or_else(|| {
        ExtractError::UnsupportedFormat(format!("unrecognized extension: {}", path.display()))
    })?;

    let bytes = fs::read(path)?;
    let decoded = decode_text(&bytes)?;
    engine_debug!(
        "Decoded {:?} as {} ({} bytes)",
        path,
        decoded.encoding_label,
        bytes.len()
    );

    match format {
        DatasetFormat::JsonLines => Ok(samples_from_json_lines(&decoded.text, extractor)),
        DatasetFormat::JsonDocument => samples_from_json_document(&decoded.text, extractor),
        DatasetFormat::PlainText => Ok(split_lines(&decoded.text)),
    }
}

/// Splits on every Unicode line boundary, `\r\n` counting as one. A final
/// break does not start another line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(end) = rest.find(is_line_break) {
        lines.push(rest[..end].to_string());
        let width = if rest[end..].starts_with("\r\n") {
            2
        } else {
            rest[end..].chars().next().map_or(1, char::len_utf8)
        };
        rest = &rest[end + width..];
    }
    if !rest.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Every non-empty line yields exactly one sample: the extracted text, the
/// compact record when nothing is extractable, or the raw line when it is not
/// valid JSON.
fn samples_from_json_lines(text: &str, extractor: &dyn RecordExtractor) -> Vec<String> {
    let mut malformed = 0usize;
    let samples: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match serde_json::from_str::<Value>(line) {
            Ok(record) => extractor
                .extract(&record)
                .unwrap_or_else(|| record.to_string()),
            Err(_) => {
                malformed += 1;
                line.to_string()
            }
        })
        .collect();
    if malformed > 0 {
        engine_info!("{} malformed JSONL lines kept as raw text", malformed);
    }
    samples
}

fn samples_from_json_document(
    text: &str,
    extractor: &dyn RecordExtractor,
) -> Result<Vec<String>, ExtractError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|err| ExtractError::UnsupportedFormat(format!("invalid JSON document: {err}")))?;
    match document {
        Value::Array(items) => Ok(items.iter().filter_map(|item| extractor.extract(item)).collect()),
        Value::Object(_) => Ok(extractor.extract(&document).into_iter().collect()),
        other => Err(ExtractError::UnsupportedFormat(format!(
            "top-level JSON {} is neither a list nor an object",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
