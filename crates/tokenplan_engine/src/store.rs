use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokenplan_core::AccountingResult;

const REPORT_EXTENSION: &str = "ron";
const MAX_STEM_BYTES: usize = 80;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot serialize measurement: {0}")]
    Serialize(#[from] ron::Error),
    #[error("cannot parse measurement {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// One accounting run, saved so estimates can be recomputed without
/// tokenizing the corpus again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub dataset_name: String,
    pub dataset_path: PathBuf,
    /// RFC 3339 UTC timestamp.
    pub measured_utc: String,
    pub accounting: AccountingResult,
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Saves measurement records as pretty RON under one directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the record atomically; a record for the same dataset path
    /// replaces the previous one.
    pub fn save(&self, record: &MeasurementRecord) -> Result<PathBuf, PersistError> {
        let content = ron::ser::to_string_pretty(record, ron::ser::PrettyConfig::new())?;
        let filename = report_filename(&record.dataset_name, &record.dataset_path);
        let target = self.write_atomic(&filename, &content)?;
        engine_info!("Saved measurement for {:?} to {:?}", record.dataset_name, target);
        Ok(target)
    }

    pub fn load(path: &Path) -> Result<MeasurementRecord, PersistError> {
        let content = fs::read_to_string(path)?;
        ron::from_str(&content).map_err(|err| PersistError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn write_atomic(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Windows-safe, deterministic name: `{sanitized_dataset}--{short_hash(path)}.ron`.
pub fn report_filename(dataset_name: &str, dataset_path: &Path) -> String {
    let stem = sanitize_stem(dataset_name);
    let hash = short_hash(&dataset_path.to_string_lossy());
    format!("{stem}--{hash}.{REPORT_EXTENSION}")
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut stem = compacted.trim_matches(&['_', '.'][..]).to_string();
    if stem.is_empty() {
        stem = "dataset".to_string();
    }
    if stem.len() > MAX_STEM_BYTES {
        let mut cut = MAX_STEM_BYTES;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        stem.truncate(cut);
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    use std::fmt::Write as _;

    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
