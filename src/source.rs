//! Content-source collaborators.
//!
//! The registry places no constraint on where modules physically live; it
//! consumes fully-materialized [ContentRecord]s through the [ContentSource]
//! trait. All I/O belongs here. A module that fails to deserialize becomes a
//! `MODULE_PARSE` finding in the batch rather than aborting the scan — only
//! genuine I/O failures surface as `Err`.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::{error::DidactError, record::ContentRecord, validate::Finding};

/// The result of one load pass: the records that materialized plus findings
/// for the modules that did not.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub records: Vec<ContentRecord>,
    pub findings: Vec<Finding>,
}

/// Uniform loading interface between storage and the registry.
pub trait ContentSource {
    fn load(&self) -> Result<SourceBatch, DidactError>;
}

/// Records already materialized by the embedding application.
#[derive(Debug, Clone, Default)]
pub struct MemorySource(pub Vec<ContentRecord>);

impl ContentSource for MemorySource {
    fn load(&self) -> Result<SourceBatch, DidactError> {
        Ok(SourceBatch {
            records: self.0.clone(),
            findings: Vec::new(),
        })
    }
}

/// Recursively scans a directory for `*.toml` modules, one record per file.
#[derive(Debug, Clone)]
pub struct TomlDirSource {
    root: PathBuf,
}

impl TomlDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TomlDirSource { root: root.into() }
    }
}

impl ContentSource for TomlDirSource {
    fn load(&self) -> Result<SourceBatch, DidactError> {
        scan_modules(&self.root, "toml", |text| {
            toml::from_str::<ContentRecord>(text).map_err(|e| e.to_string())
        })
    }
}

/// Recursively scans a directory for `*.json` modules, one record per file.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonDirSource { root: root.into() }
    }
}

impl ContentSource for JsonDirSource {
    fn load(&self) -> Result<SourceBatch, DidactError> {
        scan_modules(&self.root, "json", |text| {
            serde_json::from_str::<ContentRecord>(text).map_err(|e| e.to_string())
        })
    }
}

fn scan_modules(
    root: &Path,
    extension: &str,
    parse: impl Fn(&str) -> Result<ContentRecord, String>,
) -> Result<SourceBatch, DidactError> {
    if !root.is_dir() {
        return Err(DidactError::Source(format!(
            "content root {root:?} is not a directory"
        )));
    }

    let mut batch = SourceBatch::default();
    // Sorted traversal keeps batch order (and thus report order) stable
    // across platforms.
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let text = read_to_string(path)?;
        match parse(&text) {
            Ok(record) => {
                tracing::debug!("[source::scan_modules] Loaded {path:?}");
                batch.records.push(record);
            }
            Err(message) => {
                tracing::warn!("[source::scan_modules] Failed to parse {path:?}: {message}");
                batch
                    .findings
                    .push(Finding::parse_failure(path.display().to_string(), message));
            }
        }
    }

    tracing::info!(
        "[source::scan_modules] {} modules loaded, {} failed under {root:?}",
        batch.records.len(),
        batch.findings.len()
    );
    Ok(batch)
}
