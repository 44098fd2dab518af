// src/records/store.rs
// =============================================================================
// A directory of JSON documents, one per company.
//
// Loading is forgiving: a document that cannot be read or lacks its identity
// fields is logged and skipped so one bad file never blocks the whole batch.
// Saving is strict: the caller gets the error and decides what to do.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::SiteRecord;
use crate::error::ScoutError;

// The seam the batch drivers write through
//
// Send + Sync so the search workers can share one store by reference.
pub trait RecordStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<SiteRecord>, ScoutError>;
    fn save(&self, record: &SiteRecord) -> Result<(), ScoutError>;
}

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RecordStore for JsonDirStore {
    fn load_all(&self) -> Result<Vec<SiteRecord>, ScoutError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| ScoutError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Sorted so batch runs visit companies in a stable order
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match load_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "skipping record"),
            }
        }

        debug!(dir = %self.dir.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    fn save(&self, record: &SiteRecord) -> Result<(), ScoutError> {
        let path = record.document_path(&self.dir);
        let json = serde_json::to_string_pretty(record).map_err(|e| ScoutError::RecordValidation {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, json).map_err(|source| ScoutError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(company = %record.name, path = %path.display(), "saved record");
        Ok(())
    }
}

// Reads a single document and remembers where it came from
pub fn load_record(path: &Path) -> Result<SiteRecord, ScoutError> {
    let text = fs::read_to_string(path).map_err(|source| ScoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut record: SiteRecord =
        serde_json::from_str(&text).map_err(|e| ScoutError::RecordValidation {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if record.name.trim().is_empty() || record.kvk.trim().is_empty() {
        return Err(ScoutError::RecordValidation {
            path: path.to_path_buf(),
            message: "both 'name' and 'kvk' must be provided".to_string(),
        });
    }

    record.file_path = Some(path.to_path_buf());
    Ok(record)
}
