//! Per-event-type JSON collections on disk
//!
//! Each event type owns one file, `<encoded event type>.json`, holding a JSON array of records.
//! Every append is a full read-modify-write of that file:
//!
//! - missing file: start from an empty array
//! - unparsable file: start from an empty array (prior bytes are lost)
//! - single JSON object: wrap it as a one-element array
//! - any other JSON value: discard it and start from an empty array
//!
//! Writes go to a temp file that is renamed over the collection, so a crash leaves either
//! the old or the new collection. There is no locking; one writer per directory is assumed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Record;
use crate::utils::{collection_file_name, event_type_from_file_name};

const COLLECTION_EXTENSION: &str = "json";

/// Shape of a collection file before it was normalized for an append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorShape {
    Absent,
    Sequence { len: usize },
    SingleObject,
    Corrupt,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub path: PathBuf,
    pub prior: PriorShape,
    pub appended: usize,
    /// Collection length after the write
    pub len: usize,
}

/// Directory of per-event-type collections
#[derive(Debug, Clone)]
pub struct EventStore {
    root: PathBuf,
}

impl EventStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the collection for `event_type`. Deterministic, one file per event type.
    pub fn collection_path(&self, event_type: &str) -> PathBuf {
        self.root.join(format!("{}.{}", collection_file_name(event_type), COLLECTION_EXTENSION))
    }

    /// Current collection for `event_type`, normalized to a sequence
    ///
    /// # Errors
    ///
    /// Only I/O failures other than a missing file are errors; bad content is normalized.
    pub fn load(&self, event_type: &str) -> Result<(Vec<Value>, PriorShape)> {
        let path = self.collection_path(event_type);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok((Vec::new(), PriorShape::Absent));
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read collection: {}", path.display()));
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(items)) => {
                let len = items.len();
                Ok((items, PriorShape::Sequence { len }))
            }
            Ok(object @ Value::Object(_)) => {
                debug!(path = %path.display(), "Wrapping single-object collection in an array");
                Ok((vec![object], PriorShape::SingleObject))
            }
            Ok(_) => {
                warn!(
                    path = %path.display(),
                    "Collection is neither an array nor an object, discarding it"
                );
                Ok((Vec::new(), PriorShape::Discarded))
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Collection is corrupt, starting from an empty collection"
                );
                Ok((Vec::new(), PriorShape::Corrupt))
            }
        }
    }

    /// Append one record to the collection for `event_type`
    pub fn append(&self, event_type: &str, record: &Record) -> Result<AppendOutcome> {
        self.append_all(event_type, [record])
    }

    /// Append records in order with a single rewrite.
    ///
    /// Equivalent to calling [`EventStore::append`] once per record.
    pub fn append_all<'r, I>(&self, event_type: &str, records: I) -> Result<AppendOutcome>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let (mut items, prior) = self.load(event_type)?;
        let before = items.len();
        items.extend(records.into_iter().map(|record| Value::Object(record.clone())));
        let appended = items.len() - before;

        let path = self.collection_path(event_type);
        self.write_collection(&path, &items)?;

        Ok(AppendOutcome { path, prior, appended, len: items.len() })
    }

    /// Event types with a collection in this store, sorted
    pub fn event_types(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read collections directory: {}", self.root.display())
                });
            }
        };

        let mut event_types = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(COLLECTION_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                event_types.push(event_type_from_file_name(stem));
            }
        }
        event_types.sort();
        Ok(event_types)
    }

    fn write_collection(&self, path: &Path, items: &[Value]) -> Result<()> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create collections directory: {}", self.root.display())
        })?;

        // Write atomically (temp file + rename)
        let file_name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        let temp = self.root.join(format!(".{}.tmp", file_name));
        let json = serde_json::to_vec_pretty(items).context("Failed to serialize collection")?;
        fs::write(&temp, json)
            .with_context(|| format!("Failed to write collection temp file: {}", temp.display()))?;
        fs::rename(&temp, path)
            .with_context(|| format!("Failed to replace collection: {}", path.display()))?;

        Ok(())
    }
}
