//! Batched JSON records from a keyed store.
//!
//! A key-value store hands back records as batches of JSON objects. The
//! [`BatchSource`] trait is the seam for any such store; [`JsonDirStore`]
//! is the on-disk variant where each key is a `<key>.json` file holding an
//! array of objects, read in key order.

use serde_json::Value;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_info, log_info_indent};
use crate::error::{SourceError, SourceResult};
use crate::parser::{json, ParseResult};

/// A store that yields records in batches until exhausted.
pub trait BatchSource {
    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;

    /// Fetch the next batch, or `None` when the store is exhausted.
    fn next_batch(&mut self) -> SourceResult<Option<Vec<Value>>>;
}

/// Directory of `*.json` batch files, one per key.
#[derive(Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
}

impl JsonDirStore {
    /// List the batch keys in `dir`, sorted by file name.
    pub fn open(dir: impl AsRef<Path>) -> SourceResult<Self> {
        let dir = dir.as_ref().to_path_buf();

        let mut keys: Vec<PathBuf> = fs::read_dir(&dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "json"))
            .collect();
        keys.sort();

        Ok(Self {
            dir,
            pending: keys.into(),
        })
    }

    /// Number of batches not yet fetched.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl BatchSource for JsonDirStore {
    fn describe(&self) -> String {
        format!("json batches in {}", self.dir.display())
    }

    fn next_batch(&mut self) -> SourceResult<Option<Vec<Value>>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let content = fs::read_to_string(&path)?;
        let parsed = json::parse_records(&content).map_err(|e| match e {
            SourceError::NotRecordArray(msg) => {
                SourceError::NotRecordArray(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        Ok(Some(parsed.records))
    }
}

/// Drain every batch from `source` into one parse result.
///
/// A batch that cannot be read fails the whole collection so that a
/// partial dataset is never served.
pub fn collect_batches<S: BatchSource>(source: &mut S) -> SourceResult<ParseResult> {
    log_info(format!("Fetching {}", source.describe()));

    let mut records = Vec::new();
    let mut batches = 0;
    while let Some(batch) = source.next_batch()? {
        batches += 1;
        log_info_indent(format!("batch {}: {} records", batches, batch.len()), 1);
        records.extend(batch);
    }
    json::records_from_value(Value::Array(records))
}
