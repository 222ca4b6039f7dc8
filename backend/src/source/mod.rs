//! Where records come from.
//!
//! A [`RecordSource`] is either a single file (spreadsheet, CSV, JSON) or a
//! directory acting as a keyed JSON batch store.

pub mod batches;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SourceResult;
use crate::parser::{parse_path, ParseResult};

pub use batches::{collect_batches, BatchSource, JsonDirStore};

/// Location of the raw sales data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// A single file, read by extension.
    File(PathBuf),
    /// A directory of `*.json` batches.
    BatchDir(PathBuf),
}

impl RecordSource {
    /// Directories are batch stores, everything else is a file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_dir() {
            Self::BatchDir(path.to_path_buf())
        } else {
            Self::File(path.to_path_buf())
        }
    }

    /// Read every raw row from the source.
    pub fn read(&self) -> SourceResult<ParseResult> {
        match self {
            Self::File(path) => parse_path(path),
            Self::BatchDir(dir) => {
                let mut store = JsonDirStore::open(dir)?;
                collect_batches(&mut store)
            }
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::BatchDir(p) => write!(f, "{} (json batches)", p.display()),
        }
    }
}
