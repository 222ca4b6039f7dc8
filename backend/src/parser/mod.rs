//! Raw source readers.
//!
//! Turns files into loosely typed rows (JSON objects keyed by column header).
//! No sales-specific logic here; typing happens in [`crate::store`].
//!
//! | Extension                       | Reader                   |
//! |---------------------------------|--------------------------|
//! | `.xlsx` `.xlsm` `.xlsb` `.xls` `.ods` | [`spreadsheet`]   |
//! | `.csv` `.tsv` `.txt`            | [`delimited`]            |
//! | `.json`                         | [`json`]                 |

pub mod delimited;
pub mod json;
pub mod spreadsheet;

use serde_json::Value;
use std::path::Path;

use crate::error::{SourceError, SourceResult};

pub use delimited::{decode_content, detect_delimiter, detect_encoding, parse_bytes_auto};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows as JSON objects
    pub records: Vec<Value>,
    /// Column headers, in source order
    pub headers: Vec<String>,
    /// Detected text encoding (text sources only)
    pub encoding: Option<String>,
    /// Detected delimiter (delimited sources only)
    pub delimiter: Option<char>,
}

/// Supported file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Delimited,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "csv" | "tsv" | "txt" => Ok(Self::Delimited),
            "json" => Ok(Self::Json),
            "" => Err(SourceError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
            other => Err(SourceError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Parse a single file, dispatching on its extension.
pub fn parse_path(path: &Path) -> SourceResult<ParseResult> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Spreadsheet => spreadsheet::parse_workbook(path),
        SourceFormat::Delimited => delimited::parse_file_auto(path),
        SourceFormat::Json => json::parse_file(path),
    }
}
