//! JSON record reader.
//!
//! Accepts an array of flat objects, the shape key-value stores hand back.

use serde_json::Value;
use std::path::Path;

use super::ParseResult;
use crate::error::{SourceError, SourceResult};

/// Parse a JSON array of objects.
pub fn parse_records(content: &str) -> SourceResult<ParseResult> {
    let value: Value = serde_json::from_str(content)?;
    records_from_value(value)
}

/// Read and parse a JSON file.
pub fn parse_file(path: &Path) -> SourceResult<ParseResult> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}

/// Validate that `value` is an array of objects and collect the header union.
pub fn records_from_value(value: Value) -> SourceResult<ParseResult> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(SourceError::NotRecordArray(describe(&other).to_string())),
    };

    let mut headers: Vec<String> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(SourceError::NotRecordArray(format!(
                "item {} is {}",
                i,
                describe(item)
            )));
        };
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    Ok(ParseResult {
        records: items,
        headers,
        encoding: Some("utf-8".to_string()),
        delimiter: None,
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
