//! JSON Schema validation for incoming filter selections.
//!
//! The schema is embedded at compile time from
//! `schemas/pivot-selection.json` and compiled once (draft 7).
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use salesboard::validation::validate_selection;
//!
//! assert!(validate_selection(&json!({ "years": [2020] })).is_ok());
//! assert!(validate_selection(&json!({ "years": ["2020"] })).is_err());
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

static SELECTION_VALIDATOR: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/pivot-selection.json"))
        .expect("Invalid embedded schema");
    jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
});

/// Validate a selection body against the embedded selection schema.
///
/// Returns every error message, not just the first.
pub fn validate_selection(data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = SELECTION_VALIDATOR
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
