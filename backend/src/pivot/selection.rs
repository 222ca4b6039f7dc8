//! Query-boundary selection: four optional lists of untyped values.
//!
//! [`SelectionRequest`] is what clients send. [`SelectionRequest::to_selection`]
//! type-checks every entry and produces the typed [`FilterSelection`]; any
//! malformed entry rejects the whole query with
//! [`QueryError::InvalidSelection`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::{QueryError, QueryResult};
use crate::models::FilterSelection;
use crate::validation::validate_selection;

/// Untyped filter selection as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectionRequest {
    #[serde(default)]
    pub manufacturers: Option<Vec<Value>>,
    #[serde(default)]
    pub years: Option<Vec<Value>>,
    #[serde(default)]
    pub countries: Option<Vec<Value>>,
    #[serde(default)]
    pub types: Option<Vec<Value>>,
}

impl SelectionRequest {
    /// Parse a raw JSON body, checking it against the selection schema first.
    pub fn from_json(body: &Value) -> QueryResult<Self> {
        validate_selection(body).map_err(|errors| QueryError::InvalidSelection { errors })?;
        serde_json::from_value(body.clone()).map_err(|e| QueryError::invalid(e.to_string()))
    }

    /// Build a request from an already typed selection.
    pub fn from_selection(selection: &FilterSelection) -> Self {
        fn list<T: Clone + Into<Value>>(values: &BTreeSet<T>) -> Option<Vec<Value>> {
            (!values.is_empty()).then(|| values.iter().cloned().map(Into::into).collect())
        }

        Self {
            manufacturers: list(&selection.manufacturers),
            years: list(&selection.years),
            countries: list(&selection.countries),
            types: list(&selection.types),
        }
    }

    /// Type-check every entry. All errors are reported together.
    pub fn to_selection(&self) -> QueryResult<FilterSelection> {
        let mut errors = Vec::new();

        let selection = FilterSelection {
            manufacturers: collect("manufacturers", &self.manufacturers, as_text, &mut errors),
            years: collect("years", &self.years, as_year, &mut errors),
            countries: collect("countries", &self.countries, as_text, &mut errors),
            types: collect("types", &self.types, as_text, &mut errors),
        };

        if errors.is_empty() {
            Ok(selection)
        } else {
            Err(QueryError::InvalidSelection { errors })
        }
    }
}

fn collect<T: Ord>(
    field: &str,
    values: &Option<Vec<Value>>,
    convert: fn(&Value) -> Result<T, String>,
    errors: &mut Vec<String>,
) -> BTreeSet<T> {
    let mut out = BTreeSet::new();
    for (i, value) in values.iter().flatten().enumerate() {
        match convert(value) {
            Ok(v) => {
                out.insert(v);
            }
            Err(expected) => errors.push(format!("{}[{}]: expected {}, got {}", field, i, expected, value)),
        }
    }
    out
}

fn as_text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "a string".to_string())
}

fn as_year(value: &Value) -> Result<i64, String> {
    if let Some(year) = value.as_i64() {
        return Ok(year);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        _ => Err("an integer year".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_lists_are_unrestricted() {
        let request = SelectionRequest::from_json(&json!({ "years": null })).unwrap();
        assert!(request.to_selection().unwrap().is_unrestricted());
    }

    #[test]
    fn test_typed_selection() {
        let request = SelectionRequest::from_json(&json!({
            "manufacturers": ["A", "B", "A"],
            "years": [2020, 2021],
            "types": ["X"]
        }))
        .unwrap();
        let selection = request.to_selection().unwrap();

        assert_eq!(selection.manufacturers.len(), 2);
        assert!(selection.years.contains(&2021));
        assert!(selection.countries.is_empty());
    }

    #[test]
    fn test_wrong_types_collect_all_errors() {
        let request = SelectionRequest {
            manufacturers: Some(vec![json!("A"), json!(7)]),
            years: Some(vec![json!("2020"), json!(2020.5)]),
            ..Default::default()
        };
        let err = request.to_selection().unwrap_err();

        assert_eq!(err.messages().len(), 3);
        assert!(err.messages()[0].starts_with("manufacturers[1]"));
        assert!(err.to_string().contains("years[0]"));
    }

    #[test]
    fn test_schema_rejects_unknown_keys() {
        let err = SelectionRequest::from_json(&json!({ "brand": ["A"] })).unwrap_err();
        assert!(matches!(err, QueryError::InvalidSelection { .. }));
    }

    #[test]
    fn test_from_selection_round_trip() {
        let selection = FilterSelection::all()
            .with_countries(["BR"])
            .with_years([2020]);
        let request = SelectionRequest::from_selection(&selection);

        assert!(request.manufacturers.is_none());
        assert_eq!(request.to_selection().unwrap(), selection);
    }
}
