//! Coercion of loosely typed rows into [`Record`]s.
//!
//! Never fails: a value that cannot be coerced becomes `None` and is
//! counted in the [`CoercionReport`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{
    Record, COL_COUNTRY, COL_MANUFACTURER, COL_MONTH, COL_TYPE, COL_VOLUME, COL_YEAR,
    COL_YEAR_ALIAS,
};

/// Counts of values that were present but could not be coerced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoercionReport {
    pub rows: usize,
    pub invalid_years: usize,
    pub invalid_months: usize,
    pub invalid_volumes: usize,
    /// Rows whose year came from the `Ano` column.
    pub aliased_years: usize,
}

impl CoercionReport {
    pub fn failures(&self) -> usize {
        self.invalid_years + self.invalid_months + self.invalid_volumes
    }
}

/// Coerce every row, collecting a report of recovered failures.
pub fn coerce_rows(rows: &[Value]) -> (Vec<Record>, CoercionReport) {
    let mut report = CoercionReport {
        rows: rows.len(),
        ..Default::default()
    };
    let empty = Map::new();

    let records = rows
        .iter()
        .map(|row| {
            let obj = row.as_object().unwrap_or(&empty);
            coerce_object(obj, &mut report)
        })
        .collect();

    (records, report)
}

/// Coerce a single row. Non-object rows yield an all-`None` record.
pub fn coerce_row(row: &Value) -> Record {
    let mut report = CoercionReport::default();
    match row.as_object() {
        Some(obj) => coerce_object(obj, &mut report),
        None => coerce_object(&Map::new(), &mut report),
    }
}

fn coerce_object(obj: &Map<String, Value>, report: &mut CoercionReport) -> Record {
    let raw_year = match obj.get(COL_YEAR).filter(|v| !is_blank(v)) {
        Some(v) => Some(v),
        None => {
            let alias = obj.get(COL_YEAR_ALIAS).filter(|v| !is_blank(v));
            if alias.is_some() {
                report.aliased_years += 1;
            }
            alias
        }
    };

    let year = coerce_counted(raw_year, to_integer, &mut report.invalid_years);
    let month = coerce_counted(obj.get(COL_MONTH), to_month, &mut report.invalid_months);
    let volume = coerce_counted(obj.get(COL_VOLUME), to_number, &mut report.invalid_volumes);

    Record {
        year,
        month,
        manufacturer: obj.get(COL_MANUFACTURER).and_then(to_text),
        country: obj.get(COL_COUNTRY).and_then(to_text),
        product_type: obj.get(COL_TYPE).and_then(to_text),
        volume,
    }
}

fn coerce_counted<T>(
    value: Option<&Value>,
    convert: fn(&Value) -> Option<T>,
    failures: &mut usize,
) -> Option<T> {
    let value = value.filter(|v| !is_blank(v))?;
    let converted = convert(value);
    if converted.is_none() {
        *failures += 1;
    }
    converted
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numeric coercion: numbers pass through, numeric strings are parsed.
/// Non-finite results are rejected.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer coercion: numeric values without a fractional part.
pub fn to_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let n = to_number(value)?;
    if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
        return None;
    }
    Some(n as i64)
}

fn to_month(value: &Value) -> Option<u32> {
    let month = to_integer(value)?;
    (1..=12).contains(&month).then_some(month as u32)
}

/// Text coercion: trimmed strings, numbers and booleans rendered as text.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
