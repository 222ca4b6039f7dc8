//! Domain models for the sales pivot.
//!
//! - [`Record`] - One typed sales observation
//! - [`FilterSelection`] - Accepted values per filterable dimension
//! - [`PivotKey`] / [`PivotRow`] - Grouped, aggregated output
//! - [`FilterOptions`] - Distinct values offered to the filter controls

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Source column names
// =============================================================================

/// Column holding the year.
pub const COL_YEAR: &str = "Year";
/// Portuguese alias for [`COL_YEAR`], renamed before coercion.
pub const COL_YEAR_ALIAS: &str = "Ano";
/// Column holding the month (1-12).
pub const COL_MONTH: &str = "Month";
/// Column holding the manufacturer.
pub const COL_MANUFACTURER: &str = "Fabricante Produtor";
/// Column holding the country.
pub const COL_COUNTRY: &str = "Country";
/// Column holding the product type.
pub const COL_TYPE: &str = "Type";
/// Column holding the volume, in 9-litre boxes.
pub const COL_VOLUME: &str = "Box 9L";

// =============================================================================
// Record
// =============================================================================

/// One sales observation with typed, nullable fields.
///
/// Values that failed numeric coercion at load time are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub year: Option<i64>,
    pub month: Option<u32>,
    pub manufacturer: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub volume: Option<f64>,
}

impl Record {
    /// First day of the record's month, if year and month are both valid.
    pub fn date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year?).ok()?;
        NaiveDate::from_ymd_opt(year, self.month?, 1)
    }

    /// Grouping key, or `None` when any key field is missing.
    pub fn pivot_key(&self) -> Option<PivotKey> {
        Some(PivotKey {
            year: self.year?,
            manufacturer: self.manufacturer.clone()?,
            country: self.country.clone()?,
            product_type: self.product_type.clone()?,
        })
    }
}

// =============================================================================
// Filter selection
// =============================================================================

/// User-selected restriction per dimension.
///
/// An empty set imposes no restriction. Values inside one set are OR'ed,
/// the four sets are AND'ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default)]
    pub manufacturers: BTreeSet<String>,
    #[serde(default)]
    pub years: BTreeSet<i64>,
    #[serde(default)]
    pub countries: BTreeSet<String>,
    #[serde(default)]
    pub types: BTreeSet<String>,
}

impl FilterSelection {
    /// Selection with no restriction at all.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_manufacturers<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manufacturers.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_years(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.years.extend(values);
        self
    }

    pub fn with_countries<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.manufacturers.is_empty()
            && self.years.is_empty()
            && self.countries.is_empty()
            && self.types.is_empty()
    }
}

// =============================================================================
// Pivot output
// =============================================================================

/// Composite grouping key. Ordering is year, manufacturer, country, type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PivotKey {
    pub year: i64,
    pub manufacturer: String,
    pub country: String,
    pub product_type: String,
}

/// One aggregated row of the pivot table.
///
/// Serialized with the column names the dashboard table binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Fabricante Produtor")]
    pub manufacturer: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Type")]
    pub product_type: String,
    #[serde(rename = "Total Volume")]
    pub total_volume: f64,
    #[serde(rename = "Share (%)")]
    pub share_percent: i64,
}

impl PivotRow {
    pub fn new(key: PivotKey, total_volume: f64, share_percent: i64) -> Self {
        Self {
            year: key.year,
            manufacturer: key.manufacturer,
            country: key.country,
            product_type: key.product_type,
            total_volume,
            share_percent,
        }
    }
}

// =============================================================================
// Filter options
// =============================================================================

/// Distinct values per filter dimension, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub manufacturers: Vec<String>,
    pub years: Vec<i64>,
    pub countries: Vec<String>,
    pub types: Vec<String>,
}

impl FilterOptions {
    /// Collect distinct non-missing values from `records`.
    pub fn from_records(records: &[Record]) -> Self {
        let mut options = Self::default();
        for record in records {
            push_unique(&mut options.manufacturers, record.manufacturer.as_ref());
            push_unique(&mut options.years, record.year.as_ref());
            push_unique(&mut options.countries, record.country.as_ref());
            push_unique(&mut options.types, record.product_type.as_ref());
        }
        options
    }
}

fn push_unique<T: Clone + PartialEq>(values: &mut Vec<T>, value: Option<&T>) {
    if let Some(v) = value {
        if !values.contains(v) {
            values.push(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(year: Option<i64>, month: Option<u32>, manufacturer: &str) -> Record {
        Record {
            year,
            month,
            manufacturer: Some(manufacturer.to_string()),
            country: Some("BR".to_string()),
            product_type: Some("X".to_string()),
            volume: Some(1.0),
        }
    }

    #[test]
    fn test_date_is_first_of_month() {
        let r = record(Some(2021), Some(7), "A");
        assert_eq!(r.date(), NaiveDate::from_ymd_opt(2021, 7, 1));
    }

    #[test]
    fn test_date_missing_or_invalid_month() {
        assert_eq!(record(Some(2021), None, "A").date(), None);
        assert_eq!(record(Some(2021), Some(13), "A").date(), None);
        assert_eq!(record(None, Some(1), "A").date(), None);
    }

    #[test]
    fn test_pivot_key_requires_all_fields() {
        let mut r = record(Some(2020), Some(1), "A");
        assert!(r.pivot_key().is_some());
        r.country = None;
        assert!(r.pivot_key().is_none());
    }

    #[test]
    fn test_pivot_row_column_names() {
        let key = PivotKey {
            year: 2020,
            manufacturer: "A".into(),
            country: "BR".into(),
            product_type: "X".into(),
        };
        let row = serde_json::to_value(PivotRow::new(key, 15.0, 100)).unwrap();

        assert_eq!(row["Year"], 2020);
        assert_eq!(row["Fabricante Produtor"], "A");
        assert_eq!(row["Country"], "BR");
        assert_eq!(row["Type"], "X");
        assert_eq!(row["Total Volume"], json!(15.0));
        assert_eq!(row["Share (%)"], 100);
    }

    #[test]
    fn test_filter_options_first_appearance_order() {
        let records = vec![
            record(Some(2021), Some(1), "B"),
            record(Some(2020), Some(1), "A"),
            record(Some(2021), Some(2), "B"),
            record(None, None, "C"),
        ];
        let options = FilterOptions::from_records(&records);

        assert_eq!(options.manufacturers, vec!["B", "A", "C"]);
        assert_eq!(options.years, vec![2021, 2020]);
        assert_eq!(options.countries, vec!["BR"]);
    }

    #[test]
    fn test_selection_builder() {
        let selection = FilterSelection::all()
            .with_manufacturers(["A", "B"])
            .with_years([2020]);
        assert!(!selection.is_unrestricted());
        assert_eq!(selection.manufacturers.len(), 2);
        assert!(FilterSelection::all().is_unrestricted());
    }
}
