//! Filter-aggregate-share pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Records   │────▶│   Filter    │────▶│ Group + Sum │────▶│    Share    │
//! │ (snapshot)  │     │ (4 dims)    │     │ (by key)    │     │ (% of total)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Pure functions over borrowed records: no state, safe to call concurrently.
//! Output rows are sorted by (year, manufacturer, country, type).
//!
//! # Example
//!
//! ```rust,ignore
//! use salesboard::{aggregate, FilterSelection};
//!
//! let rows = aggregate(&records, &FilterSelection::all().with_manufacturers(["A"]));
//! for row in rows {
//!     println!("{} {} {}%", row.manufacturer, row.total_volume, row.share_percent);
//! }
//! ```

pub mod filter;
pub mod grouper;
pub mod selection;
pub mod share;

use serde::Serialize;

use crate::error::QueryResult;
use crate::models::{FilterSelection, PivotRow, Record};

pub use filter::{filter_records, Dimension};
pub use grouper::{grand_total, group_records, GroupTotal, Groups};
pub use selection::SelectionRequest;
pub use share::share_percent;

/// Pivot rows plus the figures they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    pub rows: Vec<PivotRow>,
    /// Records that passed the filter stage.
    pub filtered_records: usize,
    /// Share denominator: sum of all group totals.
    pub grand_total: f64,
}

impl PivotTable {
    /// Sum of the rounded shares; near 100 but not guaranteed equal.
    pub fn share_sum(&self) -> i64 {
        self.rows.iter().map(|r| r.share_percent).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run the full pipeline and keep the intermediate figures.
pub fn summarize(records: &[Record], selection: &FilterSelection) -> PivotTable {
    let filtered = filter_records(records, selection);
    let filtered_records = filtered.len();

    let groups = group_records(filtered);
    let total = grand_total(&groups);

    let rows = groups
        .into_iter()
        .map(|(key, group)| PivotRow::new(key, group.volume, share_percent(group.volume, total)))
        .collect();

    PivotTable {
        rows,
        filtered_records,
        grand_total: total,
    }
}

/// Filter, group, sum and share. Rows are sorted by key.
pub fn aggregate(records: &[Record], selection: &FilterSelection) -> Vec<PivotRow> {
    summarize(records, selection).rows
}

/// Query boundary over an untyped selection.
///
/// Fails only with [`crate::error::QueryError::InvalidSelection`]; a
/// selection matching nothing yields an empty result.
pub fn query(records: &[Record], request: &SelectionRequest) -> QueryResult<Vec<PivotRow>> {
    let selection = request.to_selection()?;
    Ok(aggregate(records, &selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(year: i64, manufacturer: &str, country: &str, product_type: &str, volume: Option<f64>) -> Record {
        Record {
            year: Some(year),
            month: Some(1),
            manufacturer: Some(manufacturer.into()),
            country: Some(country.into()),
            product_type: Some(product_type.into()),
            volume,
        }
    }

    fn scenario() -> Vec<Record> {
        vec![
            rec(2020, "A", "BR", "X", Some(10.0)),
            rec(2020, "B", "BR", "X", Some(30.0)),
        ]
    }

    #[test]
    fn test_grouping_correctness() {
        let records = vec![
            rec(2020, "A", "BR", "X", Some(10.0)),
            rec(2020, "A", "BR", "X", Some(5.0)),
        ];
        let rows = aggregate(&records, &FilterSelection::all());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_volume, 15.0);
        assert_eq!(rows[0].share_percent, 100);
    }

    #[test]
    fn test_scenario_shares() {
        let rows = aggregate(&scenario(), &FilterSelection::all());

        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].manufacturer.as_str(), rows[0].total_volume, rows[0].share_percent), ("A", 10.0, 25));
        assert_eq!((rows[1].manufacturer.as_str(), rows[1].total_volume, rows[1].share_percent), ("B", 30.0, 75));
    }

    #[test]
    fn test_filter_exclusion_renormalizes() {
        let selection = FilterSelection::all().with_manufacturers(["A"]);
        let rows = aggregate(&scenario(), &selection);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].manufacturer, "A");
        assert_eq!(rows[0].total_volume, 10.0);
        assert_eq!(rows[0].share_percent, 100);
    }

    #[test]
    fn test_empty_input() {
        let table = summarize(&[], &FilterSelection::all().with_years([2020]));
        assert!(table.is_empty());
        assert_eq!(table.grand_total, 0.0);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let selection = FilterSelection::all().with_countries(["JP"]);
        assert!(aggregate(&scenario(), &selection).is_empty());
    }

    #[test]
    fn test_all_zero_volumes_give_zero_shares() {
        let records = vec![
            rec(2020, "A", "BR", "X", None),
            rec(2020, "B", "BR", "X", Some(0.0)),
        ];
        let rows = aggregate(&records, &FilterSelection::all());

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.share_percent == 0 && r.total_volume == 0.0));
    }

    #[test]
    fn test_missing_volume_contributes_zero() {
        let mut records = scenario();
        records.push(rec(2020, "A", "BR", "X", None));
        let rows = aggregate(&records, &FilterSelection::all());

        assert_eq!(rows[0].total_volume, 10.0);
        assert_eq!(rows[0].share_percent, 25);
    }

    #[test]
    fn test_share_sum_within_group_count_of_100() {
        let records: Vec<Record> = (0..7)
            .map(|i| rec(2020, &format!("M{}", i), "BR", "X", Some(1.0 + i as f64 * 3.3)))
            .collect();
        let table = summarize(&records, &FilterSelection::all());

        let groups = table.rows.len() as i64;
        assert!((table.share_sum() - 100).abs() <= groups);
    }

    #[test]
    fn test_keys_unique_and_sorted() {
        let records = vec![
            rec(2021, "A", "BR", "X", Some(1.0)),
            rec(2020, "B", "BR", "Y", Some(1.0)),
            rec(2020, "B", "AR", "Y", Some(1.0)),
            rec(2020, "B", "BR", "Y", Some(1.0)),
        ];
        let rows = aggregate(&records, &FilterSelection::all());

        let keys: Vec<(i64, &str, &str)> = rows
            .iter()
            .map(|r| (r.year, r.manufacturer.as_str(), r.country.as_str()))
            .collect();
        assert_eq!(keys, vec![(2020, "B", "AR"), (2020, "B", "BR"), (2021, "A", "BR")]);
    }

    #[test]
    fn test_deterministic() {
        let records = scenario();
        let selection = FilterSelection::all().with_years([2020]);
        assert_eq!(aggregate(&records, &selection), aggregate(&records, &selection));
    }

    #[test]
    fn test_query_rejects_malformed_selection() {
        let request: SelectionRequest =
            serde_json::from_value(json!({ "years": ["twenty"] })).unwrap();
        assert!(query(&scenario(), &request).is_err());
    }

    #[test]
    fn test_query_output_fields() {
        let request: SelectionRequest =
            serde_json::from_value(json!({ "manufacturers": ["B"] })).unwrap();
        let rows = query(&scenario(), &request).unwrap();
        let row = serde_json::to_value(&rows[0]).unwrap();

        assert_eq!(row["Fabricante Produtor"], "B");
        assert_eq!(row["Share (%)"], 100);
        assert_eq!(row["Total Volume"], json!(30.0));
    }
}
