//! Filter stage.
//!
//! Each [`Dimension`] is an independent predicate. An empty accepted set
//! keeps everything; a non-empty one keeps only members. Stages commute.

use std::collections::BTreeSet;

use crate::models::{FilterSelection, Record};

/// A filterable record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Manufacturer,
    Year,
    Country,
    Type,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Manufacturer,
        Dimension::Year,
        Dimension::Country,
        Dimension::Type,
    ];

    /// Whether `record` passes this dimension's filter in `selection`.
    pub fn accepts(self, selection: &FilterSelection, record: &Record) -> bool {
        match self {
            Dimension::Manufacturer => member(&selection.manufacturers, record.manufacturer.as_ref()),
            Dimension::Year => member(&selection.years, record.year.as_ref()),
            Dimension::Country => member(&selection.countries, record.country.as_ref()),
            Dimension::Type => member(&selection.types, record.product_type.as_ref()),
        }
    }
}

/// Empty set: no restriction. Missing values never match a non-empty set.
fn member<T: Ord>(accepted: &BTreeSet<T>, value: Option<&T>) -> bool {
    accepted.is_empty() || value.is_some_and(|v| accepted.contains(v))
}

/// Apply a single dimension to an already filtered set.
pub fn apply<'a>(
    records: Vec<&'a Record>,
    selection: &FilterSelection,
    dimension: Dimension,
) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| dimension.accepts(selection, r))
        .collect()
}

/// Apply all four dimensions.
pub fn filter_records<'a>(records: &'a [Record], selection: &FilterSelection) -> Vec<&'a Record> {
    if selection.is_unrestricted() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| Dimension::ALL.iter().all(|d| d.accepts(selection, r)))
        .collect()
}
