//! Group and sum stages.
//!
//! Partition filtered records by (year, manufacturer, country, type) and sum
//! volumes. Records missing any key field form no group.

use std::collections::BTreeMap;

use crate::models::{PivotKey, Record};

/// Accumulated totals for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupTotal {
    /// Sum of volumes, missing volumes counted as zero.
    pub volume: f64,
    /// Number of records in the group.
    pub records: usize,
}

/// Groups ordered by key.
pub type Groups = BTreeMap<PivotKey, GroupTotal>;

/// Group `records` by pivot key and sum their volumes.
pub fn group_records<'a, I>(records: I) -> Groups
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups = Groups::new();

    for record in records {
        let Some(key) = record.pivot_key() else {
            continue;
        };
        let total = groups.entry(key).or_default();
        total.volume += record.volume.unwrap_or(0.0);
        total.records += 1;
    }

    groups
}

/// Sum of all group volumes.
pub fn grand_total(groups: &Groups) -> f64 {
    groups.values().map(|g| g.volume).sum()
}
