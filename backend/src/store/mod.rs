//! In-memory record store.
//!
//! Holds the full record set as an immutable [`Snapshot`]. Readers get an
//! `Arc` to the current snapshot; [`RecordStore::reload`] builds a new one
//! off-lock and swaps the pointer, so in-flight queries keep a consistent
//! view.

pub mod coerce;

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{QueryResult, StoreError, StoreResult};
use crate::models::{FilterOptions, FilterSelection, Record};
use crate::pivot::{self, PivotTable, SelectionRequest};
use crate::source::RecordSource;

pub use coerce::{coerce_row, coerce_rows, CoercionReport};

/// One immutable generation of the record set.
#[derive(Debug)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub report: CoercionReport,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    fn new(records: Vec<Record>, report: CoercionReport) -> Self {
        Self {
            records,
            report,
            loaded_at: Utc::now(),
        }
    }
}

/// Shared, read-mostly store of sales records.
#[derive(Debug)]
pub struct RecordStore {
    origin: Option<RecordSource>,
    current: RwLock<Arc<Snapshot>>,
}

impl RecordStore {
    /// Load every record from `source`.
    ///
    /// Fails with [`StoreError::SourceUnavailable`] when the source cannot be
    /// read at all. Individual bad values never fail the load.
    pub fn load(source: RecordSource) -> StoreResult<Self> {
        let snapshot = read_snapshot(&source)?;
        Ok(Self {
            origin: Some(source),
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Load from a file or batch directory path.
    pub fn load_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::load(RecordSource::from_path(path))
    }

    /// Build a store over records already in memory. Such a store cannot reload.
    pub fn from_records(records: Vec<Record>) -> Self {
        let report = CoercionReport {
            rows: records.len(),
            ..Default::default()
        };
        Self {
            origin: None,
            current: RwLock::new(Arc::new(Snapshot::new(records, report))),
        }
    }

    pub fn origin(&self) -> Option<&RecordSource> {
        self.origin.as_ref()
    }

    /// Current snapshot. Stays valid even if the store reloads meanwhile.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Re-read the origin and swap in the new snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> StoreResult<Arc<Snapshot>> {
        let source = self.origin.as_ref().ok_or(StoreError::NoOrigin)?;
        let fresh = Arc::new(read_snapshot(source)?);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&fresh);
        Ok(fresh)
    }

    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct values for each filter control.
    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.snapshot().records)
    }

    /// Run the pipeline over the current snapshot with a typed selection.
    pub fn aggregate(&self, selection: &FilterSelection) -> PivotTable {
        pivot::summarize(&self.snapshot().records, selection)
    }

    /// Query boundary: validate an untyped selection, then aggregate.
    pub fn query(&self, request: &SelectionRequest) -> QueryResult<PivotTable> {
        let selection = request.to_selection()?;
        Ok(self.aggregate(&selection))
    }
}

fn read_snapshot(source: &RecordSource) -> StoreResult<Snapshot> {
    log_info(format!("📖 Loading records from {}", source));

    let parsed = source
        .read()
        .map_err(|e| StoreError::unavailable(source.to_string(), e))?;

    if let Some(ref encoding) = parsed.encoding {
        log_info(format!("Encoding: {}", encoding));
    }
    if let Some(delimiter) = parsed.delimiter {
        log_info(format!("Delimiter: {:?}", delimiter));
    }
    log_info(format!("Columns: {}", parsed.headers.join(", ")));

    let (records, report) = coerce_rows(&parsed.records);

    if report.failures() > 0 {
        log_warning(format!(
            "{} values could not be coerced (year: {}, month: {}, volume: {})",
            report.failures(),
            report.invalid_years,
            report.invalid_months,
            report.invalid_volumes
        ));
    }
    log_success(format!("Loaded {} records", records.len()));

    Ok(Snapshot::new(records, report))
}
