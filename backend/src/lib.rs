//! # Salesboard - Sales volume and market share pivot
//!
//! Loads sales records from a spreadsheet, CSV, JSON file or a keyed JSON
//! batch store, and answers filtered pivot queries: total volume and share
//! per (year, manufacturer, country, type).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XLSX / CSV  │────▶│   Parser    │────▶│ RecordStore │────▶│    Pivot    │
//! │ JSON batches│     │ (raw rows)  │     │ (snapshot)  │     │ (filter/sum)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesboard::{FilterSelection, RecordStore};
//!
//! let store = RecordStore::load_path("Dados_coordenada_V3.xlsx")?;
//! let table = store.aggregate(&FilterSelection::all().with_years([2023]));
//! for row in table.rows {
//!     println!("{} {} {}%", row.manufacturer, row.total_volume, row.share_percent);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Record, selection and pivot row types
//! - [`parser`] - Spreadsheet, CSV and JSON readers
//! - [`source`] - File and keyed batch sources
//! - [`store`] - In-memory record store with atomic reload
//! - [`pivot`] - Filter, group, sum and share pipeline
//! - [`validation`] - Selection schema validation
//! - [`config`] - Server settings and tracing setup
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Ingestion
pub mod parser;
pub mod source;
pub mod store;

// Aggregation
pub mod pivot;
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{QueryError, ServerError, SourceError, StoreError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{FilterOptions, FilterSelection, PivotKey, PivotRow, Record};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use source::{BatchSource, JsonDirStore, RecordSource};
pub use store::{CoercionReport, RecordStore, Snapshot};

// =============================================================================
// Re-exports - Pivot
// =============================================================================

pub use pivot::{aggregate, query, summarize, PivotTable, SelectionRequest};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
