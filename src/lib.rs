//! `instrument-csv-import` loads laboratory instrument CSV exports into a relational store
//! without a hand-written schema per instrument format.
//!
//! The primary entrypoints are [`ingestion::import_file`] and [`ingestion::import_directory`].
//! Both take an already-open store session ([`rusqlite::Connection`] implements
//! [`store::ImportStore`]) and return row statistics.
//!
//! ## What an import does
//!
//! - The header row names the columns. Names are sanitized into lower-case identifiers
//!   (`"Sample ID"` becomes `sample_id`; see [`schema::sanitize_identifier`]).
//! - The **first data row alone** decides each column's type: `INTEGER`, `REAL` or `TEXT`
//!   (see [`schema::infer_column_type`]). Later rows are inserted as-is.
//! - The table (named after the file stem unless given) is created if absent with an
//!   auto-increment `id` key first and `import_timestamp` / `source_file` columns last. An
//!   existing table is never altered.
//! - Rows shorter than the header are padded with empty text, longer rows are truncated, and
//!   rows with no non-empty field (including empty lines) are skipped.
//! - Rows are committed in batches (default 1000), one transaction per batch. A rejected batch
//!   counts all of its rows as errors and the import carries on.
//!
//! ## Quick example
//!
//! ```rust
//! use instrument_csv_import::ingestion::{import_reader, ImportOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = rusqlite::Connection::open_in_memory()?;
//! let csv = "Sample ID,Result\n001,12.3\n002,7\n";
//!
//! let stats = import_reader(&mut conn, csv.as_bytes(), "run.csv", "run", &ImportOptions::default())?;
//! assert_eq!((stats.total, stats.imported, stats.skipped, stats.error), (2, 2, 0, 0));
//!
//! let result: f64 = conn.query_row("SELECT result FROM run WHERE sample_id = 2", [], |r| r.get(0))?;
//! assert_eq!(result, 7.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every fallible function returns [`ImportResult`]. [`ImportError::kind`] separates failures that
//! abort a file ([`ErrorKind::FatalIo`], [`ErrorKind::FatalSchema`]) from batch rejections
//! ([`ErrorKind::BatchInsert`]), which never escape an import and only show up in the stats and
//! observer callbacks.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber. Set one up in the
//! binary (for example with `tracing-subscriber`) to see progress.
//!
//! ## Modules
//!
//! - [`ingestion`]: file/directory entrypoints, batching, observers
//! - [`schema`]: identifier sanitization, type inference, table synthesis
//! - [`store`]: the store contract and its SQLite implementation
//! - [`types`]: schema and statistics types
//! - [`error`]: error types used across the crate

pub mod error;
pub mod ingestion;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{ErrorKind, ImportError, ImportResult, StoreError};
