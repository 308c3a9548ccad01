//! The store contract consumed by the import pipeline.
//!
//! The pipeline never opens or closes connections. Callers pass an already-open session as
//! `&mut` into every operation that needs it; [`rusqlite::Connection`] implements
//! [`ImportStore`] out of the box (see [`sqlite`]).

pub mod sqlite;

use crate::error::StoreError;

/// A relational store that can run schema statements and commit batches of rows.
pub trait ImportStore {
    /// Execute a single statement (DDL) and make its effect durable.
    fn execute_statement(&mut self, sql: &str) -> Result<(), StoreError>;

    /// Execute `sql` once per row as one atomic unit, then commit.
    ///
    /// Either every row is committed or none is. Each row carries exactly one value per
    /// placeholder in `sql`.
    fn execute_batch(&mut self, sql: &str, rows: &[Vec<String>]) -> Result<(), StoreError>;
}
