//! Fixed-size batching and per-batch transactional inserts.

use std::fmt;

use crate::error::ImportError;
use crate::store::ImportStore;
use crate::types::{NormalizedRow, TableSchema};

/// A bounded group of rows committed as one unit.
pub type Batch = Vec<NormalizedRow>;

/// Groups rows into batches of at most `batch_size` rows.
#[derive(Debug)]
pub struct BatchAccumulator {
    batch_size: usize,
    current: Batch,
}

impl BatchAccumulator {
    /// Create an accumulator that yields batches of `batch_size` rows.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn new(batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");
        Self {
            batch_size,
            current: Vec::with_capacity(batch_size.min(4_096)),
        }
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Rows waiting in the open batch.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Add a row; returns the full batch once it reaches `batch_size` rows.
    pub fn append(&mut self, row: NormalizedRow) -> Option<Batch> {
        self.current.push(row);
        if self.current.len() >= self.batch_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Return the open batch (possibly partial or empty) and start a new one.
    pub fn drain(&mut self) -> Batch {
        self.take()
    }

    fn take(&mut self) -> Batch {
        let capacity = self.batch_size.min(4_096);
        std::mem::replace(&mut self.current, Vec::with_capacity(capacity))
    }
}

/// A batch the store refused to commit. Every row in it counts as an error.
#[derive(Debug)]
pub struct BatchFailure {
    /// Rows in the rejected batch.
    pub rows: usize,
    /// The [`ImportError::BatchInsert`] describing the rejection.
    pub error: ImportError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// Commits batches for one table.
#[derive(Debug)]
pub struct BatchInserter<'a> {
    schema: &'a TableSchema,
    sql: String,
}

impl<'a> BatchInserter<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            sql: schema.insert_sql(),
        }
    }

    /// Insert `batch` as a single transaction.
    ///
    /// Returns the number of committed rows. On rejection the batch is discarded as a whole and
    /// reported as a [`BatchFailure`]; nothing is retried. An empty batch never reaches the store.
    pub fn insert<S>(&self, store: &mut S, batch: Batch) -> Result<usize, BatchFailure>
    where
        S: ImportStore + ?Sized,
    {
        if batch.is_empty() {
            return Ok(0);
        }
        let rows = batch.len();
        match store.execute_batch(&self.sql, &batch) {
            Ok(()) => Ok(rows),
            Err(source) => Err(BatchFailure {
                rows,
                error: ImportError::BatchInsert {
                    table: self.schema.name.clone(),
                    rows,
                    source,
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, StoreError};
    use crate::types::{ColumnSpec, ColumnType};

    fn row(v: &str) -> NormalizedRow {
        vec![v.to_string(), "src.csv".to_string()]
    }

    #[test]
    fn yields_full_batches_and_a_partial_tail() {
        let mut acc = BatchAccumulator::new(2);
        let mut flushed = Vec::new();
        for i in 0..5 {
            if let Some(batch) = acc.append(row(&i.to_string())) {
                flushed.push(batch.len());
            }
        }
        assert_eq!(acc.len(), 1);
        flushed.push(acc.drain().len());

        assert_eq!(flushed, vec![2, 2, 1]);
        assert!(acc.is_empty());
        assert!(acc.drain().is_empty());
    }

    #[test]
    fn exact_multiple_leaves_empty_tail() {
        let mut acc = BatchAccumulator::new(3);
        let full = (0..6)
            .filter_map(|i| acc.append(row(&i.to_string())))
            .count();
        assert_eq!(full, 2);
        assert!(acc.drain().is_empty());
    }

    #[test]
    fn batches_preserve_arrival_order() {
        let mut acc = BatchAccumulator::new(2);
        assert!(acc.append(row("a")).is_none());
        let batch = acc.append(row("b")).unwrap();
        assert_eq!(batch[0][0], "a");
        assert_eq!(batch[1][0], "b");
    }

    #[test]
    #[should_panic(expected = "batch_size must be > 0")]
    fn zero_batch_size_panics() {
        let _ = BatchAccumulator::new(0);
    }

    struct RecordingStore {
        reject: bool,
        calls: Vec<(String, usize)>,
    }

    impl ImportStore for RecordingStore {
        fn execute_statement(&mut self, _sql: &str) -> Result<(), StoreError> {
            Ok(())
        }

        fn execute_batch(&mut self, sql: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
            self.calls.push((sql.to_string(), rows.len()));
            if self.reject {
                Err(StoreError::Rejected("datatype mismatch".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn schema() -> TableSchema {
        TableSchema {
            name: "t".to_string(),
            columns: vec![ColumnSpec {
                name: "v".to_string(),
                column_type: ColumnType::Text,
                ordinal: 0,
            }],
        }
    }

    #[test]
    fn inserter_reports_committed_rows() {
        let schema = schema();
        let inserter = BatchInserter::new(&schema);
        let mut store = RecordingStore {
            reject: false,
            calls: Vec::new(),
        };

        assert_eq!(inserter.insert(&mut store, vec![row("a"), row("b")]).unwrap(), 2);
        assert_eq!(
            store.calls,
            vec![(
                "INSERT INTO \"t\" (\"v\", \"source_file\") VALUES (?1, ?2)".to_string(),
                2
            )]
        );
    }

    #[test]
    fn inserter_skips_empty_batches() {
        let schema = schema();
        let mut store = RecordingStore {
            reject: true,
            calls: Vec::new(),
        };
        assert_eq!(
            BatchInserter::new(&schema).insert(&mut store, Vec::new()).unwrap(),
            0
        );
        assert!(store.calls.is_empty());
    }

    #[test]
    fn inserter_turns_rejection_into_batch_failure() {
        let schema = schema();
        let mut store = RecordingStore {
            reject: true,
            calls: Vec::new(),
        };
        let failure = BatchInserter::new(&schema)
            .insert(&mut store, vec![row("a"), row("b"), row("c")])
            .unwrap_err();
        assert_eq!(failure.rows, 3);
        assert_eq!(failure.error.kind(), ErrorKind::BatchInsert);
        assert!(failure.to_string().contains("datatype mismatch"));
    }
}
