//! Core data model types for import.
//!
//! A [`TableSchema`] is synthesized once per table from a CSV header row and its first data row;
//! rows then flow through the pipeline as [`NormalizedRow`]s and the outcome is summarized in
//! [`ImportStats`] / [`AggregateStats`].

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

/// Name of the surrogate key column added to every synthesized table.
pub const SURROGATE_KEY: &str = "id";
/// Name of the metadata column holding the row's import time.
pub const IMPORT_TIMESTAMP: &str = "import_timestamp";
/// Name of the metadata column holding the source file's base name.
pub const SOURCE_FILE: &str = "source_file";

/// Storage type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Real,
    /// Anything else, including empty samples.
    Text,
}

impl ColumnType {
    /// SQL type name used in `CREATE TABLE`.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A single synthesized column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Sanitized column name.
    pub name: String,
    /// Type inferred from the sample row.
    pub column_type: ColumnType,
    /// 0-based position in the CSV header.
    pub ordinal: usize,
}

/// A synthesized table: surrogate key, inferred columns in header order, then the
/// `import_timestamp` and `source_file` metadata columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Sanitized table name.
    pub name: String,
    /// Inferred columns, in header order.
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Iterate inferred column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of values bound per inserted row (inferred columns plus `source_file`).
    pub fn width(&self) -> usize {
        self.columns.len() + 1
    }

    /// Idempotent `CREATE TABLE IF NOT EXISTS` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        let mut defs = Vec::with_capacity(self.columns.len() + 3);
        defs.push(format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            quote_ident(SURROGATE_KEY)
        ));
        for column in &self.columns {
            defs.push(format!("{} {}", quote_ident(&column.name), column.column_type));
        }
        defs.push(format!(
            "{} TEXT DEFAULT CURRENT_TIMESTAMP",
            quote_ident(IMPORT_TIMESTAMP)
        ));
        defs.push(format!("{} TEXT", quote_ident(SOURCE_FILE)));

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.name),
            defs.join(", ")
        )
    }

    /// Parameterized multi-row insert statement, one placeholder per bound value.
    pub fn insert_sql(&self) -> String {
        let names = self
            .column_names()
            .chain(std::iter::once(SOURCE_FILE))
            .map(quote_ident)
            .collect::<Vec<_>>();
        let placeholders = (1..=names.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.name),
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

// Sanitized identifiers never contain `"`, so plain wrapping is enough.
fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}

/// A row resized to the header width with the source-file tag appended.
pub type NormalizedRow = Vec<String>;

/// Counters for a single file's import.
///
/// `total == imported + skipped + error` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Data rows read (header excluded).
    pub total: usize,
    /// Rows committed to the store.
    pub imported: usize,
    /// Rows with no non-empty field; never inserted.
    pub skipped: usize,
    /// Rows belonging to a batch the store rejected.
    pub error: usize,
}

/// Counters summed across a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Files imported without a fatal error.
    pub files_processed: usize,
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub error: usize,
}

impl AddAssign<ImportStats> for AggregateStats {
    fn add_assign(&mut self, stats: ImportStats) {
        self.files_processed += 1;
        self.total += stats.total;
        self.imported += stats.imported;
        self.skipped += stats.skipped;
        self.error += stats.error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        TableSchema {
            name: "assay".to_string(),
            columns: vec![
                ColumnSpec {
                    name: "sample_id".to_string(),
                    column_type: ColumnType::Integer,
                    ordinal: 0,
                },
                ColumnSpec {
                    name: "result".to_string(),
                    column_type: ColumnType::Real,
                    ordinal: 1,
                },
            ],
        }
    }

    #[test]
    fn create_table_sql_places_key_first_and_metadata_last() {
        let sql = sample_schema().create_table_sql();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"assay\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"sample_id\" INTEGER, \"result\" REAL, \
             \"import_timestamp\" TEXT DEFAULT CURRENT_TIMESTAMP, \"source_file\" TEXT)"
        );
    }

    #[test]
    fn insert_sql_binds_columns_plus_source_file() {
        let schema = sample_schema();
        assert_eq!(schema.width(), 3);
        assert_eq!(
            schema.insert_sql(),
            "INSERT INTO \"assay\" (\"sample_id\", \"result\", \"source_file\") VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn aggregate_sums_file_stats() {
        let mut agg = AggregateStats::default();
        agg += ImportStats {
            total: 5,
            imported: 3,
            skipped: 1,
            error: 1,
        };
        agg += ImportStats {
            total: 2,
            imported: 2,
            skipped: 0,
            error: 0,
        };
        assert_eq!(
            agg,
            AggregateStats {
                files_processed: 2,
                total: 7,
                imported: 5,
                skipped: 1,
                error: 1,
            }
        );
    }

    #[test]
    fn stats_serialize_as_flat_json() {
        let stats = ImportStats {
            total: 3,
            imported: 2,
            skipped: 1,
            error: 0,
        };
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"total":3,"imported":2,"skipped":1,"error":0}"#
        );

        let schema = serde_json::to_value(sample_schema()).unwrap();
        assert_eq!(schema["columns"][1]["column_type"], "Real");
    }
}
