//! Schema synthesis from a CSV header row and its first data row.
//!
//! - [`sanitize_identifier()`]: storage-safe names for tables and columns
//! - [`infer_column_type()`]: `INTEGER` / `REAL` / `TEXT` from a single sample value
//! - [`synthesize_schema()`]: header + sample row to [`TableSchema`]
//! - [`ensure_table()`]: idempotent `CREATE TABLE IF NOT EXISTS`
//!
//! ## Example
//!
//! ```rust
//! use instrument_csv_import::schema::synthesize_schema;
//! use instrument_csv_import::types::ColumnType;
//!
//! let schema = synthesize_schema("Plate Reader", &["Sample ID", "Result"], &["001", "12.3"]).unwrap();
//! assert_eq!(schema.name, "plate_reader");
//! assert_eq!(schema.columns[0].name, "sample_id");
//! assert_eq!(schema.columns[0].column_type, ColumnType::Integer);
//! assert_eq!(schema.columns[1].column_type, ColumnType::Real);
//! ```

mod infer;
mod sanitize;

use tracing::info;

use crate::error::{ImportError, ImportResult};
use crate::store::ImportStore;
use crate::types::{ColumnSpec, IMPORT_TIMESTAMP, SOURCE_FILE, SURROGATE_KEY, TableSchema};

pub use infer::infer_column_type;
pub use sanitize::{DIGIT_PREFIX, sanitize_identifier};

/// Prefix given to a header whose sanitized name is one of the synthesized column names.
pub const RESERVED_PREFIX: &str = "csv_";

const RESERVED_COLUMNS: [&str; 3] = [SURROGATE_KEY, IMPORT_TIMESTAMP, SOURCE_FILE];

/// Build a [`TableSchema`] from a header row and one sample data row.
///
/// Column `i` takes its type from `sample_row[i]`; a sample row shorter than the header makes
/// the missing columns `TEXT`. A header that sanitizes to `id`, `import_timestamp` or
/// `source_file` is renamed with the [`RESERVED_PREFIX`] (`ID` becomes `csv_id`).
///
/// Fails if the table name or any header sanitizes to an empty identifier. Headers that
/// sanitize to the same identifier are passed through unchanged; the store rejects the
/// resulting `CREATE TABLE`.
pub fn synthesize_schema<H, S>(
    table_name: &str,
    headers: &[H],
    sample_row: &[S],
) -> ImportResult<TableSchema>
where
    H: AsRef<str>,
    S: AsRef<str>,
{
    let name = sanitize_identifier(table_name);
    if name.is_empty() {
        return Err(ImportError::Schema {
            table: table_name.to_string(),
            message: "table name sanitizes to an empty identifier".to_string(),
        });
    }
    if headers.is_empty() {
        return Err(ImportError::Schema {
            table: name,
            message: "header row has no columns".to_string(),
        });
    }

    let mut columns = Vec::with_capacity(headers.len());
    for (ordinal, header) in headers.iter().enumerate() {
        let header = header.as_ref();
        let column_name = column_identifier(header);
        if column_name.is_empty() {
            return Err(ImportError::Schema {
                table: name,
                message: format!(
                    "header {} ('{header}') sanitizes to an empty identifier",
                    ordinal + 1
                ),
            });
        }
        let sample = sample_row.get(ordinal).map(AsRef::as_ref).unwrap_or("");
        columns.push(ColumnSpec {
            name: column_name,
            column_type: infer_column_type(sample),
            ordinal,
        });
    }

    Ok(TableSchema { name, columns })
}

/// Sanitized column name for a header, with the reserved-name policy applied.
pub fn column_identifier(header: &str) -> String {
    let name = sanitize_identifier(header);
    if RESERVED_COLUMNS.contains(&name.as_str()) {
        format!("{RESERVED_PREFIX}{name}")
    } else {
        name
    }
}

/// Create the table for `schema` unless it already exists.
///
/// An existing table is left untouched, whatever its columns.
pub fn ensure_table<S>(store: &mut S, schema: &TableSchema) -> ImportResult<()>
where
    S: ImportStore + ?Sized,
{
    store
        .execute_statement(&schema.create_table_sql())
        .map_err(|source| ImportError::CreateTable {
            table: schema.name.clone(),
            source,
        })?;
    info!(table = %schema.name, columns = schema.columns.len(), "table created or verified");
    Ok(())
}
