//! Single-file import: header, schema, streamed rows, batched inserts, statistics.
//!
//! Most callers should use [`import_file`]. [`import_reader`] runs the same pipeline over any
//! [`std::io::Read`] source.
//!
//! Per file, the pipeline moves through:
//!
//! ```text
//! Start -> HeaderRead -+-> (no data rows) ----------------------------------> Done
//!                      +-> SchemaReady -> Streaming <-> Flushing -> EOF -> FinalFlush -> Done
//! ```
//!
//! An unreadable source, a missing header, a read failure mid-stream, or a rejected
//! `CREATE TABLE` ends the file in `Failed` and is returned as an error. A rejected batch does
//! not: its rows are counted in [`ImportStats::error`] and streaming carries on.
//!
//! Empty lines after the header count as data rows that are skipped, like rows whose fields are
//! all empty. A file with no data record at all (header only, possibly followed by empty lines)
//! reports zero rows.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ::csv::StringRecord;
use tracing::{debug, error, info, warn};

use crate::error::{ImportError, ImportResult};
use crate::schema::{ensure_table, synthesize_schema};
use crate::store::ImportStore;
use crate::types::{ImportStats, TableSchema};

use super::batch::{Batch, BatchAccumulator, BatchInserter};
use super::csv::{CsvSource, open_source};
use super::normalize::{is_blank_row, normalize_row};
use super::observability::{ImportContext, ImportObserver, ImportSeverity};

/// Rows per committed batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Options controlling an import.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// Target table name before sanitization. If `None`, the file stem is used.
    pub table_name: Option<String>,
    /// Rows per batch (one transaction each). Must be > 0.
    pub batch_size: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("table_name", &self.table_name)
            .field("batch_size", &self.batch_size)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            table_name: None,
            batch_size: DEFAULT_BATCH_SIZE,
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

impl ImportOptions {
    fn validate(&self) -> ImportResult<()> {
        if self.batch_size == 0 {
            return Err(ImportError::InvalidOptions {
                message: "batch_size must be > 0".to_string(),
            });
        }
        Ok(())
    }

    fn report(&self, ctx: &ImportContext, result: &ImportResult<ImportStats>) {
        let Some(obs) = self.observer.as_ref() else {
            return;
        };
        match result {
            Ok(stats) => obs.on_success(ctx, *stats),
            Err(e) => {
                let sev = ImportSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

/// Import one CSV file into `store`.
///
/// The table is named after `options.table_name`, or the file stem when unset, and every row's
/// `source_file` is the file's base name. The table is created on first use; an existing table
/// only receives new rows.
///
/// Returns per-file statistics. Errors are fatal for this file only: the file is missing or
/// unreadable, has no header row, or the store rejects the table. Rows already committed by
/// earlier batches stay committed.
///
/// When an observer is configured, this function reports:
///
/// - `on_batch_failure` for every rejected batch
/// - `on_success` with the final stats
/// - `on_failure` on a fatal error, plus `on_alert` when its severity is
///   >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use instrument_csv_import::ingestion::{import_file, ImportOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = rusqlite::Connection::open("instrument_data.db")?;
/// let stats = import_file(&mut conn, "exports/plate_reader.csv", &ImportOptions::default())?;
/// println!("imported {} of {} rows", stats.imported, stats.total);
/// # Ok(())
/// # }
/// ```
pub fn import_file<S>(
    store: &mut S,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> ImportResult<ImportStats>
where
    S: ImportStore + ?Sized,
{
    let path = path.as_ref();
    let ctx = ImportContext {
        path: path.to_path_buf(),
        table: options
            .table_name
            .clone()
            .unwrap_or_else(|| file_stem(path)),
        source_file: file_name(path),
    };

    info!(path = %path.display(), table = %ctx.table, "starting import");
    let result = options
        .validate()
        .and_then(|()| open_source(path))
        .and_then(|file| run_import(store, file, &ctx, options));

    options.report(&ctx, &result);
    result
}

/// Import CSV data from any reader.
///
/// `source_name` is used both in diagnostics and as the `source_file` tag of every row.
/// `options.table_name` is ignored in favor of `table_name`.
pub fn import_reader<S, R>(
    store: &mut S,
    reader: R,
    source_name: &str,
    table_name: &str,
    options: &ImportOptions,
) -> ImportResult<ImportStats>
where
    S: ImportStore + ?Sized,
    R: Read,
{
    let ctx = ImportContext {
        path: PathBuf::from(source_name),
        table: table_name.to_string(),
        source_file: source_name.to_string(),
    };

    let result = options
        .validate()
        .and_then(|()| run_import(store, reader, &ctx, options));

    options.report(&ctx, &result);
    result
}

/// Owned import request, useful for queueing work before a store session is available.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling the import.
    pub options: ImportOptions,
}

impl ImportRequest {
    pub fn new(path: impl Into<PathBuf>, options: ImportOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Execute the request by calling [`import_file`].
    pub fn run<S>(&self, store: &mut S) -> ImportResult<ImportStats>
    where
        S: ImportStore + ?Sized,
    {
        import_file(store, &self.path, &self.options)
    }
}

fn run_import<S, R>(
    store: &mut S,
    reader: R,
    ctx: &ImportContext,
    options: &ImportOptions,
) -> ImportResult<ImportStats>
where
    S: ImportStore + ?Sized,
    R: Read,
{
    let source_name = ctx.path.display().to_string();
    let mut source = CsvSource::new(reader, &source_name)?;
    let header_count = source.headers().len();

    let mut stats = ImportStats::default();
    let mut record = StringRecord::new();
    if !source.next_record(&mut record)? {
        warn!(path = %source_name, "CSV file is empty");
        return Ok(stats);
    }

    let sample: Vec<&str> = record.iter().collect();
    let schema = synthesize_schema(&ctx.table, source.headers(), sample.as_slice())?;
    ensure_table(store, &schema)?;

    let flusher = Flusher {
        inserter: BatchInserter::new(&schema),
        schema: &schema,
        ctx,
        options,
    };
    let mut batches = BatchAccumulator::new(options.batch_size);

    loop {
        stats.total += 1;
        if is_blank_row(&record) {
            stats.skipped += 1;
        } else {
            let row = normalize_row(&record, header_count, &ctx.source_file);
            if let Some(batch) = batches.append(row) {
                let last_row = stats.total;
                flusher.flush(store, batch, &mut stats, last_row);
            }
        }

        if !source.next_record(&mut record)? {
            break;
        }
    }
    let last_row = stats.total;
    flusher.flush(store, batches.drain(), &mut stats, last_row);

    let empty_lines = source.empty_lines() as usize;
    if empty_lines > 0 {
        debug!(path = %source_name, empty_lines, "counted empty lines as skipped rows");
        stats.total += empty_lines;
        stats.skipped += empty_lines;
    }

    info!(
        path = %source_name,
        table = %schema.name,
        total = stats.total,
        imported = stats.imported,
        skipped = stats.skipped,
        error = stats.error,
        "import complete"
    );
    Ok(stats)
}

struct Flusher<'a> {
    inserter: BatchInserter<'a>,
    schema: &'a TableSchema,
    ctx: &'a ImportContext,
    options: &'a ImportOptions,
}

impl Flusher<'_> {
    /// `last_row` is the 1-based ordinal of the last record read, among data records that
    /// are not empty lines.
    fn flush<S>(&self, store: &mut S, batch: Batch, stats: &mut ImportStats, last_row: usize)
    where
        S: ImportStore + ?Sized,
    {
        match self.inserter.insert(store, batch) {
            Ok(0) => {}
            Ok(rows) => {
                stats.imported += rows;
                debug!(
                    table = %self.schema.name,
                    rows,
                    imported = stats.imported,
                    "imported batch"
                );
            }
            Err(failure) => {
                stats.error += failure.rows;
                error!(
                    table = %self.schema.name,
                    rows = failure.rows,
                    last_row,
                    err = %failure.error,
                    "batch insert failed"
                );
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_batch_failure(self.ctx, &failure);
                }
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
