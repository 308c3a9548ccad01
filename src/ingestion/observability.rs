//! Outcome reporting for imports.
//!
//! Progress is logged by the pipeline itself; observers receive the outcome of each file. Per
//! file, an observer sees zero or more `on_batch_failure` calls (one per rejected batch, while the
//! import carries on), then exactly one of:
//!
//! - `on_success` with the file's [`ImportStats`], when the file was read to the end
//! - `on_failure` with the fatal error and its [`ImportSeverity`], followed by `on_alert` when
//!   that severity reaches [`ImportOptions::alert_at_or_above`](super::ImportOptions)
//!
//! Implementations here: [`TracingObserver`] (structured `tracing` events),
//! [`FileObserver`] (an append-only `csv_import.log` style file) and [`CompositeObserver`]
//! (fan-out).

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ErrorKind, ImportError};
use crate::types::ImportStats;

use super::batch::BatchFailure;

/// How serious an import outcome is; observers alert at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// A contained failure (a rejected batch); the import carries on.
    Warning,
    /// The file's import failed.
    Error,
    /// The source could not be read at all.
    Critical,
}

impl ImportSeverity {
    /// Severity of a fatal error returned from an import.
    pub fn for_error(error: &ImportError) -> Self {
        match error.kind() {
            ErrorKind::FatalIo => ImportSeverity::Critical,
            ErrorKind::FatalSchema | ErrorKind::InvalidOptions => ImportSeverity::Error,
            ErrorKind::BatchInsert => ImportSeverity::Warning,
        }
    }
}

/// The file an outcome belongs to.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// The input path (or source name for reader-based imports).
    pub path: PathBuf,
    /// Requested table name, before sanitization.
    pub table: String,
    /// Tag written to every row's `source_file` column.
    pub source_file: String,
}

/// Receives import outcomes. All callbacks default to doing nothing.
pub trait ImportObserver: Send + Sync {
    /// The file was read to the end; `stats` may still include rejected rows.
    fn on_success(&self, _ctx: &ImportContext, _stats: ImportStats) {}

    /// The store rejected one batch; its rows are counted as errors.
    fn on_batch_failure(&self, _ctx: &ImportContext, _failure: &BatchFailure) {}

    /// The file's import stopped with a fatal error.
    fn on_failure(&self, _ctx: &ImportContext, _severity: ImportSeverity, _error: &ImportError) {}

    /// A fatal error at or above the alert threshold. Defaults to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }

    /// Add another observer after the existing ones.
    pub fn push(&mut self, observer: Arc<dyn ImportObserver>) {
        self.observers.push(observer);
    }

    fn each(&self, f: impl Fn(&dyn ImportObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_batch_failure(&self, ctx: &ImportContext, failure: &BatchFailure) {
        self.each(|o| o.on_batch_failure(ctx, failure));
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Reports outcomes as `tracing` events on the `import_outcome` target.
///
/// The pipeline already logs its progress; this observer adds one structured event per outcome so
/// subscribers can route results and alerts separately from progress chatter.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ImportObserver for TracingObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        tracing::info!(
            target: "import_outcome",
            path = %ctx.path.display(),
            table = %ctx.table,
            total = stats.total,
            imported = stats.imported,
            skipped = stats.skipped,
            error = stats.error,
            "ok"
        );
    }

    fn on_batch_failure(&self, ctx: &ImportContext, failure: &BatchFailure) {
        tracing::warn!(
            target: "import_outcome",
            path = %ctx.path.display(),
            table = %ctx.table,
            rows = failure.rows,
            err = %failure.error,
            "batch rejected"
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            target: "import_outcome",
            path = %ctx.path.display(),
            table = %ctx.table,
            ?severity,
            err = %error,
            "failed"
        );
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        tracing::error!(
            target: "import_outcome",
            alert = true,
            path = %ctx.path.display(),
            table = %ctx.table,
            ?severity,
            err = %error,
            "ALERT"
        );
    }
}

/// Appends one line per outcome to a plain-text import log (e.g. `csv_import.log`).
///
/// Lines look like `1718000000 ok table=plate_reader source=plate_reader.csv total=5 ...`: Unix
/// seconds, the event, then `key=value` pairs. The file is opened on the first event and kept
/// open. Logging is best-effort: open and write failures are ignored so they never affect an
/// import.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn log(&self, event: &str, ctx: &ImportContext, details: fmt::Arguments<'_>) {
        let Ok(mut slot) = self.file.lock() else {
            return;
        };
        if slot.is_none() {
            *slot = OpenOptions::new().create(true).append(true).open(&self.path).ok();
        }
        if let Some(file) = slot.as_mut() {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs());
            let _ = writeln!(
                file,
                "{secs} {event} table={} source={} {details}",
                ctx.table, ctx.source_file
            );
        }
    }
}

impl ImportObserver for FileObserver {
    fn on_success(&self, ctx: &ImportContext, stats: ImportStats) {
        self.log(
            "ok",
            ctx,
            format_args!(
                "total={} imported={} skipped={} error={}",
                stats.total, stats.imported, stats.skipped, stats.error
            ),
        );
    }

    fn on_batch_failure(&self, ctx: &ImportContext, failure: &BatchFailure) {
        self.log(
            "batch_fail",
            ctx,
            format_args!("rows={} err={}", failure.rows, failure.error),
        );
    }

    fn on_failure(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.log(
            "fail",
            ctx,
            format_args!("severity={severity:?} path={} err={error}", ctx.path.display()),
        );
    }

    fn on_alert(&self, ctx: &ImportContext, severity: ImportSeverity, error: &ImportError) {
        self.log(
            "ALERT",
            ctx,
            format_args!("severity={severity:?} path={} err={error}", ctx.path.display()),
        );
    }
}
