//! Multi-file import with aggregated statistics.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::ImportResult;
use crate::store::ImportStore;
use crate::types::AggregateStats;

use super::pipeline::{ImportOptions, import_file};

/// File pattern used when the caller has no preference.
pub const DEFAULT_PATTERN: &str = "*.csv";

/// Import each file in order, one table per file stem, and sum the statistics.
///
/// A file that fails fatally (unreadable, no header, table rejected) is logged and contributes
/// nothing; the run continues with the next file. `options.table_name` is ignored.
///
/// ```no_run
/// use instrument_csv_import::ingestion::{import_directory, match_files, ImportOptions, DEFAULT_PATTERN};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = rusqlite::Connection::open("instrument_data.db")?;
/// let files = match_files("exports", DEFAULT_PATTERN)?;
/// let totals = import_directory(&mut conn, &files, &ImportOptions::default());
/// println!("{} files, {} rows imported", totals.files_processed, totals.imported);
/// # Ok(())
/// # }
/// ```
pub fn import_directory<S, P>(store: &mut S, files: &[P], options: &ImportOptions) -> AggregateStats
where
    S: ImportStore + ?Sized,
    P: AsRef<Path>,
{
    let mut totals = AggregateStats::default();
    if files.is_empty() {
        warn!("no CSV files to import");
        return totals;
    }
    info!(files = files.len(), "importing CSV files");

    let file_options = ImportOptions {
        table_name: None,
        ..options.clone()
    };
    for file in files {
        let file = file.as_ref();
        match import_file(store, file, &file_options) {
            Ok(stats) => totals += stats,
            Err(e) => error!(path = %file.display(), err = %e, "failed to import file"),
        }
    }

    info!(
        files_processed = totals.files_processed,
        total = totals.total,
        imported = totals.imported,
        skipped = totals.skipped,
        error = totals.error,
        "directory import complete"
    );
    totals
}

/// Files directly inside `dir` whose names match the glob `pattern`, sorted by path.
///
/// Special characters in `dir` itself are matched literally. Entries that cannot be read are
/// logged and left out.
pub fn match_files(dir: impl AsRef<Path>, pattern: &str) -> ImportResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let full = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let mut files = Vec::new();
    for entry in glob::glob(&full)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(path = %e.path().display(), err = %e, "skipping unreadable entry"),
        }
    }
    files.sort();

    info!(dir = %dir.display(), pattern, found = files.len(), "matched CSV files");
    Ok(files)
}
