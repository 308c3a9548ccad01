use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Coarse classification of an [`ImportError`].
///
/// Callers use this to tell failures that abort a file's import apart from failures that are
/// contained to a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source file is missing, unreadable, or has no header row. Aborts the file.
    FatalIo,
    /// The table could not be synthesized or created. Aborts the file.
    FatalSchema,
    /// A batch commit was rejected. Isolated to that batch.
    BatchInsert,
    /// The caller passed unusable options (zero batch size, bad file pattern).
    InvalidOptions,
}

/// Error reported by an [`crate::store::ImportStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected a statement or transaction.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure reported by a non-SQLite store.
    #[error("{0}")]
    Rejected(String),
}

/// Error type returned by import functions.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed (malformed quoting, invalid UTF-8, read error mid-stream).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The source has no header row at all.
    #[error("no header row in {source_name}")]
    MissingHeader { source_name: String },

    /// The table could not be synthesized from the header/sample pair.
    #[error("schema error for table '{table}': {message}")]
    Schema { table: String, message: String },

    /// The store rejected the table creation statement.
    #[error("failed to create table '{table}': {source}")]
    CreateTable {
        table: String,
        #[source]
        source: StoreError,
    },

    /// The store rejected a batch commit.
    #[error("batch insert into '{table}' failed ({rows} rows): {source}")]
    BatchInsert {
        table: String,
        rows: usize,
        #[source]
        source: StoreError,
    },

    /// Options that cannot drive an import.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// The directory file pattern could not be compiled.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ImportError {
    /// Classify this error as fatal (per file), isolated (per batch), or a caller mistake.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Io { .. } | ImportError::Csv(_) | ImportError::MissingHeader { .. } => {
                ErrorKind::FatalIo
            }
            ImportError::Schema { .. } | ImportError::CreateTable { .. } => ErrorKind::FatalSchema,
            ImportError::BatchInsert { .. } => ErrorKind::BatchInsert,
            ImportError::InvalidOptions { .. } | ImportError::Pattern(_) => {
                ErrorKind::InvalidOptions
            }
        }
    }

    /// `true` when the error aborts the whole file's import.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::FatalIo | ErrorKind::FatalSchema)
    }
}
