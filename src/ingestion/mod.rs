//! Import entrypoints and pipeline stages.
//!
//! Most callers should use [`import_file`] (from [`pipeline`]) or [`import_directory`] (from
//! [`directory`]), which:
//!
//! - read the header row and the first data row
//! - synthesize and create the table (see [`crate::schema`])
//! - stream every row through [`normalize_row`] and a [`BatchAccumulator`]
//! - commit each batch as one transaction via a [`BatchInserter`]
//! - optionally report outcomes and alerts to an [`ImportObserver`]
//!
//! The stages are also available individually:
//! - [`csv`]: header + record reading
//! - [`normalize`]: row width repair
//! - [`batch`]: batching and transactional inserts

pub mod batch;
pub mod csv;
pub mod directory;
pub mod normalize;
pub mod observability;
pub mod pipeline;

pub use batch::{Batch, BatchAccumulator, BatchFailure, BatchInserter};
pub use directory::{DEFAULT_PATTERN, import_directory, match_files};
pub use normalize::{is_blank_row, normalize_row};
pub use observability::{
    CompositeObserver, FileObserver, ImportContext, ImportObserver, ImportSeverity,
    TracingObserver,
};
pub use pipeline::{
    DEFAULT_BATCH_SIZE, ImportOptions, ImportRequest, import_file, import_reader,
};
