//! Error types for archive-level and entry-level failures.
//!
//! The two enums mirror the two failure scopes of a search:
//!
//! - [`SearchError`] is fatal. It is surfaced before any scanning
//!   starts (bad path, unparsable central directory, empty needle) and
//!   aborts the whole operation.
//! - [`EntryError`] is per-entry. A member whose stream cannot be
//!   opened or errors mid-read is skipped and the scan continues with
//!   the remaining entries.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a search before or during setup.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The archive path does not exist.
    #[error("archive not found: {0}")]
    NotFound(PathBuf),

    /// The archive exists but the filesystem denied access.
    #[error("archive not readable: {path}: {source}")]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The central directory could not be parsed.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// The search text was empty after trimming.
    #[error("search text is empty")]
    EmptyQuery,

    /// The underlying data source failed while reading archive
    /// metadata (e.g. the central directory itself).
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Non-fatal errors scoped to a single archive entry.
///
/// The engine logs these and moves on; they never abort the scan and
/// never appear in result data.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The entry's stream could not be opened (bad local header,
    /// unsupported compression method, unreachable data).
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// The stream opened but failed part-way through decompression
    /// or transport.
    #[error("read failed: {0}")]
    ReadFailure(String),
}
