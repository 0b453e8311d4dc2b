//! # zipsearch
//!
//! Search for a literal text fragment inside every entry of a ZIP
//! archive, without extracting anything to disk.
//!
//! The archive's central directory is parsed up front; each entry is
//! then streamed through an incremental decompressor and a
//! line-oriented matcher that reconstructs lines across read-chunk
//! boundaries. A single unreadable member never aborts the scan of
//! the rest of the archive.
//!
//! Archives are read through a random-access [`ReadAt`] trait, so the
//! same engine searches local files and remote ZIPs over HTTP Range
//! requests, transferring only the central directory and the
//! compressed bytes of each entry.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use zipsearch::{LocalFileReader, SearchEngine, ZipArchive};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::open(Path::new("logs.zip"))?);
//!     let archive = ZipArchive::open(reader).await?;
//!     let outcome = SearchEngine::new(archive).search("connection reset").await?;
//!
//!     for matches in outcome.result.iter() {
//!         println!("- {}:", matches.entry_name);
//!         for line in &matches.lines {
//!             println!("  Line {}: {}", line.line_number, line.text);
//!         }
//!     }
//!     println!(
//!         "{} of {} entries matched in {:.4} s",
//!         outcome.stats.entries_matched,
//!         outcome.stats.entries_scanned,
//!         outcome.stats.elapsed_seconds()
//!     );
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod search;
pub mod zip;

pub use cli::Cli;
pub use error::{EntryError, SearchError};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use search::{
    EntryMatches, LineMatcher, MatchLine, SearchEngine, SearchOutcome, SearchResult, SearchStats,
};
pub use zip::{ArchiveEntry, CompressionMethod, DEFAULT_CHUNK_SIZE, EntryStream, ZipArchive};
