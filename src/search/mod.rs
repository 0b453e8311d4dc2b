//! Streaming text search over archive entries.
//!
//! Two pieces, kept separate so the scan logic is testable without
//! any presentation concerns:
//!
//! - [`LineMatcher`]: reconstructs logical lines from arbitrary
//!   decompressed chunks and tests each one for a literal substring
//! - [`SearchEngine`]: walks all entries of an opened archive, runs a
//!   fresh matcher per entry, and aggregates [`SearchResult`] and
//!   [`SearchStats`]
//!
//! Rendering the outcome (console, HTML, whatever) is the caller's
//! job; nothing in here formats output.

mod engine;
mod matcher;

pub use engine::{EntryMatches, MatchLine, SearchEngine, SearchOutcome, SearchResult, SearchStats};
pub use matcher::{LineMatcher, ScannedLine};
