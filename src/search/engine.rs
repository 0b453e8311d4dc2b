//! Scan orchestration and result aggregation.

use std::time::{Duration, Instant};

use crate::error::{EntryError, SearchError};
use crate::io::ReadAt;
use crate::search::matcher::{LineMatcher, ScannedLine};
use crate::zip::{ArchiveEntry, DEFAULT_CHUNK_SIZE, EntryStream, ZipArchive};

/// A single matching line within an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLine {
    /// 1-based line number within the entry
    pub line_number: u64,
    /// Trimmed line content
    pub text: String,
}

/// All matching lines for one entry, in ascending line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMatches {
    pub entry_name: String,
    pub lines: Vec<MatchLine>,
}

/// Matches grouped by entry, in archive directory order.
///
/// An entry is present iff it has at least one matching line; no
/// entry ever maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    entries: Vec<EntryMatches>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with at least one match.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryMatches> {
        self.entries.iter()
    }

    /// Matching lines for a named entry, if it matched at all.
    pub fn get(&self, entry_name: &str) -> Option<&[MatchLine]> {
        self.entries
            .iter()
            .find(|e| e.entry_name == entry_name)
            .map(|e| e.lines.as_slice())
    }

    fn push(&mut self, entry_name: String, lines: Vec<MatchLine>) {
        debug_assert!(!lines.is_empty());
        self.entries.push(EntryMatches { entry_name, lines });
    }
}

/// Aggregate statistics for one search invocation.
#[derive(Debug, Clone)]
pub struct SearchStats {
    /// Entries for which a scan was attempted
    pub entries_scanned: u64,
    /// Distinct entries with at least one match
    pub entries_matched: u64,
    /// Total archive size in bytes
    pub archive_size: u64,
    /// Wall-clock duration of the scan
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Result and statistics of one search invocation.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: SearchResult,
    pub stats: SearchStats,
}

/// Scans every entry of an opened archive for a literal fragment.
///
/// The scan is sequential, entry by entry; the archives this tool
/// targets are bounded by decompression speed, not scheduling. Each
/// entry gets its own stream and matcher, so no state leaks between
/// entries. Dropping the future mid-scan closes the in-flight stream
/// and emits nothing for that entry.
pub struct SearchEngine<R: ReadAt> {
    archive: ZipArchive<R>,
    chunk_size: usize,
}

impl<R: ReadAt> SearchEngine<R> {
    pub fn new(archive: ZipArchive<R>) -> Self {
        Self {
            archive,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the read-chunk size for entry streams.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn archive(&self) -> &ZipArchive<R> {
        &self.archive
    }

    /// Search every entry for `text` as a literal, case-sensitive
    /// substring.
    ///
    /// The text is trimmed exactly once here; an empty trimmed needle
    /// fails with [`SearchError::EmptyQuery`] before any entry is
    /// touched. Entry-level stream failures are logged and skipped;
    /// they never abort the scan.
    pub async fn search(&self, text: &str) -> Result<SearchOutcome, SearchError> {
        let needle = text.trim();
        if needle.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let started = Instant::now();
        let mut result = SearchResult::default();
        let mut entries_scanned = 0u64;
        let mut entries_matched = 0u64;

        for entry in self.archive.entries() {
            entries_scanned += 1;
            match self.scan_entry(entry, needle.as_bytes()).await {
                Ok(lines) => {
                    tracing::debug!(entry = %entry.name, matches = lines.len(), "scanned");
                    if !lines.is_empty() {
                        entries_matched += 1;
                        result.push(entry.name.clone(), lines);
                    }
                }
                Err(err) => {
                    tracing::warn!(entry = %entry.name, %err, "skipping entry");
                }
            }
        }

        let stats = SearchStats {
            entries_scanned,
            entries_matched,
            archive_size: self.archive.size(),
            elapsed: started.elapsed(),
        };
        Ok(SearchOutcome { result, stats })
    }

    /// Stream one entry through a fresh matcher and collect its
    /// matching lines.
    async fn scan_entry(
        &self,
        entry: &ArchiveEntry,
        needle: &[u8],
    ) -> Result<Vec<MatchLine>, EntryError> {
        let mut stream =
            EntryStream::open(self.archive.reader().clone(), entry, self.chunk_size).await?;
        let mut matcher = LineMatcher::new(needle);
        let mut scanned = Vec::new();
        let mut matches = Vec::new();

        let collect = |scanned: &mut Vec<ScannedLine>, matches: &mut Vec<MatchLine>| {
            for line in scanned.drain(..) {
                if line.is_match {
                    matches.push(MatchLine {
                        line_number: line.number,
                        text: line.text,
                    });
                }
            }
        };

        while let Some(chunk) = stream.next_chunk().await? {
            matcher.feed(&chunk, &mut scanned);
            collect(&mut scanned, &mut matches);
        }
        matcher.finish(&mut scanned);
        collect(&mut scanned, &mut matches);

        Ok(matches)
    }
}
