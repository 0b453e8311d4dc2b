//! Line-oriented substring matching over a chunked byte stream.
//!
//! The matcher is push-based: callers feed decompressed chunks in
//! whatever sizes the stream produces, and the matcher reconstructs
//! logical lines across chunk boundaries. A line is a run of bytes
//! terminated by `\n` (a trailing `\r` is treated as part of the
//! terminator), or the final unterminated run at end of stream.

/// One scanned logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// 1-based line number within the entry
    pub number: u64,
    /// Line content, trimmed of leading/trailing whitespace
    pub text: String,
    /// Whether the untrimmed line contained the needle
    pub is_match: bool,
}

/// Reconstructs lines from arbitrary chunks and tests each one for a
/// literal byte substring.
///
/// The needle must be non-empty and already trimmed; the engine
/// enforces both before constructing a matcher. Matching runs against
/// the raw line bytes (leading/trailing whitespace included) so that
/// matches adjacent to padding are not lost; only the emitted text is
/// trimmed, for reporting.
pub struct LineMatcher {
    needle: Vec<u8>,
    pending: Vec<u8>,
    next_line: u64,
}

impl LineMatcher {
    pub fn new(needle: &[u8]) -> Self {
        debug_assert!(!needle.is_empty(), "empty needle must be rejected by the caller");
        Self {
            needle: needle.to_vec(),
            pending: Vec::new(),
            next_line: 1,
        }
    }

    /// Consume one chunk, emitting a record for every line completed
    /// by it. Bytes after the last terminator stay buffered for the
    /// next chunk.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<ScannedLine>) {
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            self.emit_line(out);
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);
    }

    /// Flush the final unterminated line, if any.
    ///
    /// An empty stream (or one ending exactly on a terminator) emits
    /// nothing here: a zero-byte entry has zero lines, not one empty
    /// line.
    pub fn finish(&mut self, out: &mut Vec<ScannedLine>) {
        if !self.pending.is_empty() {
            self.emit_line(out);
        }
    }

    fn emit_line(&mut self, out: &mut Vec<ScannedLine>) {
        let raw = match self.pending.last() {
            Some(b'\r') => &self.pending[..self.pending.len() - 1],
            _ => &self.pending[..],
        };
        let is_match = contains(raw, &self.needle);
        let text = String::from_utf8_lossy(raw).trim().to_string();
        out.push(ScannedLine {
            number: self.next_line,
            text,
            is_match,
        });
        self.next_line += 1;
        self.pending.clear();
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
