//! ZIP archive reading, tuned for scanning rather than extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: data structures for ZIP format records (EOCD,
//!   ZIP64 records, entry metadata)
//! - [`reader`]: central directory parsing, everything needed to
//!   list entries without decompressing anything
//! - [`stream`]: per-entry decompressed byte streams
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first (from the end of the file), then the
//! Central Directory, so listing entries never touches the file data.
//! For HTTP sources this means a couple of Range requests.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for archives > 4GB
//! - STORED (no compression) and DEFLATE entries
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods (entries using them
//!   are skipped at scan time, not fatal)

mod reader;
mod stream;
mod structures;

pub use reader::ZipArchive;
pub use stream::{DEFAULT_CHUNK_SIZE, EntryStream};
pub use structures::{ArchiveEntry, CompressionMethod};
