//! Per-entry decompressed byte streams.
//!
//! An [`EntryStream`] pulls an entry's compressed bytes through
//! positioned reads and yields decompressed chunks. Chunk boundaries
//! are arbitrary; nothing here knows about lines. The stream is
//! closed by dropping it, on every exit path.

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::{Decompress, FlushDecompress, Status};

use super::structures::{ArchiveEntry, CompressionMethod, LFH_SIGNATURE, LFH_SIZE};
use crate::error::EntryError;
use crate::io::{ReadAt, read_fully};

/// Default read-chunk size for entry streams.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A decompressed byte stream over one archive entry.
#[derive(Debug)]
pub struct EntryStream<R: ReadAt> {
    reader: Arc<R>,
    /// Offset of the next compressed byte to fetch
    offset: u64,
    /// Compressed bytes not yet fetched
    remaining: u64,
    chunk_size: usize,
    decoder: Decoder,
}

#[derive(Debug)]
enum Decoder {
    /// STORED entries pass through untouched
    Stored,
    /// DEFLATE entries run through an incremental raw inflater
    Deflate {
        inflater: Decompress,
        in_buf: Vec<u8>,
        in_pos: usize,
        finished: bool,
    },
}

impl<R: ReadAt> EntryStream<R> {
    /// Open a decompression stream for `entry`.
    ///
    /// Reads the entry's Local File Header to locate the start of the
    /// compressed data; the LFH's variable-length fields may differ
    /// from the central directory record, so the offset cannot be
    /// computed from metadata alone.
    ///
    /// Any failure here is [`EntryError::StreamUnavailable`]: the
    /// caller skips the entry and the scan continues.
    pub async fn open(
        reader: Arc<R>,
        entry: &ArchiveEntry,
        chunk_size: usize,
    ) -> Result<Self, EntryError> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        read_fully(reader.as_ref(), entry.lfh_offset, &mut lfh_buf)
            .await
            .map_err(|e| EntryError::StreamUnavailable(e.to_string()))?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            return Err(EntryError::StreamUnavailable(
                "invalid local file header".into(),
            ));
        }

        let mut cursor = Cursor::new(&lfh_buf);
        cursor.set_position(26); // filename length field
        let file_name_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| EntryError::StreamUnavailable(e.to_string()))?
            as u64;
        let extra_field_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| EntryError::StreamUnavailable(e.to_string()))?
            as u64;

        let data_offset = entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length;
        if data_offset
            .checked_add(entry.compressed_size)
            .is_none_or(|end| end > reader.size())
        {
            return Err(EntryError::StreamUnavailable(
                "entry data lies beyond end of archive".into(),
            ));
        }

        // A zero-byte member (directories included) has nothing to
        // decode regardless of its declared method.
        let decoder = if entry.compressed_size == 0 {
            Decoder::Stored
        } else {
            match entry.compression_method {
                CompressionMethod::Stored => Decoder::Stored,
                CompressionMethod::Deflate => Decoder::Deflate {
                    // raw deflate, no zlib header
                    inflater: Decompress::new(false),
                    in_buf: Vec::new(),
                    in_pos: 0,
                    finished: false,
                },
                CompressionMethod::Unknown(method) => {
                    return Err(EntryError::StreamUnavailable(format!(
                        "unsupported compression method {method}"
                    )));
                }
            }
        };

        Ok(Self {
            reader,
            offset: data_offset,
            remaining: entry.compressed_size,
            chunk_size,
            decoder,
        })
    }

    /// Yield the next decompressed chunk, or `None` at end of stream.
    ///
    /// Chunks are at most `chunk_size` bytes and never empty.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, EntryError> {
        if matches!(self.decoder, Decoder::Stored) {
            self.next_stored().await
        } else {
            self.next_deflate().await
        }
    }

    async fn next_stored(&mut self) -> Result<Option<Vec<u8>>, EntryError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let len = self.chunk_size.min(self.remaining as usize);
        let mut buf = vec![0u8; len];
        read_fully(self.reader.as_ref(), self.offset, &mut buf)
            .await
            .map_err(|e| EntryError::ReadFailure(e.to_string()))?;
        self.offset += len as u64;
        self.remaining -= len as u64;
        Ok(Some(buf))
    }

    async fn next_deflate(&mut self) -> Result<Option<Vec<u8>>, EntryError> {
        loop {
            // Refill the compressed input buffer when it is drained.
            let need_input = match &self.decoder {
                Decoder::Deflate {
                    in_buf,
                    in_pos,
                    finished,
                    ..
                } => !*finished && *in_pos == in_buf.len() && self.remaining > 0,
                Decoder::Stored => unreachable!(),
            };
            if need_input {
                let len = self.chunk_size.min(self.remaining as usize);
                let mut buf = vec![0u8; len];
                read_fully(self.reader.as_ref(), self.offset, &mut buf)
                    .await
                    .map_err(|e| EntryError::ReadFailure(e.to_string()))?;
                self.offset += len as u64;
                self.remaining -= len as u64;
                if let Decoder::Deflate { in_buf, in_pos, .. } = &mut self.decoder {
                    *in_buf = buf;
                    *in_pos = 0;
                }
            }

            let Decoder::Deflate {
                inflater,
                in_buf,
                in_pos,
                finished,
            } = &mut self.decoder
            else {
                unreachable!()
            };

            if *finished {
                return Ok(None);
            }

            let mut out = vec![0u8; self.chunk_size];
            let before_in = inflater.total_in();
            let before_out = inflater.total_out();
            let status = inflater
                .decompress(&in_buf[*in_pos..], &mut out, FlushDecompress::None)
                .map_err(|e| EntryError::ReadFailure(format!("inflate failed: {e}")))?;
            *in_pos += (inflater.total_in() - before_in) as usize;
            let produced = (inflater.total_out() - before_out) as usize;

            if status == Status::StreamEnd {
                *finished = true;
            }
            if produced > 0 {
                out.truncate(produced);
                return Ok(Some(out));
            }
            if *finished {
                return Ok(None);
            }
            if self.remaining == 0 && *in_pos == in_buf.len() {
                return Err(EntryError::ReadFailure("truncated deflate stream".into()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    #[derive(Debug)]
    struct MemoryReader(Vec<u8>);

    #[async_trait]
    impl ReadAt for MemoryReader {
        async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
            let start = (offset as usize).min(self.0.len());
            let len = buf.len().min(self.0.len() - start);
            buf[..len].copy_from_slice(&self.0[start..start + len]);
            Ok(len)
        }

        fn size(&self) -> u64 {
            self.0.len() as u64
        }
    }

    /// Lay out a minimal LFH + data blob and the matching entry.
    fn member(name: &str, data: &[u8], method: CompressionMethod) -> (Vec<u8>, ArchiveEntry) {
        let mut buf = Vec::new();
        buf.extend_from_slice(LFH_SIGNATURE);
        buf.extend_from_slice(&20u16.to_le_bytes()); // version needed
        buf.extend_from_slice(&0u16.to_le_bytes()); // flags
        buf.extend_from_slice(&method.as_u16().to_le_bytes());
        buf.extend_from_slice(&[0u8; 4]); // time + date
        buf.extend_from_slice(&[0u8; 4]); // crc32 (unchecked)
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // uncompressed size (unused here)
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // extra length
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(data);

        let entry = ArchiveEntry {
            name: name.to_string(),
            index: 0,
            compression_method: method,
            compressed_size: data.len() as u64,
            uncompressed_size: 0,
            lfh_offset: 0,
            is_directory: false,
        };
        (buf, entry)
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    async fn drain<R: ReadAt>(stream: &mut EntryStream<R>) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next_chunk().await.unwrap() {
            assert!(!chunk.is_empty());
            out.extend_from_slice(&chunk);
        }
        out
    }

    #[tokio::test]
    async fn stored_entry_streams_in_chunks() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (buf, entry) = member("fox.txt", data, CompressionMethod::Stored);
        let reader = Arc::new(MemoryReader(buf));

        let mut stream = EntryStream::open(reader, &entry, 5).await.unwrap();
        assert_eq!(drain(&mut stream).await, data);
    }

    #[tokio::test]
    async fn deflate_entry_round_trips_with_tiny_chunks() {
        let data = "hello streaming world\n".repeat(100);
        let compressed = deflate(data.as_bytes());
        let (buf, entry) = member("hello.txt", &compressed, CompressionMethod::Deflate);
        let reader = Arc::new(MemoryReader(buf));

        let mut stream = EntryStream::open(reader, &entry, 7).await.unwrap();
        assert_eq!(drain(&mut stream).await, data.as_bytes());
    }

    #[tokio::test]
    async fn zero_byte_entry_yields_no_chunks() {
        let (buf, entry) = member("empty.txt", b"", CompressionMethod::Deflate);
        let reader = Arc::new(MemoryReader(buf));

        let mut stream = EntryStream::open(reader, &entry, 16).await.unwrap();
        assert_eq!(stream.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_method_is_unavailable() {
        let (buf, entry) = member("odd.bin", b"data", CompressionMethod::Unknown(99));
        let reader = Arc::new(MemoryReader(buf));

        let err = EntryStream::open(reader, &entry, 16).await.unwrap_err();
        assert!(matches!(err, EntryError::StreamUnavailable(_)));
    }

    #[tokio::test]
    async fn truncated_deflate_is_a_read_failure() {
        let data = "0123456789".repeat(50);
        let mut compressed = deflate(data.as_bytes());
        compressed.truncate(compressed.len() / 2);
        let (buf, entry) = member("cut.txt", &compressed, CompressionMethod::Deflate);
        let reader = Arc::new(MemoryReader(buf));

        let mut stream = EntryStream::open(reader, &entry, 4096).await.unwrap();
        let mut result = Ok(Some(Vec::new()));
        while let Ok(Some(_)) = result {
            result = stream.next_chunk().await;
        }
        assert!(matches!(result, Err(EntryError::ReadFailure(_))));
    }

    #[tokio::test]
    async fn bad_local_header_is_unavailable() {
        let (mut buf, entry) = member("x.txt", b"abc", CompressionMethod::Stored);
        buf[0] = b'Z';
        let reader = Arc::new(MemoryReader(buf));

        let err = EntryStream::open(reader, &entry, 16).await.unwrap_err();
        assert!(matches!(err, EntryError::StreamUnavailable(_)));
    }
}
