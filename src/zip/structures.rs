use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::SearchError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self, SearchError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(SearchError::Corrupt(
                "invalid end of central directory record".into(),
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let read = |c: &mut Cursor<&[u8]>| -> Result<(u16, u16, u16, u16, u32, u32, u16), std::io::Error> {
            Ok((
                c.read_u16::<LittleEndian>()?, // disk number
                c.read_u16::<LittleEndian>()?, // disk with central directory
                c.read_u16::<LittleEndian>()?,
                c.read_u16::<LittleEndian>()?,
                c.read_u32::<LittleEndian>()?,
                c.read_u32::<LittleEndian>()?,
                c.read_u16::<LittleEndian>()?,
            ))
        };
        let (_disk, _cd_disk, disk_entries, total_entries, cd_size, cd_offset, comment_len) =
            read(&mut cursor).map_err(|_| {
                SearchError::Corrupt("truncated end of central directory record".into())
            })?;

        Ok(Self {
            disk_entries,
            total_entries,
            cd_size,
            cd_offset,
            comment_len,
        })
    }

    /// Sentinel values mean the real numbers live in the ZIP64 EOCD.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EocdLocator {
    pub eocd64_offset: u64,
}

impl Zip64EocdLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self, SearchError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(SearchError::Corrupt("invalid ZIP64 locator".into()));
        }

        let mut cursor = Cursor::new(&data[8..]); // skip signature + disk number
        let eocd64_offset = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| SearchError::Corrupt("truncated ZIP64 locator".into()))?;

        Ok(Self { eocd64_offset })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64Eocd {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64Eocd {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self, SearchError> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(SearchError::Corrupt(
                "invalid ZIP64 end of central directory".into(),
            ));
        }

        // Fixed-size fields up to disk_entries are not needed for a
        // read-only scan; the interesting values sit at the tail.
        let mut cursor = Cursor::new(&data[32..]);
        let parse = |c: &mut Cursor<&[u8]>| -> Result<(u64, u64, u64), std::io::Error> {
            Ok((
                c.read_u64::<LittleEndian>()?,
                c.read_u64::<LittleEndian>()?,
                c.read_u64::<LittleEndian>()?,
            ))
        };
        let (total_entries, cd_size, cd_offset) = parse(&mut cursor).map_err(|_| {
            SearchError::Corrupt("truncated ZIP64 end of central directory".into())
        })?;

        Ok(Self {
            total_entries,
            cd_size,
            cd_offset,
        })
    }
}

/// Central Directory File Header (CDFH) signature
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// One archive member, as described by its central directory record.
///
/// Read-only view; owning the metadata (not the data) lets the search
/// engine iterate entries without touching the compressed streams.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry name, unique within the archive
    pub name: String,
    /// Ordinal position in the central directory (0-based)
    pub index: usize,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Offset of this entry's Local File Header in the archive
    pub lfh_offset: u64,
    /// Directory entries carry no data and end with '/'
    pub is_directory: bool,
}
