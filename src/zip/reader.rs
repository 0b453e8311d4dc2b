//! Central directory reader.
//!
//! ZIP archives are read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's tail
//! 2. If ZIP64, follow the locator to the ZIP64 EOCD
//! 3. Read the Central Directory to get metadata for every entry
//!
//! Only the tail of the archive is fetched to list entries, which is
//! what makes scanning remote archives over Range requests cheap.

use std::io::{Cursor, Read};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};

use super::structures::*;
use crate::error::SearchError;
use crate::io::{ReadAt, read_fully};

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// Limits the backward search area when the EOCD is not at the very
/// end of the file.
const MAX_COMMENT_SIZE: u64 = 65535;

/// An opened archive: validated central directory plus entry metadata.
///
/// Parsing happens eagerly in [`ZipArchive::open`], so a corrupt
/// archive fails before any entry is scanned. The struct is a
/// read-only view; nothing here is decompressed.
#[derive(Debug)]
pub struct ZipArchive<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
    entries: Vec<ArchiveEntry>,
}

impl<R: ReadAt> ZipArchive<R> {
    /// Open and validate an archive.
    ///
    /// Fails with [`SearchError::Corrupt`] if no valid EOCD can be
    /// found or the central directory does not parse.
    pub async fn open(reader: Arc<R>) -> Result<Self, SearchError> {
        let size = reader.size();
        let (eocd, eocd_offset) = Self::find_eocd(&reader, size).await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = Self::read_zip64_eocd(&reader, eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        if cd_offset.checked_add(cd_size).is_none_or(|end| end > size) {
            return Err(SearchError::Corrupt(
                "central directory lies beyond end of archive".into(),
            ));
        }

        // One read for the whole central directory; for HTTP sources
        // this is a single Range request.
        let mut cd_data = vec![0u8; cd_size as usize];
        read_fully(reader.as_ref(), cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for index in 0..total_entries as usize {
            entries.push(Self::parse_cdfh(&mut cursor, index)?);
        }

        Ok(Self {
            reader,
            size,
            entries,
        })
    }

    /// Entries in native central directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Total size of the archive file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Shared handle to the underlying data source.
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    /// Locate and parse the EOCD record.
    ///
    /// Tries the no-comment fast path first (EOCD exactly at the
    /// tail), then searches backwards through the maximum comment
    /// window for the signature.
    async fn find_eocd(
        reader: &Arc<R>,
        size: u64,
    ) -> Result<(EndOfCentralDirectory, u64), SearchError> {
        if size >= EndOfCentralDirectory::SIZE as u64 {
            let offset = size - EndOfCentralDirectory::SIZE as u64;
            let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
            read_fully(reader.as_ref(), offset, &mut buf).await?;

            if &buf[0..4] == EndOfCentralDirectory::SIGNATURE {
                let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
                if eocd.comment_len == 0 {
                    return Ok((eocd, offset));
                }
            }
        } else {
            return Err(SearchError::Corrupt("file too small to be a ZIP".into()));
        }

        // The EOCD sits earlier when the archive carries a comment.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(size);
        let search_start = size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        read_fully(reader.as_ref(), search_start, &mut buf).await?;

        for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                // A real EOCD's comment length accounts for exactly
                // the bytes that follow it.
                if eocd.comment_len as usize == buf.len() - i - EndOfCentralDirectory::SIZE {
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        Err(SearchError::Corrupt("not a valid ZIP file".into()))
    }

    /// Follow the ZIP64 locator (immediately before the EOCD) to the
    /// ZIP64 EOCD record.
    async fn read_zip64_eocd(reader: &Arc<R>, eocd_offset: u64) -> Result<Zip64Eocd, SearchError> {
        if eocd_offset < Zip64EocdLocator::SIZE as u64 {
            return Err(SearchError::Corrupt("missing ZIP64 locator".into()));
        }
        let locator_offset = eocd_offset - Zip64EocdLocator::SIZE as u64;
        let mut locator_buf = vec![0u8; Zip64EocdLocator::SIZE];
        read_fully(reader.as_ref(), locator_offset, &mut locator_buf).await?;
        let locator = Zip64EocdLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64Eocd::MIN_SIZE];
        read_fully(reader.as_ref(), locator.eocd64_offset, &mut eocd64_buf).await?;
        Zip64Eocd::from_bytes(&eocd64_buf)
    }

    /// Parse one Central Directory File Header.
    fn parse_cdfh(cursor: &mut Cursor<&[u8]>, index: usize) -> Result<ArchiveEntry, SearchError> {
        let corrupt = |_| SearchError::Corrupt("truncated central directory".into());

        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig).map_err(corrupt)?;
        if sig != CDFH_SIGNATURE {
            return Err(SearchError::Corrupt(
                "invalid central directory file header".into(),
            ));
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _version_needed = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _flags = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let compression_method = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _crc32 = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>().map_err(corrupt)? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>().map_err(corrupt)? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let extra_field_length = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let file_comment_length = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
        let _external_attrs = cursor.read_u32::<LittleEndian>().map_err(corrupt)?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>().map_err(corrupt)? as u64;

        let mut name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut name_bytes).map_err(corrupt)?;
        // Lossy conversion keeps non-UTF8 names scannable.
        let name = String::from_utf8_lossy(&name_bytes).to_string();
        let is_directory = name.ends_with('/');

        // ZIP64 extended information (extra field id 0x0001) replaces
        // any 32-bit field that saturated at 0xFFFFFFFF.
        let extra_field_end = cursor.position() + extra_field_length as u64;
        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;
            let field_size = cursor.read_u16::<LittleEndian>().map_err(corrupt)?;

            if header_id == 0x0001 {
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    compressed_size = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
                }
                if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                    lfh_offset = cursor.read_u64::<LittleEndian>().map_err(corrupt)?;
                }
                break;
            }
            cursor.set_position(cursor.position() + field_size as u64);
        }
        cursor.set_position(extra_field_end);

        // Skip the per-entry comment
        cursor.set_position(cursor.position() + file_comment_length as u64);

        Ok(ArchiveEntry {
            name,
            index,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            lfh_offset,
            is_directory,
        })
    }
}
