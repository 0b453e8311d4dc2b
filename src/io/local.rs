use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use super::ReadAt;
use crate::error::SearchError;

/// Local file reader with random access support
#[derive(Debug)]
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    /// Open a local archive for reading.
    ///
    /// Validates the path before any archive parsing happens: a
    /// missing file is [`SearchError::NotFound`], anything else the
    /// filesystem refuses is [`SearchError::NotReadable`].
    pub fn open(path: &Path) -> Result<Self, SearchError> {
        let file = std::fs::File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SearchError::NotFound(path.to_path_buf())
            } else {
                SearchError::NotReadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let size = file.metadata().map_err(|source| SearchError::NotReadable {
            path: path.to_path_buf(),
            source,
        })?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            Ok(self.file.read_at(buf, offset)?)
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            Ok(self.file.seek_read(buf, offset)?)
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            Ok(file.read(buf)?)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
