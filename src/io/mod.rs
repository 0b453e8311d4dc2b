mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use anyhow::{Result, bail};
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    ///
    /// May return fewer bytes than requested; use [`read_fully`] when
    /// a short read is not acceptable.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

/// Fill `buf` completely from `offset`, looping over short reads.
///
/// Archive headers are fixed-size records, so a short read there is a
/// hard error rather than something the parser can work around.
pub async fn read_fully<R: ReadAt + ?Sized>(reader: &R, offset: u64, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read_at(offset + filled as u64, &mut buf[filled..])
            .await?;
        if n == 0 {
            bail!(
                "unexpected end of archive at offset {} (wanted {} bytes)",
                offset + filled as u64,
                buf.len()
            );
        }
        filled += n;
    }
    Ok(())
}
