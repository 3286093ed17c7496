//! The sfnt running-sum checksum
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums>

use crate::{source::check_range, ByteSource, CancelToken, ReadError};

/// The default size of the scratch buffer used when streaming a checksum.
pub const DEFAULT_CHECKSUM_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the checksum of some in-memory data.
///
/// The data is summed as big-endian u32 words, wrapping on overflow. If the
/// length is not a multiple of four the final word is padded with zeros on
/// the right, as if the data were followed by zero bytes.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut words = data.chunks_exact(4);
    let sum = words
        .by_ref()
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .fold(0u32, u32::wrapping_add);
    let rem = words.remainder();
    if rem.is_empty() {
        return sum;
    }
    let mut last = [0u8; 4];
    last[..rem.len()].copy_from_slice(rem);
    sum.wrapping_add(u32::from_be_bytes(last))
}

/// A reusable scratch buffer for streaming checksums.
///
/// Checksums over large regions (whole collection files can be hundreds of
/// megabytes) are computed one buffer at a time. Each call chain needs its
/// own buffer; share one between threads only with external locking.
#[derive(Debug, Clone)]
pub struct ChecksumBuffer {
    buf: Vec<u8>,
}

impl ChecksumBuffer {
    /// Create a buffer of (at least) `size` bytes.
    ///
    /// The size is rounded up to a multiple of four so that only the last
    /// fill of a region can end in a partial word.
    pub fn new(size: usize) -> Self {
        let size = size.max(4).next_multiple_of(4);
        ChecksumBuffer {
            buf: vec![0; size],
        }
    }

    /// The capacity of this buffer, in bytes.
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Compute the checksum of `length` bytes starting at `offset`.
    ///
    /// The token is polled before every buffer fill; if it has been cancelled
    /// this returns [`ReadError::Cancelled`] instead of a partial sum.
    pub fn region_checksum<S: ByteSource>(
        &mut self,
        source: &mut S,
        offset: u64,
        length: u64,
        cancel: &CancelToken,
    ) -> Result<u32, ReadError> {
        check_range(source.len(), "checksum region", offset, length)?;
        let mut sum = 0u32;
        let mut pos = offset;
        let mut remaining = length;
        while remaining > 0 {
            cancel.check()?;
            let chunk_len = remaining.min(self.buf.len() as u64) as usize;
            let chunk = &mut self.buf[..chunk_len];
            source.read_exact_at(pos, chunk)?;
            sum = sum.wrapping_add(compute_checksum(chunk));
            pos += chunk_len as u64;
            remaining -= chunk_len as u64;
        }
        Ok(sum)
    }
}

impl Default for ChecksumBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKSUM_BUFFER_SIZE)
    }
}
