//! Random-access byte sources

use std::io::{Read, Seek, SeekFrom};

use types::{FixedSize, Scalar};

use crate::ReadError;

/// A random-access view of the bytes of one font file.
///
/// Every read is bounds checked against [`ByteSource::len`] before it is
/// attempted, so a damaged directory can never cause a read past the end of
/// the file.
pub trait ByteSource {
    /// The total length of the file, in bytes.
    fn len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Returns [`ReadError::BoundsError`] if the range is not entirely within
    /// the file.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), ReadError>;

    /// `true` if the file has a length of zero bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a big-endian scalar at `offset`.
    fn read_at<T: Scalar>(&mut self, offset: u64) -> Result<T, ReadError>
    where
        Self: Sized,
    {
        let mut raw = [0u8; 8];
        let raw = &mut raw[..T::RAW_BYTE_LEN];
        self.read_exact_at(offset, raw)?;
        let len = self.len();
        T::read(raw).ok_or_else(|| {
            ReadError::out_of_bounds("scalar", offset, T::RAW_BYTE_LEN as u64, len)
        })
    }

    /// Read `length` bytes starting at `offset` into a new vector.
    fn read_vec(&mut self, offset: u64, length: usize) -> Result<Vec<u8>, ReadError>
    where
        Self: Sized,
    {
        check_range(self.len(), "region", offset, length as u64)?;
        let mut buf = vec![0u8; length];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), ReadError> {
        (**self).read_exact_at(offset, buf)
    }
}

/// Ensure `offset..offset + length` lies within a file of `file_len` bytes.
pub(crate) fn check_range(
    file_len: u64,
    what: &'static str,
    offset: u64,
    length: u64,
) -> Result<(), ReadError> {
    match offset.checked_add(length) {
        Some(end) if end <= file_len => Ok(()),
        _ => Err(ReadError::out_of_bounds(what, offset, length, file_len)),
    }
}

/// A byte source backed by an in-memory slice.
#[derive(Debug, Default, Clone, Copy)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        SliceSource { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl ByteSource for SliceSource<'_> {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), ReadError> {
        check_range(self.len(), "read", offset, buf.len() as u64)?;
        // in range: offset + buf.len() <= bytes.len() <= usize::MAX
        let start = offset as usize;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}

/// A byte source backed by a seekable reader, such as a [`std::fs::File`].
///
/// The length is measured once, when the source is created.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> ReaderSource<R> {
    pub fn new(mut inner: R) -> Result<Self, ReadError> {
        let len = inner.seek(SeekFrom::End(0))?;
        Ok(ReaderSource { inner, len })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), ReadError> {
        check_range(self.len, "read", offset, buf.len() as u64)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn slice_reads() {
        let mut source = SliceSource::new(&[0, 1, 0, 0, 0xAB, 0xCD]);
        assert_eq!(source.read_at::<u32>(0).unwrap(), 0x00010000);
        assert_eq!(source.read_at::<u16>(4).unwrap(), 0xABCD);
        assert!(matches!(
            source.read_at::<u32>(4),
            Err(ReadError::BoundsError { .. })
        ));
        assert!(source.read_at::<u16>(u64::MAX).is_err());
    }

    #[test]
    fn reader_matches_slice() {
        let bytes = (0u8..=255).collect::<Vec<_>>();
        let mut reader = ReaderSource::new(Cursor::new(bytes.clone())).unwrap();
        let mut slice = SliceSource::new(&bytes);
        assert_eq!(reader.len(), 256);
        for offset in [0u64, 3, 100, 252] {
            assert_eq!(
                reader.read_at::<u32>(offset).unwrap(),
                slice.read_at::<u32>(offset).unwrap()
            );
        }
        assert!(reader.read_vec(250, 7).is_err());
        assert_eq!(reader.read_vec(250, 6).unwrap(), &bytes[250..]);
    }

    #[test]
    fn dyn_source() {
        let bytes = [0x12, 0x34];
        let mut source = SliceSource::new(&bytes);
        let mut erased: &mut dyn ByteSource = &mut source;
        assert_eq!((&mut erased).read_at::<u16>(0).unwrap(), 0x1234);
    }
}
