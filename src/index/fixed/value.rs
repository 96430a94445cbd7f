//! Zero-copy views over an entry's value bytes.
//!
//! - [`ValueSlice`] - the whole value as a borrowed byte slice
//! - [`ValueReader`] - a sequential cursor for decoding structured values

use std::io;
use std::ops::Deref;

use crate::common::{Error, Result};

/// Borrowed view of one entry's value.
///
/// The slice points straight into the page (or embedded payload) the
/// iterator is positioned on; it lives as long as the borrow of the iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSlice<'a> {
    bytes: &'a [u8],
}

impl<'a> ValueSlice<'a> {
    #[inline]
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The value bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Width of the value (the tree's value size).
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for trees with a zero-width value (key-only sets).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy the value out.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// A sequential reader over the same bytes.
    #[inline]
    pub fn reader(&self) -> ValueReader<'a> {
        ValueReader::new(self.bytes)
    }
}

impl Deref for ValueSlice<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for ValueSlice<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Sequential reader over a value.
///
/// Integers are little-endian unless the method says otherwise, matching the
/// on-page encoding of keys.
///
/// # Example
/// ```
/// # use fixedtree::index::fixed::ValueReader;
/// # fn demo(mut reader: ValueReader<'_>) -> fixedtree::Result<()> {
/// let id = reader.read_i64()?;
/// let flags = reader.read_u16()?;
/// let rest = reader.read_bytes(reader.remaining())?;
/// # let _ = (id, flags, rest);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ValueReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ValueReader<'a> {
    #[inline]
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Total length of the value.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Rewind to the start of the value.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Advance without reading.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Borrow the next `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Read a big-endian i64 (used by callers that store sortable keys).
    pub fn read_i64_be(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::ReadPastEnd {
                requested: count,
                remaining: self.remaining(),
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.bytes[start..self.position])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

impl io::Read for ValueReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.bytes[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_slice_views() {
        let bytes = [1u8, 2, 3, 4];
        let slice = ValueSlice::new(&bytes);
        assert_eq!(slice.len(), 4);
        assert!(!slice.is_empty());
        assert_eq!(&slice[..2], &[1, 2]);
        assert_eq!(slice.to_vec(), vec![1, 2, 3, 4]);
        assert!(ValueSlice::new(&[]).is_empty());
    }

    #[test]
    fn test_reader_integers() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-5i64).to_le_bytes());
        bytes.extend_from_slice(&0x0102u16.to_le_bytes());
        bytes.extend_from_slice(&77i32.to_le_bytes());
        bytes.extend_from_slice(&1234i64.to_be_bytes());
        bytes.push(0xEE);

        let mut reader = ValueReader::new(&bytes);
        assert_eq!(reader.read_i64().unwrap(), -5);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.read_i32().unwrap(), 77);
        assert_eq!(reader.read_i64_be().unwrap(), 1234);
        assert_eq!(reader.read_u8().unwrap(), 0xEE);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn test_reader_past_end() {
        let bytes = [1u8, 2, 3];
        let mut reader = ValueReader::new(&bytes);
        reader.skip(2).unwrap();

        match reader.read_u16() {
            Err(Error::ReadPastEnd {
                requested,
                remaining,
            }) => {
                assert_eq!(requested, 2);
                assert_eq!(remaining, 1);
            }
            other => panic!("expected ReadPastEnd, got {:?}", other),
        }
        // A failed read does not consume anything.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_reader_reset_and_io_read() {
        let bytes = *b"abcdef";
        let mut reader = ValueSlice::new(&bytes).reader();
        assert_eq!(reader.read_bytes(3).unwrap(), b"abc");

        reader.reset();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcdef");
        assert_eq!(reader.remaining(), 0);
    }
}
