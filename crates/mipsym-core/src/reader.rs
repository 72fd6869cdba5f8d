//! # Byte-Layout Reader
//!
//! Bounds-checked access to fixed-offset, fixed-size records in an immutable
//! byte region.
//!
//! Every record is checked against the region as a whole before any of its
//! fields are read, so a truncated or corrupt table fails fast with a
//! [`FormatError`] instead of reading garbage. Field decoding itself goes
//! through a little-endian `gimli` reader.

use gimli::{EndianSlice, LittleEndian, Reader};

use crate::mdebug::FormatError;

/// Immutable view of the bytes a symbol table lives in.
///
/// Offsets handed to [`ByteRegion::record`] and [`ByteRegion::string`] are
/// absolute offsets into this region.
#[derive(Debug, Clone, Copy)]
pub struct ByteRegion<'a>
{
    bytes: &'a [u8],
}

impl<'a> ByteRegion<'a>
{
    /// Wrap a byte slice.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self
    {
        Self { bytes }
    }

    /// Length of the region in bytes.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    /// True if the region holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }

    /// Borrow the `size`-byte record starting at `offset`.
    ///
    /// ## Errors
    ///
    /// Returns [`FormatError::OutOfBounds`] if any byte of the record lies
    /// outside the region, including when `offset` itself is negative once
    /// converted from the table's signed fields.
    pub fn record(&self, offset: i64, size: usize, subject: &'static str) -> Result<RecordReader<'a>, FormatError>
    {
        let out_of_bounds = || FormatError::OutOfBounds {
            subject,
            offset,
            size,
            region_len: self.bytes.len(),
        };

        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(size).ok_or_else(out_of_bounds)?;
        let bytes = self.bytes.get(start..end).ok_or_else(out_of_bounds)?;

        Ok(RecordReader {
            inner: EndianSlice::new(bytes, LittleEndian),
            subject,
        })
    }

    /// Read the null-terminated string starting at `offset`.
    ///
    /// Strings in the table are mostly ASCII, but nothing stops a compiler from
    /// emitting other encodings, so invalid UTF-8 is replaced rather than
    /// rejected.
    ///
    /// ## Errors
    ///
    /// Returns [`FormatError::OutOfBounds`] if `offset` lies outside the region
    /// and [`FormatError::UnterminatedString`] if the region ends before a
    /// terminator is found.
    pub fn string(&self, offset: i64, subject: &'static str) -> Result<String, FormatError>
    {
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| *start < self.bytes.len())
            .ok_or(FormatError::OutOfBounds {
                subject,
                offset,
                size: 1,
                region_len: self.bytes.len(),
            })?;

        let mut reader = EndianSlice::new(&self.bytes[start..], LittleEndian);
        let slice = reader
            .read_null_terminated_slice()
            .map_err(|_| FormatError::UnterminatedString { subject, offset })?;
        Ok(slice.to_string_lossy().into_owned())
    }
}

/// Sequential little-endian reader over one bounds-checked record.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a>
{
    inner: EndianSlice<'a, LittleEndian>,
    subject: &'static str,
}

impl RecordReader<'_>
{
    fn map(&self, source: gimli::Error) -> FormatError
    {
        FormatError::Layout {
            subject: self.subject,
            source,
        }
    }

    /// Read the next `u16`.
    pub fn u16(&mut self) -> Result<u16, FormatError>
    {
        self.inner.read_u16().map_err(|err| self.map(err))
    }

    /// Read the next `i16`.
    pub fn i16(&mut self) -> Result<i16, FormatError>
    {
        self.inner.read_i16().map_err(|err| self.map(err))
    }

    /// Read the next `u32`.
    pub fn u32(&mut self) -> Result<u32, FormatError>
    {
        self.inner.read_u32().map_err(|err| self.map(err))
    }

    /// Read the next `i32`.
    pub fn i32(&mut self) -> Result<i32, FormatError>
    {
        self.inner.read_i32().map_err(|err| self.map(err))
    }

    /// Number of bytes left in the record.
    #[must_use]
    pub fn remaining(&self) -> usize
    {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_record_reads_little_endian_fields()
    {
        let bytes = [0x09, 0x70, 0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        let region = ByteRegion::new(&bytes);
        let mut record = region.record(0, 10, "test").unwrap();
        assert_eq!(record.u16().unwrap(), 0x7009);
        assert_eq!(record.u32().unwrap(), 1);
        assert_eq!(record.i32().unwrap(), -1);
        assert_eq!(record.remaining(), 0);
    }

    #[test]
    fn test_record_rejects_out_of_range()
    {
        let bytes = [0u8; 8];
        let region = ByteRegion::new(&bytes);
        assert!(region.record(4, 4, "test").is_ok());
        assert!(matches!(
            region.record(5, 4, "test"),
            Err(FormatError::OutOfBounds { offset: 5, size: 4, .. })
        ));
        assert!(matches!(region.record(-1, 1, "test"), Err(FormatError::OutOfBounds { .. })));
    }

    #[test]
    fn test_reading_past_record_end_fails()
    {
        let bytes = [0u8; 8];
        let region = ByteRegion::new(&bytes);
        let mut record = region.record(0, 2, "short").unwrap();
        assert!(record.u16().is_ok());
        assert!(matches!(record.u16(), Err(FormatError::Layout { subject: "short", .. })));
    }

    #[test]
    fn test_string_reads_until_terminator()
    {
        let bytes = b"abc\0def\0";
        let region = ByteRegion::new(bytes);
        assert_eq!(region.string(0, "test").unwrap(), "abc");
        assert_eq!(region.string(4, "test").unwrap(), "def");
        assert_eq!(region.string(3, "test").unwrap(), "");
    }

    #[test]
    fn test_string_without_terminator_fails()
    {
        let bytes = b"abc";
        let region = ByteRegion::new(bytes);
        assert!(matches!(
            region.string(0, "test"),
            Err(FormatError::UnterminatedString { offset: 0, .. })
        ));
        assert!(matches!(region.string(3, "test"), Err(FormatError::OutOfBounds { .. })));
    }
}
