//! On-disk record layouts.
//!
//! These mirror the fixed-size little-endian records of the mdebug format. The
//! header and symbol record offsets are listed next to each field.

use super::error::FormatError;
use crate::reader::ByteRegion;

/// Expected value of [`SymbolicHeader::magic`].
pub const SYMBOLIC_HEADER_MAGIC: u16 = 0x7009;

/// Size of the symbolic header in bytes.
pub const SYMBOLIC_HEADER_SIZE: usize = 0x60;

/// Size of one file descriptor record in bytes.
pub const FILE_DESCRIPTOR_SIZE: usize = 0x48;

/// Size of one local symbol record in bytes.
pub const SYMBOL_ENTRY_SIZE: usize = 0xc;

/// The symbolic header (HDRR) at the start of the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolicHeader
{
    /* 0x00 */ pub magic: u16,
    /* 0x02 */ pub version_stamp: u16,
    /* 0x04 */ pub line_number_count: i32,
    /* 0x08 */ pub line_numbers_size_bytes: i32,
    /* 0x0c */ pub line_numbers_offset: i32,
    /* 0x10 */ pub dense_numbers_max_index: i32,
    /* 0x14 */ pub dense_numbers_offset: i32,
    /* 0x18 */ pub procedure_descriptor_count: i32,
    /* 0x1c */ pub procedure_descriptors_offset: i32,
    /* 0x20 */ pub local_symbol_count: i32,
    /* 0x24 */ pub local_symbols_offset: i32,
    /* 0x28 */ pub optimization_symbols_max_index: i32,
    /* 0x2c */ pub optimization_symbols_offset: i32,
    /* 0x30 */ pub auxiliary_symbol_count: i32,
    /* 0x34 */ pub auxiliary_symbols_offset: i32,
    /* 0x38 */ pub local_strings_max_index: i32,
    /* 0x3c */ pub local_strings_offset: i32,
    /* 0x40 */ pub external_strings_max_index: i32,
    /* 0x44 */ pub external_strings_offset: i32,
    /* 0x48 */ pub file_descriptor_count: i32,
    /* 0x4c */ pub file_descriptors_offset: i32,
    /* 0x50 */ pub relative_file_descriptor_count: i32,
    /* 0x54 */ pub relative_file_descriptors_offset: i32,
    /* 0x58 */ pub external_symbols_max_index: i32,
    /* 0x5c */ pub external_symbols_offset: i32,
}

impl SymbolicHeader
{
    /// Decode the header at `offset`, without checking the magic.
    pub(crate) fn read(region: &ByteRegion<'_>, offset: i64) -> Result<Self, FormatError>
    {
        let mut r = region.record(offset, SYMBOLIC_HEADER_SIZE, "symbolic header")?;
        Ok(Self {
            magic: r.u16()?,
            version_stamp: r.u16()?,
            line_number_count: r.i32()?,
            line_numbers_size_bytes: r.i32()?,
            line_numbers_offset: r.i32()?,
            dense_numbers_max_index: r.i32()?,
            dense_numbers_offset: r.i32()?,
            procedure_descriptor_count: r.i32()?,
            procedure_descriptors_offset: r.i32()?,
            local_symbol_count: r.i32()?,
            local_symbols_offset: r.i32()?,
            optimization_symbols_max_index: r.i32()?,
            optimization_symbols_offset: r.i32()?,
            auxiliary_symbol_count: r.i32()?,
            auxiliary_symbols_offset: r.i32()?,
            local_strings_max_index: r.i32()?,
            local_strings_offset: r.i32()?,
            external_strings_max_index: r.i32()?,
            external_strings_offset: r.i32()?,
            file_descriptor_count: r.i32()?,
            file_descriptors_offset: r.i32()?,
            relative_file_descriptor_count: r.i32()?,
            relative_file_descriptors_offset: r.i32()?,
            external_symbols_max_index: r.i32()?,
            external_symbols_offset: r.i32()?,
        })
    }
}

/// A file descriptor (FDR), one per translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileDescriptor
{
    /* 0x00 */ pub address: u32,
    /* 0x04 */ pub file_path_string_offset: i32,
    /* 0x08 */ pub strings_offset: i32,
    /* 0x0c */ pub strings_size: i32,
    /* 0x10 */ pub isym_base: i32,
    /* 0x14 */ pub symbol_count: i32,
    /* 0x18 */ pub iline_base: i32,
    /* 0x1c */ pub line_count: i32,
    /* 0x20 */ pub iopt_base: i32,
    /* 0x24 */ pub optimization_count: i32,
    /* 0x28 */ pub ipd_first: i16,
    /* 0x2a */ pub procedure_count: i16,
    /* 0x2c */ pub iaux_base: i32,
    /* 0x30 */ pub auxiliary_count: i32,
    /* 0x34 */ pub rfd_base: i32,
    /* 0x38 */ pub relative_file_count: i32,
    /* 0x3c */ pub lang: u8,
    /* 0x3c */ pub f_merge: bool,
    /* 0x3c */ pub f_readin: bool,
    /* 0x3c */ pub f_big_endian: bool,
    /* 0x40 */ pub cb_line_offset: i32,
    /* 0x44 */ pub cb_line: i32,
}

impl FileDescriptor
{
    pub(crate) fn read(region: &ByteRegion<'_>, offset: i64) -> Result<Self, FormatError>
    {
        let mut r = region.record(offset, FILE_DESCRIPTOR_SIZE, "file descriptor")?;
        let address = r.u32()?;
        let file_path_string_offset = r.i32()?;
        let strings_offset = r.i32()?;
        let strings_size = r.i32()?;
        let isym_base = r.i32()?;
        let symbol_count = r.i32()?;
        let iline_base = r.i32()?;
        let line_count = r.i32()?;
        let iopt_base = r.i32()?;
        let optimization_count = r.i32()?;
        let ipd_first = r.i16()?;
        let procedure_count = r.i16()?;
        let iaux_base = r.i32()?;
        let auxiliary_count = r.i32()?;
        let rfd_base = r.i32()?;
        let relative_file_count = r.i32()?;
        let bits = r.u32()?;
        let cb_line_offset = r.i32()?;
        let cb_line = r.i32()?;

        Ok(Self {
            address,
            file_path_string_offset,
            strings_offset,
            strings_size,
            isym_base,
            symbol_count,
            iline_base,
            line_count,
            iopt_base,
            optimization_count,
            ipd_first,
            procedure_count,
            iaux_base,
            auxiliary_count,
            rfd_base,
            relative_file_count,
            lang: (bits & 0x1f) as u8,
            f_merge: bits & (1 << 5) != 0,
            f_readin: bits & (1 << 6) != 0,
            f_big_endian: bits & (1 << 7) != 0,
            cb_line_offset,
            cb_line,
        })
    }
}

/// A local symbol record (SYMR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolEntry
{
    /// Offset of the name in the file's string table.
    pub iss: u32,
    pub value: i32,
    /// 6-bit storage type.
    pub st: u8,
    /// 5-bit storage class.
    pub sc: u8,
    /// 20-bit cross-reference index.
    pub index: u32,
}

impl SymbolEntry
{
    pub(crate) fn read(region: &ByteRegion<'_>, offset: i64) -> Result<Self, FormatError>
    {
        let mut r = region.record(offset, SYMBOL_ENTRY_SIZE, "local symbol")?;
        let iss = r.u32()?;
        let value = r.i32()?;
        let bits = r.u32()?;
        Ok(Self {
            iss,
            value,
            st: (bits & 0x3f) as u8,
            sc: ((bits >> 6) & 0x1f) as u8,
            index: bits >> 12,
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_symbol_entry_bitfields()
    {
        // st = 5 (label), sc = 1 (text), index = 0xfffff
        let bits: u32 = 5 | (1 << 6) | (0xfffff << 12);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&(-4i32).to_le_bytes());
        bytes.extend_from_slice(&bits.to_le_bytes());

        let entry = SymbolEntry::read(&ByteRegion::new(&bytes), 0).unwrap();
        assert_eq!(entry.iss, 7);
        assert_eq!(entry.value, -4);
        assert_eq!(entry.st, 5);
        assert_eq!(entry.sc, 1);
        assert_eq!(entry.index, 0xfffff);
    }

    #[test]
    fn test_file_descriptor_flags()
    {
        let mut bytes = vec![0u8; FILE_DESCRIPTOR_SIZE];
        bytes[0x3c..0x40].copy_from_slice(&(3u32 | (1 << 5) | (1 << 7)).to_le_bytes());

        let fd = FileDescriptor::read(&ByteRegion::new(&bytes), 0).unwrap();
        assert_eq!(fd.lang, 3);
        assert!(fd.f_merge);
        assert!(!fd.f_readin);
        assert!(fd.f_big_endian);
    }

    #[test]
    fn test_truncated_header_is_out_of_bounds()
    {
        let bytes = vec![0u8; SYMBOLIC_HEADER_SIZE - 1];
        assert!(matches!(
            SymbolicHeader::read(&ByteRegion::new(&bytes), 0),
            Err(FormatError::OutOfBounds { .. })
        ));
    }
}
