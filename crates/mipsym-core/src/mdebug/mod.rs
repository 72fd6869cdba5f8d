//! # mdebug Symbol Tables
//!
//! Decoder for the legacy ECOFF-style `.mdebug` symbol table found in MIPS
//! executables.
//!
//! The table starts with a fixed symbolic header that points at a file
//! descriptor table, a local symbol table and a string table. Each file
//! descriptor describes one translation unit: which slice of the local symbols
//! belongs to it, where its strings start and what its source path was.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mipsym_core::mdebug::SymbolTableReader;
//!
//! # fn example(image: &[u8], section_offset: u64) -> Result<(), mipsym_core::mdebug::FormatError> {
//! let reader = SymbolTableReader::init(image, section_offset)?;
//! for file in reader.parse_files()? {
//!     println!("{} ({}): {} symbols", file.full_path, file.detected_language, file.symbols.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Decoding is all-or-nothing: [`SymbolTableReader::parse_files`] either
//! returns every file or the first error it ran into.

pub mod error;
pub mod layout;
pub mod path;
pub mod symbols;

pub use error::FormatError;
pub use layout::{FileDescriptor, SymbolEntry, SymbolicHeader, SYMBOLIC_HEADER_MAGIC};
pub use path::{detect_language, resolve_full_path, SourceLanguage};
pub use symbols::{SymbolClass, SymbolType};
use tracing::{debug, trace};

use crate::reader::ByteRegion;
use layout::{FILE_DESCRIPTOR_SIZE, SYMBOL_ENTRY_SIZE};

/// Marker stored in bits 8..20 of a symbol's index field when the symbol is
/// really a stabs directive smuggled through the mdebug table.
const STABS_MAGIC: u32 = 0x8f300;

/// A decoded local symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol
{
    /// Name, resolved through the file's string table.
    pub string: String,
    /// Offset of the name relative to the file's strings.
    pub string_offset: u32,
    pub value: i32,
    pub storage_type: SymbolType,
    pub storage_class: SymbolClass,
    /// Cross-reference index (auxiliary symbol index, or stabs code).
    pub index: u32,
}

impl Symbol
{
    fn decode(entry: &SymbolEntry, string: String) -> Self
    {
        Self {
            string,
            string_offset: entry.iss,
            value: entry.value,
            storage_type: SymbolType::from_raw(entry.st),
            storage_class: SymbolClass::from_raw(entry.sc),
            index: entry.index,
        }
    }

    /// True if this symbol carries a stabs directive.
    #[must_use]
    pub fn is_stabs(&self) -> bool
    {
        (self.index & 0xfff00) == STABS_MAGIC
    }

    /// The stabs type code, if this is a stabs symbol.
    #[must_use]
    pub fn stabs_code(&self) -> Option<u32>
    {
        self.is_stabs().then(|| self.index - STABS_MAGIC)
    }
}

/// One translation unit from the file descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File
{
    /// Position in the file descriptor table.
    pub index: usize,
    pub descriptor: FileDescriptor,
    /// The path exactly as recorded.
    pub raw_path: String,
    /// Compiler working directory recovered from the symbols, if any.
    pub base_path: Option<String>,
    /// See [`resolve_full_path`].
    pub full_path: String,
    pub detected_language: SourceLanguage,
    pub symbols: Vec<Symbol>,
}

/// Reader over a symbol table embedded in a larger image.
///
/// All offsets stored in the table are absolute offsets into `image`; the
/// section offset only tells us where the header is.
#[derive(Debug, Clone, Copy)]
pub struct SymbolTableReader<'a>
{
    region: ByteRegion<'a>,
    section_offset: i64,
    header: SymbolicHeader,
}

impl<'a> SymbolTableReader<'a>
{
    /// Read and validate the symbolic header.
    ///
    /// ## Errors
    ///
    /// - [`FormatError::OutOfBounds`] if the header doesn't fit in the image
    /// - [`FormatError::BadMagic`] if the magic isn't `0x7009`
    pub fn init(image: &'a [u8], section_offset: u64) -> Result<Self, FormatError>
    {
        let region = ByteRegion::new(image);
        let section_offset = i64::try_from(section_offset).map_err(|_| FormatError::OutOfBounds {
            subject: "symbolic header",
            offset: i64::MAX,
            size: layout::SYMBOLIC_HEADER_SIZE,
            region_len: image.len(),
        })?;

        let header = SymbolicHeader::read(&region, section_offset)?;
        if header.magic != SYMBOLIC_HEADER_MAGIC {
            return Err(FormatError::BadMagic { found: header.magic });
        }

        debug!(
            section_offset,
            version_stamp = header.version_stamp,
            files = header.file_descriptor_count,
            local_symbols = header.local_symbol_count,
            "read symbolic header"
        );

        Ok(Self {
            region,
            section_offset,
            header,
        })
    }

    #[must_use]
    pub fn header(&self) -> &SymbolicHeader
    {
        &self.header
    }

    /// Offset of the symbolic header within the image.
    #[must_use]
    pub fn section_offset(&self) -> u64
    {
        self.section_offset.unsigned_abs()
    }

    /// Number of file descriptors. A negative count in the header reads as zero.
    #[must_use]
    pub fn file_count(&self) -> usize
    {
        usize::try_from(self.header.file_descriptor_count).unwrap_or(0)
    }

    /// Decode every file.
    ///
    /// ## Errors
    ///
    /// Returns the first error encountered; no partial result is produced.
    pub fn parse_files(&self) -> Result<Vec<File>, FormatError>
    {
        (0..self.file_count()).map(|index| self.parse_file(index)).collect()
    }

    /// Decode a single file descriptor and its symbols.
    ///
    /// ## Errors
    ///
    /// - [`FormatError::FileIndexOutOfRange`] for an index past the table
    /// - [`FormatError::BigEndian`] if the descriptor's big-endian flag is set
    /// - [`FormatError::OutOfBounds`]/[`FormatError::UnterminatedString`] for
    ///   any read outside the image
    pub fn parse_file(&self, index: usize) -> Result<File, FormatError>
    {
        let count = self.file_count();
        if index >= count {
            return Err(FormatError::FileIndexOutOfRange { index, count });
        }

        let index_i64 = i64::try_from(index).map_err(|_| FormatError::FileIndexOutOfRange { index, count })?;
        let fd_offset = i64::from(self.header.file_descriptors_offset) + index_i64 * FILE_DESCRIPTOR_SIZE as i64;
        let descriptor = FileDescriptor::read(&self.region, fd_offset)?;
        if descriptor.f_big_endian {
            return Err(FormatError::BigEndian { file_index: index });
        }

        let strings_base = i64::from(self.header.local_strings_offset) + i64::from(descriptor.strings_offset);
        let raw_path = self
            .region
            .string(strings_base + i64::from(descriptor.file_path_string_offset), "file path")?;

        let mut symbols: Vec<Symbol> = Vec::new();
        let mut base_path: Option<String> = None;
        for j in 0..i64::from(descriptor.symbol_count.max(0)) {
            let sym_offset = i64::from(self.header.local_symbols_offset)
                + (i64::from(descriptor.isym_base) + j) * SYMBOL_ENTRY_SIZE as i64;
            let entry = SymbolEntry::read(&self.region, sym_offset)?;
            let string = self.region.string(strings_base + i64::from(entry.iss), "symbol name")?;
            let symbol = Symbol::decode(&entry, string);

            // The compiler emits the working directory as a label directly
            // before a label naming the file itself.
            let names_file = i64::from(entry.iss) == i64::from(descriptor.file_path_string_offset);
            let is_label = symbol.storage_type == SymbolType::Label;
            symbols.push(symbol);
            if base_path.is_none() && names_file && is_label && symbols.len() > 2 {
                let candidate = &symbols[symbols.len() - 2];
                if candidate.storage_type == SymbolType::Label && !candidate.string.is_empty() {
                    base_path = Some(candidate.string.clone());
                }
            }
        }

        let full_path = resolve_full_path(base_path.as_deref(), &raw_path);
        let detected_language = detect_language(&raw_path);
        trace!(
            index,
            path = %full_path,
            language = %detected_language,
            symbols = symbols.len(),
            "decoded file descriptor"
        );

        Ok(File {
            index,
            descriptor,
            raw_path,
            base_path,
            full_path,
            detected_language,
            symbols,
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_stabs_code()
    {
        let mut symbol = Symbol {
            string: String::new(),
            string_offset: 0,
            value: 0,
            storage_type: SymbolType::Nil,
            storage_class: SymbolClass::Info,
            index: STABS_MAGIC + 0x64,
        };
        assert!(symbol.is_stabs());
        assert_eq!(symbol.stabs_code(), Some(0x64));

        symbol.index = 0x12;
        assert!(!symbol.is_stabs());
        assert_eq!(symbol.stabs_code(), None);
    }

    #[test]
    fn test_init_rejects_tiny_image()
    {
        assert!(matches!(
            SymbolTableReader::init(&[0x09, 0x70], 0),
            Err(FormatError::OutOfBounds { .. })
        ));
    }
}
