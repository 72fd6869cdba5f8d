//! # Symbol Table Format Errors
//!
//! Everything that can go wrong while turning raw bytes into file and symbol
//! records. Any of these aborts the whole import: the decoder never returns a
//! partial file table.

use thiserror::Error;

/// The symbol table is malformed or uses a layout we don't support
#[derive(Error, Debug)]
pub enum FormatError
{
    /// The symbolic header doesn't start with `0x7009`
    ///
    /// Either the offset handed to the reader is wrong, or the section isn't
    /// an mdebug section at all.
    #[error("Invalid symbolic header: magic 0x{found:04x}, expected 0x7009")]
    BadMagic
    {
        /// The value found where the magic should be
        found: u16,
    },

    /// A file descriptor has its big-endian flag set
    ///
    /// Only little-endian tables are supported. A set flag can also mean the
    /// file descriptor table offset is wrong, in which case we would be
    /// reading garbage anyway.
    #[error("File descriptor {file_index} is not little endian (or the file descriptor table is corrupt)")]
    BigEndian
    {
        /// Index of the offending file descriptor
        file_index: usize,
    },

    /// A record would extend past the end of the image
    #[error("Failed to read {subject}: {size} bytes at offset 0x{offset:x} are outside the {region_len} byte image")]
    OutOfBounds
    {
        /// What was being read
        subject: &'static str,
        /// Offset of the first byte
        offset: i64,
        /// Size of the record
        size: usize,
        /// Total size of the image
        region_len: usize,
    },

    /// The image ends before a string's null terminator
    #[error("Unterminated {subject} string at offset 0x{offset:x}")]
    UnterminatedString
    {
        /// What the string was for
        subject: &'static str,
        /// Offset of the first character
        offset: i64,
    },

    /// A field read failed inside an already bounds-checked record
    #[error("Failed to decode {subject}: {source}")]
    Layout
    {
        /// The record being decoded
        subject: &'static str,
        /// Error reported by the underlying reader
        #[source]
        source: gimli::Error,
    },

    /// A file index past the end of the file descriptor table was requested
    #[error("File index {index} out of range (table has {count} files)")]
    FileIndexOutOfRange
    {
        /// The requested index
        index: usize,
        /// Number of file descriptors in the table
        count: usize,
    },

    /// The executable has no `.mdebug` section
    #[error("No {name} section")]
    MissingSection
    {
        /// Name of the section that was looked for
        name: &'static str,
    },

    /// The container image itself couldn't be parsed
    #[error("Failed to parse executable: {0}")]
    Container(#[from] object::Error),
}
