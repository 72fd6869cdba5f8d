//! # Error Types
//!
//! General error handling for symbol table import and the symbol database.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::mdebug::FormatError;

/// Main error type for symbol table operations
///
/// ## Error Categories
///
/// 1. **Format errors**: the symbol table bytes are malformed or unsupported.
///    These always abort the current import.
/// 2. **Lookup errors**: an internal handle failed to resolve. If the database
///    invariants hold this never happens, so treat it as a bug rather than a
///    user-facing condition.
/// 3. **Argument errors**: the caller asked for something impossible, like
///    creating a symbol without a symbol source.
/// 4. **Type tree errors**: raised by a
///    [`TypeTreeProducer`](crate::analysis::TypeTreeProducer). Only fatal
///    under strict parsing.
/// 5. **I/O errors**: reading the executable from disk failed.
///
/// Duplicate data type definitions are *not* errors. They are recorded on the
/// retained `DataType` symbol as a diagnostic and the import carries on.
#[derive(Error, Debug)]
pub enum SymbolError
{
    /// The symbol table could not be decoded
    #[error("Bad symbol table: {0}")]
    Format(#[from] FormatError),

    /// A handle that should have been live did not resolve
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Invalid argument passed to a database or analysis function
    ///
    /// Examples:
    /// - Creating a symbol without a valid symbol source
    /// - Restricting an import to a file index that doesn't exist
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A type encoding attached to a symbol couldn't be turned into a type tree
    #[error("Bad type encoding: {0}")]
    TypeTree(String),

    /// I/O error (for reading executables from disk)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SymbolError>`
///
/// ```rust
/// use mipsym_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SymbolError>;
