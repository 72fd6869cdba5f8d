//! # mipsym-core
//!
//! Symbol table decoding and a symbol database for MIPS executables.
//!
//! This crate provides:
//! - Decoding of the mdebug (`.mdebug`) symbol table found in MIPS ELF files
//! - A handle-indexed [`SymbolDatabase`] holding functions, variables, data
//!   types and the rest, with address and name lookups
//! - Structural deduplication of data types defined in more than one
//!   translation unit
//! - [`analyse`], which walks a decoded table and populates the database
//!
//! ## Example
//!
//! ```rust,no_run
//! use mipsym_core::analysis::{analyse, AnalysisOptions, NoTypeTrees};
//! use mipsym_core::database::SymbolDatabase;
//! use mipsym_core::elf::find_mdebug_section;
//! use mipsym_core::mdebug::SymbolTableReader;
//!
//! # fn example() -> mipsym_core::Result<()> {
//! let image = std::fs::read("SLUS_123.45")?;
//! let offset = find_mdebug_section(&image)?;
//! let reader = SymbolTableReader::init(&image, offset)?;
//!
//! let mut database = SymbolDatabase::new();
//! analyse(&mut database, &reader, &AnalysisOptions::default(), &mut NoTypeTrees)?;
//! for function in &database.functions {
//!     println!("{:08x} {}", function.address().map_or(0, |a| a.value()), function.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod ast;
pub mod database;
pub mod demangle;
pub mod elf;
pub mod error;
pub mod mdebug;
pub mod reader;
pub mod types;

pub use analysis::{analyse, AnalysisOptions, ImporterFlags};
pub use database::SymbolDatabase;
// Re-export commonly used types
pub use error::{Result, SymbolError};
pub use mdebug::{FormatError, SymbolTableReader};
pub use types::{Address, AddressRange};
