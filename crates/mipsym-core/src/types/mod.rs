//! # Types
//!
//! Small value types shared by the decoder and the symbol database.

pub mod address;

// Re-export all public types
pub use address::{Address, AddressRange};
