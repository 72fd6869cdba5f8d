//! Tests for error handling

use mipsym_core::error::{Result, SymbolError};
use mipsym_core::mdebug::FormatError;

#[test]
fn test_format_error_bad_magic()
{
    let error = FormatError::BadMagic { found: 0x1234 };
    let message = format!("{}", error);
    assert!(message.contains("0x1234"));
    assert!(message.contains("0x7009"));
}

#[test]
fn test_format_error_big_endian()
{
    let error = FormatError::BigEndian { file_index: 7 };
    let message = format!("{}", error);
    assert!(message.contains('7'));
    assert!(message.contains("little endian"));
}

#[test]
fn test_format_error_out_of_bounds()
{
    let error = FormatError::OutOfBounds {
        subject: "file descriptor",
        offset: 0x100,
        size: 0x48,
        region_len: 0x80,
    };
    let message = format!("{}", error);
    assert!(message.contains("file descriptor"));
    assert!(message.contains("0x100"));
    assert!(message.contains("128"));
}

#[test]
fn test_format_error_converts_to_symbol_error()
{
    let error: SymbolError = FormatError::MissingSection { name: ".mdebug" }.into();

    match error {
        SymbolError::Format(FormatError::MissingSection { name }) => assert_eq!(name, ".mdebug"),
        _ => panic!("Expected Format variant"),
    }
}

#[test]
fn test_symbol_error_display()
{
    let error = SymbolError::Format(FormatError::FileIndexOutOfRange { index: 4, count: 2 });
    let message = format!("{}", error);
    assert!(message.contains("Bad symbol table"));
    assert!(message.contains("File index 4"));
}

#[test]
fn test_symbol_error_lookup()
{
    let error = SymbolError::Lookup("source file SymbolHandle(3)".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Lookup failed"));
    assert!(message.contains("SymbolHandle(3)"));
}

#[test]
fn test_symbol_error_invalid_argument()
{
    let error = SymbolError::InvalidArgument("test arg".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid argument"));
    assert!(message.contains("test arg"));
}

#[test]
fn test_symbol_error_type_tree()
{
    let error = SymbolError::TypeTree("unexpected '=' in stab".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Bad type encoding"));
}

#[test]
fn test_io_error_conversion()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.elf");
    let error: SymbolError = io.into();
    assert!(matches!(error, SymbolError::Io(_)));
    assert!(format!("{}", error).contains("missing.elf"));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(SymbolError::Lookup("test".to_string()));
}
