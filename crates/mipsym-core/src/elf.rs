//! Locating the symbol table inside an executable.
//!
//! Only the section lookup lives here; everything else about the container
//! format is left to `object`.

use object::{Object, ObjectSection};
use tracing::debug;

use crate::mdebug::FormatError;

/// Name of the section holding the symbol table.
pub const MDEBUG_SECTION_NAME: &str = ".mdebug";

/// Find the file offset of the `.mdebug` section in an ELF image.
///
/// ## Errors
///
/// - [`FormatError::Container`] if `object` can't parse the image
/// - [`FormatError::MissingSection`] if there is no `.mdebug` section, or it
///   has no file data (e.g. `SHT_NOBITS`)
pub fn find_mdebug_section(image: &[u8]) -> Result<u64, FormatError>
{
    let file = object::File::parse(image)?;
    let section = file
        .section_by_name(MDEBUG_SECTION_NAME)
        .ok_or(FormatError::MissingSection {
            name: MDEBUG_SECTION_NAME,
        })?;
    let (offset, size) = section.file_range().ok_or(FormatError::MissingSection {
        name: MDEBUG_SECTION_NAME,
    })?;

    debug!(offset, size, "found {MDEBUG_SECTION_NAME} section");
    Ok(offset)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_garbage_is_a_container_error()
    {
        let garbage = [0u8; 64];
        assert!(matches!(find_mdebug_section(&garbage), Err(FormatError::Container(_))));
    }
}
