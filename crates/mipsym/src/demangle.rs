//! Itanium C++ demangling for the importer, backed by `cpp_demangle`.
//!
//! GNU v2 names (`func__Fi`) aren't Itanium names and are left as they are.

use cpp_demangle::Symbol;

/// Demangle an Itanium ABI name, or return `None` if it isn't one.
pub fn demangle_itanium(name: &str) -> Option<String>
{
    Symbol::new(name).ok().map(|symbol| symbol.to_string())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_demangle_itanium()
    {
        assert_eq!(demangle_itanium("_Z3fooi").as_deref(), Some("foo(int)"));
        assert_eq!(demangle_itanium("main"), None);
        assert_eq!(demangle_itanium("func__Fi"), None);
    }
}
