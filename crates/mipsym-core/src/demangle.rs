//! Symbol demangling.
//!
//! The importer doesn't know how to demangle anything itself. Callers hand in
//! a [`Demangler`]: any `name -> name` function, e.g. a wrapper around a GNU
//! v2 or Itanium demangler. It is applied to every symbol kind flagged with
//! [`SymbolFlags::NAME_NEEDS_DEMANGLING`](crate::database::SymbolFlags::NAME_NEEDS_DEMANGLING).

use tracing::trace;

/// A demangling function. Returns `None` if the name isn't mangled or can't
/// be demangled.
pub type Demangler = dyn Fn(&str) -> Option<String>;

/// Run `demangler` over `mangled`.
///
/// A demangler that returns an empty string, or the input unchanged, is
/// treated as having failed.
///
/// ## Example
///
/// ```rust
/// use mipsym_core::demangle::{demangle_name, Demangler};
///
/// let demangler: &Demangler = &|name: &str| name.strip_suffix("__Fv").map(|base| format!("{base}(void)"));
/// assert_eq!(demangle_name(demangler, "main__Fv").as_deref(), Some("main(void)"));
/// assert_eq!(demangle_name(demangler, "main"), None);
/// ```
#[must_use]
pub fn demangle_name(demangler: &Demangler, mangled: &str) -> Option<String>
{
    let demangled = demangler(mangled)?;
    if demangled.is_empty() || demangled == mangled {
        return None;
    }

    trace!(mangled, demangled = %demangled, "demangled symbol name");
    Some(demangled)
}

/// Cut the parameter list off a demangled function name, so `ns::f(int)`
/// becomes `ns::f`. `operator()` is left intact.
///
/// ## Example
///
/// ```rust
/// use mipsym_core::demangle::strip_parameters;
///
/// assert_eq!(strip_parameters("Foo::bar(int, char *)"), "Foo::bar");
/// assert_eq!(strip_parameters("Functor::operator()(void)"), "Functor::operator()");
/// assert_eq!(strip_parameters("plain_name"), "plain_name");
/// ```
#[must_use]
pub fn strip_parameters(demangled: &str) -> &str
{
    let mut search_from = 0;
    while let Some(relative) = demangled[search_from..].find('(') {
        let position = search_from + relative;
        if demangled[..position].ends_with("operator") {
            search_from = position + 1;
            continue;
        }
        return &demangled[..position];
    }
    demangled
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_failed_demangle_is_none()
    {
        let identity: &Demangler = &|name: &str| Some(name.to_string());
        let empty: &Demangler = &|_: &str| Some(String::new());
        assert_eq!(demangle_name(identity, "foo"), None);
        assert_eq!(demangle_name(empty, "foo"), None);
    }

    #[test]
    fn test_strip_parameters_edge_cases()
    {
        assert_eq!(strip_parameters("operator("), "operator(");
        assert_eq!(strip_parameters("(anonymous)"), "");
        assert_eq!(strip_parameters("a::operator()(int)"), "a::operator()");
    }
}
