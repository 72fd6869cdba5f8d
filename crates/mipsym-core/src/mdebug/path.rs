//! Source path reconstruction and language detection.
//!
//! Everything here is purely lexical. Paths recorded by the compiler usually
//! come from a different machine (often Windows), so consulting the local
//! filesystem would only make the result depend on where we happen to run.

use std::fmt;

/// Source language guessed from a file's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceLanguage
{
    C,
    Cpp,
    Assembly,
    /// No recognised suffix. Not an error.
    #[default]
    Unknown,
}

impl fmt::Display for SourceLanguage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SourceLanguage::C => "c",
            SourceLanguage::Cpp => "c++",
            SourceLanguage::Assembly => "assembly",
            SourceLanguage::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Guess the language of a source file from its suffix (case-insensitive).
///
/// ## Example
///
/// ```rust
/// use mipsym_core::mdebug::{detect_language, SourceLanguage};
///
/// assert_eq!(detect_language("MAIN.CPP"), SourceLanguage::Cpp);
/// assert_eq!(detect_language("crt0.s"), SourceLanguage::Assembly);
/// assert_eq!(detect_language("notes.txt"), SourceLanguage::Unknown);
/// ```
#[must_use]
pub fn detect_language(path: &str) -> SourceLanguage
{
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".c") {
        SourceLanguage::C
    } else if lower.ends_with(".cpp") || lower.ends_with(".cc") || lower.ends_with(".cxx") {
        SourceLanguage::Cpp
    } else if lower.ends_with(".s") || lower.ends_with(".asm") {
        SourceLanguage::Assembly
    } else {
        SourceLanguage::Unknown
    }
}

/// Work out the full path of a translation unit.
///
/// Both inputs have their backslashes converted to forward slashes first. The
/// raw path is returned as-is if there is no base path or if it is already
/// absolute (`/...` or `X:/...`). Otherwise the two are joined and `.`/`..`
/// components are collapsed.
///
/// ## Example
///
/// ```rust
/// use mipsym_core::mdebug::resolve_full_path;
///
/// assert_eq!(resolve_full_path(Some("C:\\proj\\include"), "foo.cpp"), "C:/proj/include/foo.cpp");
/// assert_eq!(resolve_full_path(Some("C:\\proj"), "/abs/foo.c"), "/abs/foo.c");
/// assert_eq!(resolve_full_path(None, "src\\foo.c"), "src/foo.c");
/// ```
#[must_use]
pub fn resolve_full_path(base_path: Option<&str>, raw_path: &str) -> String
{
    let raw_path = raw_path.replace('\\', "/");
    let base_path = match base_path {
        Some(base) if !base.is_empty() => base.replace('\\', "/"),
        _ => return raw_path,
    };

    if raw_path.starts_with('/') || has_drive_prefix(&raw_path) {
        return raw_path;
    }

    let joined = if base_path.ends_with('/') {
        format!("{base_path}{raw_path}")
    } else {
        format!("{base_path}/{raw_path}")
    };
    normalize(&joined)
}

/// `X:/` at the start of a path.
fn has_drive_prefix(path: &str) -> bool
{
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Collapse `.`, `..` and repeated separators in a forward-slash path.
///
/// `..` at the root of an absolute path is dropped; at the start of a relative
/// path it is kept.
fn normalize(path: &str) -> String
{
    let (prefix, rest) = if has_drive_prefix(path) {
        path.split_at(3)
    } else if let Some(rest) = path.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", path)
    };
    let rooted = !prefix.is_empty();

    let mut components: Vec<&str> = Vec::new();
    for component in rest.split('/') {
        match component {
            "" | "." => {}
            ".." => match components.last().copied() {
                Some(last) if last != ".." => {
                    components.pop();
                }
                _ if rooted => {}
                _ => components.push(".."),
            },
            other => components.push(other),
        }
    }

    let body = components.join("/");
    if body.is_empty() && !rooted {
        ".".to_string()
    } else {
        format!("{prefix}{body}")
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_detect_language_suffixes()
    {
        assert_eq!(detect_language("a.c"), SourceLanguage::C);
        assert_eq!(detect_language("A.C"), SourceLanguage::C);
        assert_eq!(detect_language("a.cc"), SourceLanguage::Cpp);
        assert_eq!(detect_language("a.cxx"), SourceLanguage::Cpp);
        assert_eq!(detect_language("a.ASM"), SourceLanguage::Assembly);
        assert_eq!(detect_language("a.h"), SourceLanguage::Unknown);
        assert_eq!(detect_language(""), SourceLanguage::Unknown);
    }

    #[test]
    fn test_join_collapses_dots()
    {
        assert_eq!(resolve_full_path(Some("C:/a/b/"), "../c/./d.c"), "C:/a/c/d.c");
        assert_eq!(resolve_full_path(Some("/usr//src"), "x.c"), "/usr/src/x.c");
        assert_eq!(resolve_full_path(Some("/"), "../../x.c"), "/x.c");
        assert_eq!(resolve_full_path(Some("rel"), "../../x.c"), "../x.c");
    }

    #[test]
    fn test_absolute_raw_path_wins()
    {
        assert_eq!(resolve_full_path(Some("C:\\base"), "D:\\other\\x.c"), "D:/other/x.c");
        assert_eq!(resolve_full_path(Some("C:\\base"), "\\root\\x.c"), "/root/x.c");
    }

    #[test]
    fn test_empty_base_is_ignored()
    {
        assert_eq!(resolve_full_path(Some(""), "a/../b.c"), "a/../b.c");
    }

    #[test]
    fn test_short_paths_dont_panic()
    {
        assert_eq!(resolve_full_path(Some("base"), ""), "base");
        assert_eq!(resolve_full_path(Some("base"), "c"), "base/c");
        assert_eq!(resolve_full_path(Some("base"), "c:"), "base/c:");
    }
}
