//! Typed symbol handles and handle ranges.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Every kind of symbol the database stores, in declaration order.
///
/// The order matters: lookups that search across all kinds (such as
/// [`SymbolDatabase::first_symbol_from_starting_address`](super::SymbolDatabase::first_symbol_from_starting_address))
/// check kinds in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolDescriptor
{
    DataType,
    Function,
    GlobalVariable,
    Label,
    LocalVariable,
    Module,
    ParameterVariable,
    Section,
    SourceFile,
    SymbolSource,
}

impl SymbolDescriptor
{
    pub const ALL: [SymbolDescriptor; 10] = [
        SymbolDescriptor::DataType,
        SymbolDescriptor::Function,
        SymbolDescriptor::GlobalVariable,
        SymbolDescriptor::Label,
        SymbolDescriptor::LocalVariable,
        SymbolDescriptor::Module,
        SymbolDescriptor::ParameterVariable,
        SymbolDescriptor::Section,
        SymbolDescriptor::SourceFile,
        SymbolDescriptor::SymbolSource,
    ];

    /// Human-readable kind name, e.g. `"Global Variable"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            SymbolDescriptor::DataType => "Data Type",
            SymbolDescriptor::Function => "Function",
            SymbolDescriptor::GlobalVariable => "Global Variable",
            SymbolDescriptor::Label => "Label",
            SymbolDescriptor::LocalVariable => "Local Variable",
            SymbolDescriptor::Module => "Module",
            SymbolDescriptor::ParameterVariable => "Parameter Variable",
            SymbolDescriptor::Section => "Section",
            SymbolDescriptor::SourceFile => "Source File",
            SymbolDescriptor::SymbolSource => "Symbol Source",
        }
    }
}

impl fmt::Display for SymbolDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

const INVALID_HANDLE: u32 = u32::MAX;

/// Stable identity of one symbol of kind `T`.
///
/// Handles are allocated in increasing order by each
/// [`SymbolList`](super::SymbolList) and are never reused, so a handle to a
/// destroyed symbol simply stops resolving. The default handle is the invalid
/// sentinel, which never resolves.
pub struct SymbolHandle<T>
{
    value: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> SymbolHandle<T>
{
    #[must_use]
    pub const fn new(value: u32) -> Self
    {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    /// The sentinel handle that never refers to a symbol.
    #[must_use]
    pub const fn invalid() -> Self
    {
        Self::new(INVALID_HANDLE)
    }

    #[must_use]
    pub const fn valid(&self) -> bool
    {
        self.value != INVALID_HANDLE
    }

    #[must_use]
    pub const fn value(&self) -> u32
    {
        self.value
    }
}

impl<T> Default for SymbolHandle<T>
{
    fn default() -> Self
    {
        Self::invalid()
    }
}

impl<T> Clone for SymbolHandle<T>
{
    fn clone(&self) -> Self
    {
        *self
    }
}

impl<T> Copy for SymbolHandle<T> {}

impl<T> PartialEq for SymbolHandle<T>
{
    fn eq(&self, other: &Self) -> bool
    {
        self.value == other.value
    }
}

impl<T> Eq for SymbolHandle<T> {}

impl<T> PartialOrd for SymbolHandle<T>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl<T> Ord for SymbolHandle<T>
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for SymbolHandle<T>
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for SymbolHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.valid() {
            write!(f, "SymbolHandle({})", self.value)
        } else {
            f.write_str("SymbolHandle(invalid)")
        }
    }
}

/// An inclusive range of handles, typically all the symbols created by one
/// import.
pub struct SymbolRange<T>
{
    pub first: SymbolHandle<T>,
    pub last: SymbolHandle<T>,
}

impl<T> SymbolRange<T>
{
    /// A range containing a single handle.
    #[must_use]
    pub fn new(handle: SymbolHandle<T>) -> Self
    {
        Self {
            first: handle,
            last: handle,
        }
    }

    #[must_use]
    pub fn empty() -> Self
    {
        Self {
            first: SymbolHandle::invalid(),
            last: SymbolHandle::invalid(),
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool
    {
        self.first.valid() && self.last.valid()
    }

    #[must_use]
    pub fn contains(&self, handle: SymbolHandle<T>) -> bool
    {
        self.valid() && handle.valid() && self.first <= handle && handle <= self.last
    }

    /// Grow the range so that it ends at `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not greater than the current last handle. Handles
    /// are allocated in increasing order, so this only happens when handles
    /// from different lists are mixed up.
    pub fn expand_to_include(&mut self, handle: SymbolHandle<T>)
    {
        if !self.first.valid() {
            self.first = handle;
        }
        assert!(
            !self.last.valid() || self.last < handle,
            "symbol range can only grow forwards ({:?} is not after {:?})",
            handle,
            self.last
        );
        self.last = handle;
    }
}

impl<T> Default for SymbolRange<T>
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl<T> Clone for SymbolRange<T>
{
    fn clone(&self) -> Self
    {
        *self
    }
}

impl<T> Copy for SymbolRange<T> {}

impl<T> PartialEq for SymbolRange<T>
{
    fn eq(&self, other: &Self) -> bool
    {
        self.first == other.first && self.last == other.last
    }
}

impl<T> Eq for SymbolRange<T> {}

impl<T> fmt::Debug for SymbolRange<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SymbolRange")
            .field("first", &self.first)
            .field("last", &self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    struct Marker;

    #[test]
    fn test_default_handle_is_invalid()
    {
        let handle: SymbolHandle<Marker> = SymbolHandle::default();
        assert!(!handle.valid());
        assert!(SymbolHandle::<Marker>::new(0).valid());
        assert_eq!(format!("{handle:?}"), "SymbolHandle(invalid)");
    }

    #[test]
    fn test_range_contains()
    {
        let mut range: SymbolRange<Marker> = SymbolRange::empty();
        assert!(!range.contains(SymbolHandle::new(0)));
        range.expand_to_include(SymbolHandle::new(2));
        range.expand_to_include(SymbolHandle::new(5));
        assert!(range.contains(SymbolHandle::new(2)));
        assert!(range.contains(SymbolHandle::new(4)));
        assert!(!range.contains(SymbolHandle::new(6)));
        assert!(!range.contains(SymbolHandle::invalid()));
    }

    #[test]
    #[should_panic(expected = "can only grow forwards")]
    fn test_range_cannot_grow_backwards()
    {
        let mut range = SymbolRange::<Marker>::new(SymbolHandle::new(4));
        range.expand_to_include(SymbolHandle::new(3));
    }
}
