//! Storage for all the symbols of one kind.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use tracing::trace;

use super::handle::{SymbolDescriptor, SymbolHandle, SymbolRange};
use super::kinds::sealed::Sealed;
use super::kinds::{Module, ModuleHandle, ModuleRange, Symbol, SymbolFlags, SymbolKind, SymbolSourceHandle, SymbolSourceRange};
use crate::ast::Node;
use crate::demangle::{demangle_name, Demangler};
use crate::error::{Result, SymbolError};
use crate::types::{Address, AddressRange};

/// Multi-map from a key to every handle filed under it.
type BTreeIndex<K, H> = BTreeMap<K, BTreeSet<H>>;

/// Every symbol of kind `T`, kept sorted by handle, plus the secondary
/// indices the kind asks for through [`SymbolKind::FLAGS`].
///
/// Handles are allocated in increasing order and never reused, so pushing new
/// symbols onto the end keeps the storage sorted and lookups by handle are a
/// binary search.
///
/// Lists only live inside a [`SymbolDatabase`](super::SymbolDatabase) and
/// never hand out a `&mut T`: symbols are edited through a [`SymbolMut`], so
/// handles, names and addresses can't drift away from the indices.
#[derive(Debug)]
pub struct SymbolList<T: SymbolKind>
{
    symbols: Vec<T>,
    address_to_handle: BTreeIndex<Address, SymbolHandle<T>>,
    name_to_handle: BTreeIndex<String, SymbolHandle<T>>,
    next_handle: u32,
    /// Largest size ever given to a symbol in this list.
    largest_size: u32,
}

impl<T: SymbolKind> SymbolList<T>
{
    pub(crate) fn new() -> Self
    {
        Self {
            symbols: Vec::new(),
            address_to_handle: BTreeMap::new(),
            name_to_handle: BTreeMap::new(),
            next_handle: 0,
            largest_size: 0,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> SymbolDescriptor
    {
        T::DESCRIPTOR
    }

    // Lookup

    #[must_use]
    pub fn symbol_from_handle(&self, handle: SymbolHandle<T>) -> Option<&T>
    {
        let index = self.index_from_handle(handle)?;
        self.symbols.get(index)
    }

    /// Edit a symbol's fields and type tree.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use mipsym_core::database::SymbolDatabase;
    ///
    /// let mut database = SymbolDatabase::new();
    /// let source = database.get_symbol_source("User").unwrap();
    /// let function = database.functions.create_symbol("f", None, source, None).unwrap().handle();
    /// database.functions.symbol_mut(function).unwrap().relative_path = "f.c".to_string();
    /// assert_eq!(database.functions.symbol_from_handle(function).unwrap().relative_path, "f.c");
    /// ```
    pub fn symbol_mut(&mut self, handle: SymbolHandle<T>) -> Option<SymbolMut<'_, T>>
    {
        let index = self.index_from_handle(handle)?;
        Some(SymbolMut { list: self, index })
    }

    pub(crate) fn symbol_from_handle_mut(&mut self, handle: SymbolHandle<T>) -> Option<&mut T>
    {
        let index = self.index_from_handle(handle)?;
        self.symbols.get_mut(index)
    }

    /// Resolve a batch of handles, silently skipping any that don't resolve.
    #[must_use]
    pub fn symbols_from_handles(&self, handles: &[SymbolHandle<T>]) -> Vec<&T>
    {
        handles
            .iter()
            .filter_map(|&handle| self.symbol_from_handle(handle))
            .collect()
    }

    /// Position of a symbol in the backing storage. Only meaningful until the
    /// next mutation.
    #[must_use]
    pub fn index_from_handle(&self, handle: SymbolHandle<T>) -> Option<usize>
    {
        if !handle.valid() {
            return None;
        }
        self.symbols
            .binary_search_by_key(&handle.value(), |symbol| symbol.base().raw_handle())
            .ok()
    }

    #[must_use]
    pub fn symbol_from_index(&self, index: usize) -> Option<&T>
    {
        self.symbols.get(index)
    }

    #[must_use]
    pub fn contains(&self, handle: SymbolHandle<T>) -> bool
    {
        self.index_from_handle(handle).is_some()
    }

    /// Every symbol starting exactly at `address`, in handle order.
    #[must_use]
    pub fn handles_from_starting_address(&self, address: Address) -> Vec<SymbolHandle<T>>
    {
        self.address_to_handle
            .get(&address)
            .map(|handles| handles.iter().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first_handle_from_starting_address(&self, address: Address) -> Option<SymbolHandle<T>>
    {
        self.address_to_handle.get(&address)?.first().copied()
    }

    #[must_use]
    pub fn first_symbol_from_starting_address(&self, address: Address) -> Option<&T>
    {
        self.symbol_from_handle(self.first_handle_from_starting_address(address)?)
    }

    /// Every symbol whose starting address lies inside `range`, ordered by
    /// address then handle.
    #[must_use]
    pub fn handles_from_address_range(&self, range: AddressRange) -> Vec<SymbolHandle<T>>
    {
        self.address_to_handle
            .range(range.start..)
            .take_while(|(address, _)| u64::from(address.value()) < range.end())
            .flat_map(|(_, handles)| handles.iter().copied())
            .collect()
    }

    /// Every symbol with exactly this name, in handle order.
    #[must_use]
    pub fn handles_from_name(&self, name: &str) -> Vec<SymbolHandle<T>>
    {
        self.name_to_handle
            .get(name)
            .map(|handles| handles.iter().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first_handle_from_name(&self, name: &str) -> Option<SymbolHandle<T>>
    {
        self.name_to_handle.get(name)?.first().copied()
    }

    #[must_use]
    pub fn symbol_from_name(&self, name: &str) -> Option<&T>
    {
        self.symbol_from_handle(self.first_handle_from_name(name)?)
    }

    /// The symbol whose `[address, address + size)` covers `address`, e.g.
    /// the function containing an instruction.
    ///
    /// Candidates are the symbols starting at or below `address`, nearest
    /// first. Only starting addresses within the largest symbol size in the
    /// list are visited, so a miss costs no more than a hit.
    #[must_use]
    pub fn symbol_overlapping_address(&self, address: Address) -> Option<&T>
    {
        let lowest = Address::new(address.value().saturating_sub(self.largest_size));
        self.address_to_handle
            .range(lowest..=address)
            .rev()
            .flat_map(|(_, handles)| handles.iter())
            .filter_map(|&handle| self.symbol_from_handle(handle))
            .find(|symbol| symbol.base().address_range().is_some_and(|range| range.contains(address)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T>
    {
        self.symbols.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T>
    {
        self.symbols.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.symbols.is_empty()
    }

    /// The handle the next created symbol will get.
    #[must_use]
    pub fn next_handle(&self) -> SymbolHandle<T>
    {
        SymbolHandle::new(self.next_handle)
    }

    // Mutation

    /// Create a new symbol.
    ///
    /// If `module` is given, the module's address is added to `address` and
    /// the symbol is recorded as belonging to it.
    ///
    /// ## Errors
    ///
    /// - [`SymbolError::InvalidArgument`] if `source` is invalid (except when
    ///   creating a symbol source) or the list has run out of handles
    ///
    /// ## Example
    ///
    /// ```rust
    /// use mipsym_core::database::SymbolDatabase;
    /// use mipsym_core::types::Address;
    ///
    /// let mut database = SymbolDatabase::new();
    /// let source = database.get_symbol_source("User").unwrap();
    /// let label = database
    ///     .labels
    ///     .create_symbol("entry", Some(Address::new(0x0010_0000)), source, None)
    ///     .unwrap()
    ///     .handle();
    /// assert_eq!(database.labels.first_handle_from_starting_address(Address::new(0x0010_0000)), Some(label));
    /// ```
    pub fn create_symbol(
        &mut self,
        name: impl Into<String>,
        address: Option<Address>,
        source: SymbolSourceHandle,
        module: Option<&Module>,
    ) -> Result<SymbolMut<'_, T>>
    {
        if T::DESCRIPTOR != SymbolDescriptor::SymbolSource && !source.valid() {
            return Err(SymbolError::InvalidArgument(format!(
                "cannot create a {} without a valid symbol source",
                T::NAME
            )));
        }
        if self.next_handle == u32::MAX {
            return Err(SymbolError::InvalidArgument(format!("out of {} handles", T::NAME)));
        }

        let handle = self.next_handle;
        self.next_handle += 1;

        let (address, module_handle) = match module {
            Some(module) => {
                let base = module.address().map_or(0, Address::value);
                (address.map(|address| address + base), module.handle())
            }
            None => (address, ModuleHandle::invalid()),
        };

        let symbol = T::from_base(Symbol::new(handle, name.into(), address, source, module_handle));
        self.link(&symbol);
        let index = self.symbols.len();
        self.symbols.push(symbol);
        Ok(SymbolMut { list: self, index })
    }

    /// Like [`SymbolList::create_symbol`], but for kinds flagged with
    /// [`SymbolFlags::NAME_NEEDS_DEMANGLING`] the name is run through
    /// `demangler` first. When that succeeds the original name is kept as the
    /// symbol's mangled name.
    ///
    /// ## Errors
    ///
    /// See [`SymbolList::create_symbol`].
    pub fn create_demangled_symbol(
        &mut self,
        name: &str,
        address: Option<Address>,
        source: SymbolSourceHandle,
        module: Option<&Module>,
        demangler: Option<&Demangler>,
    ) -> Result<SymbolMut<'_, T>>
    {
        let demangled = if T::FLAGS.contains(SymbolFlags::NAME_NEEDS_DEMANGLING) {
            demangler.and_then(|demangler| demangle_name(demangler, name))
        } else {
            None
        };

        match demangled {
            Some(demangled) => {
                let mut symbol = self.create_symbol(demangled, address, source, module)?;
                symbol.symbol_mut().set_mangled_name(name.to_string());
                Ok(symbol)
            }
            None => self.create_symbol(name, address, source, module),
        }
    }

    /// Change a symbol's address, keeping the address index in step.
    ///
    /// Returns `false` if the handle doesn't resolve.
    pub fn move_symbol(&mut self, handle: SymbolHandle<T>, new_address: Option<Address>) -> bool
    {
        let Some(index) = self.index_from_handle(handle) else {
            return false;
        };

        let old_address = self.symbols[index].base().address;
        if old_address != new_address && T::FLAGS.contains(SymbolFlags::WITH_ADDRESS_MAP) {
            if let Some(old_address) = old_address {
                remove_from_index(&mut self.address_to_handle, &old_address, handle);
            }
            if let Some(new_address) = new_address {
                insert_into_index(&mut self.address_to_handle, new_address, handle);
            }
        }
        self.symbols[index].base_mut().address = new_address;
        true
    }

    /// Change a symbol's size. Returns `false` if the handle doesn't resolve.
    pub fn set_size(&mut self, handle: SymbolHandle<T>, size: u32) -> bool
    {
        let Some(index) = self.index_from_handle(handle) else {
            return false;
        };
        self.set_size_at(index, size);
        true
    }

    /// Change a symbol's name, keeping the name index in step.
    ///
    /// Returns `false` if the handle doesn't resolve.
    pub fn rename_symbol(&mut self, handle: SymbolHandle<T>, new_name: impl Into<String>) -> bool
    {
        let Some(index) = self.index_from_handle(handle) else {
            return false;
        };

        let new_name = new_name.into();
        if T::FLAGS.contains(SymbolFlags::WITH_NAME_MAP) && self.symbols[index].base().name() != new_name {
            remove_from_index(&mut self.name_to_handle, self.symbols[index].base().name(), handle);
            insert_into_index(&mut self.name_to_handle, new_name.clone(), handle);
        }
        self.symbols[index].base_mut().name = new_name;
        true
    }

    /// Destroy one symbol. Returns `false` if the handle doesn't resolve.
    pub fn destroy_symbol(&mut self, handle: SymbolHandle<T>) -> bool
    {
        handle.valid() && self.destroy_symbols(SymbolRange::new(handle)) == 1
    }

    /// Destroy every symbol with a handle inside `range`. Returns how many
    /// were destroyed.
    pub fn destroy_symbols(&mut self, range: SymbolRange<T>) -> usize
    {
        if !range.valid() {
            return 0;
        }

        let begin = self
            .symbols
            .partition_point(|symbol| symbol.base().raw_handle() < range.first.value());
        let end = self
            .symbols
            .partition_point(|symbol| symbol.base().raw_handle() <= range.last.value());
        if begin >= end {
            return 0;
        }

        let destroyed: Vec<T> = self.symbols.drain(begin..end).collect();
        for symbol in &destroyed {
            self.unlink(symbol);
        }
        trace!(kind = T::NAME, count = destroyed.len(), "destroyed symbol range");
        destroyed.len()
    }

    /// Destroy every symbol created by a symbol source inside `range`.
    pub fn destroy_symbols_from_sources(&mut self, range: SymbolSourceRange) -> usize
    {
        self.destroy_matching(|symbol| range.contains(symbol.source()))
    }

    /// Destroy every symbol belonging to a module inside `range`.
    pub fn destroy_symbols_from_modules(&mut self, range: ModuleRange) -> usize
    {
        self.destroy_matching(|symbol| range.contains(symbol.module()))
    }

    /// Destroy every symbol allocated at or after `first`.
    pub(crate) fn destroy_symbols_from(&mut self, first: SymbolHandle<T>) -> usize
    {
        self.destroy_symbols(SymbolRange {
            first,
            last: SymbolHandle::new(u32::MAX - 1),
        })
    }

    /// Remove every symbol. Handles handed out before are still never reused.
    pub fn clear(&mut self)
    {
        self.symbols.clear();
        self.address_to_handle.clear();
        self.name_to_handle.clear();
        self.largest_size = 0;
    }

    fn destroy_matching(&mut self, predicate: impl Fn(&Symbol) -> bool) -> usize
    {
        let (destroyed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.symbols)
            .into_iter()
            .partition(|symbol| predicate(symbol.base()));
        self.symbols = kept;
        for symbol in &destroyed {
            self.unlink(symbol);
        }
        destroyed.len()
    }

    fn set_size_at(&mut self, index: usize, size: u32)
    {
        self.largest_size = self.largest_size.max(size);
        self.symbols[index].base_mut().size = size;
    }

    fn link(&mut self, symbol: &T)
    {
        let symbol = symbol.base();
        let handle = SymbolHandle::new(symbol.raw_handle());
        if T::FLAGS.contains(SymbolFlags::WITH_ADDRESS_MAP) {
            if let Some(address) = symbol.address() {
                insert_into_index(&mut self.address_to_handle, address, handle);
            }
        }
        if T::FLAGS.contains(SymbolFlags::WITH_NAME_MAP) {
            insert_into_index(&mut self.name_to_handle, symbol.name().to_string(), handle);
        }
    }

    fn unlink(&mut self, symbol: &T)
    {
        let symbol = symbol.base();
        let handle = SymbolHandle::new(symbol.raw_handle());
        if T::FLAGS.contains(SymbolFlags::WITH_ADDRESS_MAP) {
            if let Some(address) = symbol.address() {
                remove_from_index(&mut self.address_to_handle, &address, handle);
            }
        }
        if T::FLAGS.contains(SymbolFlags::WITH_NAME_MAP) {
            remove_from_index(&mut self.name_to_handle, symbol.name(), handle);
        }
    }
}

/// Write access to one symbol in a [`SymbolList`].
///
/// Dereferences to the kind's `Fields`, which can be edited freely. The type
/// tree and size go through methods; the handle, name, address and
/// provenance stay with the list.
pub struct SymbolMut<'a, T: SymbolKind>
{
    list: &'a mut SymbolList<T>,
    index: usize,
}

impl<T: SymbolKind> SymbolMut<'_, T>
{
    #[must_use]
    pub fn handle(&self) -> SymbolHandle<T>
    {
        SymbolHandle::new(self.symbol().base().raw_handle())
    }

    /// Read access to the whole symbol.
    #[must_use]
    pub fn symbol(&self) -> &T
    {
        &self.list.symbols[self.index]
    }

    pub fn set_size(&mut self, size: u32)
    {
        self.list.set_size_at(self.index, size);
    }

    /// Replace the type tree wholesale.
    pub fn set_type(&mut self, node: Box<Node>)
    {
        self.symbol_mut().base_mut().set_type(node);
    }

    /// Remove and return the type tree.
    pub fn take_type(&mut self) -> Option<Box<Node>>
    {
        self.symbol_mut().base_mut().take_type()
    }

    /// Mutable access to the type tree.
    ///
    /// Positions inside the tree may change through this reference, so every
    /// outstanding [`NodeHandle`](super::NodeHandle) into it is invalidated.
    pub fn type_tree_mut(&mut self) -> Option<&mut Node>
    {
        self.symbol_mut().base_mut().type_tree_mut()
    }

    pub(crate) fn symbol_mut(&mut self) -> &mut T
    {
        &mut self.list.symbols[self.index]
    }
}

impl<T: SymbolKind> Deref for SymbolMut<'_, T>
{
    type Target = T::Fields;

    fn deref(&self) -> &T::Fields
    {
        self.symbol().fields()
    }
}

impl<T: SymbolKind> DerefMut for SymbolMut<'_, T>
{
    fn deref_mut(&mut self) -> &mut T::Fields
    {
        self.symbol_mut().fields_mut()
    }
}

impl<'a, T: SymbolKind> IntoIterator for &'a SymbolList<T>
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.symbols.iter()
    }
}

fn insert_into_index<K: Ord, H: Ord>(index: &mut BTreeIndex<K, H>, key: K, handle: H)
{
    index.entry(key).or_default().insert(handle);
}

fn remove_from_index<K, Q, H>(index: &mut BTreeIndex<K, H>, key: &Q, handle: H)
where
    K: Ord + std::borrow::Borrow<Q>,
    Q: Ord + ?Sized,
    H: Ord,
{
    if let Some(handles) = index.get_mut(key) {
        handles.remove(&handle);
        if handles.is_empty() {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::database::kinds::{Function, Label, ParameterVariable, SymbolSource};

    fn source() -> SymbolSourceHandle
    {
        SymbolSourceHandle::new(0)
    }

    #[test]
    fn test_create_requires_source()
    {
        let mut labels: SymbolList<Label> = SymbolList::new();
        assert!(matches!(
            labels.create_symbol("x", None, SymbolSourceHandle::invalid(), None),
            Err(SymbolError::InvalidArgument(_))
        ));

        let mut sources: SymbolList<SymbolSource> = SymbolList::new();
        assert!(sources.create_symbol("User", None, SymbolSourceHandle::invalid(), None).is_ok());
    }

    #[test]
    fn test_overlapping_address()
    {
        let mut functions: SymbolList<Function> = SymbolList::new();
        functions
            .create_symbol("a", Some(Address::new(0x100)), source(), None)
            .unwrap()
            .set_size(0x20);
        let mut second = functions.create_symbol("b", Some(Address::new(0x120)), source(), None).unwrap();
        second.set_size(0x10);
        let second = second.handle();

        assert_eq!(
            functions.symbol_overlapping_address(Address::new(0x11c)).map(|f| f.name()),
            Some("a")
        );
        assert_eq!(
            functions.symbol_overlapping_address(Address::new(0x120)).map(|f| f.handle()),
            Some(second)
        );
        assert!(functions.symbol_overlapping_address(Address::new(0x130)).is_none());
        assert!(functions.symbol_overlapping_address(Address::new(0xff)).is_none());
    }

    #[test]
    fn test_address_range_query()
    {
        let mut labels: SymbolList<Label> = SymbolList::new();
        for (name, address) in [("a", 0x10), ("b", 0x20), ("c", 0x30)] {
            labels.create_symbol(name, Some(Address::new(address)), source(), None).unwrap();
        }
        let handles = labels.handles_from_address_range(AddressRange::new(Address::new(0x10), 0x20));
        let names: Vec<&str> = labels.symbols_from_handles(&handles).iter().map(|l| l.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_unindexed_kind_has_no_name_lookup()
    {
        let mut parameters: SymbolList<ParameterVariable> = SymbolList::new();
        let handle = parameters.create_symbol("x", None, source(), None).unwrap().handle();
        assert!(parameters.handles_from_name("x").is_empty());
        assert!(parameters.rename_symbol(handle, "y"));
        assert_eq!(parameters.symbol_from_handle(handle).map(|p| p.name()), Some("y"));
    }

    #[test]
    fn test_destroy_range_compacts()
    {
        let mut labels: SymbolList<Label> = SymbolList::new();
        let handles: Vec<_> = (0..5u32)
            .map(|i| {
                labels
                    .create_symbol(format!("l{i}"), Some(Address::new(i * 4)), source(), None)
                    .unwrap()
                    .handle()
            })
            .collect();

        let mut range = SymbolRange::new(handles[1]);
        range.expand_to_include(handles[3]);
        assert_eq!(labels.destroy_symbols(range), 3);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.index_from_handle(handles[4]), Some(1));
        assert!(labels.handles_from_starting_address(Address::new(8)).is_empty());
        assert_eq!(labels.destroy_symbols(range), 0);
    }

    #[test]
    fn test_clear_keeps_handle_counter()
    {
        let mut labels: SymbolList<Label> = SymbolList::new();
        let old = labels.create_symbol("a", None, source(), None).unwrap().handle();
        labels.clear();
        let new = labels.create_symbol("a", None, source(), None).unwrap().handle();
        assert!(new > old);
        assert!(labels.symbol_from_handle(old).is_none());
    }

    #[test]
    fn test_demangled_symbol_keeps_mangled_name()
    {
        let demangler: &Demangler = &|name: &str| name.strip_suffix("__Fv").map(|base| format!("{base}(void)"));
        let mut functions: SymbolList<Function> = SymbolList::new();
        let function = functions
            .create_demangled_symbol("main__Fv", None, source(), None, Some(demangler))
            .unwrap();
        assert_eq!(function.symbol().name(), "main(void)");
        assert_eq!(function.mangled_name, "main__Fv");

        let mut labels: SymbolList<Label> = SymbolList::new();
        let label = labels
            .create_demangled_symbol("main__Fv", None, source(), None, Some(demangler))
            .unwrap();
        assert_eq!(label.symbol().name(), "main__Fv");
    }

    #[test]
    fn test_overlap_query_only_visits_nearby_starts()
    {
        let mut labels: SymbolList<Label> = SymbolList::new();
        for i in 0..1000u32 {
            labels
                .create_symbol(format!("l{i}"), Some(Address::new(i * 0x10)), source(), None)
                .unwrap()
                .set_size(4);
        }
        assert_eq!(labels.largest_size, 4);
        assert!(labels.symbol_overlapping_address(Address::new(0x3e78)).is_none());
        assert_eq!(
            labels.symbol_overlapping_address(Address::new(0x3e73)).map(Label::name),
            Some("l999")
        );

        let first = labels.first_handle_from_starting_address(Address::new(0)).unwrap();
        assert!(labels.set_size(first, 0x10000));
        assert_eq!(
            labels.symbol_overlapping_address(Address::new(0x3e78)).map(Label::name),
            Some("l0")
        );
    }

    #[test]
    fn test_field_edits_leave_identity_and_indices_alone()
    {
        let mut functions: SymbolList<Function> = SymbolList::new();
        let mut a = functions.create_symbol("a", Some(Address::new(0x100)), source(), None).unwrap();
        a.relative_path = "a.c".to_string();
        let a = a.handle();
        let mut b = functions.create_symbol("b", Some(Address::new(0x200)), source(), None).unwrap();
        b.relative_path = "b.c".to_string();
        let b = b.handle();

        let fields_a = functions.symbol_mut(a).unwrap().clone();
        let fields_b = std::mem::replace(&mut *functions.symbol_mut(b).unwrap(), fields_a);
        *functions.symbol_mut(a).unwrap() = fields_b;

        assert!(functions.symbols.windows(2).all(|pair| pair[0].raw_handle() < pair[1].raw_handle()));
        let first = functions.symbol_from_handle(a).unwrap();
        assert_eq!((first.name(), first.relative_path.as_str()), ("a", "b.c"));
        assert_eq!(functions.first_handle_from_name("b"), Some(b));
        assert_eq!(functions.first_handle_from_starting_address(Address::new(0x100)), Some(a));
    }
}
