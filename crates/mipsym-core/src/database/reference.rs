//! References that outlive a borrow of the database.
//!
//! Neither type here holds a pointer. Both are resolved against a
//! [`SymbolDatabase`] on every access and simply fail to resolve once what they
//! point at is gone.

use smallvec::SmallVec;

use super::handle::{SymbolDescriptor, SymbolHandle};
use super::kinds::{Symbol, SymbolKind};
use super::SymbolDatabase;
use crate::ast::Node;

/// A handle to a symbol of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MultiSymbolHandle
{
    descriptor: SymbolDescriptor,
    handle: u32,
}

impl Default for MultiSymbolHandle
{
    fn default() -> Self
    {
        Self {
            descriptor: SymbolDescriptor::DataType,
            handle: SymbolHandle::<()>::invalid().value(),
        }
    }
}

impl MultiSymbolHandle
{
    #[must_use]
    pub fn new<T: SymbolKind>(symbol: &T) -> Self
    {
        Self {
            descriptor: T::DESCRIPTOR,
            handle: symbol.base().raw_handle(),
        }
    }

    #[must_use]
    pub fn from_handle<T: SymbolKind>(handle: SymbolHandle<T>) -> Self
    {
        Self {
            descriptor: T::DESCRIPTOR,
            handle: handle.value(),
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool
    {
        SymbolHandle::<()>::new(self.handle).valid()
    }

    #[must_use]
    pub fn descriptor(&self) -> SymbolDescriptor
    {
        self.descriptor
    }

    #[must_use]
    pub fn handle(&self) -> u32
    {
        self.handle
    }

    /// The common part of the symbol, if it still exists.
    #[must_use]
    pub fn lookup_symbol<'a>(&self, database: &'a SymbolDatabase) -> Option<&'a Symbol>
    {
        database.symbol_from_multi_handle(*self)
    }
}

/// A weak reference to one node of a symbol's type tree.
///
/// The node is identified by the path of child indices from the root (see
/// [`Node::children`]) together with the owner's generation at the time the
/// handle was made. If the owner is destroyed, or its tree is replaced or
/// handed out mutably, the handle stops resolving.
///
/// ## Example
///
/// ```rust
/// use mipsym_core::ast::{BuiltInClass, Node};
/// use mipsym_core::database::{NodeHandle, SymbolDatabase};
///
/// let mut database = SymbolDatabase::new();
/// let source = database.get_symbol_source("User").unwrap();
/// let mut function = database.functions.create_symbol("f", None, source, None).unwrap();
/// function.set_type(Box::new(Node::pointer_to(Node::builtin(BuiltInClass::Signed32))));
/// let pointee = NodeHandle::new(function.symbol()).handle_for_child(0);
/// let function = function.handle();
///
/// assert!(pointee.lookup_node(&database).is_some());
///
/// let mut function = database.functions.symbol_mut(function).unwrap();
/// function.set_type(Box::new(Node::builtin(BuiltInClass::Void)));
/// assert!(pointee.lookup_node(&database).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodeHandle
{
    symbol: MultiSymbolHandle,
    generation: u64,
    path: SmallVec<[u32; 4]>,
}

impl NodeHandle
{
    /// A handle to the root of `symbol`'s type tree.
    #[must_use]
    pub fn new<T: SymbolKind>(symbol: &T) -> Self
    {
        Self {
            symbol: MultiSymbolHandle::new(symbol),
            generation: symbol.base().generation(),
            path: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool
    {
        self.symbol.valid()
    }

    #[must_use]
    pub fn symbol(&self) -> MultiSymbolHandle
    {
        self.symbol
    }

    #[must_use]
    pub fn generation(&self) -> u64
    {
        self.generation
    }

    /// Child indices from the root down to the node.
    #[must_use]
    pub fn path(&self) -> &[u32]
    {
        &self.path
    }

    /// A handle to the `index`th child of this node. Whether that child exists
    /// is only checked when the handle is looked up.
    #[must_use]
    pub fn handle_for_child(&self, index: u32) -> NodeHandle
    {
        let mut child = self.clone();
        child.path.push(index);
        child
    }

    /// Resolve the handle.
    ///
    /// Returns `None` if the owning symbol no longer exists, its generation has
    /// moved on, or the path no longer leads to a node.
    #[must_use]
    pub fn lookup_node<'a>(&self, database: &'a SymbolDatabase) -> Option<&'a Node>
    {
        let symbol = self.symbol.lookup_symbol(database)?;
        if symbol.generation() != self.generation {
            return None;
        }

        let mut node = symbol.type_tree()?;
        for &index in &self.path {
            node = node.child(usize::try_from(index).ok()?)?;
        }
        Some(node)
    }
}
