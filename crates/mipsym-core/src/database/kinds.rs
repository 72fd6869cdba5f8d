//! The symbol base record and the ten concrete symbol kinds.
//!
//! Every kind wraps a [`Symbol`] that only its
//! [`SymbolList`](super::SymbolList) can change, next to a plain `Fields`
//! struct the kind dereferences to. Name, address, size and provenance are
//! read through methods on the kind; the fields are what a caller edits
//! through a [`SymbolMut`](super::SymbolMut).

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use super::handle::{SymbolDescriptor, SymbolHandle, SymbolRange};
use crate::ast::{CompareFailReason, Node, NodeDescriptor, StorageClass};
use crate::mdebug::{SourceLanguage, SymbolClass};
use crate::types::{Address, AddressRange};

/// Which secondary indices a kind keeps, and whether its names are mangled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymbolFlags(u32);

impl SymbolFlags
{
    pub const NONE: SymbolFlags = SymbolFlags(0);
    pub const WITH_ADDRESS_MAP: SymbolFlags = SymbolFlags(1 << 0);
    pub const WITH_NAME_MAP: SymbolFlags = SymbolFlags(1 << 1);
    pub const NAME_NEEDS_DEMANGLING: SymbolFlags = SymbolFlags(1 << 2);

    #[must_use]
    pub const fn union(self, other: SymbolFlags) -> SymbolFlags
    {
        SymbolFlags(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, other: SymbolFlags) -> bool
    {
        self.0 & other.0 == other.0
    }
}

/// Fields shared by every kind of symbol.
#[derive(Debug, Clone)]
pub struct Symbol
{
    pub(crate) handle: u32,
    pub(crate) name: String,
    pub(crate) address: Option<Address>,
    pub(crate) source: SymbolSourceHandle,
    pub(crate) module: ModuleHandle,
    pub(crate) size: u32,
    type_tree: Option<Box<Node>>,
    generation: u64,
    latest_generation: u64,
}

impl Symbol
{
    pub(crate) fn new(
        handle: u32,
        name: String,
        address: Option<Address>,
        source: SymbolSourceHandle,
        module: ModuleHandle,
    ) -> Self
    {
        Self {
            handle,
            name,
            address,
            source,
            module,
            size: 0,
            type_tree: None,
            generation: 0,
            latest_generation: 0,
        }
    }

    /// The handle value without its kind.
    #[must_use]
    pub fn raw_handle(&self) -> u32
    {
        self.handle
    }

    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> Option<Address>
    {
        self.address
    }

    #[must_use]
    pub fn size(&self) -> u32
    {
        self.size
    }

    /// `[address, address + size)`, if the symbol has an address.
    #[must_use]
    pub fn address_range(&self) -> Option<AddressRange>
    {
        self.address.map(|start| AddressRange::new(start, self.size))
    }

    /// The symbol source that created this symbol.
    #[must_use]
    pub fn source(&self) -> SymbolSourceHandle
    {
        self.source
    }

    /// The module this symbol belongs to, or an invalid handle.
    #[must_use]
    pub fn module(&self) -> ModuleHandle
    {
        self.module
    }

    #[must_use]
    pub fn type_tree(&self) -> Option<&Node>
    {
        self.type_tree.as_deref()
    }

    /// Identifies the current type tree. A new value is issued every time the
    /// tree is replaced or handed out mutably, and values are never reused
    /// for a different tree.
    #[must_use]
    pub fn generation(&self) -> u64
    {
        self.generation
    }

    /// Positions inside the tree may change through this reference, so every
    /// outstanding [`NodeHandle`](super::NodeHandle) into it is invalidated.
    pub(crate) fn type_tree_mut(&mut self) -> Option<&mut Node>
    {
        if self.type_tree.is_some() {
            self.next_generation();
        }
        self.type_tree.as_deref_mut()
    }

    pub(crate) fn set_type(&mut self, node: Box<Node>)
    {
        self.replace_type(Some(node));
    }

    pub(crate) fn take_type(&mut self) -> Option<Box<Node>>
    {
        if self.type_tree.is_none() {
            return None;
        }
        self.replace_type(None)
    }

    /// Swap in a new tree, returning the old one.
    pub(crate) fn replace_type(&mut self, node: Option<Box<Node>>) -> Option<Box<Node>>
    {
        self.next_generation();
        std::mem::replace(&mut self.type_tree, node)
    }

    /// Put back a tree saved from an earlier state along with the generation
    /// it had, so node handles taken back then resolve again.
    pub(crate) fn restore_type(&mut self, node: Option<Box<Node>>, generation: u64)
    {
        self.type_tree = node;
        self.generation = generation;
    }

    fn next_generation(&mut self)
    {
        self.latest_generation += 1;
        self.generation = self.latest_generation;
    }
}

pub(crate) mod sealed
{
    use super::Symbol;

    /// Write access to the base record, kept inside the crate so only a
    /// symbol list can change a symbol's identity.
    pub trait Sealed
    {
        fn base_mut(&mut self) -> &mut Symbol;
    }
}

/// Implemented by each of the ten symbol kinds.
pub trait SymbolKind: sealed::Sealed + Sized
{
    const DESCRIPTOR: SymbolDescriptor;
    /// Human-readable kind name.
    const NAME: &'static str;
    const FLAGS: SymbolFlags;

    /// The part of the kind a caller may edit freely.
    type Fields: Default;

    /// Wrap a freshly created base record, with every kind-specific field at
    /// its default.
    fn from_base(base: Symbol) -> Self;

    fn base(&self) -> &Symbol;

    fn fields(&self) -> &Self::Fields;

    fn fields_mut(&mut self) -> &mut Self::Fields;

    /// Record the name a demangled symbol had before demangling. Only kinds
    /// that carry a mangled name keep it.
    fn set_mangled_name(&mut self, _mangled: String) {}
}

macro_rules! symbol_kinds {
    ($(
        $kind:ident($fields:ty) { $($link:ident: $init:expr),* $(,)? },
            $handle:ident, $range:ident, $flags:expr $(, { $($extra:tt)* })?;
    )*) => {
        $(
            pub type $handle = SymbolHandle<$kind>;
            pub type $range = SymbolRange<$kind>;

            impl SymbolKind for $kind
            {
                const DESCRIPTOR: SymbolDescriptor = SymbolDescriptor::$kind;
                const NAME: &'static str = SymbolDescriptor::$kind.as_str();
                const FLAGS: SymbolFlags = $flags;

                type Fields = $fields;

                fn from_base(base: Symbol) -> Self
                {
                    Self {
                        base,
                        $($link: $init,)*
                        fields: <$fields>::default(),
                    }
                }

                fn base(&self) -> &Symbol
                {
                    &self.base
                }

                fn fields(&self) -> &$fields
                {
                    &self.fields
                }

                fn fields_mut(&mut self) -> &mut $fields
                {
                    &mut self.fields
                }

                $($($extra)*)?
            }

            impl sealed::Sealed for $kind
            {
                fn base_mut(&mut self) -> &mut Symbol
                {
                    &mut self.base
                }
            }

            impl $kind
            {
                #[must_use]
                pub fn handle(&self) -> $handle
                {
                    SymbolHandle::new(self.base.handle)
                }

                #[must_use]
                pub fn raw_handle(&self) -> u32
                {
                    self.base.handle
                }

                #[must_use]
                pub fn name(&self) -> &str
                {
                    &self.base.name
                }

                #[must_use]
                pub fn address(&self) -> Option<Address>
                {
                    self.base.address
                }

                #[must_use]
                pub fn size(&self) -> u32
                {
                    self.base.size
                }

                #[must_use]
                pub fn address_range(&self) -> Option<AddressRange>
                {
                    self.base.address_range()
                }

                #[must_use]
                pub fn source(&self) -> SymbolSourceHandle
                {
                    self.base.source
                }

                #[must_use]
                pub fn module(&self) -> ModuleHandle
                {
                    self.base.module
                }

                #[must_use]
                pub fn type_tree(&self) -> Option<&Node>
                {
                    self.base.type_tree()
                }

                #[must_use]
                pub fn generation(&self) -> u64
                {
                    self.base.generation()
                }
            }
        )*
    };
}

/// Lets a kind be read and written like its `Fields` struct.
macro_rules! deref_fields {
    ($($kind:ident => $fields:ty;)*) => {
        $(
            impl Deref for $kind
            {
                type Target = $fields;

                fn deref(&self) -> &$fields
                {
                    &self.fields
                }
            }

            impl DerefMut for $kind
            {
                fn deref_mut(&mut self) -> &mut $fields
                {
                    &mut self.fields
                }
            }
        )*
    };
}

symbol_kinds! {
    DataType(DataTypeFields) { files: Vec::new() },
        DataTypeHandle, DataTypeRange, SymbolFlags::WITH_NAME_MAP;
    Function(FunctionFields) {
        source_file: SymbolHandle::invalid(),
        parameter_variables: None,
        local_variables: None,
    },
        FunctionHandle, FunctionRange,
        SymbolFlags::WITH_ADDRESS_MAP
            .union(SymbolFlags::WITH_NAME_MAP)
            .union(SymbolFlags::NAME_NEEDS_DEMANGLING),
        {
            fn set_mangled_name(&mut self, mangled: String)
            {
                self.fields.mangled_name = mangled;
            }
        };
    GlobalVariable(GlobalVariableFields) { source_file: SymbolHandle::invalid() },
        GlobalVariableHandle, GlobalVariableRange,
        SymbolFlags::WITH_ADDRESS_MAP
            .union(SymbolFlags::WITH_NAME_MAP)
            .union(SymbolFlags::NAME_NEEDS_DEMANGLING),
        {
            fn set_mangled_name(&mut self, mangled: String)
            {
                self.fields.mangled_name = mangled;
            }
        };
    Label(()) {}, LabelHandle, LabelRange, SymbolFlags::WITH_ADDRESS_MAP;
    LocalVariable(LocalVariableFields) { function: SymbolHandle::invalid() },
        LocalVariableHandle, LocalVariableRange, SymbolFlags::WITH_ADDRESS_MAP;
    Module(ModuleFields) {}, ModuleHandle, ModuleRange, SymbolFlags::WITH_NAME_MAP;
    ParameterVariable(ParameterVariableFields) { function: SymbolHandle::invalid() },
        ParameterVariableHandle, ParameterVariableRange, SymbolFlags::NONE;
    Section(()) {}, SectionHandle, SectionRange, SymbolFlags::WITH_ADDRESS_MAP.union(SymbolFlags::WITH_NAME_MAP);
    SourceFile(SourceFileFields) {
        functions: Vec::new(),
        global_variables: Vec::new(),
        functions_match: true,
    },
        SourceFileHandle, SourceFileRange, SymbolFlags::WITH_ADDRESS_MAP.union(SymbolFlags::WITH_NAME_MAP);
    SymbolSource(()) {}, SymbolSourceHandle, SymbolSourceRange, SymbolFlags::WITH_NAME_MAP;
}

deref_fields! {
    DataType => DataTypeFields;
    Function => FunctionFields;
    GlobalVariable => GlobalVariableFields;
    LocalVariable => LocalVariableFields;
    Module => ModuleFields;
    ParameterVariable => ParameterVariableFields;
    SourceFile => SourceFileFields;
}

/// Where a variable with global storage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlobalStorageLocation
{
    #[default]
    Nil,
    Data,
    Bss,
    Abs,
    SData,
    SBss,
    RData,
    Common,
    SCommon,
    SUndefined,
}

impl GlobalStorageLocation
{
    /// The location implied by a symbol's storage class, if it is a data class.
    #[must_use]
    pub fn from_symbol_class(class: SymbolClass) -> Option<Self>
    {
        Some(match class {
            SymbolClass::Nil => Self::Nil,
            SymbolClass::Data => Self::Data,
            SymbolClass::Bss => Self::Bss,
            SymbolClass::Abs => Self::Abs,
            SymbolClass::SData => Self::SData,
            SymbolClass::SBss => Self::SBss,
            SymbolClass::RData => Self::RData,
            SymbolClass::Common => Self::Common,
            SymbolClass::SCommon => Self::SCommon,
            SymbolClass::SUndefined => Self::SUndefined,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str
    {
        match self {
            Self::Nil => "nil",
            Self::Data => "data",
            Self::Bss => "bss",
            Self::Abs => "abs",
            Self::SData => "sdata",
            Self::SBss => "sbss",
            Self::RData => "rdata",
            Self::Common => "common",
            Self::SCommon => "scommon",
            Self::SUndefined => "sundefined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlobalStorage
{
    pub location: GlobalStorageLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterStorage
{
    pub dbx_register_number: i32,
    pub is_by_reference: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackStorage
{
    pub stack_pointer_offset: i32,
}

/// Storage of a local or parameter variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableStorage
{
    Global(GlobalStorage),
    Register(RegisterStorage),
    Stack(StackStorage),
}

impl Default for VariableStorage
{
    fn default() -> Self
    {
        VariableStorage::Global(GlobalStorage::default())
    }
}

/// A translation-unit-local type number, as used by stabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeNumber
{
    pub file: i32,
    pub index: i32,
}

/// Hash of the opcodes of a function, used to tell whether the code in
/// memory still matches what the symbol table describes.
///
/// Only the top six bits of each instruction are hashed so the result doesn't
/// depend on whether relocations have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FunctionHash(u32);

impl FunctionHash
{
    #[must_use]
    pub fn new() -> Self
    {
        Self(0)
    }

    /// Hash a whole function body.
    #[must_use]
    pub fn of(instructions: &[u32]) -> Self
    {
        let mut hash = Self::new();
        for &instruction in instructions {
            hash.update(instruction);
        }
        hash
    }

    pub fn update(&mut self, instruction: u32)
    {
        let opcode = instruction >> 26;
        self.0 = self.0.wrapping_mul(31).wrapping_add(opcode);
    }

    #[must_use]
    pub fn get(&self) -> u32
    {
        self.0
    }
}

/// A C/C++ data type.
#[derive(Debug, Clone)]
pub struct DataType
{
    base: Symbol,
    pub(crate) files: Vec<SourceFileHandle>,
    fields: DataTypeFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTypeFields
{
    /// Set when two definitions with this name didn't match.
    pub compare_fail_reason: Option<CompareFailReason>,
    pub not_defined_in_any_translation_unit: bool,
    pub only_defined_in_single_translation_unit: bool,
}

impl DataType
{
    /// Every live source file the type was seen in.
    #[must_use]
    pub fn files(&self) -> &[SourceFileHandle]
    {
        &self.files
    }

    /// True when another definition with the same name was found that
    /// doesn't match this one.
    #[must_use]
    pub fn not_identically_defined(&self) -> bool
    {
        self.fields.compare_fail_reason.is_some()
    }

    pub(crate) fn is_anonymous_enum(&self) -> bool
    {
        self.base.name.is_empty()
            && matches!(
                self.type_tree().map(|node| &node.descriptor),
                Some(NodeDescriptor::Enum { .. })
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberPair
{
    pub address: Address,
    pub line_number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSourceFile
{
    pub address: Address,
    pub relative_path: String,
}

/// A function. Its type tree describes the return type.
#[derive(Debug, Clone)]
pub struct Function
{
    base: Symbol,
    pub(crate) source_file: SourceFileHandle,
    pub(crate) parameter_variables: Option<Vec<ParameterVariableHandle>>,
    pub(crate) local_variables: Option<Vec<LocalVariableHandle>>,
    fields: FunctionFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionFields
{
    pub mangled_name: String,
    /// Hash of the function's opcodes as read from the file.
    pub original_hash: u32,
    /// Hash of the function's opcodes as read from memory.
    pub current_hash: u32,
    pub relative_path: String,
    pub storage_class: StorageClass,
    pub line_numbers: Vec<LineNumberPair>,
    pub sub_source_files: Vec<SubSourceFile>,
    pub is_member_function_ish: bool,
}

impl FunctionFields
{
    pub fn set_current_hash(&mut self, hash: FunctionHash)
    {
        self.current_hash = hash.get();
    }
}

impl Function
{
    #[must_use]
    pub fn source_file(&self) -> SourceFileHandle
    {
        self.source_file
    }

    #[must_use]
    pub fn parameter_variables(&self) -> Option<&[ParameterVariableHandle]>
    {
        self.parameter_variables.as_deref()
    }

    #[must_use]
    pub fn local_variables(&self) -> Option<&[LocalVariableHandle]>
    {
        self.local_variables.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct GlobalVariable
{
    base: Symbol,
    pub(crate) source_file: SourceFileHandle,
    fields: GlobalVariableFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalVariableFields
{
    pub mangled_name: String,
    pub storage: GlobalStorage,
    pub storage_class: StorageClass,
}

impl GlobalVariable
{
    #[must_use]
    pub fn source_file(&self) -> SourceFileHandle
    {
        self.source_file
    }
}

/// A label, or any symbol whose kind couldn't be worked out.
#[derive(Debug, Clone)]
pub struct Label
{
    base: Symbol,
    fields: (),
}

/// A local variable, including static locals which have global storage.
#[derive(Debug, Clone)]
pub struct LocalVariable
{
    base: Symbol,
    pub(crate) function: FunctionHandle,
    fields: LocalVariableFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalVariableFields
{
    pub storage: VariableStorage,
    pub live_range: Option<AddressRange>,
}

impl LocalVariable
{
    #[must_use]
    pub fn function(&self) -> FunctionHandle
    {
        self.function
    }
}

/// A loaded program module. Symbols created with a module have the module's
/// address added to their own.
#[derive(Debug, Clone)]
pub struct Module
{
    base: Symbol,
    fields: ModuleFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFields
{
    pub is_irx: bool,
    pub version_major: i32,
    pub version_minor: i32,
}

impl Default for ModuleFields
{
    fn default() -> Self
    {
        Self {
            is_irx: false,
            version_major: -1,
            version_minor: -1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterVariable
{
    base: Symbol,
    pub(crate) function: FunctionHandle,
    fields: ParameterVariableFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterVariableFields
{
    pub storage: VariableStorage,
}

impl ParameterVariable
{
    #[must_use]
    pub fn function(&self) -> FunctionHandle
    {
        self.function
    }
}

/// An ELF section.
#[derive(Debug, Clone)]
pub struct Section
{
    base: Symbol,
    fields: (),
}

/// One translation unit. The name is the resolved full path.
#[derive(Debug, Clone)]
pub struct SourceFile
{
    base: Symbol,
    pub(crate) functions: Vec<FunctionHandle>,
    pub(crate) global_variables: Vec<GlobalVariableHandle>,
    pub(crate) functions_match: bool,
    fields: SourceFileFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileFields
{
    pub working_dir: String,
    pub command_line_path: String,
    pub language: SourceLanguage,
    pub type_numbers: BTreeMap<TypeNumber, DataTypeHandle>,
    pub toolchain_version_info: BTreeSet<String>,
}

impl SourceFile
{
    #[must_use]
    pub fn full_path(&self) -> &str
    {
        self.name()
    }

    #[must_use]
    pub fn functions(&self) -> &[FunctionHandle]
    {
        &self.functions
    }

    #[must_use]
    pub fn global_variables(&self) -> &[GlobalVariableHandle]
    {
        &self.global_variables
    }

    /// Whether at least half of this file's functions still match their
    /// original hash, as of the last
    /// [`check_functions_match`](super::SymbolDatabase::check_functions_match).
    #[must_use]
    pub fn functions_match(&self) -> bool
    {
        self.functions_match
    }
}

/// Records how a symbol came to exist, e.g. one per importer.
#[derive(Debug, Clone)]
pub struct SymbolSource
{
    base: Symbol,
    fields: (),
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::ast::BuiltInClass;

    #[test]
    fn test_function_hash()
    {
        let instructions = [0x2784_ffe0, 0x0c00_0000, 0x0000_0000];
        let expected = ((0x27840000u32 >> 26) * 31 + (0x0c00_0000 >> 26)) * 31;
        assert_eq!(FunctionHash::of(&instructions).get(), expected);
        assert_eq!(FunctionHash::new().get(), 0);
    }

    #[test]
    fn test_function_hash_wraps()
    {
        let hash = FunctionHash::of(&[0xffff_ffff; 64]);
        assert_ne!(hash.get(), 0);
    }

    #[test]
    fn test_flags()
    {
        assert!(Function::FLAGS.contains(SymbolFlags::NAME_NEEDS_DEMANGLING));
        assert!(!Label::FLAGS.contains(SymbolFlags::WITH_NAME_MAP));
        assert!(ParameterVariable::FLAGS.contains(SymbolFlags::NONE));
        assert_eq!(SourceFile::NAME, "Source File");
        assert_eq!(Module::DESCRIPTOR, SymbolDescriptor::Module);
    }

    #[test]
    fn test_new_kind_starts_with_default_fields()
    {
        let module = Module::from_base(Symbol::new(0, "m".to_string(), None, SymbolHandle::invalid(), SymbolHandle::invalid()));
        assert_eq!(module.version_major, -1);
        assert!(!module.is_irx);

        let file = SourceFile::from_base(Symbol::new(0, "a.c".to_string(), None, SymbolHandle::invalid(), SymbolHandle::invalid()));
        assert!(file.functions_match());
        assert_eq!(file.full_path(), "a.c");
    }

    #[test]
    fn test_generation_is_never_reused()
    {
        let mut symbol = Symbol::new(0, String::new(), None, SymbolHandle::invalid(), SymbolHandle::invalid());
        assert!(symbol.type_tree_mut().is_none());
        assert_eq!(symbol.generation(), 0);
        symbol.set_type(Box::new(Node::builtin(BuiltInClass::Signed32)));
        assert_eq!(symbol.generation(), 1);
        assert!(symbol.type_tree_mut().is_some());
        assert_eq!(symbol.generation(), 2);

        let old = symbol.replace_type(Some(Box::new(Node::builtin(BuiltInClass::Void))));
        assert_eq!(symbol.generation(), 3);
        symbol.restore_type(old, 2);
        assert_eq!(symbol.generation(), 2);

        assert!(symbol.take_type().is_some());
        assert_eq!(symbol.generation(), 4);
        assert!(symbol.take_type().is_none());
        assert_eq!(symbol.generation(), 4);
    }

    #[test]
    fn test_storage_location_from_class()
    {
        assert_eq!(
            GlobalStorageLocation::from_symbol_class(SymbolClass::SBss),
            Some(GlobalStorageLocation::SBss)
        );
        assert_eq!(GlobalStorageLocation::from_symbol_class(SymbolClass::Text), None);
    }
}
