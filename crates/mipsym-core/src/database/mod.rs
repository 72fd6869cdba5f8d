//! # Symbol Database
//!
//! Owner of every symbol reconstructed from a symbol table.
//!
//! The database is ten [`SymbolList`]s, one per [`SymbolDescriptor`]. Each list
//! stores its symbols sorted by [`SymbolHandle`] and keeps address and name
//! indices for the kinds that want them. Nothing outside the database ever
//! holds a reference into a list across a mutation: callers keep handles, and
//! [`NodeHandle`]s for positions inside type trees.
//!
//! ## Provenance
//!
//! Every symbol records the [`SymbolSource`] that created it and, optionally,
//! the [`Module`] it belongs to. [`SymbolDatabase::destroy_symbols_from_sources`]
//! and [`SymbolDatabase::destroy_symbols_from_modules`] use these to tear down
//! one import without disturbing anything else.
//!
//! ## Checkpoints
//!
//! [`SymbolDatabase::checkpoint`] opens a checkpoint that
//! [`SymbolDatabase::rollback`] can return to: symbols created since are
//! destroyed and data types that existed before get their old file lists,
//! mismatch reasons and type trees back.
//!
//! ## Example
//!
//! ```rust
//! use mipsym_core::database::SymbolDatabase;
//! use mipsym_core::database::SymbolRange;
//! use mipsym_core::types::Address;
//!
//! let mut database = SymbolDatabase::new();
//! let user = database.get_symbol_source("User").unwrap();
//! let imported = database.get_symbol_source("Symbol Table").unwrap();
//!
//! database.labels.create_symbol("mine", Some(Address::new(0x100)), user, None).unwrap();
//! database.labels.create_symbol("theirs", Some(Address::new(0x200)), imported, None).unwrap();
//!
//! database.destroy_symbols_from_sources(SymbolRange::new(imported));
//! assert_eq!(database.labels.len(), 1);
//! ```

mod handle;
mod kinds;
mod list;
mod reference;

pub use handle::{SymbolDescriptor, SymbolHandle, SymbolRange};
pub use kinds::{
    DataType, DataTypeFields, DataTypeHandle, DataTypeRange, Function, FunctionFields, FunctionHandle, FunctionHash,
    FunctionRange, GlobalStorage, GlobalStorageLocation, GlobalVariable, GlobalVariableFields, GlobalVariableHandle,
    GlobalVariableRange, Label, LabelHandle, LabelRange, LineNumberPair, LocalVariable, LocalVariableFields,
    LocalVariableHandle, LocalVariableRange, Module, ModuleFields, ModuleHandle, ModuleRange, ParameterVariable,
    ParameterVariableFields, ParameterVariableHandle, ParameterVariableRange, RegisterStorage, Section, SectionHandle,
    SectionRange, SourceFile, SourceFileFields, SourceFileHandle, SourceFileRange, StackStorage, SubSourceFile, Symbol,
    SymbolFlags, SymbolKind, SymbolSource, SymbolSourceHandle, SymbolSourceRange, TypeNumber, VariableStorage,
};
use kinds::sealed::Sealed;
pub use list::{SymbolList, SymbolMut};
pub use reference::{MultiSymbolHandle, NodeHandle};
use tracing::{debug, warn};

use crate::ast::{compare_nodes, CompareFailReason, CompareResult, Node};
use crate::error::{Result, SymbolError};
use crate::types::Address;

/// Evaluate `$body` once per list, in declaration order, collecting the
/// results into an array.
macro_rules! each_list {
    ($database:expr, |$list:ident| $body:expr) => {
        [
            {
                let $list = &$database.data_types;
                $body
            },
            {
                let $list = &$database.functions;
                $body
            },
            {
                let $list = &$database.global_variables;
                $body
            },
            {
                let $list = &$database.labels;
                $body
            },
            {
                let $list = &$database.local_variables;
                $body
            },
            {
                let $list = &$database.modules;
                $body
            },
            {
                let $list = &$database.parameter_variables;
                $body
            },
            {
                let $list = &$database.sections;
                $body
            },
            {
                let $list = &$database.source_files;
                $body
            },
            {
                let $list = &$database.symbol_sources;
                $body
            },
        ]
    };
}

macro_rules! each_list_mut {
    ($database:expr, |$list:ident| $body:expr) => {
        [
            {
                let $list = &mut $database.data_types;
                $body
            },
            {
                let $list = &mut $database.functions;
                $body
            },
            {
                let $list = &mut $database.global_variables;
                $body
            },
            {
                let $list = &mut $database.labels;
                $body
            },
            {
                let $list = &mut $database.local_variables;
                $body
            },
            {
                let $list = &mut $database.modules;
                $body
            },
            {
                let $list = &mut $database.parameter_variables;
                $body
            },
            {
                let $list = &mut $database.sections;
                $body
            },
            {
                let $list = &mut $database.source_files;
                $body
            },
            {
                let $list = &mut $database.symbol_sources;
                $body
            },
        ]
    };
}

/// Identifies the symbols created by one import: same symbol source, same
/// module (or both without one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolGroup
{
    pub source: SymbolSourceHandle,
    pub module: Option<ModuleHandle>,
}

impl SymbolGroup
{
    #[must_use]
    pub fn new(source: SymbolSourceHandle) -> Self
    {
        Self { source, module: None }
    }

    #[must_use]
    pub fn is_in_group(&self, symbol: &Symbol) -> bool
    {
        symbol.source() == self.source && symbol.module() == self.module.unwrap_or_default()
    }
}

/// An open checkpoint: the next handle of every list plus the length of the
/// undo journal at the time it was taken. Hand it back to
/// [`SymbolDatabase::rollback`] or [`SymbolDatabase::commit`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct DatabaseCheckpoint
{
    next_handles: [u32; 10],
    journal_len: usize,
}

/// A pre-existing data type as it was before an import changed it.
#[derive(Debug)]
struct DataTypeSnapshot
{
    handle: DataTypeHandle,
    files: Vec<SourceFileHandle>,
    compare_fail_reason: Option<CompareFailReason>,
    /// The old tree and its generation, if the tree was replaced.
    type_tree: Option<(Option<Box<Node>>, u64)>,
}

impl DataTypeSnapshot
{
    fn of(data_type: &DataType) -> Self
    {
        Self {
            handle: data_type.handle(),
            files: data_type.files.clone(),
            compare_fail_reason: data_type.compare_fail_reason,
            type_tree: None,
        }
    }
}

/// Owns every symbol.
#[derive(Debug)]
pub struct SymbolDatabase
{
    pub data_types: SymbolList<DataType>,
    pub functions: SymbolList<Function>,
    pub global_variables: SymbolList<GlobalVariable>,
    pub labels: SymbolList<Label>,
    pub local_variables: SymbolList<LocalVariable>,
    pub modules: SymbolList<Module>,
    pub parameter_variables: SymbolList<ParameterVariable>,
    pub sections: SymbolList<Section>,
    pub source_files: SymbolList<SourceFile>,
    pub symbol_sources: SymbolList<SymbolSource>,
    journal: Vec<DataTypeSnapshot>,
    open_checkpoints: usize,
}

impl Default for SymbolDatabase
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl SymbolDatabase
{
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            data_types: SymbolList::new(),
            functions: SymbolList::new(),
            global_variables: SymbolList::new(),
            labels: SymbolList::new(),
            local_variables: SymbolList::new(),
            modules: SymbolList::new(),
            parameter_variables: SymbolList::new(),
            sections: SymbolList::new(),
            source_files: SymbolList::new(),
            symbol_sources: SymbolList::new(),
            journal: Vec::new(),
            open_checkpoints: 0,
        }
    }

    /// Total number of symbols across all kinds.
    #[must_use]
    pub fn symbol_count(&self) -> usize
    {
        each_list!(self, |list| list.len()).iter().sum()
    }

    /// Symbol counts per kind, in declaration order.
    #[must_use]
    pub fn symbol_counts(&self) -> [(SymbolDescriptor, usize); 10]
    {
        each_list!(self, |list| (list.descriptor(), list.len()))
    }

    /// A symbol of any kind starting at `address`. Kinds are checked in
    /// [`SymbolDescriptor`] order.
    #[must_use]
    pub fn first_symbol_from_starting_address(&self, address: Address) -> Option<MultiSymbolHandle>
    {
        each_list!(self, |list| list
            .first_symbol_from_starting_address(address)
            .map(MultiSymbolHandle::new))
        .into_iter()
        .flatten()
        .next()
    }

    /// The common part of a symbol of any kind.
    #[must_use]
    pub fn symbol_from_multi_handle(&self, handle: MultiSymbolHandle) -> Option<&Symbol>
    {
        let raw = handle.handle();
        match handle.descriptor() {
            SymbolDescriptor::DataType => self.data_types.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::Function => self.functions.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::GlobalVariable => self
                .global_variables
                .symbol_from_handle(SymbolHandle::new(raw))
                .map(SymbolKind::base),
            SymbolDescriptor::Label => self.labels.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::LocalVariable => self
                .local_variables
                .symbol_from_handle(SymbolHandle::new(raw))
                .map(SymbolKind::base),
            SymbolDescriptor::Module => self.modules.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::ParameterVariable => self
                .parameter_variables
                .symbol_from_handle(SymbolHandle::new(raw))
                .map(SymbolKind::base),
            SymbolDescriptor::Section => self.sections.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::SourceFile => self.source_files.symbol_from_handle(SymbolHandle::new(raw)).map(SymbolKind::base),
            SymbolDescriptor::SymbolSource => self
                .symbol_sources
                .symbol_from_handle(SymbolHandle::new(raw))
                .map(SymbolKind::base),
        }
    }

    /// Find the symbol source called `name`, creating it if needed.
    ///
    /// ## Errors
    ///
    /// Only fails if the symbol source list has run out of handles.
    pub fn get_symbol_source(&mut self, name: &str) -> Result<SymbolSourceHandle>
    {
        if let Some(handle) = self.symbol_sources.first_handle_from_name(name) {
            return Ok(handle);
        }
        let source = self
            .symbol_sources
            .create_symbol(name, None, SymbolSourceHandle::invalid(), None)?;
        Ok(source.handle())
    }

    /// Call `callback` on every symbol, kind by kind.
    pub fn for_each_symbol<F: FnMut(&Symbol)>(&self, mut callback: F)
    {
        each_list!(self, |list| for symbol in list {
            callback(symbol.base());
        });
    }

    /// Destroy every symbol. Handles are still never reused afterwards.
    pub fn clear(&mut self)
    {
        each_list_mut!(self, |list| list.clear());
    }

    /// Destroy every symbol created by a symbol source in `range`, across all
    /// kinds. Returns how many symbols were destroyed.
    pub fn destroy_symbols_from_sources(&mut self, range: SymbolSourceRange) -> usize
    {
        let destroyed: usize = each_list_mut!(self, |list| list.destroy_symbols_from_sources(range))
            .iter()
            .sum();
        self.prune_data_type_files();
        debug!(?range, destroyed, "destroyed symbols from sources");
        destroyed
    }

    /// Destroy every symbol belonging to a module in `range`, across all
    /// kinds. Returns how many symbols were destroyed.
    pub fn destroy_symbols_from_modules(&mut self, range: ModuleRange) -> usize
    {
        let destroyed: usize = each_list_mut!(self, |list| list.destroy_symbols_from_modules(range))
            .iter()
            .sum();
        self.prune_data_type_files();
        debug!(?range, destroyed, "destroyed symbols from modules");
        destroyed
    }

    /// Open a checkpoint. Until it is rolled back or committed, changes made
    /// to existing data types by
    /// [`create_data_type_if_unique`](Self::create_data_type_if_unique) are
    /// journaled so they can be undone.
    pub fn checkpoint(&mut self) -> DatabaseCheckpoint
    {
        self.open_checkpoints += 1;
        DatabaseCheckpoint {
            next_handles: each_list!(self, |list| list.next_handle().value()),
            journal_len: self.journal.len(),
        }
    }

    /// Keep everything done since `checkpoint`.
    pub fn commit(&mut self, checkpoint: DatabaseCheckpoint)
    {
        debug!(
            changed_data_types = self.journal.len().saturating_sub(checkpoint.journal_len),
            "committed symbol database changes"
        );
        self.close_checkpoint();
    }

    /// Return to the state at `checkpoint`: destroy every symbol created
    /// since, restore the data types that existed before and drop references
    /// to destroyed source files. Returns how many symbols were destroyed.
    pub fn rollback(&mut self, checkpoint: DatabaseCheckpoint) -> usize
    {
        let [data_types, functions, global_variables, labels, local_variables, modules, parameter_variables, sections, source_files, symbol_sources] =
            checkpoint.next_handles;

        let destroyed = self.data_types.destroy_symbols_from(SymbolHandle::new(data_types))
            + self.functions.destroy_symbols_from(SymbolHandle::new(functions))
            + self.global_variables.destroy_symbols_from(SymbolHandle::new(global_variables))
            + self.labels.destroy_symbols_from(SymbolHandle::new(labels))
            + self.local_variables.destroy_symbols_from(SymbolHandle::new(local_variables))
            + self.modules.destroy_symbols_from(SymbolHandle::new(modules))
            + self.parameter_variables.destroy_symbols_from(SymbolHandle::new(parameter_variables))
            + self.sections.destroy_symbols_from(SymbolHandle::new(sections))
            + self.source_files.destroy_symbols_from(SymbolHandle::new(source_files))
            + self.symbol_sources.destroy_symbols_from(SymbolHandle::new(symbol_sources));

        let start = checkpoint.journal_len.min(self.journal.len());
        let restored = self.journal.len() - start;
        for snapshot in self.journal.drain(start..).rev() {
            let Some(data_type) = self.data_types.symbol_from_handle_mut(snapshot.handle) else {
                continue;
            };
            data_type.files = snapshot.files;
            data_type.compare_fail_reason = snapshot.compare_fail_reason;
            if let Some((node, generation)) = snapshot.type_tree {
                data_type.base_mut().restore_type(node, generation);
            }
        }

        self.close_checkpoint();
        self.prune_data_type_files();
        debug!(destroyed, restored, "rolled back symbol database");
        destroyed
    }

    /// Create a data type, or reuse a structurally identical one.
    ///
    /// Existing data types with the same name from the same `group` are
    /// compared against `node` in turn:
    ///
    /// - on a match, `source_file` is added to the existing type's file list
    ///   and its handle is returned. If the new tree is strictly better (it
    ///   resolves a type name the old one didn't) it replaces the old tree.
    ///   When each tree resolves a name the other doesn't, the old tree is
    ///   kept.
    /// - if nothing matches, the mismatch reason is recorded on the existing
    ///   types (except anonymous enums) and a new data type carrying the same
    ///   reason is created alongside them.
    ///
    /// A mismatch is a diagnostic, not an error.
    ///
    /// ## Errors
    ///
    /// - [`SymbolError::Lookup`] if `source_file` doesn't resolve
    /// - anything [`SymbolList::create_symbol`] returns
    pub fn create_data_type_if_unique(
        &mut self,
        node: Box<Node>,
        number: Option<TypeNumber>,
        name: &str,
        source_file: SourceFileHandle,
        group: &SymbolGroup,
    ) -> Result<DataTypeHandle>
    {
        self.require_source_file(source_file)?;

        let existing: Vec<DataTypeHandle> = self
            .data_types
            .handles_from_name(name)
            .into_iter()
            .filter(|&handle| {
                self.data_types
                    .symbol_from_handle(handle)
                    .is_some_and(|data_type| group.is_in_group(data_type.base()))
            })
            .collect();

        let journaling = self.open_checkpoints > 0;
        let mut first_reason: Option<CompareFailReason> = None;
        for &handle in &existing {
            let Some(data_type) = self.data_types.symbol_from_handle_mut(handle) else {
                continue;
            };

            let result = match data_type.type_tree() {
                Some(existing_node) => compare_nodes(existing_node, &node),
                None => CompareResult::MatchesFavourRhs,
            };
            if let CompareResult::Differs(reason) = result {
                first_reason.get_or_insert(reason);
                continue;
            }

            let mut snapshot = journaling.then(|| DataTypeSnapshot::of(data_type));
            match result {
                CompareResult::MatchesFavourRhs => {
                    let generation = data_type.generation();
                    let old = data_type.base_mut().replace_type(Some(node));
                    if let Some(snapshot) = &mut snapshot {
                        snapshot.type_tree = Some((old, generation));
                    }
                }
                CompareResult::MatchesConfused => {
                    debug!(name, "definitions resolve different type names, keeping the existing one");
                }
                _ => {}
            }
            if !data_type.files.contains(&source_file) {
                data_type.files.push(source_file);
            }
            self.journal.extend(snapshot);
            self.record_type_number(source_file, number, handle);
            return Ok(handle);
        }

        let Some(reason) = first_reason else {
            return self.create_data_type(node, number, name, source_file, group);
        };

        warn!(name, %reason, "data type is defined differently in different translation units");
        for &handle in &existing {
            if let Some(data_type) = self.data_types.symbol_from_handle_mut(handle) {
                if !data_type.is_anonymous_enum() {
                    if journaling {
                        self.journal.push(DataTypeSnapshot::of(data_type));
                    }
                    data_type.compare_fail_reason = Some(reason);
                }
            }
        }

        let handle = self.create_data_type(node, number, name, source_file, group)?;
        if let Some(data_type) = self.data_types.symbol_from_handle_mut(handle) {
            data_type.compare_fail_reason = Some(reason);
        }
        Ok(handle)
    }

    /// Create a data type without looking for an existing one.
    ///
    /// ## Errors
    ///
    /// - [`SymbolError::Lookup`] if `source_file` doesn't resolve
    /// - anything [`SymbolList::create_symbol`] returns
    pub fn create_data_type(
        &mut self,
        node: Box<Node>,
        number: Option<TypeNumber>,
        name: &str,
        source_file: SourceFileHandle,
        group: &SymbolGroup,
    ) -> Result<DataTypeHandle>
    {
        self.require_source_file(source_file)?;

        let module = group.module.and_then(|module| self.modules.symbol_from_handle(module));
        let mut data_type = self.data_types.create_symbol(name, None, group.source, module)?;
        data_type.set_type(node);
        data_type.symbol_mut().files.push(source_file);
        let handle = data_type.handle();

        self.record_type_number(source_file, number, handle);
        Ok(handle)
    }

    /// Destroy a function together with its parameter and local variables.
    ///
    /// Returns `false` if the handle doesn't resolve.
    pub fn destroy_function(&mut self, handle: FunctionHandle) -> bool
    {
        let Some(function) = self.functions.symbol_from_handle(handle) else {
            return false;
        };
        let parameters = function.parameter_variables.clone().unwrap_or_default();
        let locals = function.local_variables.clone().unwrap_or_default();
        let source_file = function.source_file;

        for parameter in parameters {
            self.parameter_variables.destroy_symbol(parameter);
        }
        for local in locals {
            self.local_variables.destroy_symbol(local);
        }
        if let Some(file) = self.source_files.symbol_from_handle_mut(source_file) {
            file.functions.retain(|&function| function != handle);
        }
        self.functions.destroy_symbol(handle)
    }

    /// Set a function's parameter list and point each parameter back at the
    /// function. Parameters dropped from the list lose their back-reference.
    ///
    /// Returns `false` if the function doesn't resolve.
    pub fn set_function_parameters(
        &mut self,
        function: FunctionHandle,
        parameters: Option<Vec<ParameterVariableHandle>>,
    ) -> bool
    {
        let Some(symbol) = self.functions.symbol_from_handle_mut(function) else {
            return false;
        };
        let old = std::mem::replace(&mut symbol.parameter_variables, parameters.clone());

        for handle in old.into_iter().flatten() {
            if let Some(parameter) = self.parameter_variables.symbol_from_handle_mut(handle) {
                if parameter.function == function {
                    parameter.function = FunctionHandle::invalid();
                }
            }
        }
        for handle in parameters.into_iter().flatten() {
            if let Some(parameter) = self.parameter_variables.symbol_from_handle_mut(handle) {
                parameter.function = function;
            }
        }
        true
    }

    /// Set a function's local variable list, keeping back-references in step.
    ///
    /// Returns `false` if the function doesn't resolve.
    pub fn set_function_locals(&mut self, function: FunctionHandle, locals: Option<Vec<LocalVariableHandle>>) -> bool
    {
        let Some(symbol) = self.functions.symbol_from_handle_mut(function) else {
            return false;
        };
        let old = std::mem::replace(&mut symbol.local_variables, locals.clone());

        for handle in old.into_iter().flatten() {
            if let Some(local) = self.local_variables.symbol_from_handle_mut(handle) {
                if local.function == function {
                    local.function = FunctionHandle::invalid();
                }
            }
        }
        for handle in locals.into_iter().flatten() {
            if let Some(local) = self.local_variables.symbol_from_handle_mut(handle) {
                local.function = function;
            }
        }
        true
    }

    /// Set the functions defined in a source file, keeping each function's
    /// source file in step.
    ///
    /// Returns `false` if the source file doesn't resolve.
    pub fn set_source_file_functions(&mut self, source_file: SourceFileHandle, functions: Vec<FunctionHandle>) -> bool
    {
        let Some(file) = self.source_files.symbol_from_handle_mut(source_file) else {
            return false;
        };
        let old = std::mem::replace(&mut file.functions, functions.clone());

        for handle in old {
            if let Some(function) = self.functions.symbol_from_handle_mut(handle) {
                if function.source_file == source_file {
                    function.source_file = SourceFileHandle::invalid();
                }
            }
        }
        for handle in functions {
            if let Some(function) = self.functions.symbol_from_handle_mut(handle) {
                function.source_file = source_file;
            }
        }
        true
    }

    /// Set the global variables defined in a source file, keeping each
    /// variable's source file in step.
    ///
    /// Returns `false` if the source file doesn't resolve.
    pub fn set_source_file_global_variables(
        &mut self,
        source_file: SourceFileHandle,
        global_variables: Vec<GlobalVariableHandle>,
    ) -> bool
    {
        let Some(file) = self.source_files.symbol_from_handle_mut(source_file) else {
            return false;
        };
        let old = std::mem::replace(&mut file.global_variables, global_variables.clone());

        for handle in old {
            if let Some(variable) = self.global_variables.symbol_from_handle_mut(handle) {
                if variable.source_file == source_file {
                    variable.source_file = SourceFileHandle::invalid();
                }
            }
        }
        for handle in global_variables {
            if let Some(variable) = self.global_variables.symbol_from_handle_mut(handle) {
                variable.source_file = source_file;
            }
        }
        true
    }

    /// Recompute whether at least half of a source file's functions still
    /// match their original hash, store it on the file and return it.
    pub fn check_functions_match(&mut self, source_file: SourceFileHandle) -> Option<bool>
    {
        let file = self.source_files.symbol_from_handle(source_file)?;
        let functions = self.functions.symbols_from_handles(&file.functions);
        let matching = functions
            .iter()
            .filter(|function| function.original_hash == function.current_hash)
            .count();
        let functions_match = matching * 2 >= functions.len();

        self.source_files.symbol_from_handle_mut(source_file)?.functions_match = functions_match;
        Some(functions_match)
    }

    /// Drop destroyed source files from every data type's file list.
    fn prune_data_type_files(&mut self)
    {
        let source_files = &self.source_files;
        for data_type in self.data_types.iter_mut() {
            let before = data_type.files.len();
            data_type.files.retain(|&file| source_files.contains(file));
            if data_type.files.len() != before {
                data_type.only_defined_in_single_translation_unit = data_type.files.len() == 1;
            }
        }
    }

    fn close_checkpoint(&mut self)
    {
        self.open_checkpoints = self.open_checkpoints.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }

    fn require_source_file(&self, source_file: SourceFileHandle) -> Result<()>
    {
        if self.source_files.contains(source_file) {
            Ok(())
        } else {
            Err(SymbolError::Lookup(format!("source file {source_file:?} does not exist")))
        }
    }

    fn record_type_number(&mut self, source_file: SourceFileHandle, number: Option<TypeNumber>, handle: DataTypeHandle)
    {
        if let (Some(number), Some(file)) = (number, self.source_files.symbol_from_handle_mut(source_file)) {
            file.type_numbers.insert(number, handle);
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::ast::{BuiltInClass, NodeDescriptor};

    fn database_with_file() -> (SymbolDatabase, SymbolGroup, SourceFileHandle)
    {
        let mut database = SymbolDatabase::new();
        let source = database.get_symbol_source("Test").unwrap();
        let file = database
            .source_files
            .create_symbol("a.c", None, source, None)
            .unwrap()
            .handle();
        (database, SymbolGroup::new(source), file)
    }

    #[test]
    fn test_get_symbol_source_is_idempotent()
    {
        let mut database = SymbolDatabase::new();
        let first = database.get_symbol_source("Symbol Table").unwrap();
        let second = database.get_symbol_source("Symbol Table").unwrap();
        assert_eq!(first, second);
        assert_eq!(database.symbol_sources.len(), 1);
    }

    #[test]
    fn test_anonymous_enum_mismatch_is_not_recorded_on_existing()
    {
        let (mut database, group, file) = database_with_file();
        let enumeration = |constants: Vec<(i32, String)>| Box::new(Node::new(NodeDescriptor::Enum { constants }));

        let first = database
            .create_data_type_if_unique(enumeration(vec![(0, "A".into())]), None, "", file, &group)
            .unwrap();
        let second = database
            .create_data_type_if_unique(enumeration(vec![(0, "B".into())]), None, "", file, &group)
            .unwrap();

        assert_ne!(first, second);
        assert!(database.data_types.symbol_from_handle(first).unwrap().compare_fail_reason.is_none());
        assert_eq!(
            database.data_types.symbol_from_handle(second).unwrap().compare_fail_reason,
            Some(CompareFailReason::EnumConstants)
        );
    }

    #[test]
    fn test_type_number_is_recorded()
    {
        let (mut database, group, file) = database_with_file();
        let number = TypeNumber { file: 0, index: 12 };
        let handle = database
            .create_data_type_if_unique(Box::new(Node::builtin(BuiltInClass::Signed32)), Some(number), "int", file, &group)
            .unwrap();
        assert_eq!(
            database.source_files.symbol_from_handle(file).unwrap().type_numbers.get(&number),
            Some(&handle)
        );
    }

    #[test]
    fn test_data_type_needs_live_source_file()
    {
        let (mut database, group, _) = database_with_file();
        let result = database.create_data_type_if_unique(
            Box::new(Node::builtin(BuiltInClass::Void)),
            None,
            "void",
            SourceFileHandle::new(99),
            &group,
        );
        assert!(matches!(result, Err(SymbolError::Lookup(_))));
    }

    #[test]
    fn test_destroy_function_cascades()
    {
        let (mut database, group, file) = database_with_file();
        let function = database
            .functions
            .create_symbol("f", Some(Address::new(0x1000)), group.source, None)
            .unwrap()
            .handle();
        let parameter = database
            .parameter_variables
            .create_symbol("x", None, group.source, None)
            .unwrap()
            .handle();
        let local = database
            .local_variables
            .create_symbol("y", None, group.source, None)
            .unwrap()
            .handle();
        assert!(database.set_function_parameters(function, Some(vec![parameter])));
        assert!(database.set_function_locals(function, Some(vec![local])));
        assert!(database.set_source_file_functions(file, vec![function]));
        assert_eq!(database.parameter_variables.symbol_from_handle(parameter).unwrap().function(), function);

        assert!(database.destroy_function(function));
        assert!(database.parameter_variables.is_empty());
        assert!(database.local_variables.is_empty());
        assert!(database.source_files.symbol_from_handle(file).unwrap().functions().is_empty());
        assert!(!database.destroy_function(function));
    }

    #[test]
    fn test_check_functions_match()
    {
        let (mut database, group, file) = database_with_file();
        let mut functions = Vec::new();
        for (i, current_hash) in [1, 1, 2].into_iter().enumerate() {
            let mut function = database
                .functions
                .create_symbol(format!("f{i}"), None, group.source, None)
                .unwrap();
            function.original_hash = 1;
            function.current_hash = current_hash;
            functions.push(function.handle());
        }
        database.set_source_file_functions(file, functions);
        assert_eq!(database.check_functions_match(file), Some(true));

        let first = database.source_files.symbol_from_handle(file).unwrap().functions()[0];
        database.functions.symbol_mut(first).unwrap().current_hash = 3;
        assert_eq!(database.check_functions_match(file), Some(false));
        assert!(!database.source_files.symbol_from_handle(file).unwrap().functions_match());
    }

    #[test]
    fn test_confused_match_keeps_existing_tree()
    {
        let (mut database, group, file) = database_with_file();
        let field = |name: &str, handle: Option<u32>| {
            Node::new(NodeDescriptor::TypeName {
                data_type: handle.map(SymbolHandle::new),
                unresolved_name: name.to_string(),
            })
            .with_name(name.to_lowercase())
        };
        let lhs = Node::struct_with_fields(vec![field("A", Some(1)), field("B", None)]);
        let rhs = Node::struct_with_fields(vec![field("A", None), field("B", Some(2))]);

        let first = database
            .create_data_type_if_unique(Box::new(lhs.clone()), None, "S", file, &group)
            .unwrap();
        let generation = database.data_types.symbol_from_handle(first).unwrap().generation();
        let second = database
            .create_data_type_if_unique(Box::new(rhs), None, "S", file, &group)
            .unwrap();

        assert_eq!(first, second);
        let data_type = database.data_types.symbol_from_handle(first).unwrap();
        assert_eq!(data_type.type_tree(), Some(&lhs));
        assert_eq!(data_type.generation(), generation);
        assert!(!data_type.not_identically_defined());
    }

    #[test]
    fn test_checkpoint_journal_is_dropped_once_closed()
    {
        let (mut database, group, file) = database_with_file();
        let int = || Box::new(Node::builtin(BuiltInClass::Signed32));
        database.create_data_type_if_unique(int(), None, "int", file, &group).unwrap();

        database.create_data_type_if_unique(int(), None, "int", file, &group).unwrap();
        assert!(database.journal.is_empty());

        let outer = database.checkpoint();
        let inner = database.checkpoint();
        database.create_data_type_if_unique(int(), None, "int", file, &group).unwrap();
        database.commit(inner);
        assert_eq!(database.journal.len(), 1);
        database.commit(outer);
        assert!(database.journal.is_empty());
        assert_eq!(database.open_checkpoints, 0);
    }

    #[test]
    fn test_first_symbol_from_starting_address_prefers_earlier_kinds()
    {
        let (mut database, group, _) = database_with_file();
        let address = Some(Address::new(0x2000));
        database.labels.create_symbol("label", address, group.source, None).unwrap();
        let function = database
            .functions
            .create_symbol("function", address, group.source, None)
            .unwrap()
            .handle();

        let found = database.first_symbol_from_starting_address(Address::new(0x2000)).unwrap();
        assert_eq!(found, MultiSymbolHandle::from_handle(function));
        assert_eq!(found.lookup_symbol(&database).map(Symbol::name), Some("function"));
    }
}
