//! # Analysis
//!
//! Populates a [`SymbolDatabase`] from a decoded mdebug symbol table.
//!
//! An import runs in two phases:
//!
//! 1. **Decode.** Every requested file descriptor is decoded up front. A
//!    [`FormatError`](crate::mdebug::FormatError) here returns before the
//!    database has been touched.
//! 2. **Populate.** One [`SourceFile`](crate::database::SourceFile) is created
//!    per file, then the file's symbols are walked in order. If anything
//!    fails, every symbol created by this import is destroyed again before the
//!    error is returned.
//!
//! Type encodings are not parsed here. Typedef and stabs symbols, along with
//! functions and variables, are offered to a [`TypeTreeProducer`] supplied by
//! the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mipsym_core::analysis::{analyse, AnalysisOptions, NoTypeTrees};
//! use mipsym_core::database::SymbolDatabase;
//! use mipsym_core::mdebug::SymbolTableReader;
//!
//! # fn example(image: &[u8], section_offset: u64) -> mipsym_core::error::Result<()> {
//! let reader = SymbolTableReader::init(image, section_offset)?;
//! let mut database = SymbolDatabase::new();
//! analyse(&mut database, &reader, &AnalysisOptions::default(), &mut NoTypeTrees)?;
//! println!("{} functions", database.functions.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::ops::BitOr;

use tracing::{debug, info, info_span, trace, warn};

use crate::ast::{Node, StorageClass};
use crate::database::{
    FunctionHandle, GlobalStorage, GlobalStorageLocation, GlobalVariableHandle, LocalVariableHandle,
    ParameterVariableHandle, RegisterStorage, SourceFileHandle, StackStorage, SymbolDatabase, SymbolGroup,
    SymbolKind, SymbolSourceHandle, TypeNumber, VariableStorage,
};
use crate::demangle::{strip_parameters, Demangler};
use crate::error::Result;
use crate::mdebug::{File, Symbol, SymbolClass, SymbolTableReader, SymbolType};
use crate::types::Address;

/// Name of the symbol source every mdebug import records its symbols under.
pub const SYMBOL_TABLE_SOURCE_NAME: &str = "Symbol Table";

/// Options controlling an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImporterFlags(u32);

impl ImporterFlags
{
    pub const NONE: ImporterFlags = ImporterFlags(0);
    /// Keep parameter lists in demangled function names.
    pub const DEMANGLE_PARAMETERS: ImporterFlags = ImporterFlags(1 << 0);
    /// Create labels and global variables even if an identical one from the
    /// same symbol source already exists.
    pub const DONT_DEDUPLICATE_SYMBOLS: ImporterFlags = ImporterFlags(1 << 1);
    /// Create a new data type for every definition instead of merging
    /// structurally identical ones.
    pub const DONT_DEDUPLICATE_TYPES: ImporterFlags = ImporterFlags(1 << 2);
    /// Treat type tree errors as fatal instead of skipping the symbol.
    pub const STRICT_PARSING: ImporterFlags = ImporterFlags(1 << 3);

    #[must_use]
    pub const fn bits(self) -> u32
    {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: ImporterFlags) -> bool
    {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ImporterFlags
{
    type Output = ImporterFlags;

    fn bitor(self, rhs: ImporterFlags) -> ImporterFlags
    {
        ImporterFlags(self.0 | rhs.0)
    }
}

/// Everything [`analyse`] needs besides the reader and the database.
#[derive(Clone, Copy, Default)]
pub struct AnalysisOptions<'a>
{
    pub flags: ImporterFlags,
    /// Only import this file descriptor.
    pub file_index: Option<usize>,
    pub demangler: Option<&'a Demangler>,
}

impl fmt::Debug for AnalysisOptions<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("AnalysisOptions")
            .field("flags", &self.flags)
            .field("file_index", &self.file_index)
            .field("demangler", &self.demangler.is_some())
            .finish()
    }
}

/// A data type produced from a typedef or stabs symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedType
{
    pub name: String,
    pub number: Option<TypeNumber>,
    pub node: Box<Node>,
}

/// Builds type trees from the type encodings attached to symbols.
///
/// Every method defaults to producing nothing, so an implementation only
/// needs to handle what it understands.
pub trait TypeTreeProducer
{
    /// A data type described by a typedef or stabs symbol, if any.
    ///
    /// ## Errors
    ///
    /// Any error describing why the encoding couldn't be parsed.
    fn data_type(&mut self, _file: &File, _symbol: &Symbol) -> Result<Option<ProducedType>>
    {
        Ok(None)
    }

    /// The return type of a procedure.
    ///
    /// ## Errors
    ///
    /// Any error describing why the encoding couldn't be parsed.
    fn function_type(&mut self, _file: &File, _symbol: &Symbol) -> Result<Option<Box<Node>>>
    {
        Ok(None)
    }

    /// The type of a global, local or parameter variable.
    ///
    /// ## Errors
    ///
    /// Any error describing why the encoding couldn't be parsed.
    fn variable_type(&mut self, _file: &File, _symbol: &Symbol) -> Result<Option<Box<Node>>>
    {
        Ok(None)
    }
}

/// A producer that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypeTrees;

impl TypeTreeProducer for NoTypeTrees {}

/// Import a symbol table into `database`.
///
/// Every call creates a new `"Symbol Table"` symbol source and records its
/// symbols under it, so one import can later be torn down with
/// [`SymbolDatabase::destroy_symbols_from_sources`] without touching the
/// others. Symbols and data types are only deduplicated within one import.
///
/// ## Errors
///
/// - [`SymbolError::Format`](crate::error::SymbolError::Format) if any
///   requested file fails to decode. The database is left untouched.
/// - Any error raised while populating the database, including type tree
///   errors under [`ImporterFlags::STRICT_PARSING`]. Every symbol created by
///   this call is destroyed again first.
pub fn analyse(
    database: &mut SymbolDatabase,
    reader: &SymbolTableReader<'_>,
    options: &AnalysisOptions<'_>,
    producer: &mut dyn TypeTreeProducer,
) -> Result<SymbolSourceHandle>
{
    let span = info_span!("analyse", file_index = ?options.file_index);
    let _guard = span.enter();

    let files = match options.file_index {
        Some(index) => vec![reader.parse_file(index)?],
        None => reader.parse_files()?,
    };
    debug!(files = files.len(), "decoded file descriptors");

    let checkpoint = database.checkpoint();
    let before = database.symbol_count();
    match populate(database, &files, options, producer) {
        Ok(source) => {
            database.commit(checkpoint);
            info!(
                files = files.len(),
                created = database.symbol_count().saturating_sub(before),
                functions = database.functions.len(),
                global_variables = database.global_variables.len(),
                data_types = database.data_types.len(),
                "imported symbol table"
            );
            Ok(source)
        }
        Err(error) => {
            let destroyed = database.rollback(checkpoint);
            warn!(%error, destroyed, "symbol table import failed, rolled back");
            Err(error)
        }
    }
}

fn populate(
    database: &mut SymbolDatabase,
    files: &[File],
    options: &AnalysisOptions<'_>,
    producer: &mut dyn TypeTreeProducer,
) -> Result<SymbolSourceHandle>
{
    let source = database
        .symbol_sources
        .create_symbol(SYMBOL_TABLE_SOURCE_NAME, None, SymbolSourceHandle::invalid(), None)?
        .handle();
    let group = SymbolGroup::new(source);

    for file in files {
        let mut importer = FileImporter {
            database: &mut *database,
            file,
            group,
            options,
            producer: &mut *producer,
            source_file: SourceFileHandle::invalid(),
            functions: Vec::new(),
            global_variables: Vec::new(),
            current_function: None,
        };
        importer.run()?;
    }

    for data_type in database.data_types.iter_mut() {
        if group.is_in_group(data_type.base()) {
            data_type.only_defined_in_single_translation_unit = data_type.files.len() == 1;
        }
    }

    Ok(source)
}

/// The procedure whose symbols are currently being read.
struct CurrentFunction
{
    handle: FunctionHandle,
    parameters: Vec<ParameterVariableHandle>,
    locals: Vec<LocalVariableHandle>,
    /// Open `BLOCK`s that haven't seen their `END` yet.
    block_depth: u32,
}

struct FileImporter<'d, 'f, 'o, 'a, 'p>
{
    database: &'d mut SymbolDatabase,
    file: &'f File,
    group: SymbolGroup,
    options: &'o AnalysisOptions<'a>,
    producer: &'p mut dyn TypeTreeProducer,
    source_file: SourceFileHandle,
    functions: Vec<FunctionHandle>,
    global_variables: Vec<GlobalVariableHandle>,
    current_function: Option<CurrentFunction>,
}

impl FileImporter<'_, '_, '_, '_, '_>
{
    fn run(&mut self) -> Result<()>
    {
        let file = self.file;
        let mut source_file = self.database.source_files.create_symbol(
            file.full_path.clone(),
            Some(Address::new(file.descriptor.address)),
            self.group.source,
            None,
        )?;
        source_file.working_dir = file.base_path.clone().unwrap_or_default();
        source_file.command_line_path = file.raw_path.clone();
        source_file.language = file.detected_language;
        self.source_file = source_file.handle();

        trace!(path = %file.full_path, symbols = file.symbols.len(), "importing file");

        for symbol in &file.symbols {
            self.import_symbol(symbol)?;
        }
        self.finish_function();

        let functions = std::mem::take(&mut self.functions);
        let global_variables = std::mem::take(&mut self.global_variables);
        self.database.set_source_file_functions(self.source_file, functions);
        self.database
            .set_source_file_global_variables(self.source_file, global_variables);
        Ok(())
    }

    fn import_symbol(&mut self, symbol: &Symbol) -> Result<()>
    {
        if symbol.is_stabs() {
            return self.import_data_type(symbol);
        }

        let in_function = self.current_function.is_some();
        match symbol.storage_type {
            SymbolType::Proc | SymbolType::StaticProc if symbol.storage_class == SymbolClass::Text => {
                self.import_function(symbol)
            }
            SymbolType::Block if in_function => {
                if let Some(function) = &mut self.current_function {
                    function.block_depth += 1;
                }
                Ok(())
            }
            SymbolType::End if in_function => {
                self.end_scope(symbol);
                Ok(())
            }
            SymbolType::Param if in_function => self.import_parameter(symbol),
            SymbolType::Local | SymbolType::Static if in_function => self.import_local(symbol),
            SymbolType::Global | SymbolType::Static => self.import_global(symbol),
            SymbolType::Label if symbol.storage_class == SymbolClass::Text => self.import_label(symbol),
            SymbolType::Typedef => self.import_data_type(symbol),
            _ => {
                trace!(name = %symbol.string, st = %symbol.storage_type, sc = %symbol.storage_class, "skipping symbol");
                Ok(())
            }
        }
    }

    fn import_function(&mut self, symbol: &Symbol) -> Result<()>
    {
        self.finish_function();

        let return_type = tolerate(self.options.flags, self.producer.function_type(self.file, symbol), symbol)?;
        let mut function = self.database.functions.create_demangled_symbol(
            &symbol.string,
            Some(address_of(symbol)),
            self.group.source,
            None,
            self.options.demangler,
        )?;
        function.storage_class = if symbol.storage_type == SymbolType::StaticProc {
            StorageClass::Static
        } else {
            StorageClass::None
        };
        if let Some(return_type) = return_type {
            function.set_type(return_type);
        }
        let demangled = !function.mangled_name.is_empty();
        let handle = function.handle();

        if demangled && !self.options.flags.contains(ImporterFlags::DEMANGLE_PARAMETERS) {
            self.strip_function_parameters(handle);
        }

        self.current_function = Some(CurrentFunction {
            handle,
            parameters: Vec::new(),
            locals: Vec::new(),
            block_depth: 0,
        });
        Ok(())
    }

    fn strip_function_parameters(&mut self, handle: FunctionHandle)
    {
        let Some(function) = self.database.functions.symbol_from_handle(handle) else {
            return;
        };
        let stripped = strip_parameters(function.name());
        if stripped.len() != function.name().len() {
            let stripped = stripped.to_string();
            self.database.functions.rename_symbol(handle, stripped);
        }
    }

    /// An `END` closes the innermost open block, or the procedure itself. For
    /// the procedure, the value is its size in bytes.
    fn end_scope(&mut self, symbol: &Symbol)
    {
        let Some(current) = &mut self.current_function else {
            return;
        };
        if current.block_depth > 0 {
            current.block_depth -= 1;
            return;
        }

        self.database
            .functions
            .set_size(current.handle, u32::try_from(symbol.value).unwrap_or(0));
        self.finish_function();
    }

    fn finish_function(&mut self)
    {
        let Some(current) = self.current_function.take() else {
            return;
        };
        self.database
            .set_function_parameters(current.handle, Some(current.parameters));
        self.database.set_function_locals(current.handle, Some(current.locals));
        self.functions.push(current.handle);
    }

    fn import_parameter(&mut self, symbol: &Symbol) -> Result<()>
    {
        let node = tolerate(self.options.flags, self.producer.variable_type(self.file, symbol), symbol)?;
        let mut parameter =
            self.database
                .parameter_variables
                .create_symbol(symbol.string.clone(), None, self.group.source, None)?;
        parameter.storage = variable_storage(symbol);
        if let Some(node) = node {
            parameter.set_type(node);
        }
        let handle = parameter.handle();

        if let Some(current) = &mut self.current_function {
            current.parameters.push(handle);
        }
        Ok(())
    }

    fn import_local(&mut self, symbol: &Symbol) -> Result<()>
    {
        let node = tolerate(self.options.flags, self.producer.variable_type(self.file, symbol), symbol)?;
        let storage = if symbol.storage_type == SymbolType::Static {
            VariableStorage::Global(GlobalStorage {
                location: GlobalStorageLocation::from_symbol_class(symbol.storage_class).unwrap_or_default(),
            })
        } else {
            variable_storage(symbol)
        };
        let address = matches!(storage, VariableStorage::Global(_)).then(|| address_of(symbol));

        let mut local = self.database.local_variables.create_symbol(
            symbol.string.clone(),
            address,
            self.group.source,
            None,
        )?;
        local.storage = storage;
        if let Some(node) = node {
            local.set_type(node);
        }
        let handle = local.handle();

        if let Some(current) = &mut self.current_function {
            current.locals.push(handle);
        }
        Ok(())
    }

    fn import_global(&mut self, symbol: &Symbol) -> Result<()>
    {
        let address = address_of(symbol);
        if !self.options.flags.contains(ImporterFlags::DONT_DEDUPLICATE_SYMBOLS) {
            let globals = &self.database.global_variables;
            let existing = globals.handles_from_starting_address(address).into_iter().find(|&handle| {
                globals.symbol_from_handle(handle).is_some_and(|global| {
                    self.group.is_in_group(global.base())
                        && (global.name() == symbol.string || global.mangled_name == symbol.string)
                })
            });
            if let Some(existing) = existing {
                trace!(name = %symbol.string, "reusing existing global variable");
                self.global_variables.push(existing);
                return Ok(());
            }
        }

        let node = tolerate(self.options.flags, self.producer.variable_type(self.file, symbol), symbol)?;
        let mut global = self.database.global_variables.create_demangled_symbol(
            &symbol.string,
            Some(address),
            self.group.source,
            None,
            self.options.demangler,
        )?;
        global.storage = GlobalStorage {
            location: GlobalStorageLocation::from_symbol_class(symbol.storage_class).unwrap_or_default(),
        };
        global.storage_class = if symbol.storage_type == SymbolType::Static {
            StorageClass::Static
        } else {
            StorageClass::None
        };
        if let Some(node) = node {
            global.set_type(node);
        }
        self.global_variables.push(global.handle());
        Ok(())
    }

    fn import_label(&mut self, symbol: &Symbol) -> Result<()>
    {
        let address = address_of(symbol);
        if !self.options.flags.contains(ImporterFlags::DONT_DEDUPLICATE_SYMBOLS) {
            let labels = &self.database.labels;
            let duplicate = labels.handles_from_starting_address(address).into_iter().any(|handle| {
                labels
                    .symbol_from_handle(handle)
                    .is_some_and(|label| self.group.is_in_group(label.base()) && label.name() == symbol.string)
            });
            if duplicate {
                return Ok(());
            }
        }

        self.database
            .labels
            .create_symbol(symbol.string.clone(), Some(address), self.group.source, None)?;
        Ok(())
    }

    fn import_data_type(&mut self, symbol: &Symbol) -> Result<()>
    {
        let Some(produced) = tolerate(self.options.flags, self.producer.data_type(self.file, symbol), symbol)? else {
            return Ok(());
        };

        if self.options.flags.contains(ImporterFlags::DONT_DEDUPLICATE_TYPES) {
            self.database.create_data_type(
                produced.node,
                produced.number,
                &produced.name,
                self.source_file,
                &self.group,
            )?;
        } else {
            self.database.create_data_type_if_unique(
                produced.node,
                produced.number,
                &produced.name,
                self.source_file,
                &self.group,
            )?;
        }
        Ok(())
    }
}

/// Pass producer errors through under strict parsing, otherwise log them and
/// carry on without a type.
fn tolerate<T>(flags: ImporterFlags, result: Result<Option<T>>, symbol: &Symbol) -> Result<Option<T>>
{
    match result {
        Ok(value) => Ok(value),
        Err(error) if flags.contains(ImporterFlags::STRICT_PARSING) => Err(error),
        Err(error) => {
            warn!(name = %symbol.string, %error, "ignoring unparsable type");
            Ok(None)
        }
    }
}

#[allow(clippy::cast_sign_loss)]
fn address_of(symbol: &Symbol) -> Address
{
    Address::new(symbol.value as u32)
}

/// Where a parameter or non-static local lives, from its storage class.
/// `ABS` here means an offset from the frame, not an absolute address.
fn variable_storage(symbol: &Symbol) -> VariableStorage
{
    match symbol.storage_class {
        SymbolClass::Register | SymbolClass::VarRegister => VariableStorage::Register(RegisterStorage {
            dbx_register_number: symbol.value,
            is_by_reference: symbol.storage_class == SymbolClass::VarRegister,
        }),
        class @ (SymbolClass::Data
        | SymbolClass::Bss
        | SymbolClass::SData
        | SymbolClass::SBss
        | SymbolClass::RData
        | SymbolClass::Common
        | SymbolClass::SCommon) => VariableStorage::Global(GlobalStorage {
            location: GlobalStorageLocation::from_symbol_class(class).unwrap_or_default(),
        }),
        _ => VariableStorage::Stack(StackStorage {
            stack_pointer_offset: symbol.value,
        }),
    }
}
