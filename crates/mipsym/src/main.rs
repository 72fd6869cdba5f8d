mod demangle;

use std::path::PathBuf;
use std::{fs, process};

use clap::Parser;
use mipsym_core::analysis::{analyse, AnalysisOptions, ImporterFlags, NoTypeTrees};
use mipsym_core::database::SymbolDatabase;
use mipsym_core::demangle::Demangler;
use mipsym_core::elf::find_mdebug_section;
use mipsym_core::mdebug::SymbolTableReader;
use mipsym_core::Result as SymbolResult;
use mipsym_utils::{debug, info, init_logging, init_logging_with_level, warn, LogFormat, LogLevel};

/// Recover functions, variables and data types from the mdebug symbol table
/// of a MIPS executable.
#[derive(Parser, Debug)]
#[command(name = "mipsym")]
#[command(version)]
#[command(about = "Import the mdebug symbol table of a MIPS executable and summarise it", long_about = None)]
struct Cli
{
    /// Path to the ELF executable
    path: PathBuf,
    /// Only import this file descriptor
    #[arg(long)]
    file_index: Option<usize>,
    /// Don't merge identical data types or reuse existing labels and globals
    #[arg(long, default_value_t = false)]
    no_dedup: bool,
    /// Abort the import on the first type encoding that can't be parsed
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Keep C++ function and global names mangled
    #[arg(long, default_value_t = false)]
    no_demangle: bool,
    /// Log level (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<LogLevel>,
}

fn main()
{
    let cli = Cli::parse();

    // Without --log-level, RUST_LOG and MIPSYM_LOG_FORMAT apply
    let guard = match cli.log_level {
        Some(level) => init_logging_with_level(level, LogFormat::Pretty),
        None => init_logging(),
    };
    let _guard = match guard {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> SymbolResult<()>
{
    let image = fs::read(&cli.path)?;
    let section_offset = find_mdebug_section(&image)?;
    let reader = SymbolTableReader::init(&image, section_offset)?;
    info!(
        path = %cli.path.display(),
        files = reader.file_count(),
        "Reading symbol table"
    );

    let mut flags = ImporterFlags::NONE;
    if cli.no_dedup {
        flags = flags | ImporterFlags::DONT_DEDUPLICATE_SYMBOLS | ImporterFlags::DONT_DEDUPLICATE_TYPES;
    }
    if cli.strict {
        flags = flags | ImporterFlags::STRICT_PARSING;
    }
    let demangler: &Demangler = &demangle::demangle_itanium;
    let options = AnalysisOptions {
        flags,
        file_index: cli.file_index,
        demangler: (!cli.no_demangle).then_some(demangler),
    };

    let mut database = SymbolDatabase::new();
    analyse(&mut database, &reader, &options, &mut NoTypeTrees)?;

    report(&database);
    Ok(())
}

fn report(database: &SymbolDatabase)
{
    for (descriptor, count) in database.symbol_counts() {
        info!(kind = %descriptor, count, "Symbols");
    }

    let conflicting = database
        .data_types
        .iter()
        .filter(|data_type| data_type.not_identically_defined())
        .count();
    for data_type in database.data_types.iter().filter(|data_type| data_type.not_identically_defined()) {
        if let Some(reason) = data_type.compare_fail_reason {
            debug!(name = data_type.name(), files = data_type.files().len(), %reason, "Conflicting definition");
        }
    }
    if conflicting > 0 {
        warn!(conflicting, "Some data types are defined differently in different translation units");
    }

    for file in &database.source_files {
        debug!(
            path = file.full_path(),
            language = %file.language,
            functions = file.functions().len(),
            globals = file.global_variables().len(),
            "Source file"
        );
    }
}
