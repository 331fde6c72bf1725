//! CLI module for stexls
//!
//! This module provides the command-line interface for the analyzer.
//!
//! ## Commands
//!
//! - `check <root>` - Analyze a corpus and report diagnostics
//! - `find <root> <file> <line> <column>` - Show the symbol at a position and its references
//! - `complete <root> <file> <partial>` - List completions for a partial reference
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::WorkspaceConfig;
use crate::frontend::diagnostics::Severity;
use crate::version::STEXLS_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Incremental analyzer for stex semantic markup
#[derive(Parser, Debug)]
#[command(name = "stexls")]
#[command(version = STEXLS_VERSION)]
#[command(about = "Incremental analyzer for stex semantic markup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Debug/development flags
    /// Tokenize only (debug)
    #[arg(long = "lex", value_name = "FILE")]
    pub lex_file: Option<PathBuf>,

    /// Parse only (debug)
    #[arg(long = "parse", value_name = "FILE", conflicts_with = "lex_file")]
    pub parse_file: Option<PathBuf>,
}

/// Options shared by every command that loads a corpus.
#[derive(clap::Args, Debug)]
pub struct CorpusArgs {
    /// Corpus root holding the repositories
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
    /// Directory for persisted compiled units
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,
    /// Worker threads (0 = one per core)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub jobs: usize,
    /// Name of each repository's document directory
    #[arg(long, value_name = "NAME", default_value = "source")]
    pub source_dir: String,
    /// Also analyze hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,
}

impl CorpusArgs {
    pub fn config(&self) -> WorkspaceConfig {
        let config = WorkspaceConfig::new(&self.root)
            .with_source_dir(&self.source_dir)
            .with_jobs(self.jobs)
            .with_ignore_hidden(!self.include_hidden);
        match &self.cache {
            Some(dir) => config.with_cache_dir(dir),
            None => config,
        }
    }
}

/// Lowest severity a command prints.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
    Hint,
}

impl Level {
    pub fn admits(self, severity: Severity) -> bool {
        let floor = match self {
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Hint => Severity::Hint,
        };
        severity <= floor
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a corpus and report diagnostics
    Check {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Lowest severity to print
        #[arg(long, value_enum, default_value_t = Level::Hint)]
        level: Level,
    },

    /// Show the symbol at a position and every reference to it
    Find {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Document path below the root
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// One-based line
        #[arg(value_name = "LINE")]
        line: u32,
        /// One-based column
        #[arg(value_name = "COLUMN")]
        column: u32,
    },

    /// List completions for a partial reference
    Complete {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Document path below the root
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// `module?prefix` or a bare prefix
        #[arg(value_name = "PARTIAL", default_value = "")]
        partial: String,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    // Handle debug flags first
    if let Some(file) = cli.lex_file {
        return commands::lex_file(&file);
    }
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file);
    }

    match cli.command {
        Some(Command::Check { corpus, level }) => commands::check(&corpus.config(), level),
        Some(Command::Find {
            corpus,
            file,
            line,
            column,
        }) => commands::find(&corpus.config(), &file, line, column),
        Some(Command::Complete { corpus, file, partial }) => commands::complete(&corpus.config(), &file, &partial),
        // No command and no debug flag - show help
        None => Err(CliError::failure("no command given; see `stexls --help`")),
    }
}

// ============================================================================
// Tests
// ============================================================================
