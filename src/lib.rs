#![forbid(unsafe_code)]
//! stexls: incremental analyzer for stex semantic markup
//!
//! stex documents declare modules of mathematical symbols, verbalize them per language and
//! reference them across files and repositories. This crate provides the analysis pipeline:
//! per-file compilation, cross-file linking with export visibility and cycle detection, an
//! incremental cache, and a query surface for editors and the `stexls` CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Diagnostics are data**: malformed documents never produce an `Err`. Only I/O and cache failures do.

pub mod cli;
pub mod config;
pub mod frontend;
pub mod query;
pub mod version;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::symbols;

pub use config::WorkspaceConfig;
pub use frontend::compiler::compile;
pub use frontend::linker::{LinkedGraph, link, relink};
pub use frontend::workspace::{CancellationToken, RunReport, SourceInput, Workspace, WorkspaceError};
pub use query::{completions_at, find_definition, find_references};
