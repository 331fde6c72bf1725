//! stexls analysis frontend
//!
//! This module contains all analysis stages:
//! - `lexer`, `parser`, `ast`: tokenization and tree building (from the `stex_syntax` crate)
//! - `compiler`: per-file extraction of modules, symbols, references and imports
//! - `linker`: cross-file resolution, closures and cycle detection
//! - `cache`: fingerprints, the unit arena and the on-disk blob store
//! - `workspace`: the incremental driver tying the stages together
//! - `advisory`: optional hints from an external term tagger

// Syntax components are provided by the shared stex_syntax crate.
pub use stex_syntax::{ast, lexer, parser};

pub mod advisory;
pub mod cache;
pub mod compiler;
pub mod diagnostics;
pub mod linker;
pub mod location;
pub mod source;
pub mod symbols;
pub mod workspace;
