//! Shared syntax frontend for stex documents: lexer, parser, syntax tree, diagnostics.
//!
//! This crate is dependency-light and does no file I/O. It is reused by the per-file compiler, the
//! CLI debug dumps and the fuzz targets.
//!
//! ## Notes
//! - This crate is "syntax-only": it knows what an environment or a macro looks like, not what a
//!   module or a symbol is.
//! - Vocabulary identity (math environments, verbatim commands) comes from `stex_core::lang`.
//!
//! ## Examples
//! ```rust,no_run
//! use stex_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("\\begin{modsig}{x}\\symi{a}\\end{modsig}");
//! let output = parser::parse(&tokens);
//! assert!(output.diagnostics.is_empty());
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
