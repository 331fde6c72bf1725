//! Error-tolerant parser for stex documents
//!
//! Converts a token stream into a concrete syntax tree. Parsing never aborts: unbalanced groups,
//! mismatched or unclosed environments and stray closers are reported as diagnostics and the tree is
//! repaired locally.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use stex_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("\\begin{modsig}{x}\\symi{a}\\end{modsig}");
//! let output = parser::parse(&tokens);
//! assert!(output.diagnostics.is_empty());
//! assert_eq!(output.root.children.len(), 1);
//! ```

use std::collections::HashSet;

use crate::ast::*;
use crate::diagnostics::{Diagnostic, syntax};
use crate::lexer::{Token, TokenKind};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/body.rs");
include!("parser/args.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
