//! Provide the canonical stex vocabulary shared by the syntax frontend and the compiler.
//!
//! The stex dialect layers module/symbol semantics over LaTeX macros. Which macro names mean what
//! (definition families, reference families, import macros, module environments, opaque math
//! environments) is decided here, once, so the lexer and the compiler never disagree.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no syntax tree types.
//! - Macro families are decoded into small tagged values (e.g. [`lang::macros::DefinitionVariant`])
//!   instead of being matched as dozens of separate spellings.
//!
//! ## Examples
//! ```rust
//! use stex_core::lang::macros::{self, MacroFamily};
//!
//! let Some(MacroFamily::Definition(v)) = macros::decode("Defis") else { panic!() };
//! assert_eq!(v.arity, 1);
//! assert!(v.capitalize && v.pluralize);
//! ```

#![forbid(unsafe_code)]

pub mod lang;
pub mod roman;
