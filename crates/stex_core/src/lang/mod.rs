//! stex vocabulary registries.
//!
//! Callers work with decoded, typed values (`MacroFamily`, `ModuleEnvId`, `ImportMacroId`) rather than
//! comparing macro spellings at every call site.
//!
//! ## Notes
//! - Registries are **pure**: no syntax tree types, no IO, no side effects.
//! - Spellings are matched case-sensitively, because `Defi` and `defi` mean different things.
//!
//! ## Examples
//! ```rust
//! use stex_core::lang::environments::{self, ModuleEnvId};
//!
//! assert_eq!(environments::module_env("mhmodnl"), Some(ModuleEnvId::Mhmodnl));
//! assert!(environments::is_math_environment("align*"));
//! ```

pub mod environments;
pub mod imports;
pub mod macros;
