//! Import macro vocabulary.
//!
//! Six macros create import edges. They differ along two axes: whether the import is re-exported to
//! transitive importers, and which locator arguments they understand.
//!
//! ## Examples
//! ```rust
//! use stex_core::lang::imports::{self, ImportMacroId, LocatorStyle};
//!
//! let id = imports::from_str("guse").unwrap();
//! assert_eq!(id, ImportMacroId::Guse);
//! assert!(!imports::exports(id));
//! assert_eq!(imports::locator_style(id), LocatorStyle::Repository);
//! ```

/// Stable identifier for an import macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportMacroId {
    Gimport,
    Guse,
    ImportMhModule,
    UseMhModule,
    ImportModule,
    UseModule,
}

/// How an import macro spells its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorStyle {
    /// `\gimport[repository]{module}`: positional repository.
    Repository,
    /// `\importmhmodule[mhrepos=..,dir=..,path=..,load=..]{module}`: keyed, defaults to the current
    /// source directory.
    MathHub,
    /// `\importmodule[load=..]{module}`: keyed, defaults to the current file.
    Module,
}

/// Metadata for an import macro.
#[derive(Debug, Clone, Copy)]
pub struct ImportMacroInfo {
    pub id: ImportMacroId,
    pub canonical: &'static str,
    /// Whether importers of the importing module see the target too.
    pub exports: bool,
    pub style: LocatorStyle,
    /// Whether the macro may appear inside a language-bound module.
    pub allowed_in_bindings: bool,
}

/// Registry of all import macros.
pub const IMPORT_MACROS: &[ImportMacroInfo] = &[
    info(ImportMacroId::Gimport, "gimport", true, LocatorStyle::Repository, false),
    info(ImportMacroId::Guse, "guse", false, LocatorStyle::Repository, true),
    info(ImportMacroId::ImportMhModule, "importmhmodule", true, LocatorStyle::MathHub, true),
    info(ImportMacroId::UseMhModule, "usemhmodule", false, LocatorStyle::MathHub, true),
    info(ImportMacroId::ImportModule, "importmodule", true, LocatorStyle::Module, true),
    info(ImportMacroId::UseModule, "usemodule", false, LocatorStyle::Module, true),
];

/// Resolve an import macro spelling (optionally starred) to its identifier.
pub fn from_str(name: &str) -> Option<ImportMacroId> {
    let name = name.strip_suffix('*').unwrap_or(name);
    IMPORT_MACROS.iter().find(|m| m.canonical == name).map(|m| m.id)
}

/// Return the full metadata entry for an import macro.
pub fn info_for(id: ImportMacroId) -> &'static ImportMacroInfo {
    match id {
        ImportMacroId::Gimport => &IMPORT_MACROS[0],
        ImportMacroId::Guse => &IMPORT_MACROS[1],
        ImportMacroId::ImportMhModule => &IMPORT_MACROS[2],
        ImportMacroId::UseMhModule => &IMPORT_MACROS[3],
        ImportMacroId::ImportModule => &IMPORT_MACROS[4],
        ImportMacroId::UseModule => &IMPORT_MACROS[5],
    }
}

/// Return the canonical spelling for an import macro.
pub fn as_str(id: ImportMacroId) -> &'static str {
    info_for(id).canonical
}

/// Whether the import is re-exported.
pub fn exports(id: ImportMacroId) -> bool {
    info_for(id).exports
}

pub fn locator_style(id: ImportMacroId) -> LocatorStyle {
    info_for(id).style
}

const fn info(
    id: ImportMacroId,
    canonical: &'static str,
    exports: bool,
    style: LocatorStyle,
    allowed_in_bindings: bool,
) -> ImportMacroInfo {
    ImportMacroInfo {
        id,
        canonical,
        exports,
        style,
        allowed_in_bindings,
    }
}
