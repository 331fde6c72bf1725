//! Compiled-unit data model
//!
//! Everything the per-file compiler extracts from one document: module declarations, symbols,
//! references and import edges. Identities are plain values (`FileId`, `ModuleId`, `SymbolId`,
//! `ReferenceId`), so units can be cached, shared through `Arc` and compared structurally.

use std::fmt;

use serde::{Deserialize, Serialize};
use stex_core::lang::environments::ModuleKind;

use crate::frontend::ast::{Body, Span};
use crate::frontend::cache::Fingerprint;
use crate::frontend::diagnostics::{Diagnostic, LineIndex};
use crate::frontend::location::{FileId, ModuleId};

// ============================================================================
// Symbols
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId {
    pub module: ModuleId,
    pub name: String,
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.module, self.name)
    }
}

/// Macro family that introduced a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolFamily {
    Symi,
    Symdef,
    Defi,
}

impl SymbolFamily {
    /// Whether repeated declarations of the same name are allowed.
    pub fn allows_redeclaration(self) -> bool {
        matches!(self, SymbolFamily::Symi | SymbolFamily::Symdef)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolFamily::Symi => "symi",
            SymbolFamily::Symdef => "symdef",
            SymbolFamily::Defi => "defi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub family: SymbolFamily,
    /// Rendered forms after capitalization/pluralization sugar.
    pub display_forms: Vec<String>,
    /// Raw name-bearing argument texts.
    pub base_forms: Vec<String>,
    /// The whole macro.
    pub span: Span,
    /// The name-bearing arguments.
    pub name_span: Span,
    pub noverb: bool,
    /// Languages for which no verbalization is expected.
    pub noverb_langs: Vec<String>,
    pub module_kind: ModuleKind,
}

// ============================================================================
// References
// ============================================================================

/// Stable identity of a reference: its file plus its index in the unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceId {
    pub file: FileId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// A `trefi`-family use site.
    Tref,
    /// A `defi` inside a binding, verbalizing the signature's symbol.
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: ReferenceId,
    /// Module containing the use site.
    pub module: ModuleId,
    /// Module name the reference is restricted to; `None` searches everything visible.
    pub qualifier: Option<String>,
    pub name: String,
    pub kind: ReferenceKind,
    pub span: Span,
    pub name_span: Span,
    pub display: String,
}

// ============================================================================
// Imports
// ============================================================================

/// Where an import edge points, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// A module of the importing file.
    SameFile { module: String },
    /// `<module>.tex` next to the importer, else at the repository's source root.
    Relative { module: String },
    Repository {
        repository: String,
        directory: String,
        file: String,
        module: String,
    },
    /// `load=`: a root-relative directory holding `<module>.tex`.
    RootPath { path: String, module: String },
}

impl Locator {
    pub fn module(&self) -> &str {
        match self {
            Locator::SameFile { module }
            | Locator::Relative { module }
            | Locator::Repository { module, .. }
            | Locator::RootPath { module, .. } => module,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::SameFile { module } | Locator::Relative { module } => f.write_str(module),
            Locator::Repository {
                repository,
                directory,
                file,
                module,
            } => {
                if directory.is_empty() {
                    write!(f, "{repository}/{file}?{module}")
                } else {
                    write!(f, "{repository}/{directory}/{file}?{module}")
                }
            }
            Locator::RootPath { path, module } => write!(f, "{path}/{module}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub source: ModuleId,
    pub locator: Locator,
    /// Whether importers of `source` see the target too.
    pub export: bool,
    /// Macro or environment that created the edge.
    pub macro_name: String,
    pub span: Span,
    /// Created by a binding for its signature rather than written out.
    pub implicit: bool,
}

// ============================================================================
// Modules and units
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDecl {
    pub id: ModuleId,
    pub kind: ModuleKind,
    /// Language tag of a binding.
    pub language: Option<String>,
    /// Signature module name of a binding.
    pub signature: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

/// Everything compiled from one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub file: FileId,
    /// Fingerprint of the source text.
    pub fingerprint: Fingerprint,
    pub tree: Body,
    pub line_index: LineIndex,
    pub modules: Vec<ModuleDecl>,
    pub symbols: Vec<Symbol>,
    pub references: Vec<Reference>,
    pub imports: Vec<ImportEdge>,
    /// Syntax and compiler diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledUnit {
    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.iter().find(|m| m.id.name == name)
    }

    pub fn symbols_of<'a>(&'a self, module: &'a ModuleId) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.symbols.iter().filter(move |s| &s.id.module == module)
    }

    pub fn imports_of<'a>(&'a self, module: &'a ModuleId) -> impl Iterator<Item = &'a ImportEdge> + 'a {
        self.imports.iter().filter(move |e| &e.source == module)
    }

    /// Local diagnostics with positions, sorted by location.
    pub fn diagnostics(&self) -> Vec<FileDiagnostic> {
        let mut out: Vec<_> = self
            .diagnostics
            .iter()
            .map(|d| FileDiagnostic::new(self.file.clone(), &self.line_index, d.clone()))
            .collect();
        sort_diagnostics(&mut out);
        out
    }
}

/// A diagnostic placed in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    pub file: FileId,
    /// Zero-based.
    pub line: u32,
    /// Zero-based, in characters.
    pub column: u32,
    pub diagnostic: Diagnostic,
}

impl FileDiagnostic {
    pub fn new(file: FileId, index: &LineIndex, diagnostic: Diagnostic) -> Self {
        let position = index.position(diagnostic.span.start);
        Self {
            file,
            line: position.line,
            column: position.column,
            diagnostic,
        }
    }
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.file,
            self.line + 1,
            self.column + 1,
            self.diagnostic.severity,
            self.diagnostic.code,
            self.diagnostic.message
        )
    }
}

/// Sort by file, then location, then code and message for a total order.
pub fn sort_diagnostics(diagnostics: &mut [FileDiagnostic]) {
    diagnostics.sort_by(|a, b| {
        (&a.file, a.line, a.column, a.diagnostic.code, &a.diagnostic.message).cmp(&(
            &b.file,
            b.line,
            b.column,
            b.diagnostic.code,
            &b.diagnostic.message,
        ))
    });
}
