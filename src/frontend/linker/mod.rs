//! Cross-file linker for compiled units.
//!
//! Linking turns a set of [`CompiledUnit`]s into a [`LinkedGraph`]:
//!
//! 1. **Resolve edges**: every import locator is mapped to a module through the [`RootConvention`].
//! 2. **Detect cycles**: one `ImportCycle` per cyclic strongly connected component, at the edge that
//!    closes its shortest cycle.
//! 3. **Compute closures**: exported and visible module sets, over the condensation of the graph.
//! 4. **Per-unit passes**: references, redundant imports, duplicate definitions, verbalization checks.
//!
//! Steps 1-3 are global and single-threaded. Step 4 reads only the global structure and runs per
//! unit on the rayon pool. A unit's per-unit results are reused by [`relink`] when neither its
//! source nor its link inputs changed.
//!
//! ## Notes
//!
//! - **First import wins**: references resolve against the visible set in source order and the
//!   first module defining the name is taken. Ambiguity is not reported.
//! - **Cycles**: modules of one strongly connected component keep their own symbols but contribute
//!   nothing to each other.

mod closure;
mod cycles;
mod resolve;
mod unit;

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use stex_core::lang::environments::ModuleKind;

use crate::frontend::cache::Fingerprint;
use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::location::{FileId, ModuleId, RootConvention};
use crate::frontend::symbols::{
    CompiledUnit, FileDiagnostic, ModuleDecl, Reference, ReferenceId, Symbol, SymbolId, sort_diagnostics,
};
use crate::frontend::workspace::CancellationToken;

// ============================================================================
// Graph types
// ============================================================================

/// An import edge after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    /// Index of the edge in its unit's `imports`.
    pub import: usize,
    pub target: Option<ModuleId>,
    pub export: bool,
    pub implicit: bool,
    /// Source and target share a strongly connected component.
    pub intra_component: bool,
}

/// A module with its resolved edges and closures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub id: ModuleId,
    pub kind: ModuleKind,
    /// Resolved signature module of a binding.
    pub signature: Option<ModuleId>,
    pub edges: Vec<ResolvedEdge>,
    /// The module followed by everything it re-exports.
    pub exported: Vec<ModuleId>,
    /// Modules references in this module are resolved against, in priority order.
    pub visible: Vec<ModuleId>,
    /// Fingerprint of `exported`: member identities and their own symbol signatures.
    pub exported_fingerprint: Fingerprint,
    /// Strongly connected component index.
    pub component: usize,
}

/// Outcome of binding one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Symbol(SymbolId),
    Unresolved,
}

impl Resolution {
    pub fn symbol(&self) -> Option<&SymbolId> {
        match self {
            Resolution::Symbol(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }
}

/// Per-unit link results.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitLink {
    pub file: FileId,
    /// Source fingerprint of the unit these results were computed for.
    pub unit_fingerprint: Fingerprint,
    /// Fingerprint of everything outside the unit the results depend on.
    pub input_fingerprint: Fingerprint,
    /// Indexed like the unit's `references`.
    pub bindings: Vec<Resolution>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where a symbol lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SymbolLocation {
    unit: usize,
    index: usize,
}

/// The linked state of a whole corpus.
#[derive(Debug, Clone, Default)]
pub struct LinkedGraph {
    units: Vec<Arc<CompiledUnit>>,
    unit_index: FxHashMap<FileId, usize>,
    modules: BTreeMap<ModuleId, ResolvedModule>,
    symbols: FxHashMap<SymbolId, SymbolLocation>,
    links: FxHashMap<FileId, Arc<UnitLink>>,
    /// Import cycles, keyed by the file holding the closing edge.
    cycles: Vec<(FileId, Diagnostic)>,
    /// Files whose per-unit results were recomputed by the pass that built this graph.
    relinked: Vec<FileId>,
}

// ============================================================================
// Entry points
// ============================================================================

/// Link a set of units from scratch.
#[tracing::instrument(skip_all, fields(units = tracing::field::Empty))]
pub fn link(units: impl IntoIterator<Item = Arc<CompiledUnit>>, root: &RootConvention) -> LinkedGraph {
    let units: Vec<_> = units.into_iter().collect();
    tracing::Span::current().record("units", units.len());
    link_with(None, units, root, &CancellationToken::new()).unwrap_or_default()
}

/// Link a set of units, reusing per-unit results of `previous` where nothing they depend on changed.
#[tracing::instrument(skip_all, fields(units = tracing::field::Empty))]
pub fn relink(
    previous: &LinkedGraph,
    units: impl IntoIterator<Item = Arc<CompiledUnit>>,
    root: &RootConvention,
) -> LinkedGraph {
    let units: Vec<_> = units.into_iter().collect();
    tracing::Span::current().record("units", units.len());
    link_with(Some(previous), units, root, &CancellationToken::new()).unwrap_or_default()
}

/// Link with cancellation checks between phases. Returns `None` when cancelled.
pub(crate) fn link_with(
    previous: Option<&LinkedGraph>,
    mut units: Vec<Arc<CompiledUnit>>,
    root: &RootConvention,
    cancel: &CancellationToken,
) -> Option<LinkedGraph> {
    units.sort_by(|a, b| a.file.cmp(&b.file));
    units.dedup_by(|a, b| a.file == b.file);
    let mut graph = LinkedGraph::from_units(units);

    graph.modules = resolve::resolve_edges(&graph, root);
    if cancel.is_cancelled() {
        return None;
    }

    let structure = cycles::analyze(&graph);
    closure::apply(&mut graph, &structure);
    graph.cycles = structure.diagnostics;
    if cancel.is_cancelled() {
        return None;
    }

    let stale = previous.map(|p| p.reaching_deleted(&graph)).unwrap_or_default();
    let links: Vec<(Arc<UnitLink>, bool)> = graph
        .units
        .par_iter()
        .map(|u| {
            let input_fingerprint = unit::input_fingerprint(&graph, u);
            let reusable = previous
                .and_then(|p| p.links.get(&u.file))
                .filter(|_| !stale.contains(&u.file))
                .filter(|l| l.unit_fingerprint == u.fingerprint && l.input_fingerprint == input_fingerprint);
            match reusable {
                Some(link) => (Arc::clone(link), false),
                None => (Arc::new(unit::link_unit(&graph, u, input_fingerprint)), true),
            }
        })
        .collect();
    if cancel.is_cancelled() {
        return None;
    }

    for (link, fresh) in links {
        if fresh {
            graph.relinked.push(link.file.clone());
        }
        graph.links.insert(link.file.clone(), link);
    }
    tracing::info!(
        units = graph.units.len(),
        modules = graph.modules.len(),
        relinked = graph.relinked.len(),
        cycles = graph.cycles.len(),
        "linked"
    );
    Some(graph)
}

// ============================================================================
// Queries
// ============================================================================

impl LinkedGraph {
    fn from_units(units: Vec<Arc<CompiledUnit>>) -> Self {
        let unit_index = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.file.clone(), i))
            .collect();
        let mut symbols = FxHashMap::default();
        for (u, unit) in units.iter().enumerate() {
            for (index, symbol) in unit.symbols.iter().enumerate() {
                symbols
                    .entry(symbol.id.clone())
                    .or_insert(SymbolLocation { unit: u, index });
            }
        }
        Self {
            units,
            unit_index,
            symbols,
            ..Self::default()
        }
    }

    /// Units in file order.
    pub fn units(&self) -> &[Arc<CompiledUnit>] {
        &self.units
    }

    pub fn unit(&self, file: &FileId) -> Option<&Arc<CompiledUnit>> {
        self.unit_index.get(file).map(|&i| &self.units[i])
    }

    pub fn modules(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.values()
    }

    pub fn module(&self, id: &ModuleId) -> Option<&ResolvedModule> {
        self.modules.get(id)
    }

    /// Declaration of a module, as compiled.
    pub fn module_decl(&self, id: &ModuleId) -> Option<&ModuleDecl> {
        self.unit(&id.file)?.module(&id.name)
    }

    /// First declaration of a symbol.
    pub fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        let location = self.symbols.get(id)?;
        self.units[location.unit].symbols.get(location.index)
    }

    /// Own symbols of a module, in source order.
    pub fn symbols_of<'a>(&'a self, module: &'a ModuleId) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.unit(&module.file)
            .into_iter()
            .flat_map(move |u| u.symbols_of(module))
    }

    pub fn link(&self, file: &FileId) -> Option<&UnitLink> {
        self.links.get(file).map(Arc::as_ref)
    }

    pub fn reference(&self, id: &ReferenceId) -> Option<&Reference> {
        self.unit(&id.file)?.references.get(id.index)
    }

    pub fn resolution(&self, id: &ReferenceId) -> Option<&Resolution> {
        self.links.get(&id.file)?.bindings.get(id.index)
    }

    /// Every reference with its binding, in file and source order.
    pub fn references(&self) -> impl Iterator<Item = (&Reference, &Resolution)> {
        self.units.iter().flat_map(move |u| {
            let bindings = self.links.get(&u.file).map(|l| l.bindings.as_slice()).unwrap_or_default();
            u.references.iter().zip(bindings)
        })
    }

    /// Files whose per-unit link results were recomputed when this graph was built.
    pub fn relinked(&self) -> &[FileId] {
        &self.relinked
    }

    /// Import cycles found in the graph.
    pub fn cycles(&self) -> impl Iterator<Item = (&FileId, &Diagnostic)> {
        self.cycles.iter().map(|(f, d)| (f, d))
    }

    /// Compiler, link and cycle diagnostics of one file, sorted by location.
    pub fn diagnostics_for(&self, file: &FileId) -> Vec<FileDiagnostic> {
        let Some(unit) = self.unit(file) else {
            return Vec::new();
        };
        let link = self.links.get(file).map(|l| l.diagnostics.as_slice()).unwrap_or_default();
        let cycles = self.cycles.iter().filter(|(f, _)| f == file).map(|(_, d)| d);
        let mut out: Vec<_> = unit
            .diagnostics
            .iter()
            .chain(link)
            .chain(cycles)
            .map(|d| FileDiagnostic::new(file.clone(), &unit.line_index, d.clone()))
            .collect();
        sort_diagnostics(&mut out);
        out
    }

    /// All diagnostics of the graph, sorted by file then location.
    pub fn diagnostics(&self) -> Vec<FileDiagnostic> {
        let mut out: Vec<_> = self
            .units
            .iter()
            .flat_map(|u| self.diagnostics_for(&u.file))
            .collect();
        sort_diagnostics(&mut out);
        out
    }

    /// Files of this graph that imported, through any chain of edges, a file missing from `next`.
    fn reaching_deleted(&self, next: &LinkedGraph) -> FxHashSet<FileId> {
        let mut importers: FxHashMap<&ModuleId, Vec<&ModuleId>> = FxHashMap::default();
        for module in self.modules.values() {
            for target in module.edges.iter().filter_map(|e| e.target.as_ref()) {
                importers.entry(target).or_default().push(&module.id);
            }
        }
        let mut seen: FxHashSet<&ModuleId> = self
            .modules
            .keys()
            .filter(|id| !next.unit_index.contains_key(&id.file))
            .collect();
        let mut pending: Vec<&ModuleId> = seen.iter().copied().collect();
        let mut stale = FxHashSet::default();
        while let Some(module) = pending.pop() {
            for &importer in importers.get(module).into_iter().flatten() {
                if seen.insert(importer) {
                    stale.insert(importer.file.clone());
                    pending.push(importer);
                }
            }
        }
        stale
    }

    /// Module ids declared under `name` among `candidates`.
    fn named<'a>(candidates: &'a [ModuleId], name: &'a str) -> impl Iterator<Item = &'a ModuleId> + 'a {
        candidates.iter().filter(move |m| m.name == name)
    }
}
