//! Per-unit link passes.
//!
//! Everything here reads the global graph but writes only the unit's own [`UnitLink`], so units
//! can be linked in parallel and a unit's results can be reused while its inputs are unchanged.

use rustc_hash::FxHashSet;

use super::{LinkedGraph, Resolution, ResolvedModule, UnitLink};
use crate::frontend::cache::{Fingerprint, FingerprintBuilder};
use crate::frontend::diagnostics::{Diagnostic, errors};
use crate::frontend::location::ModuleId;
use crate::frontend::symbols::{CompiledUnit, ModuleDecl, Reference, ReferenceKind, SymbolFamily, SymbolId};

/// Hash of everything outside `unit` its link results depend on.
///
/// For every edge of the unit's modules: the resolved target, whether the edge stays inside a
/// component, and the target's exported-closure fingerprint.
pub(super) fn input_fingerprint(graph: &LinkedGraph, unit: &CompiledUnit) -> Fingerprint {
    let mut builder = FingerprintBuilder::new();
    for decl in &unit.modules {
        let Some(module) = graph.modules.get(&decl.id) else {
            continue;
        };
        for edge in &module.edges {
            match edge.target.as_ref().and_then(|t| graph.modules.get(t)) {
                Some(target) => builder
                    .add(&target.id)
                    .add(&edge.intra_component)
                    .add(&target.exported_fingerprint),
                None => builder.add("unresolved"),
            };
        }
    }
    builder.finish()
}

pub(super) fn link_unit(graph: &LinkedGraph, unit: &CompiledUnit, input_fingerprint: Fingerprint) -> UnitLink {
    let mut diagnostics = Vec::new();
    let bindings: Vec<Resolution> = unit
        .references
        .iter()
        .map(|reference| {
            let resolution = resolve_reference(graph, reference);
            match &resolution {
                Resolution::Unresolved => diagnostics.push(errors::unresolved_reference(
                    &reference.name,
                    reference.qualifier.as_deref(),
                    reference.name_span,
                )),
                Resolution::Symbol(id) if reference.kind == ReferenceKind::Tref => {
                    if graph.symbol(id).is_some_and(|s| s.noverb) {
                        diagnostics.push(errors::reference_to_noverb(&id.name, reference.span));
                    }
                }
                Resolution::Symbol(_) => {}
            }
            resolution
        })
        .collect();

    for decl in &unit.modules {
        let Some(module) = graph.modules.get(&decl.id) else {
            continue;
        };
        import_diagnostics(graph, unit, module, &mut diagnostics);
        if let Some(signature) = &module.signature {
            missing_verbalizations(graph, unit, &bindings, decl, signature, &mut diagnostics);
        }
    }
    duplicate_definitions(unit, &mut diagnostics);

    tracing::debug!(file = %unit.file, diagnostics = diagnostics.len(), "linked unit");
    UnitLink {
        file: unit.file.clone(),
        unit_fingerprint: unit.fingerprint,
        input_fingerprint,
        bindings,
        diagnostics,
    }
}

/// Bind a reference by exact (module, name) against the visible set of its module.
fn resolve_reference(graph: &LinkedGraph, reference: &Reference) -> Resolution {
    let Some(module) = graph.modules.get(&reference.module) else {
        return Resolution::Unresolved;
    };
    let found = match &reference.qualifier {
        Some(qualifier) => LinkedGraph::named(&module.visible, qualifier).find_map(|m| lookup(graph, m, &reference.name)),
        None => module.visible.iter().find_map(|m| lookup(graph, m, &reference.name)),
    };
    found.map_or(Resolution::Unresolved, Resolution::Symbol)
}

fn lookup(graph: &LinkedGraph, module: &ModuleId, name: &str) -> Option<SymbolId> {
    let id = SymbolId {
        module: module.clone(),
        name: name.to_string(),
    };
    graph.symbols.contains_key(&id).then_some(id)
}

/// Unresolved and redundant imports of one module.
fn import_diagnostics(graph: &LinkedGraph, unit: &CompiledUnit, module: &ResolvedModule, out: &mut Vec<Diagnostic>) {
    let span_of = |import: usize| unit.imports.get(import).map(|e| e.span);
    for (i, edge) in module.edges.iter().enumerate() {
        let Some(import) = unit.imports.get(edge.import) else {
            continue;
        };
        let Some(target) = &edge.target else {
            out.push(errors::unresolved_import(&import.locator.to_string(), import.span));
            continue;
        };
        if edge.implicit || edge.intra_component {
            continue;
        }
        let covering = module.edges.iter().enumerate().find(|(j, other)| {
            let Some(other_target) = &other.target else {
                return false;
            };
            if *j == i || other.intra_component || (edge.export && !other.export) {
                return false;
            }
            if other_target == target {
                return *j < i;
            }
            graph
                .modules
                .get(other_target)
                .is_some_and(|m| m.exported.contains(target))
        });
        if let Some((_, other)) = covering {
            out.push(errors::redundant_import(
                &import.locator.to_string(),
                import.span,
                span_of(other.import),
            ));
        }
    }
}

/// Signature symbols the binding never defines.
fn missing_verbalizations(
    graph: &LinkedGraph,
    unit: &CompiledUnit,
    bindings: &[Resolution],
    binding: &ModuleDecl,
    signature: &ModuleId,
    out: &mut Vec<Diagnostic>,
) {
    let Some(language) = binding.language.as_deref() else {
        return;
    };
    let verbalized: FxHashSet<&SymbolId> = unit
        .references
        .iter()
        .zip(bindings)
        .filter(|(r, _)| r.kind == ReferenceKind::Definition && r.module == binding.id)
        .filter_map(|(_, b)| b.symbol())
        .collect();

    let mut reported: FxHashSet<&str> = FxHashSet::default();
    for symbol in graph.symbols_of(signature) {
        if symbol.noverb
            || symbol.noverb_langs.iter().any(|l| l == language)
            || verbalized.contains(&symbol.id)
            || !reported.insert(symbol.id.name.as_str())
        {
            continue;
        }
        out.push(errors::missing_verbalization(&symbol.id.name, language, binding.name_span));
    }
}

/// Repeated `defi` names within one module.
fn duplicate_definitions(unit: &CompiledUnit, out: &mut Vec<Diagnostic>) {
    for (i, symbol) in unit.symbols.iter().enumerate() {
        if symbol.family.allows_redeclaration() {
            continue;
        }
        let first = unit.symbols[..i]
            .iter()
            .find(|s| s.id == symbol.id && s.family == SymbolFamily::Defi);
        if let Some(first) = first {
            out.push(errors::duplicate_definition(
                &symbol.id.name,
                symbol.name_span,
                Some(first.name_span),
            ));
        }
    }
}
