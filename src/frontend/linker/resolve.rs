//! Locator resolution.

use std::collections::BTreeMap;

use super::{LinkedGraph, ResolvedEdge, ResolvedModule};
use crate::frontend::cache::Fingerprint;
use crate::frontend::location::{FileId, ModuleId, RootConvention};
use crate::frontend::symbols::{ImportEdge, Locator};

/// Resolve every module's edges. Closures and components are filled in later.
pub(super) fn resolve_edges(graph: &LinkedGraph, root: &RootConvention) -> BTreeMap<ModuleId, ResolvedModule> {
    let mut modules = BTreeMap::new();
    for unit in &graph.units {
        for decl in &unit.modules {
            let edges: Vec<ResolvedEdge> = unit
                .imports
                .iter()
                .enumerate()
                .filter(|(_, edge)| edge.source == decl.id)
                .map(|(import, edge)| ResolvedEdge {
                    import,
                    target: resolve_locator(graph, root, edge),
                    export: edge.export,
                    implicit: edge.implicit,
                    intra_component: false,
                })
                .collect();
            let signature = edges
                .iter()
                .find(|e| e.implicit)
                .and_then(|e| e.target.clone());
            modules.insert(
                decl.id.clone(),
                ResolvedModule {
                    id: decl.id.clone(),
                    kind: decl.kind,
                    signature,
                    edges,
                    exported: Vec::new(),
                    visible: Vec::new(),
                    exported_fingerprint: Fingerprint::default(),
                    component: 0,
                },
            );
        }
    }
    modules
}

/// The module an edge points at, if it exists in the graph.
pub(super) fn resolve_locator(graph: &LinkedGraph, root: &RootConvention, edge: &ImportEdge) -> Option<ModuleId> {
    let importer = &edge.source.file;
    let declared = |file: FileId, module: &str| {
        graph
            .unit(&file)
            .and_then(|u| u.module(module))
            .map(|m| m.id.clone())
    };
    match &edge.locator {
        Locator::SameFile { module } => declared(importer.clone(), module),
        Locator::Relative { module } => declared(importer.sibling(module.as_str()), module)
            .or_else(|| declared(importer.at_source_root(module.as_str()), module)),
        Locator::Repository {
            repository,
            directory,
            file,
            module,
        } => declared(FileId::new(repository.as_str(), directory.as_str(), file.as_str()), module),
        Locator::RootPath { path, module } => declared(root.load_target(path, module)?, module),
    }
}
