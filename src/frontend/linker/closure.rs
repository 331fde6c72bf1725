//! Exported and visible closures over the condensation.

use rustc_hash::{FxHashMap, FxHashSet};

use super::LinkedGraph;
use super::cycles::Structure;
use crate::frontend::cache::{Fingerprint, FingerprintBuilder};
use crate::frontend::location::ModuleId;

pub(super) fn apply(graph: &mut LinkedGraph, structure: &Structure) {
    for module in graph.modules.values_mut() {
        let own = structure.component_of.get(&module.id).copied();
        module.component = own.unwrap_or_default();
        for edge in &mut module.edges {
            edge.intra_component = edge
                .target
                .as_ref()
                .is_some_and(|t| structure.component_of.get(t).copied() == own);
        }
    }

    let own_signatures: FxHashMap<ModuleId, Fingerprint> = graph
        .modules
        .keys()
        .map(|id| (id.clone(), own_signature(graph, id)))
        .collect();

    // Components arrive sinks first, so every export target is finished before its importers.
    for component in &structure.components {
        for id in component {
            let Some(module) = graph.modules.get(id) else {
                continue;
            };
            let mut exported = Closure::starting_with(id);
            for edge in module.edges.iter().filter(|e| e.export && !e.intra_component) {
                if let Some(target) = edge.target.as_ref().and_then(|t| graph.modules.get(t)) {
                    exported.extend(&target.exported);
                }
            }
            let exported = exported.into_vec();
            let fingerprint = closure_fingerprint(&exported, &own_signatures);
            if let Some(module) = graph.modules.get_mut(id) {
                module.exported = exported;
                module.exported_fingerprint = fingerprint;
            }
        }
    }

    let visible: Vec<(ModuleId, Vec<ModuleId>)> = graph
        .modules
        .values()
        .map(|module| {
            let first = module.signature.as_ref().unwrap_or(&module.id);
            let mut visible = Closure::starting_with(first);
            for edge in module.edges.iter().filter(|e| !e.intra_component) {
                if let Some(target) = edge.target.as_ref().and_then(|t| graph.modules.get(t)) {
                    visible.extend(&target.exported);
                }
            }
            (module.id.clone(), visible.into_vec())
        })
        .collect();
    for (id, visible) in visible {
        if let Some(module) = graph.modules.get_mut(&id) {
            module.visible = visible;
        }
    }
}

/// Ordered, duplicate-free module list.
struct Closure {
    members: Vec<ModuleId>,
    seen: FxHashSet<ModuleId>,
}

impl Closure {
    fn starting_with(first: &ModuleId) -> Self {
        let mut closure = Self {
            members: Vec::new(),
            seen: FxHashSet::default(),
        };
        closure.extend(std::slice::from_ref(first));
        closure
    }

    fn extend(&mut self, modules: &[ModuleId]) {
        for module in modules {
            if self.seen.insert(module.clone()) {
                self.members.push(module.clone());
            }
        }
    }

    fn into_vec(self) -> Vec<ModuleId> {
        self.members
    }
}

/// Hash of a module's own symbols: name, family and verbalization flags.
fn own_signature(graph: &LinkedGraph, module: &ModuleId) -> Fingerprint {
    let mut builder = FingerprintBuilder::new();
    for symbol in graph.symbols_of(module) {
        builder
            .add(&symbol.id.name)
            .add(symbol.family.as_str())
            .add(&symbol.noverb)
            .add(&symbol.noverb_langs);
    }
    builder.finish()
}

fn closure_fingerprint(members: &[ModuleId], own: &FxHashMap<ModuleId, Fingerprint>) -> Fingerprint {
    let mut builder = FingerprintBuilder::new();
    for member in members {
        builder
            .add(member)
            .add(&own.get(member).copied().unwrap_or_default());
    }
    builder.finish()
}
