//! Import cycle detection and strongly connected components.
//!
//! A cycle is a strongly connected component that can be walked back to itself, so overlapping
//! cycles between the same modules are one report. Both traversals are iterative so deep import
//! chains cannot overflow the stack.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::LinkedGraph;
use crate::frontend::diagnostics::{Diagnostic, errors};
use crate::frontend::location::{FileId, ModuleId};

/// Module graph with dense node indices, in sorted module order.
pub(super) struct Nodes {
    pub ids: Vec<ModuleId>,
    /// Per node: (target node, position of the edge in the module's `edges`).
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Nodes {
    pub fn new(graph: &LinkedGraph) -> Self {
        let ids: Vec<ModuleId> = graph.modules.keys().cloned().collect();
        let index: FxHashMap<&ModuleId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let adjacency = graph
            .modules
            .values()
            .map(|module| {
                module
                    .edges
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, edge)| Some((*index.get(edge.target.as_ref()?)?, pos)))
                    .collect()
            })
            .collect();
        Self { ids, adjacency }
    }
}

pub(super) struct Structure {
    /// Cycle diagnostics, keyed by the file holding the closing edge.
    pub diagnostics: Vec<(FileId, Diagnostic)>,
    /// Components in reverse topological order: a component comes after everything it imports.
    pub components: Vec<Vec<ModuleId>>,
    /// Component index of each module.
    pub component_of: FxHashMap<ModuleId, usize>,
}

pub(super) fn analyze(graph: &LinkedGraph) -> Structure {
    let nodes = Nodes::new(graph);
    let components = strongly_connected(&nodes);
    let mut node_component = vec![0usize; nodes.ids.len()];
    for (c, members) in components.iter().enumerate() {
        for &node in members {
            node_component[node] = c;
        }
    }
    let diagnostics = report_cycles(graph, &nodes, &components, &node_component);
    let component_of = node_component
        .iter()
        .enumerate()
        .map(|(node, &c)| (nodes.ids[node].clone(), c))
        .collect();
    let components = components
        .into_iter()
        .map(|members| members.into_iter().map(|n| nodes.ids[n].clone()).collect())
        .collect();
    Structure {
        diagnostics,
        components,
        component_of,
    }
}

/// One `ImportCycle` per cyclic component: more than one module, or a module importing itself.
///
/// The reported path is the shortest cycle through the component's first module, taking edges in
/// source order, and the diagnostic sits on the edge that closes it.
fn report_cycles(
    graph: &LinkedGraph,
    nodes: &Nodes,
    components: &[Vec<usize>],
    node_component: &[usize],
) -> Vec<(FileId, Diagnostic)> {
    let mut cyclic: Vec<&Vec<usize>> = components
        .iter()
        .filter(|members| match members.as_slice() {
            [single] => nodes.adjacency[*single].iter().any(|&(t, _)| t == *single),
            _ => true,
        })
        .collect();
    cyclic.sort_by_key(|members| members[0]);
    cyclic
        .into_iter()
        .filter_map(|members| {
            let (cycle, source, edge_pos) = shortest_cycle(nodes, members[0], node_component)?;
            cycle_diagnostic(graph, nodes, &cycle, source, edge_pos)
        })
        .collect()
}

/// Breadth-first search from `start` inside its component until an edge leads back to it.
/// Returns the cycle's nodes starting at `start`, and the closing edge as (source node, edge position).
fn shortest_cycle(nodes: &Nodes, start: usize, node_component: &[usize]) -> Option<(Vec<usize>, usize, usize)> {
    let component = node_component[start];
    let mut parent: FxHashMap<usize, usize> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for &(target, edge_pos) in &nodes.adjacency[node] {
            if target == start {
                let mut cycle = vec![node];
                let mut at = node;
                while at != start {
                    at = *parent.get(&at)?;
                    cycle.push(at);
                }
                cycle.reverse();
                return Some((cycle, node, edge_pos));
            }
            if node_component[target] == component && !parent.contains_key(&target) {
                parent.insert(target, node);
                queue.push_back(target);
            }
        }
    }
    None
}

fn cycle_diagnostic(
    graph: &LinkedGraph,
    nodes: &Nodes,
    cycle: &[usize],
    source: usize,
    edge_pos: usize,
) -> Option<(FileId, Diagnostic)> {
    let source_id = &nodes.ids[source];
    let edge = graph.modules.get(source_id)?.edges.get(edge_pos)?;
    let unit = graph.unit(&source_id.file)?;
    let span = unit.imports.get(edge.import)?.span;
    let names: Vec<String> = cycle.iter().map(|&n| nodes.ids[n].to_string()).collect();
    Some((source_id.file.clone(), errors::import_cycle(&names, span)))
}

/// Tarjan's algorithm. Components come out sinks first.
fn strongly_connected(nodes: &Nodes) -> Vec<Vec<usize>> {
    let n = nodes.ids.len();
    let mut counter = 0usize;
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut components = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(counter);
        lowlink[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(top) = call.last_mut() {
            let node = top.0;
            if let Some(&(w, _)) = nodes.adjacency[node].get(top.1) {
                top.1 += 1;
                match index[w] {
                    None => {
                        index[w] = Some(counter);
                        lowlink[w] = counter;
                        counter += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call.push((w, 0));
                    }
                    Some(wi) if on_stack[w] => lowlink[node] = lowlink[node].min(wi),
                    Some(_) => {}
                }
                continue;
            }

            call.pop();
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[node]);
            }
            if index[node] == Some(lowlink[node]) {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(edges: &[&[usize]]) -> Nodes {
        Nodes {
            ids: (0..edges.len())
                .map(|i| ModuleId::new(FileId::new("r", "", format!("m{i}")), format!("m{i}")))
                .collect(),
            adjacency: edges
                .iter()
                .map(|targets| targets.iter().enumerate().map(|(pos, &t)| (t, pos)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_components_sinks_first() {
        // 0 -> 1 <-> 2 -> 3
        let components = strongly_connected(&nodes(&[&[1], &[2], &[1, 3], &[]]));
        assert_eq!(components, vec![vec![3], vec![1, 2], vec![0]]);
    }

    #[test]
    fn test_self_loop_is_its_own_component() {
        let components = strongly_connected(&nodes(&[&[0]]));
        assert_eq!(components, vec![vec![0]]);
    }

    #[test]
    fn test_shortest_cycle_through_first_member() {
        // 0 -> 1 -> 2 -> 0 and 0 -> 2
        let nodes = nodes(&[&[1, 2], &[2], &[0]]);
        let (cycle, source, edge_pos) = shortest_cycle(&nodes, 0, &[0, 0, 0]).unwrap();
        assert_eq!(cycle, [0, 2]);
        assert_eq!((source, edge_pos), (2, 0));
    }

    #[test]
    fn test_shortest_cycle_stays_in_component() {
        // 0 -> 1 -> 0, and 0 -> 2 outside the component
        let nodes = nodes(&[&[2, 1], &[0], &[]]);
        let (cycle, _, _) = shortest_cycle(&nodes, 0, &[1, 1, 0]).unwrap();
        assert_eq!(cycle, [0, 1]);
        assert!(shortest_cycle(&nodes, 2, &[1, 1, 0]).is_none());
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let edges: Vec<Vec<usize>> = (0..50_000).map(|i| if i + 1 < 50_000 { vec![i + 1] } else { vec![] }).collect();
        let refs: Vec<&[usize]> = edges.iter().map(Vec::as_slice).collect();
        assert_eq!(strongly_connected(&nodes(&refs)).len(), 50_000);
    }
}
