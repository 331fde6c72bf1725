//! Property-based tests for the stexls pipeline
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::sync::Arc;

use proptest::prelude::*;
use stexls::diagnostics::{DiagnosticCode, LineIndex};
use stexls::frontend::location::{FileId, RootConvention};
use stexls::{compile, lexer, link, parser, relink};

/// Markup fragments that exercise every lexer mode and most recovery paths.
const FRAGMENTS: &[&str] = &[
    "text ",
    "\n",
    "% comment\n",
    "{",
    "}",
    "[",
    "]",
    ",",
    "=",
    "$",
    "$x$",
    "$$",
    "\\(",
    "\\)",
    "\\[",
    "\\]",
    "\\$",
    "\\",
    "\\begin{modsig}{m}",
    "\\end{modsig}",
    "\\begin{module}[id=m]",
    "\\end{module}",
    "\\begin{mhmodnl}{m}{en}",
    "\\end{mhmodnl}",
    "\\begin{align}",
    "\\end{align}",
    "\\begin{",
    "\\end{",
    "\\symi{a}",
    "\\symdef{b}",
    "\\defi{a}",
    "\\adefii[name=x]{a b}{a}{b}",
    "\\Trefis[m]{a}",
    "\\mtrefi[m?a]{a}",
    "\\importmodule[mhrepos=r,dir=d]{m}",
    "\\gimport{m}",
    "\\guse[r]{m}",
    "\\verb|x|",
    "\\verb!x",
    "\\lstinline<a>",
    "é",
];

fn markup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.concat())
}

fn any_source() -> impl Strategy<Value = String> {
    prop_oneof![markup(), ".{0,200}"]
}

// =============================================================================
// Lexer and parser properties
// =============================================================================

proptest! {
    /// Property: tokens are ordered, in bounds, and their text is the source they cover
    #[test]
    fn tokens_tile_the_input(source in any_source()) {
        let tokens = lexer::lex(&source);
        let index = LineIndex::new(&source);
        let mut last = 0;
        for token in &tokens {
            prop_assert!(token.span.start >= last);
            prop_assert!(token.span.end <= source.len());
            prop_assert_eq!(&source[token.span.start..token.span.end], token.text.as_str());
            prop_assert_eq!(index.position(token.span.start), token.position);
            last = token.span.end;
        }
    }

    /// Property: parsing never fails and reports only in-bounds spans
    #[test]
    fn parse_is_total(source in any_source()) {
        let output = parser::parse(&lexer::lex(&source));
        for diagnostic in &output.diagnostics {
            prop_assert!(diagnostic.code.is_syntax());
            prop_assert!(diagnostic.span.end <= source.len());
        }
    }

    /// Property: compiling the same text twice gives identical units
    #[test]
    fn compile_is_idempotent(source in markup()) {
        let file = FileId::new("repo", "", "m");
        prop_assert_eq!(compile(&file, &source), compile(&file, &source));
    }
}

// =============================================================================
// Linker properties
// =============================================================================

/// One module per node, importing its successors with `\gimport`.
fn corpus(n: usize, edges: &[(usize, usize)]) -> Vec<Arc<stexls::symbols::CompiledUnit>> {
    (0..n)
        .map(|i| {
            let mut text = format!("\\begin{{module}}[id=m{i}]\\symi{{s{i}}}");
            for (_, to) in edges.iter().filter(|(from, _)| *from == i) {
                text.push_str(&format!("\\gimport{{m{to}}}"));
            }
            text.push_str("\\end{module}");
            Arc::new(compile(&FileId::new("repo", "", format!("m{i}")), &text))
        })
        .collect()
}

/// Kahn's algorithm: whether any node is left with a nonzero in-degree.
fn has_cycle(n: usize, edges: &[(usize, usize)]) -> bool {
    let mut indegree = vec![0usize; n];
    for (_, to) in edges {
        indegree[*to] += 1;
    }
    let mut ready: Vec<usize> = (0..n).filter(|i| indegree[*i] == 0).collect();
    let mut removed = 0;
    while let Some(node) = ready.pop() {
        removed += 1;
        for (_, to) in edges.iter().filter(|(from, _)| *from == node) {
            indegree[*to] -= 1;
            if indegree[*to] == 0 {
                ready.push(*to);
            }
        }
    }
    removed < n
}

/// Cyclic components counted from transitive reachability: a node is on a cycle when it reaches
/// itself, and two such nodes share a component when they reach each other.
fn cyclic_components(n: usize, edges: &[(usize, usize)]) -> usize {
    let mut reach = vec![vec![false; n]; n];
    for &(from, to) in edges {
        reach[from][to] = true;
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if reach[i][k] && reach[k][j] {
                    reach[i][j] = true;
                }
            }
        }
    }
    (0..n)
        .filter(|&i| reach[i][i])
        .filter(|&i| (0..i).all(|j| !(reach[i][j] && reach[j][i])))
        .count()
}

fn graphs() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..7).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..12)))
}

proptest! {
    /// Property: cycles are reported exactly when the import graph has one
    #[test]
    fn cycles_reported_iff_cyclic((n, edges) in graphs()) {
        let graph = link(corpus(n, &edges), &RootConvention::new("/mh"));
        let cycles = graph
            .diagnostics()
            .iter()
            .filter(|d| d.diagnostic.code == DiagnosticCode::ImportCycle)
            .count();
        prop_assert_eq!(cycles > 0, has_cycle(n, &edges));
        prop_assert!(graph.diagnostics().iter().all(|d| d.diagnostic.code != DiagnosticCode::UnresolvedImport));
    }

    /// Property: one cycle report per group of modules that import each other
    #[test]
    fn one_report_per_cyclic_component((n, edges) in graphs()) {
        let graph = link(corpus(n, &edges), &RootConvention::new("/mh"));
        prop_assert_eq!(graph.cycles().count(), cyclic_components(n, &edges));
    }

    /// Property: relinking unchanged units reuses everything and changes nothing
    #[test]
    fn relink_of_unchanged_units_is_identity((n, edges) in graphs()) {
        let root = RootConvention::new("/mh");
        let units = corpus(n, &edges);
        let first = link(units.clone(), &root);
        let second = relink(&first, units, &root);
        prop_assert!(second.relinked().is_empty());
        prop_assert_eq!(first.diagnostics(), second.diagnostics());
        prop_assert_eq!(
            first.modules().cloned().collect::<Vec<_>>(),
            second.modules().cloned().collect::<Vec<_>>()
        );
    }
}
