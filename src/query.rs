//! Editor-style queries over a linked graph.
//!
//! Positions are zero-based lines and character columns, like [`FileDiagnostic`](crate::frontend::symbols::FileDiagnostic).

use crate::frontend::ast::{Position, Span};
use crate::frontend::linker::{LinkedGraph, Resolution};
use crate::frontend::location::{FileId, ModuleId};
use crate::frontend::symbols::{Reference, Symbol, SymbolId};

/// The symbol at a position: the target of a reference (including a `defi` verbalizing a signature
/// symbol), or the symbol declared there.
pub fn find_definition<'g>(graph: &'g LinkedGraph, file: &FileId, line: u32, column: u32) -> Option<&'g Symbol> {
    let unit = graph.unit(file)?;
    let offset = unit.line_index.offset(Position::new(line, column))?;
    let innermost = |spans: &mut dyn Iterator<Item = (usize, Span)>| {
        spans
            .filter(|(_, span)| span.contains(offset))
            .min_by_key(|(_, span)| span.len())
            .map(|(i, _)| i)
    };

    let reference = innermost(&mut unit.references.iter().enumerate().map(|(i, r)| (i, r.span)));
    if let Some(index) = reference {
        let resolution = graph.link(file)?.bindings.get(index)?;
        return match resolution {
            Resolution::Symbol(id) => graph.symbol(id),
            Resolution::Unresolved => None,
        };
    }
    let symbol = innermost(&mut unit.symbols.iter().enumerate().map(|(i, s)| (i, s.span)))?;
    graph.symbol(&unit.symbols[symbol].id)
}

/// Every reference bound to `symbol`, sorted by file and location.
pub fn find_references<'g>(graph: &'g LinkedGraph, symbol: &SymbolId) -> Vec<&'g Reference> {
    let mut found: Vec<&Reference> = graph
        .references()
        .filter(|(_, resolution)| resolution.symbol() == Some(symbol))
        .map(|(reference, _)| reference)
        .collect();
    found.sort_by(|a, b| (&a.id.file, a.span.start).cmp(&(&b.id.file, b.span.start)));
    found
}

/// Completions for a partially typed reference in `file`.
///
/// `mod?sym` completes symbols of visible modules named `mod`. A bare prefix completes visible
/// module names (as `name?`) and visible symbol names.
pub fn completions_at(graph: &LinkedGraph, file: &FileId, partial: &str) -> Vec<String> {
    let Some(unit) = graph.unit(file) else {
        return Vec::new();
    };
    let mut visible: Vec<&ModuleId> = unit
        .modules
        .iter()
        .filter_map(|decl| graph.module(&decl.id))
        .flat_map(|module| module.visible.iter())
        .collect();
    visible.sort();
    visible.dedup();

    let mut out: Vec<String> = match partial.split_once('?') {
        Some((module, prefix)) => visible
            .iter()
            .filter(|m| m.name == module)
            .flat_map(|m| graph.symbols_of(m))
            .filter(|s| s.id.name.starts_with(prefix))
            .map(|s| format!("{module}?{}", s.id.name))
            .collect(),
        None => {
            let modules = visible
                .iter()
                .filter(|m| m.name.starts_with(partial))
                .map(|m| format!("{}?", m.name));
            let symbols = visible
                .iter()
                .flat_map(|m| graph.symbols_of(m))
                .filter(|s| s.id.name.starts_with(partial))
                .map(|s| s.id.name.clone());
            modules.chain(symbols).collect()
        }
    };
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::frontend::compiler::compile;
    use crate::frontend::linker::link;
    use crate::frontend::location::RootConvention;

    fn graph() -> LinkedGraph {
        let units = [
            (
                FileId::new("repo", "", "sets"),
                "\\begin{modsig}{sets}\n\\symi{set}\\symi{subset}\n\\end{modsig}",
            ),
            (
                FileId::new("repo", "", "use"),
                "\\begin{module}[id=use]\n\\gimport{sets}\n\\defi{union} of \\trefi[sets]{set}\n\\end{module}",
            ),
        ]
        .map(|(file, text)| Arc::new(compile(&file, text)));
        link(units, &RootConvention::new("/mh"))
    }

    #[test]
    fn test_definition_through_reference() {
        let g = graph();
        let file = FileId::new("repo", "", "use");
        // line 2 is `\defi{union} of \trefi[sets]{set}`
        let symbol = find_definition(&g, &file, 2, 20).unwrap();
        assert_eq!(symbol.id.to_string(), "repo/sets?sets?set");
    }

    #[test]
    fn test_definition_of_declaration() {
        let g = graph();
        let symbol = find_definition(&g, &FileId::new("repo", "", "use"), 2, 3).unwrap();
        assert_eq!(symbol.id.name, "union");
        assert!(find_definition(&g, &FileId::new("repo", "", "use"), 0, 0).is_none());
    }

    #[test]
    fn test_references_of_symbol() {
        let g = graph();
        let id = SymbolId {
            module: ModuleId::new(FileId::new("repo", "", "sets"), "sets"),
            name: "set".to_string(),
        };
        let refs = find_references(&g, &id);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].module.name, "use");
    }

    #[test]
    fn test_completions() {
        let g = graph();
        let file = FileId::new("repo", "", "use");
        assert_eq!(completions_at(&g, &file, "sets?s"), ["sets?set", "sets?subset"]);
        assert_eq!(completions_at(&g, &file, "s"), ["set", "sets?", "subset"]);
        assert_eq!(completions_at(&g, &file, "u"), ["union", "use?"]);
        assert!(completions_at(&g, &FileId::new("repo", "", "nothere"), "").is_empty());
    }
}
