//! Integration tests for the stexls analysis pipeline
//!
//! Scenarios run through the public surface: `compile`, `link`, the workspace driver and the
//! query functions.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use stexls::diagnostics::DiagnosticCode;
use stexls::frontend::location::{FileId, ModuleId, RootConvention};
use stexls::symbols::SymbolId;
use stexls::{CancellationToken, SourceInput, Workspace, WorkspaceConfig, compile, find_definition, find_references, link};

fn file(name: &str) -> FileId {
    FileId::new("repo", "", name)
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn codes(ws: &Workspace) -> Vec<DiagnosticCode> {
    ws.graph().diagnostics().iter().map(|d| d.diagnostic.code).collect()
}

#[test]
fn test_signature_and_binding_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "repo/source/x.tex", r"\begin{modsig}{x}\symi{thing}\end{modsig}");
    write(dir.path(), "repo/source/y.tex", r"\begin{mhmodnl}{x}{en}\defi{thing}\end{mhmodnl}");

    let mut ws = Workspace::new(WorkspaceConfig::new(dir.path())).unwrap();
    let report = ws.update_from_disk(&CancellationToken::new()).unwrap();
    assert_eq!(report.compiled, [file("x"), file("y")]);
    assert!(ws.graph().diagnostics().is_empty(), "{:?}", ws.graph().diagnostics());

    let thing = find_definition(ws.graph(), &file("y"), 0, 24).unwrap();
    assert_eq!(thing.id.to_string(), "repo/x?x?thing");
    let refs = find_references(ws.graph(), &thing.id);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].module, ModuleId::new(file("y"), "x.en"));
}

#[test]
fn test_export_asymmetry() {
    let units = [
        ("a", r"\begin{module}[id=a]\gimport{b}\end{module}"),
        ("b", r"\begin{module}[id=b]\symi{fromb}\guse{c}\end{module}"),
        ("c", r"\begin{module}[id=c]\symi{fromc}\end{module}"),
        ("d", r"\begin{module}[id=d]\gimport{a}\trefi{fromb}\trefi{fromc}\end{module}"),
    ]
    .map(|(name, text)| Arc::new(compile(&file(name), text)));
    let graph = link(units, &RootConvention::new("/mh"));

    let bindings: Vec<_> = graph
        .references()
        .map(|(r, b)| (r.name.as_str(), b.symbol().is_some()))
        .collect();
    assert_eq!(bindings, [("fromb", true), ("fromc", false)]);
    let d: Vec<_> = graph.diagnostics_for(&file("d")).iter().map(|d| d.diagnostic.code).collect();
    assert_eq!(d, [DiagnosticCode::UnresolvedReference]);
}

#[test]
fn test_closure_unaffected_by_private_import() {
    let base = [
        ("a", r"\begin{module}[id=a]\gimport{b}\end{module}"),
        ("b", r"\begin{module}[id=b]\symi{x}\end{module}"),
        ("e", r"\begin{module}[id=e]\symi{y}\end{module}"),
        ("d", r"\begin{module}[id=d]\gimport{a}\end{module}"),
    ];
    let build = |a: &str| {
        let units = base.map(|(name, text)| {
            let text = if name == "a" { a } else { text };
            Arc::new(compile(&file(name), text))
        });
        link(units, &RootConvention::new("/mh"))
    };
    let before = build(base[0].1);
    let after = build(r"\begin{module}[id=a]\gimport{b}\guse{e}\end{module}");

    let a = ModuleId::new(file("a"), "a");
    let d = ModuleId::new(file("d"), "d");
    assert_eq!(before.module(&a).unwrap().exported, after.module(&a).unwrap().exported);
    assert_eq!(before.module(&d).unwrap().visible, after.module(&d).unwrap().visible);
}

#[test]
fn test_long_cycle_reported_once() {
    let n = 20;
    let units = (0..n).map(|i| {
        let name = format!("m{i}");
        let text = format!(
            "\\begin{{module}}[id={name}]\\gimport{{m{}}}\\end{{module}}",
            (i + 1) % n
        );
        Arc::new(compile(&file(&name), &text))
    });
    let graph = link(units, &RootConvention::new("/mh"));
    let cycles: Vec<_> = graph
        .diagnostics()
        .into_iter()
        .filter(|d| d.diagnostic.code == DiagnosticCode::ImportCycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].diagnostic.message.starts_with("import cycle: "));
}

#[test]
fn test_arity_and_default_naming() {
    let unit = compile(&file("m"), r"\begin{module}[id=m]\adefii{a}\end{module}");
    assert!(unit.symbols.is_empty());
    let arity: Vec<_> = unit
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::MacroArity)
        .collect();
    assert_eq!(arity.len(), 1);

    let named = compile(
        &file("m"),
        r"\begin{module}[id=m]\adefii[name=summation-index]{index of summation}{summation}{index}\end{module}",
    );
    let default = compile(
        &file("m"),
        r"\begin{module}[id=m]\adefii{index of summation}{summation}{index}\end{module}",
    );
    let expected = SymbolId {
        module: ModuleId::new(file("m"), "m"),
        name: "summation-index".to_string(),
    };
    assert_eq!(named.symbols[0].id, expected);
    assert_eq!(default.symbols[0].id, expected);
}

#[test]
fn test_inputs_without_disk() {
    let mut ws = Workspace::new(WorkspaceConfig::new("/mh")).unwrap();
    let cancel = CancellationToken::new();
    ws.update(
        vec![
            SourceInput::new(file("x"), r"\begin{modsig}{x}\symi{thing}\symi{other}\end{modsig}"),
            SourceInput::new(file("y"), r"\begin{mhmodnl}{x}{en}\defi{thing}\end{mhmodnl}"),
        ],
        &cancel,
    )
    .unwrap();
    assert_eq!(codes(&ws), [DiagnosticCode::MissingVerbalization]);

    ws.update(
        vec![SourceInput::new(file("x"), r"\begin{modsig}{x}\symi{thing}\symi[noverb]{other}\end{modsig}")],
        &cancel,
    )
    .unwrap();
    assert!(codes(&ws).is_empty());
}
