use super::*;
use crate::frontend::diagnostics::DiagnosticCode;
use crate::frontend::symbols::{Locator, ReferenceKind, SymbolFamily};
use stex_core::lang::environments::ModuleKind;

fn file(name: &str) -> FileId {
    FileId::new("repo", "", name)
}

fn codes(unit: &CompiledUnit) -> Vec<DiagnosticCode> {
    unit.diagnostics.iter().map(|d| d.code).collect()
}

fn names(unit: &CompiledUnit) -> Vec<&str> {
    unit.symbols.iter().map(|s| s.id.name.as_str()).collect()
}

fn in_module(body: &str) -> CompiledUnit {
    compile(&file("x"), &format!("\\begin{{module}}{body}\\end{{module}}"))
}

// ---- modules ----

#[test]
fn test_signature_module_with_symbol() {
    let unit = compile(&file("x"), r"\begin{modsig}{x}\symi{thing}\end{modsig}");
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    assert_eq!(unit.modules.len(), 1);
    assert_eq!(unit.modules[0].kind, ModuleKind::Signature);
    assert_eq!(unit.modules[0].id.name, "x");
    assert_eq!(names(&unit), ["thing"]);
    assert_eq!(unit.symbols[0].family, SymbolFamily::Symi);
    assert!(unit.symbols[0].display_forms.is_empty());
}

#[test]
fn test_binding_module_links_to_its_signature() {
    let unit = compile(&file("y"), r"\begin{mhmodnl}{x}{en}\defi{thing}\end{mhmodnl}");
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);

    let module = &unit.modules[0];
    assert_eq!(module.id.name, "x.en");
    assert_eq!(module.kind, ModuleKind::LanguageBoundWithLoadPath);
    assert_eq!(module.language.as_deref(), Some("en"));
    assert_eq!(module.signature.as_deref(), Some("x"));

    assert_eq!(unit.imports.len(), 1);
    let edge = &unit.imports[0];
    assert!(edge.implicit);
    assert!(!edge.export);
    assert_eq!(
        edge.locator,
        Locator::Repository {
            repository: "repo".into(),
            directory: String::new(),
            file: "x".into(),
            module: "x".into(),
        }
    );

    assert_eq!(names(&unit), ["thing"]);
    assert_eq!(unit.references.len(), 1);
    let reference = &unit.references[0];
    assert_eq!(reference.kind, ReferenceKind::Definition);
    assert_eq!(reference.qualifier.as_deref(), Some("x"));
    assert_eq!(reference.name, "thing");
    assert_eq!(reference.module, module.id);
}

#[test]
fn test_module_name_from_id_or_file_stem() {
    let unit = compile(&file("x"), r"\begin{module}[id=foo]\end{module}\begin{module}\end{module}");
    let names: Vec<_> = unit.modules.iter().map(|m| m.id.name.as_str()).collect();
    assert_eq!(names, ["foo", "x"]);
    assert!(unit.modules.iter().all(|m| m.kind == ModuleKind::MonoLingual));
}

#[test]
fn test_signature_name_must_match_file() {
    let unit = compile(&file("x"), r"\begin{modsig}{other}\end{modsig}");
    assert_eq!(codes(&unit), [DiagnosticCode::FileNameMismatch]);
    assert_eq!(unit.modules[0].id.name, "other");
}

#[test]
fn test_duplicate_module_in_one_file() {
    let unit = compile(&file("x"), r"\begin{modsig}{x}\end{modsig}\begin{modsig}{x}\symi{a}\end{modsig}");
    assert_eq!(codes(&unit), [DiagnosticCode::DuplicateDefinition]);
    assert_eq!(unit.modules.len(), 1);
    assert_eq!(unit.symbols[0].id.module, unit.modules[0].id);
}

#[test]
fn test_module_environment_without_name_is_an_arity_error() {
    let unit = compile(&file("x"), r"\begin{modnl}{x}\end{modnl}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.modules.is_empty());
}

// ---- definitions ----

#[test]
fn test_default_name_joins_parts() {
    let unit = in_module(r"\defii{summation}{index}");
    assert!(unit.diagnostics.is_empty());
    assert_eq!(names(&unit), ["summation-index"]);
    assert_eq!(unit.symbols[0].base_forms, ["summation", "index"]);
    assert_eq!(unit.symbols[0].display_forms, ["summation index"]);
}

#[test]
fn test_whitespace_in_a_part_becomes_dash() {
    let unit = in_module(r"\defi{prime   number}");
    assert_eq!(names(&unit), ["prime-number"]);
}

#[test]
fn test_alternative_form_displays_first_group() {
    let unit = in_module(r"\adefi{primes}{prime}");
    assert_eq!(names(&unit), ["prime"]);
    assert_eq!(unit.symbols[0].display_forms, ["primes"]);
}

#[test]
fn test_name_option_overrides_parts() {
    let unit = in_module(r"\defi[name=foo]{bar}");
    assert_eq!(names(&unit), ["foo"]);
}

#[test]
fn test_capitalized_plural_display() {
    let unit = in_module(r"\Defis{set}");
    assert_eq!(unit.symbols[0].display_forms, ["Sets"]);
    assert_eq!(names(&unit), ["set"]);
}

#[test]
fn test_wrong_arity_yields_one_diagnostic_and_no_symbol() {
    let unit = in_module(r"\adefii{a}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.symbols.is_empty());
}

#[test]
fn test_two_optional_groups_are_an_arity_error() {
    let unit = in_module(r"\defi[name=a][name=b]{c}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.symbols.is_empty());
}

#[test]
fn test_macros_nested_in_arguments_are_compiled() {
    let unit = in_module(r"\textbf{\defi{nested}}");
    assert_eq!(names(&unit), ["nested"]);
}

// ---- symbol introductions ----

#[test]
fn test_symbol_introductions_and_noverb() {
    let unit = compile(
        &file("x"),
        r"\begin{modsig}{x}\symii[noverb]{a}{b}\symdef[noverb={de, en}]{c}\symdef[name=d]{e}\end{modsig}",
    );
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    assert_eq!(names(&unit), ["a-b", "c", "d"]);
    assert!(unit.symbols[0].noverb);
    assert!(!unit.symbols[1].noverb);
    assert_eq!(unit.symbols[1].noverb_langs, ["de", "en"]);
    assert_eq!(unit.symbols[1].family, SymbolFamily::Symdef);
}

#[test]
fn test_symdef_needs_a_group() {
    let unit = compile(&file("x"), r"\begin{modsig}{x}\symdef[name=a]\end{modsig}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.symbols.is_empty());
}

// ---- references ----

#[test]
fn test_reference_annotation_forms() {
    let unit = in_module(r"\trefi[mod?sym]{a}\trefi[?sym]{b}\trefi[mod]{c d}\trefi{e}");
    assert!(unit.diagnostics.is_empty());
    let refs: Vec<_> = unit
        .references
        .iter()
        .map(|r| (r.qualifier.as_deref(), r.name.as_str()))
        .collect();
    assert_eq!(
        refs,
        [(Some("mod"), "sym"), (None, "sym"), (Some("mod"), "c-d"), (None, "e")]
    );
    assert!(unit.references.iter().all(|r| r.kind == ReferenceKind::Tref));
    let indices: Vec<_> = unit.references.iter().map(|r| r.id.index).collect();
    assert_eq!(indices, [0, 1, 2, 3]);
}

#[test]
fn test_reference_display_sugar() {
    let unit = in_module(r"\Trefis{set}\atrefi{groups}{group}");
    let displays: Vec<_> = unit.references.iter().map(|r| r.display.as_str()).collect();
    assert_eq!(displays, ["Sets", "groups"]);
    assert_eq!(unit.references[1].name, "group");
}

#[test]
fn test_module_qualified_reference_without_qualifier_warns() {
    let unit = in_module(r"\mtrefi{a}\mtrefi[m?a]{a}");
    assert_eq!(codes(&unit), [DiagnosticCode::MissingQualifier]);
    assert_eq!(unit.references.len(), 2);
}

#[test]
fn test_binding_reference_defaults_to_signature() {
    let unit = compile(&file("y"), r"\begin{modnl}{x}{de}\trefi{thing}\trefi[other?z]{z}\end{modnl}");
    let qualifiers: Vec<_> = unit.references.iter().map(|r| r.qualifier.as_deref()).collect();
    assert_eq!(qualifiers, [Some("x"), Some("other")]);
}

#[test]
fn test_two_annotations_are_rejected() {
    let unit = in_module(r"\trefi[a, b]{c}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.references.is_empty());
}

// ---- scope ----

#[test]
fn test_macros_outside_modules_are_scope_errors() {
    let unit = compile(&file("x"), r"\defi{a} \trefi{b} \symi{c} \importmodule{d}");
    assert_eq!(codes(&unit), [DiagnosticCode::Scope; 4]);
    assert!(unit.symbols.is_empty() && unit.references.is_empty() && unit.imports.is_empty());
}

#[test]
fn test_signature_constructs_inside_bindings() {
    let unit = compile(
        &file("y"),
        r"\begin{modnl}{x}{en}\symi{a}\gimport{b}\guse{c}\begin{modsig}{y}\end{modsig}\end{modnl}",
    );
    assert_eq!(codes(&unit), [DiagnosticCode::Scope; 3]);
    assert!(unit.symbols.is_empty());
    // the implicit signature edge plus `\guse`
    let macros: Vec<_> = unit.imports.iter().map(|e| e.macro_name.as_str()).collect();
    assert_eq!(macros, ["modnl", "guse"]);
    // the nested environment is still opened
    assert_eq!(unit.modules.len(), 2);
}

#[test]
fn test_arity_is_checked_before_scope() {
    let unit = compile(&file("x"), r"\defii{a}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
}

// ---- imports ----

fn locators(unit: &CompiledUnit) -> Vec<Locator> {
    unit.imports.iter().map(|e| e.locator.clone()).collect()
}

fn repository(repository: &str, directory: &str, file: &str, module: &str) -> Locator {
    Locator::Repository {
        repository: repository.into(),
        directory: directory.into(),
        file: file.into(),
        module: module.into(),
    }
}

#[test]
fn test_gimport_locators() {
    let unit = in_module(r"\gimport[smglom/sets]{set}\guse{local}");
    assert_eq!(
        locators(&unit),
        [
            repository("smglom/sets", "", "set", "set"),
            Locator::Relative { module: "local".into() },
        ]
    );
    let exports: Vec<_> = unit.imports.iter().map(|e| e.export).collect();
    assert_eq!(exports, [true, false]);
}

#[test]
fn test_keyed_locators() {
    let unit = in_module(
        r"\importmhmodule[mhrepos=other,dir=a/b]{m}
          \usemhmodule[path=a/b/f]{m}
          \importmodule[load=other/source/d]{m}
          \importmodule[load=\MathHub{other/source/e}]{m}
          \usemodule{m}",
    );
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    assert_eq!(
        locators(&unit),
        [
            repository("other", "a/b", "m", "m"),
            repository("repo", "a/b", "f", "m"),
            Locator::RootPath { path: "other/source/d".into(), module: "m".into() },
            Locator::RootPath { path: "other/source/e".into(), module: "m".into() },
            Locator::SameFile { module: "m".into() },
        ]
    );
    let exports: Vec<_> = unit.imports.iter().map(|e| e.export).collect();
    assert_eq!(exports, [true, false, true, true, false]);
}

#[test]
fn test_import_hints() {
    let unit = in_module(r"\importmhmodule[repos=repo,dir=a]{m}\importmhmodule[dir=]{n}");
    assert_eq!(
        codes(&unit),
        [
            DiagnosticCode::DeprecatedArgument,
            DiagnosticCode::IsCurrentDirectory,
            DiagnosticCode::IsCurrentDirectory,
        ]
    );
    assert_eq!(locators(&unit)[0], repository("repo", "a", "m", "m"));
}

#[test]
fn test_import_needs_exactly_one_group() {
    let unit = in_module(r"\importmodule{a}{b}");
    assert_eq!(codes(&unit), [DiagnosticCode::MacroArity]);
    assert!(unit.imports.is_empty());
}

// ---- purity ----

#[test]
fn test_compile_is_idempotent() {
    let text = r"\begin{modsig}{x}\symi{a}\gimport{b}\end{modsig} \begin{modnl}{x}{en}\defi{a}\trefi{a}\end{modnl}";
    assert_eq!(compile(&file("x"), text), compile(&file("x"), text));
}

#[test]
fn test_syntax_diagnostics_are_kept() {
    let unit = compile(&file("x"), r"\begin{modsig}{x}\symi{a}");
    assert_eq!(codes(&unit), [DiagnosticCode::UnclosedEnvironment]);
    assert_eq!(names(&unit), ["a"]);
}
