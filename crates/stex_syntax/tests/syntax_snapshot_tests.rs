//! Snapshot tests for the parsed tree shape.
//!
//! Each case renders the tree as an s-expression (see `Body::sexpr`) so recovery decisions are
//! visible at a glance.
//!
//! Review changes: `cargo insta review`

use stex_syntax::diagnostics::DiagnosticCode;
use stex_syntax::parser::parse_source;

fn tree(source: &str) -> String {
    parse_source(source).root.sexpr()
}

fn diagnostic_codes(source: &str) -> Vec<DiagnosticCode> {
    parse_source(source).diagnostics.into_iter().map(|d| d.code).collect()
}

#[test]
fn snapshot_module_with_symbol() {
    insta::assert_snapshot!(tree(r"\begin{modsig}{x}\symi{a}\end{modsig}"), @r"(env modsig {x} | (\symi {a}))");
}

#[test]
fn snapshot_binding_header_arguments() {
    insta::assert_snapshot!(
        tree(r"\begin{modnl}[creators=foo]{x}{en} \defi{a} \end{modnl}"),
        @r"(env modnl [creators=foo] {x} {en} | (\defi {a}))"
    );
}

#[test]
fn snapshot_keyed_and_positional_options() {
    insta::assert_snapshot!(
        tree(r"\symdef[name=foo,noverb]{bar}"),
        @r"(\symdef [name=foo, noverb] {bar})"
    );
    insta::assert_snapshot!(
        tree(r"\trefi[mod?sym]{text} \defi[name=x]{y}"),
        @r"(\trefi [mod?sym] {text}) (\defi [name=x] {y})"
    );
}

#[test]
fn snapshot_macro_inside_option_value() {
    insta::assert_snapshot!(
        tree(r"\importmodule[load=\MathHub{smglom/sets}]{x}"),
        @r"(\importmodule [load=(\MathHub {smglom/sets})] {x})"
    );
}

#[test]
fn snapshot_opaque_spans() {
    insta::assert_snapshot!(tree(r"see $x$ and \verb|{| done"), @r"see (math $x$) and \verb|{| done");
}

#[test]
fn snapshot_mismatched_environment() {
    insta::assert_snapshot!(tree(r"\begin{a}x\end{b}"), @r"(env a | x /b)");
    assert_eq!(diagnostic_codes(r"\begin{a}x\end{b}"), [DiagnosticCode::MismatchedEnvironment]);
}

#[test]
fn snapshot_unclosed_environment() {
    insta::assert_snapshot!(tree(r"\begin{a} x"), @r"(env a | x ...)");
}

#[test]
fn snapshot_stray_closers_and_groups() {
    insta::assert_snapshot!(tree("a } b [c] d"), @"a } b g[c] d");
    assert_eq!(diagnostic_codes("a } b [c] d"), [DiagnosticCode::UnexpectedCloser]);
}

#[test]
fn snapshot_unclosed_option_falls_back_to_text() {
    insta::assert_snapshot!(tree(r"{\defi[x}"), @r"g{(\defi) [ x}");
    assert!(diagnostic_codes(r"{\defi[x}").is_empty());
}

#[test]
fn snapshot_unclosed_group() {
    insta::assert_snapshot!(tree("{unclosed"), @"g{unclosed");
    assert_eq!(diagnostic_codes("{unclosed"), [DiagnosticCode::UnclosedGroup]);
}
