//! Advisory hints from an external term tagger.
//!
//! A [`SpanOracle`] proposes spans of running text that look like terms. Those that clear the
//! configured confidence and are not already covered by a definition, a reference or math become
//! `Advisory` hints. The oracle never influences compilation or linking.

use crate::frontend::ast::{Arg, Body, Span, SyntaxNode};
use crate::frontend::diagnostics::{Diagnostic, errors};
use crate::frontend::symbols::CompiledUnit;

/// A span the tagger believes is a term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestedSpan {
    pub span: Span,
    /// In `0.0..=1.0`.
    pub confidence: f32,
}

pub trait SpanOracle {
    fn suggest_spans(&self, text: &str) -> Vec<SuggestedSpan>;
}

/// Hint diagnostics for the suggestions of `oracle` on `text`, the source `unit` was compiled from.
pub fn advisory_hints(unit: &CompiledUnit, text: &str, oracle: &dyn SpanOracle, threshold: f32) -> Vec<Diagnostic> {
    let mut covered: Vec<Span> = unit
        .symbols
        .iter()
        .map(|s| s.span)
        .chain(unit.references.iter().map(|r| r.span))
        .collect();
    math_spans(&unit.tree, &mut covered);

    let mut suggestions = oracle.suggest_spans(text);
    suggestions.sort_by_key(|s| (s.span.start, s.span.end));
    let hints: Vec<Diagnostic> = suggestions
        .into_iter()
        .filter(|s| s.confidence >= threshold && !s.span.is_empty())
        .filter(|s| !covered.iter().any(|c| c.overlaps(s.span)))
        .filter_map(|s| {
            let term = text.get(s.span.start..s.span.end)?;
            Some(errors::advisory(term.trim(), s.confidence, s.span))
        })
        .collect();
    tracing::debug!(file = %unit.file, hints = hints.len(), "advisory pass");
    hints
}

fn math_spans(body: &Body, out: &mut Vec<Span>) {
    for node in &body.children {
        match node {
            SyntaxNode::Math(token) => out.push(token.span),
            SyntaxNode::Env(env) => {
                args_math_spans(&env.begin.args, out);
                math_spans(&env.body, out);
            }
            SyntaxNode::InlineEnv(inline) => args_math_spans(&inline.args, out),
            SyntaxNode::Group(group) => math_spans(&group.body, out),
            SyntaxNode::Token(_) => {}
        }
    }
}

fn args_math_spans(args: &[Arg], out: &mut Vec<Span>) {
    for arg in args {
        match arg {
            Arg::Rarg(rarg) => math_spans(&rarg.body, out),
            Arg::Oarg(oarg) => oarg.args.args.iter().for_each(|kv| math_spans(&kv.value, out)),
        }
    }
}
