//! Concrete syntax tree for stex documents.
//!
//! The tree mirrors the markup closely: environments, inline macros with their argument groups, stray
//! groups, opaque math spans and plain tokens. Nothing is dropped, so any span in the file can be
//! mapped back to the node that covers it.

use crate::lexer::Token;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Source location span (byte offsets, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` lies inside the span. The end offset counts, so a cursor placed right after
    /// a macro still hits it.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A zero-based line/column position. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyntaxNode {
    /// Opaque math or math-like environment span.
    Math(Token),
    Env(Box<Env>),
    InlineEnv(Box<InlineEnv>),
    /// A stray `{ .. }` or `[ .. ]` group in running text.
    Group(Box<Group>),
    /// Any other token: text, verbatim spans, stray closers, separators and error tokens.
    Token(Token),
}

impl SyntaxNode {
    pub fn span(&self) -> Span {
        match self {
            SyntaxNode::Math(t) | SyntaxNode::Token(t) => t.span,
            SyntaxNode::Env(e) => e.span,
            SyntaxNode::InlineEnv(e) => e.span,
            SyntaxNode::Group(g) => g.span,
        }
    }
}

/// `\begin{name} args body \end{name}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Env {
    pub begin: EnvBegin,
    pub body: Body,
    /// `None` when the environment was never closed.
    pub end: Option<EnvEnd>,
    pub span: Span,
}

impl Env {
    pub fn name(&self) -> &str {
        &self.begin.name.text
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvBegin {
    /// The environment name token inside the braces.
    pub name: Token,
    pub args: Vec<Arg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvEnd {
    pub name: Option<Token>,
    pub span: Span,
}

/// `\name args`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InlineEnv {
    /// The `INLINE_ENV_NAME` token, including the backslash.
    pub name: Token,
    pub args: Vec<Arg>,
    pub span: Span,
}

impl InlineEnv {
    /// Macro name without the leading backslash.
    pub fn macro_name(&self) -> &str {
        self.name.text.strip_prefix('\\').unwrap_or(&self.name.text)
    }
}

/// Either kind of argument group, in source order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arg {
    Rarg(Rarg),
    Oarg(Oarg),
}

impl Arg {
    pub fn span(&self) -> Span {
        match self {
            Arg::Rarg(r) => r.span,
            Arg::Oarg(o) => o.span,
        }
    }
}

/// `{ body }`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rarg {
    pub body: Body,
    /// Span including the braces.
    pub span: Span,
}

/// `[ arglist ]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Oarg {
    pub args: ArgList,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArgList {
    pub args: Vec<KeyValueArg>,
}

/// `name=value` or a bare `value` inside an optional argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyValueArg {
    pub key: Option<Token>,
    pub value: Body,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroupDelimiter {
    Brace,
    Bracket,
}

/// A stray group in running text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    pub delimiter: GroupDelimiter,
    pub body: Body,
    /// `false` when the closing delimiter was missing.
    pub closed: bool,
    pub span: Span,
}

impl InlineEnv {
    pub fn rargs(&self) -> impl Iterator<Item = &Rarg> {
        self.args.iter().filter_map(|a| match a {
            Arg::Rarg(r) => Some(r),
            Arg::Oarg(_) => None,
        })
    }

    pub fn oargs(&self) -> impl Iterator<Item = &Oarg> {
        self.args.iter().filter_map(|a| match a {
            Arg::Oarg(o) => Some(o),
            Arg::Rarg(_) => None,
        })
    }
}

impl EnvBegin {
    pub fn rargs(&self) -> impl Iterator<Item = &Rarg> {
        self.args.iter().filter_map(|a| match a {
            Arg::Rarg(r) => Some(r),
            Arg::Oarg(_) => None,
        })
    }

    pub fn oargs(&self) -> impl Iterator<Item = &Oarg> {
        self.args.iter().filter_map(|a| match a {
            Arg::Oarg(o) => Some(o),
            Arg::Rarg(_) => None,
        })
    }
}

impl ArgList {
    /// Value of the first `key=value` entry with this key.
    pub fn get(&self, key: &str) -> Option<&KeyValueArg> {
        self.args
            .iter()
            .find(|a| a.key.as_ref().is_some_and(|k| k.text == key))
    }

    /// Entries without a key, in order.
    pub fn positional(&self) -> impl Iterator<Item = &KeyValueArg> {
        self.args.iter().filter(|a| a.key.is_none())
    }
}

// ============================================================================
// Source text helpers
// ============================================================================

/// Slice `source` by `span`, collapsing whitespace runs to single spaces and trimming the ends.
///
/// Argument values are read from the source rather than from tokens because the lexer drops
/// whitespace, and `{index of summation}` must keep its word breaks.
pub fn normalized_text(source: &str, span: Span) -> String {
    source
        .get(span.start..span.end)
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Body {
    /// Normalized source text of this body.
    pub fn text(&self, source: &str) -> String {
        normalized_text(source, self.span)
    }
}

// ============================================================================
// Debug rendering
// ============================================================================

impl Body {
    /// Compact s-expression rendering of the tree, used by `stexls --parse` and snapshot tests.
    ///
    /// Environments print as `(env NAME ARGS | CHILDREN)`, with `/END` before the paren when the end
    /// name differs and `...` when it is missing. Stray groups are prefixed with `g`.
    pub fn sexpr(&self) -> String {
        let mut out = String::new();
        write_children(&mut out, &self.children);
        out
    }
}

fn write_children(out: &mut String, children: &[SyntaxNode]) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_node(out, child);
    }
}

fn write_args(out: &mut String, args: &[Arg]) {
    for arg in args {
        out.push(' ');
        match arg {
            Arg::Rarg(r) => {
                out.push('{');
                write_children(out, &r.body.children);
                out.push('}');
            }
            Arg::Oarg(o) => {
                out.push('[');
                for (i, kv) in o.args.args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(key) = &kv.key {
                        out.push_str(&key.text);
                        out.push('=');
                    }
                    write_children(out, &kv.value.children);
                }
                out.push(']');
            }
        }
    }
}

fn write_node(out: &mut String, node: &SyntaxNode) {
    match node {
        SyntaxNode::Token(t) => out.push_str(&t.text),
        SyntaxNode::Math(t) => {
            out.push_str("(math ");
            out.push_str(&t.text);
            out.push(')');
        }
        SyntaxNode::InlineEnv(env) => {
            out.push('(');
            out.push_str(&env.name.text);
            write_args(out, &env.args);
            out.push(')');
        }
        SyntaxNode::Env(env) => {
            out.push_str("(env ");
            out.push_str(env.name());
            write_args(out, &env.begin.args);
            out.push_str(" |");
            if !env.body.children.is_empty() {
                out.push(' ');
                write_children(out, &env.body.children);
            }
            match &env.end {
                Some(EnvEnd { name: Some(n), .. }) if n.text == env.name() => {}
                Some(EnvEnd { name: Some(n), .. }) => {
                    out.push_str(" /");
                    out.push_str(&n.text);
                }
                Some(EnvEnd { name: None, .. }) => out.push_str(" /?"),
                None => out.push_str(" ..."),
            }
            out.push(')');
        }
        SyntaxNode::Group(g) => {
            let (open, close) = match g.delimiter {
                GroupDelimiter::Brace => ("g{", "}"),
                GroupDelimiter::Bracket => ("g[", "]"),
            };
            out.push_str(open);
            write_children(out, &g.body.children);
            if g.closed {
                out.push_str(close);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_contains_is_end_inclusive() {
        let s = Span::new(2, 5);
        assert!(s.contains(2));
        assert!(s.contains(5));
        assert!(!s.contains(6));
        assert!(!s.contains(1));
    }

    #[test]
    fn span_overlap_excludes_touching_edges() {
        assert!(Span::new(0, 4).overlaps(Span::new(3, 6)));
        assert!(!Span::new(0, 3).overlaps(Span::new(3, 6)));
    }

    #[test]
    fn normalized_text_collapses_whitespace() {
        let src = "{  index \n of\tsummation }";
        assert_eq!(normalized_text(src, Span::new(1, src.len() - 1)), "index of summation");
        assert_eq!(normalized_text(src, Span::new(40, 50)), "");
    }
}
