//! Token types for the stex lexer.
//!
//! Tokens keep their raw text. Whitespace between tokens is dropped by the lexer, so consumers that
//! need the words of an argument read them back from the source through the token spans.

use crate::ast::{Position, Span};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// A run of ordinary characters, or an escaped literal such as `\%`.
    Text,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Equals,
    /// Opaque math span (`$..$`, `\[..\]`, `\begin{align}..\end{align}`, ...).
    Math,
    /// Opaque verbatim span (`\verb|..|`, `\lstinline{..}`).
    Verbatim,
    /// `\begin`.
    Begin,
    /// `\end`.
    End,
    /// `\name` or `\name*`.
    InlineEnvName,
    /// Malformed markup (unterminated span, dangling escape).
    Error,
}

impl TokenKind {
    /// Short uppercase label used in debug dumps.
    pub fn label(self) -> &'static str {
        match self {
            TokenKind::Text => "TEXT",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Equals => "=",
            TokenKind::Math => "MATH",
            TokenKind::Verbatim => "VERBATIM",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::InlineEnvName => "INLINE_ENV_NAME",
            TokenKind::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A token with its kind, source span, start position and raw text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub position: Position,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, position: Position, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            position,
            text: text.into(),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
