//! Lexer for stex documents
//!
//! Handles tokenization including:
//! - Plain text runs, split at whitespace and structural characters (`$ [ { % } ] \ , =`)
//! - Escapes: `\begin`, `\end`, macro names, escaped literals
//! - Opaque math spans (`$..$`, `$$..$$`, `\(..\)`, `\[..\]`, math environments)
//! - Verbatim commands (`\verb|..|`, `\lstinline{..}`)
//! - `%` line comments (dropped)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `spans` - Math and verbatim span scanning (the non-markup modes)

mod spans;
pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::ast::{Position, Span};
use stex_core::lang::environments;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer mode stack (simplified):
//
// [Markup] → see `$`, `\(`, `\[`, `\begin{align}` → push [Math] → closer → pop
//     ↓
//    see `\verb`, `\lstinline` → push [Verbatim] → groups/delimiter done → pop
//
// Content never fails lexing: an unterminated span becomes an ERROR token.
// ============================================================================

/// Closer a math span is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MathCloser {
    Dollar,
    DoubleDollar,
    Paren,
    Bracket,
    /// `\end{name}` for a math environment.
    Environment(String),
}

/// How a verbatim command delimits its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerbatimCloser {
    /// `\lstinline[opts]{code}`: uninterpreted brace/bracket groups.
    Groups,
    /// `\verb!code!` and friends.
    Delimiter(char),
    /// `\verb<code>`: dropped without a token.
    Angle,
}

/// Start of the construct that opened a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    offset: usize,
    position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LexMode {
    Markup,
    Math { closer: MathCloser, open: Mark },
    Verbatim { closer: VerbatimCloser, open: Mark },
}

/// Lexer for stex source text.
///
/// Converts source text into a flat token stream. The scan is driven by a mode stack: markup mode
/// classifies characters, the span modes swallow raw text until their closer.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    modes: Vec<LexMode>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 0,
            column: 0,
            modes: vec![LexMode::Markup],
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source text.
    ///
    /// Never fails: malformed markup is reported as [`TokenKind::Error`] tokens.
    pub fn tokenize(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            match self.modes.last().cloned().unwrap_or(LexMode::Markup) {
                LexMode::Markup => self.scan_markup(),
                LexMode::Math { closer, open } => self.scan_math(&closer, open),
                LexMode::Verbatim { closer, open } => self.scan_verbatim(closer, open),
            }
        }
        // A span opened by the very last characters never got a chance to scan.
        while let Some(mode) = self.modes.pop() {
            match mode {
                LexMode::Markup => {}
                LexMode::Math { open, .. } => self.add_token_from(TokenKind::Error, open),
                LexMode::Verbatim { closer, open } => {
                    if closer == VerbatimCloser::Groups {
                        self.add_token_from(TokenKind::Verbatim, open);
                    } else {
                        self.add_token_from(TokenKind::Error, open);
                    }
                }
            }
        }
        self.tokens
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advance to byte offset `target`, keeping line/column in sync.
    fn advance_to(&mut self, target: usize) {
        while self.pos < target && self.advance().is_some() {}
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.pos,
            position: Position::new(self.line, self.column),
        }
    }

    /// Emit a token spanning from `start` to the current position.
    fn add_token_from(&mut self, kind: TokenKind, start: Mark) {
        let span = Span::new(start.offset, self.pos);
        let text = &self.source[start.offset..self.pos];
        self.tokens.push(Token::new(kind, span, start.position, text));
    }

    // ========================================================================
    // Markup mode
    // ========================================================================

    fn scan_markup(&mut self) {
        let Some(c) = self.peek() else { return };
        let start = self.mark();
        match c {
            c if c.is_whitespace() => {
                self.advance();
            }
            '%' => self.skip_comment(),
            '{' => self.single(TokenKind::LBrace, start),
            '}' => self.single(TokenKind::RBrace, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            ',' => self.single(TokenKind::Comma, start),
            '=' => self.single(TokenKind::Equals, start),
            '$' => {
                self.advance();
                let closer = if self.match_char('$') {
                    MathCloser::DoubleDollar
                } else {
                    MathCloser::Dollar
                };
                self.modes.push(LexMode::Math { closer, open: start });
            }
            '\\' => self.scan_escape(start),
            _ => self.scan_text(start),
        }
    }

    fn single(&mut self, kind: TokenKind, start: Mark) {
        self.advance();
        self.add_token_from(kind, start);
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_text(&mut self, start: Mark) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || is_structural(c) {
                break;
            }
            self.advance();
        }
        self.add_token_from(TokenKind::Text, start);
    }

    fn scan_escape(&mut self, start: Mark) {
        self.advance(); // '\'
        match self.peek() {
            None => self.add_token_from(TokenKind::Error, start),
            Some('(') => {
                self.advance();
                self.modes.push(LexMode::Math {
                    closer: MathCloser::Paren,
                    open: start,
                });
            }
            Some('[') => {
                self.advance();
                self.modes.push(LexMode::Math {
                    closer: MathCloser::Bracket,
                    open: start,
                });
            }
            Some(c) if c.is_ascii_alphabetic() => self.scan_command(start),
            Some(_) => {
                // Escaped literal: `\%`, `\{`, `\\`, `\,` ...
                self.advance();
                self.add_token_from(TokenKind::Text, start);
            }
        }
    }

    fn scan_command(&mut self, start: Mark) {
        let name_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance();
        }
        let name = &self.source[name_start..self.pos];
        match name {
            "begin" => {
                if let Some((env, header_end)) = self.peek_math_environment() {
                    self.advance_to(header_end);
                    self.modes.push(LexMode::Math {
                        closer: MathCloser::Environment(env),
                        open: start,
                    });
                } else {
                    self.add_token_from(TokenKind::Begin, start);
                }
            }
            "end" => self.add_token_from(TokenKind::End, start),
            _ => {
                self.match_char('*');
                let name = &self.source[name_start..self.pos];
                if environments::is_verbatim_command(name) {
                    let closer = match self.peek() {
                        Some(d) if environments::VERBATIM_DELIMITERS.contains(&d) => VerbatimCloser::Delimiter(d),
                        Some('<') => VerbatimCloser::Angle,
                        _ => VerbatimCloser::Groups,
                    };
                    self.modes.push(LexMode::Verbatim { closer, open: start });
                } else {
                    self.add_token_from(TokenKind::InlineEnvName, start);
                }
            }
        }
    }

    /// Look ahead for `{name}` naming a math environment right after `\begin`.
    ///
    /// Returns the environment name and the offset just past the closing brace, without consuming.
    fn peek_math_environment(&self) -> Option<(String, usize)> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        let skipped = rest.len() - trimmed.len();
        let inner = trimmed.strip_prefix('{')?;
        let close = inner.find(['}', '\n', '{', '\\'])?;
        if !inner[close..].starts_with('}') {
            return None;
        }
        let name = inner[..close].trim();
        if !environments::is_math_environment(name) {
            return None;
        }
        let header_end = self.pos + skipped + 1 + close + 1;
        Some((name.to_string(), header_end))
    }
}

/// Characters that end a text run.
pub fn is_structural(c: char) -> bool {
    matches!(c, '$' | '[' | '{' | '%' | '}' | ']' | '\\' | ',' | '=')
}

/// Tokenize source text.
///
/// This is the main public entrypoint for lexing. Lexing cannot fail on content; I/O is the
/// caller's concern.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
