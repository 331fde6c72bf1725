/// Parser core types and token helpers.
///
/// This chunk defines the [`Parser`] type, its frame stack and the small cursor helpers shared
/// across the other parser chunks.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a single module.
/// - A body stops at a closer only when some enclosing frame can take it; otherwise the closer is
///   absorbed as a plain token. That single rule drives all recovery.

/// Nesting past this depth parses openers as plain tokens.
const MAX_NESTING: usize = 256;

/// An open construct waiting for its closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// `{` of a required argument or a stray group.
    Brace,
    /// `[` of a stray group.
    Bracket,
    /// `\begin{..}` waiting for `\end`.
    Env,
    /// One value of an optional argument list; stops at `,` and `]`.
    ArgValue,
}

/// Parser state.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    frames: Vec<Frame>,
    diagnostics: Vec<Diagnostic>,
    /// Token positions where an optional argument already failed to close.
    failed_oargs: HashSet<usize>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream produced by [`crate::lexer::lex`].
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            frames: Vec::new(),
            diagnostics: Vec::new(),
            failed_oargs: HashSet::new(),
        }
    }

    /// Parse the entire token stream.
    pub fn parse(mut self) -> ParseOutput {
        let mut root = self.body();
        // Frame-less bodies stop at nothing, so the whole stream is consumed here.
        debug_assert!(self.is_at_end());
        root.span = Span::new(0, self.tokens.last().map(|t| t.span.end).unwrap_or(0)).merge(root.span);
        ParseOutput {
            root,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn check_at(&self, offset: usize, kind: TokenKind) -> bool {
        self.tokens.get(self.pos + offset).is_some_and(|t| t.kind == kind)
    }

    /// Consume the current token and return a copy of it.
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    /// Span of the tokens consumed since position `start`.
    ///
    /// An empty range yields a zero-width span where the next token would begin.
    fn span_from(&self, start: usize) -> Span {
        if self.pos > start {
            let first = &self.tokens[start];
            let last = &self.tokens[self.pos - 1];
            return Span::new(first.span.start, last.span.end);
        }
        let offset = match self.tokens.get(self.pos) {
            Some(next) => next.span.start,
            None => self.tokens.last().map(|t| t.span.end).unwrap_or(0),
        };
        Span::empty(offset)
    }

    /// End offset of the last consumed token.
    fn last_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    // ========================================================================
    // Frames
    // ========================================================================

    fn too_deep(&self) -> bool {
        self.frames.len() >= MAX_NESTING
    }

    fn has_frame(&self, frame: Frame) -> bool {
        self.frames.contains(&frame)
    }

    /// Whether a token of this kind ends the body currently being parsed.
    fn closes_current_body(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::RBrace => self.has_frame(Frame::Brace),
            TokenKind::RBracket => matches!(self.frames.last(), Some(Frame::Bracket | Frame::ArgValue)),
            TokenKind::Comma => matches!(self.frames.last(), Some(Frame::ArgValue)),
            TokenKind::End => self.has_frame(Frame::Env),
            _ => false,
        }
    }

    /// Parse something with `frame` pushed for its duration.
    fn within<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> T) -> T {
        self.frames.push(frame);
        let out = f(self);
        self.frames.pop();
        out
    }
}
