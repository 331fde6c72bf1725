/// Argument parsing for environments and inline macros.
///
/// ## Notes
/// - Arguments are greedy: every `{` or `[` directly following a macro or `\begin{..}` header is
///   an argument group, whitespace notwithstanding.
/// - An optional argument whose `]` never shows up before an enclosing closer is abandoned by
///   backtracking, and the `[` is reparsed as ordinary text.
impl<'a> Parser<'a> {
    fn args(&mut self) -> Vec<Arg> {
        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBrace) => args.push(Arg::Rarg(self.rarg())),
                Some(TokenKind::LBracket) => match self.oarg() {
                    Some(oarg) => args.push(Arg::Oarg(oarg)),
                    None => break,
                },
                _ => break,
            }
        }
        args
    }

    /// `{ body }`.
    fn rarg(&mut self) -> Rarg {
        let open = self.pos;
        self.pos += 1;
        let body = self.within(Frame::Brace, |p| p.body());
        if self.check(TokenKind::RBrace) {
            self.pos += 1;
        } else {
            let open_span = self.tokens[open].span;
            self.diagnostics.push(syntax::unclosed_group(open_span));
        }
        Rarg {
            body,
            span: self.span_from(open),
        }
    }

    /// `[ arglist ]`, or `None` with the cursor restored when it never closes.
    fn oarg(&mut self) -> Option<Oarg> {
        let open = self.pos;
        if self.failed_oargs.contains(&open) {
            return None;
        }
        let diagnostics_len = self.diagnostics.len();
        self.pos += 1;

        let mut args = ArgList::default();
        if !self.check(TokenKind::RBracket) {
            loop {
                args.args.push(self.argument());
                match self.peek_kind() {
                    Some(TokenKind::Comma) => self.pos += 1,
                    _ => break,
                }
            }
        }

        if self.check(TokenKind::RBracket) {
            self.pos += 1;
            return Some(Oarg {
                args,
                span: self.span_from(open),
            });
        }

        self.pos = open;
        self.diagnostics.truncate(diagnostics_len);
        self.failed_oargs.insert(open);
        None
    }

    /// `(name '=')? value`.
    fn argument(&mut self) -> KeyValueArg {
        let start = self.pos;
        let key = if self.check(TokenKind::Text) && self.check_at(1, TokenKind::Equals) {
            let key = self.bump();
            self.pos += 1;
            key
        } else {
            None
        };
        let value = self.within(Frame::ArgValue, |p| p.body());
        KeyValueArg {
            key,
            value,
            span: self.span_from(start),
        }
    }
}
