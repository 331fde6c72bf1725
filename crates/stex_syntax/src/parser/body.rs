/// Body, group and environment parsing.
///
/// ## Notes
/// - Stray `}` and `\end` become plain tokens with an `UnexpectedCloser` diagnostic.
/// - Stray `]` is silent: prose uses brackets freely.
/// - An unclosed `[` group is spliced back into its parent as a plain `[` followed by its children.
impl<'a> Parser<'a> {
    /// Parse nodes until end of input or a closer that belongs to an enclosing frame.
    fn body(&mut self) -> Body {
        let start = self.pos;
        let mut children = Vec::new();
        while let Some(token) = self.peek() {
            if self.closes_current_body(token.kind) {
                break;
            }
            match token.kind {
                TokenKind::Math => {
                    self.pos += 1;
                    children.push(SyntaxNode::Math(token.clone()));
                }
                TokenKind::Begin if !self.too_deep() => {
                    self.pos += 1;
                    self.environment_into(token.clone(), &mut children);
                }
                TokenKind::InlineEnvName => {
                    self.pos += 1;
                    children.push(self.inline_env(token.clone()));
                }
                TokenKind::LBrace if !self.too_deep() => {
                    self.pos += 1;
                    children.push(self.brace_group(token.clone()));
                }
                TokenKind::LBracket if !self.too_deep() => {
                    self.pos += 1;
                    self.bracket_group_into(token.clone(), &mut children);
                }
                TokenKind::RBrace | TokenKind::End => {
                    self.pos += 1;
                    self.diagnostics.push(syntax::unexpected_closer(&token.text, token.span));
                    children.push(SyntaxNode::Token(token.clone()));
                }
                TokenKind::Error => {
                    self.pos += 1;
                    self.diagnostics.push(syntax::malformed_token(&token.text, token.span));
                    children.push(SyntaxNode::Token(token.clone()));
                }
                _ => {
                    self.pos += 1;
                    children.push(SyntaxNode::Token(token.clone()));
                }
            }
        }
        Body {
            span: self.span_from(start),
            children,
        }
    }

    /// `{ body }` in running text.
    fn brace_group(&mut self, open: Token) -> SyntaxNode {
        let body = self.within(Frame::Brace, |p| p.body());
        let closed = self.check(TokenKind::RBrace);
        if closed {
            self.pos += 1;
        } else {
            self.diagnostics.push(syntax::unclosed_group(open.span));
        }
        SyntaxNode::Group(Box::new(Group {
            delimiter: GroupDelimiter::Brace,
            body,
            closed,
            span: Span::new(open.span.start, self.last_end()),
        }))
    }

    /// `[ body ]` in running text, spliced into `out` when never closed.
    fn bracket_group_into(&mut self, open: Token, out: &mut Vec<SyntaxNode>) {
        let body = self.within(Frame::Bracket, |p| p.body());
        if self.check(TokenKind::RBracket) {
            self.pos += 1;
            out.push(SyntaxNode::Group(Box::new(Group {
                delimiter: GroupDelimiter::Bracket,
                body,
                closed: true,
                span: Span::new(open.span.start, self.last_end()),
            })));
        } else {
            out.push(SyntaxNode::Token(open));
            out.extend(body.children);
        }
    }

    /// `\name args?`.
    fn inline_env(&mut self, name: Token) -> SyntaxNode {
        let args = if self.too_deep() { Vec::new() } else { self.args() };
        let span = Span::new(name.span.start, self.last_end());
        SyntaxNode::InlineEnv(Box::new(InlineEnv { name, args, span }))
    }

    /// `{ TEXT }` right after `\begin` or `\end`.
    fn environment_name(&mut self) -> Option<Token> {
        let well_formed = self.check(TokenKind::LBrace)
            && self.check_at(1, TokenKind::Text)
            && self.check_at(2, TokenKind::RBrace);
        if !well_formed {
            return None;
        }
        let name = self.tokens.get(self.pos + 1).cloned();
        self.pos += 3;
        name
    }

    /// `\begin{name} args? body \end{name}`, or a plain `\begin` token when the name is missing.
    fn environment_into(&mut self, begin: Token, out: &mut Vec<SyntaxNode>) {
        let start = begin.span.start;
        let Some(name) = self.environment_name() else {
            self.diagnostics
                .push(syntax::missing_environment_name(&begin.text, begin.span));
            out.push(SyntaxNode::Token(begin));
            return;
        };
        let args = self.args();
        let begin = EnvBegin {
            name,
            args,
            span: Span::new(start, self.last_end()),
        };

        let body = self.within(Frame::Env, |p| p.body());

        let end = if self.check(TokenKind::End) {
            let end_start = self.pos;
            let keyword_span = self.bump().map(|t| t.span).unwrap_or_default();
            let end_name = self.environment_name();
            let end_span = self.span_from(end_start);
            match &end_name {
                Some(found) if found.text != begin.name.text => self.diagnostics.push(
                    syntax::mismatched_environment(&begin.name.text, &found.text, end_span, begin.span),
                ),
                Some(_) => {}
                None => self
                    .diagnostics
                    .push(syntax::missing_environment_name("\\end", keyword_span)),
            }
            Some(EnvEnd {
                name: end_name,
                span: end_span,
            })
        } else {
            self.diagnostics
                .push(syntax::unclosed_environment(&begin.name.text, begin.span));
            None
        };

        out.push(SyntaxNode::Env(Box::new(Env {
            begin,
            body,
            end,
            span: Span::new(start, self.last_end()),
        })));
    }
}
