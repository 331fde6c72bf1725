/// Result of parsing one file: the root body and the syntax diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub root: Body,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a token stream into a syntax tree.
///
/// This is the main public entrypoint for parsing. It never fails; problems are reported in
/// [`ParseOutput::diagnostics`].
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> ParseOutput {
    let output = Parser::new(tokens).parse();
    tracing::trace!(diagnostics = output.diagnostics.len(), "parsed");
    output
}

/// Lex and parse source text in one step.
pub fn parse_source(source: &str) -> ParseOutput {
    let tokens = crate::lexer::lex(source);
    parse(&tokens)
}
