//! Diagnostics and error reporting for stex documents
//!
//! Diagnostics are plain data: every stage (parser, compiler, linker) records them and keeps going.
//! Rendering with source highlighting goes through `miette`.

use std::fmt;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource};

use crate::ast::{Position, Span};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How loudly a diagnostic should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticCode {
    // Syntax
    MismatchedEnvironment,
    UnclosedEnvironment,
    UnclosedGroup,
    UnexpectedCloser,
    MalformedToken,
    // Compiler
    MacroArity,
    Scope,
    MissingQualifier,
    FileNameMismatch,
    IsCurrentDirectory,
    DeprecatedArgument,
    // Linker
    UnresolvedImport,
    ImportCycle,
    RedundantImport,
    DuplicateDefinition,
    UnresolvedReference,
    MissingVerbalization,
    ReferenceToNoverb,
    // Oracle
    Advisory,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MismatchedEnvironment => "mismatched-environment",
            DiagnosticCode::UnclosedEnvironment => "unclosed-environment",
            DiagnosticCode::UnclosedGroup => "unclosed-group",
            DiagnosticCode::UnexpectedCloser => "unexpected-closer",
            DiagnosticCode::MalformedToken => "malformed-token",
            DiagnosticCode::MacroArity => "macro-arity",
            DiagnosticCode::Scope => "location-check",
            DiagnosticCode::MissingQualifier => "missing-qualifier",
            DiagnosticCode::FileNameMismatch => "filename-mismatch",
            DiagnosticCode::IsCurrentDirectory => "is-current-dir",
            DiagnosticCode::DeprecatedArgument => "deprecated-argument",
            DiagnosticCode::UnresolvedImport => "unresolved-import",
            DiagnosticCode::ImportCycle => "import-cycle",
            DiagnosticCode::RedundantImport => "redundant-import",
            DiagnosticCode::DuplicateDefinition => "duplicate-definition",
            DiagnosticCode::UnresolvedReference => "unresolved-reference",
            DiagnosticCode::MissingVerbalization => "missing-verbalization",
            DiagnosticCode::ReferenceToNoverb => "referenced-noverb-symbol",
            DiagnosticCode::Advisory => "advisory",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::RedundantImport
            | DiagnosticCode::MissingQualifier
            | DiagnosticCode::FileNameMismatch => Severity::Warning,
            DiagnosticCode::MissingVerbalization => Severity::Info,
            DiagnosticCode::IsCurrentDirectory
            | DiagnosticCode::DeprecatedArgument
            | DiagnosticCode::ReferenceToNoverb
            | DiagnosticCode::Advisory => Severity::Hint,
            _ => Severity::Error,
        }
    }

    /// Whether the code comes from the parser.
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            DiagnosticCode::MismatchedEnvironment
                | DiagnosticCode::UnclosedEnvironment
                | DiagnosticCode::UnclosedGroup
                | DiagnosticCode::UnexpectedCloser
                | DiagnosticCode::MalformedToken
        )
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secondary location in the same file (e.g. the first of two duplicate definitions).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Related {
    pub span: Span,
    pub message: String,
}

/// A diagnostic with location information.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub related: Vec<Related>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            span,
            notes: Vec::new(),
            related: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(Related {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Parser diagnostics catalog.
pub mod syntax {
    use super::{Diagnostic, DiagnosticCode};
    use crate::ast::Span;

    pub fn mismatched_environment(expected: &str, found: &str, end: Span, begin: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MismatchedEnvironment,
            format!("environment `{expected}` closed by `\\end{{{found}}}`"),
            end,
        )
        .with_related(begin, format!("`{expected}` opened here"))
    }

    pub fn unclosed_environment(name: &str, begin: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::UnclosedEnvironment,
            format!("environment `{name}` is never closed"),
            begin,
        )
        .with_note(format!("add `\\end{{{name}}}`"))
    }

    pub fn unclosed_group(open: Span) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::UnclosedGroup, "unclosed `{`", open)
    }

    pub fn unexpected_closer(text: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::UnexpectedCloser,
            format!("unexpected `{text}` without a matching opener"),
            span,
        )
    }

    pub fn missing_environment_name(keyword: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MalformedToken,
            format!("expected `{{name}}` after `{keyword}`"),
            span,
        )
    }

    pub fn malformed_token(text: &str, span: Span) -> Diagnostic {
        let shown: String = text.chars().take(24).collect();
        Diagnostic::new(
            DiagnosticCode::MalformedToken,
            format!("malformed markup starting with `{shown}`"),
            span,
        )
        .with_note("math and verbatim spans must be closed")
    }
}

// ============================================================================
// Line index
// ============================================================================

/// Maps byte offsets to zero-based line/column positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
    /// Characters per line, for column clamping.
    text: String,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            text: source.to_string(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset. Offsets past the end clamp to the end of the text.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Position::new(line as u32, column as u32)
    }

    /// Byte offset of a position, or `None` if the line does not exist. Columns past the end of
    /// the line clamp to the line end.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line_text = self.text.get(start..end).unwrap_or_default();
        let within = line_text
            .char_indices()
            .nth(position.column as usize)
            .map(|(i, _)| i)
            .unwrap_or(line_text.len());
        Some(start + within)
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Owned view of a diagnostic that `miette` can render.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct Report {
    message: String,
    code: DiagnosticCode,
    severity: Severity,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
    src: NamedSource<String>,
}

impl miette::Diagnostic for Report {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info | Severity::Hint => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }
}

/// Render a diagnostic with source context as plain (uncolored) text.
pub fn render(file_name: &str, source: &str, diagnostic: &Diagnostic) -> String {
    let clamp = |span: Span| {
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        (start, end - start)
    };
    let (offset, len) = clamp(diagnostic.span);
    let mut labels = vec![LabeledSpan::new(Some(diagnostic.severity.to_string()), offset, len)];
    for related in &diagnostic.related {
        let (offset, len) = clamp(related.span);
        labels.push(LabeledSpan::new(Some(related.message.clone()), offset, len));
    }
    let report = Report {
        message: diagnostic.message.clone(),
        code: diagnostic.code,
        severity: diagnostic.severity,
        help: (!diagnostic.notes.is_empty()).then(|| diagnostic.notes.join("\n")),
        labels,
        src: NamedSource::new(file_name, source.to_string()),
    };
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, &report).is_err() {
        let position = LineIndex::new(source).position(diagnostic.span.start);
        out = format!(
            "{}[{}]: {} at {}:{}:{}\n",
            diagnostic.severity,
            diagnostic.code,
            diagnostic.message,
            file_name,
            position.line + 1,
            position.column + 1
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_round_trips_positions() {
        let src = "ab\ncdé\n\nx";
        let index = LineIndex::new(src);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(3), Position::new(1, 0));
        assert_eq!(index.position(5), Position::new(1, 2));
        assert_eq!(index.position(src.len()), Position::new(3, 1));
        assert_eq!(index.offset(Position::new(1, 2)), Some(5));
        assert_eq!(index.offset(Position::new(1, 99)), Some(7));
        assert_eq!(index.offset(Position::new(9, 0)), None);
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(DiagnosticCode::ImportCycle.default_severity(), Severity::Error);
        assert_eq!(DiagnosticCode::RedundantImport.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::MissingVerbalization.default_severity(), Severity::Info);
        assert_eq!(DiagnosticCode::Advisory.default_severity(), Severity::Hint);
        assert!(DiagnosticCode::UnclosedGroup.is_syntax());
        assert!(!DiagnosticCode::MacroArity.is_syntax());
    }

    #[test]
    fn test_render_mentions_code_message_and_file() {
        let src = "\\begin{modsig}{x}\n";
        let diag = syntax::unclosed_environment("modsig", Span::new(0, 6));
        let out = render("x.tex", src, &diag);
        assert!(out.contains("unclosed-environment"), "{out}");
        assert!(out.contains("environment `modsig` is never closed"), "{out}");
        assert!(out.contains("x.tex"), "{out}");
    }

    #[test]
    fn test_render_clamps_out_of_range_spans() {
        let diag = Diagnostic::new(DiagnosticCode::MalformedToken, "bad", Span::new(50, 80));
        let out = render("f.tex", "short", &diag);
        assert!(out.contains("bad"), "{out}");
    }
}
