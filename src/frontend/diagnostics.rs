//! Diagnostics for stex compilation and linking
//!
//! The diagnostic types, line index and renderer live in `stex_syntax`; this module adds the
//! catalog of compiler and linker diagnostics so wording stays consistent across passes.

pub use stex_syntax::diagnostics::*;

// ============================================================================
// Error catalog: compiler and linker diagnostics
// ============================================================================

/// Constructors for compiler and linker diagnostics.
pub mod errors {
    use super::{Diagnostic, DiagnosticCode};
    use crate::frontend::ast::Span;

    // ---- compiler ----

    pub fn macro_arity(macro_name: &str, expected: usize, found: usize, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MacroArity,
            format!("`\\{macro_name}` expects {expected} argument group(s), found {found}"),
            span,
        )
    }

    pub fn too_few_arguments(macro_name: &str, minimum: usize, found: usize, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MacroArity,
            format!("`\\{macro_name}` expects at least {minimum} argument group(s), found {found}"),
            span,
        )
    }

    pub fn too_many_options(macro_name: &str, found: usize, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MacroArity,
            format!("`\\{macro_name}` takes at most one optional argument, found {found}"),
            span,
        )
    }

    pub fn outside_module(macro_name: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::Scope,
            format!("`\\{macro_name}` must appear inside a module"),
            span,
        )
    }

    pub fn not_allowed_in_binding(construct: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::Scope,
            format!("`{construct}` is not allowed inside a language-bound module"),
            span,
        )
        .with_note("declare it in the signature module instead")
    }

    pub fn missing_qualifier(macro_name: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MissingQualifier,
            format!("`\\{macro_name}` should name its module as `[module?symbol]`"),
            span,
        )
    }

    pub fn file_name_mismatch(module: &str, file: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::FileNameMismatch,
            format!("signature module `{module}` is declared in file `{file}`"),
            span,
        )
        .with_note(format!("expected the file to be named `{module}`"))
    }

    pub fn is_current_directory(key: &str, value: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::IsCurrentDirectory,
            format!("`{key}={value}` names the current location and can be omitted"),
            span,
        )
    }

    pub fn deprecated_argument(old: &str, new: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::DeprecatedArgument,
            format!("`{old}=` is deprecated, use `{new}=`"),
            span,
        )
    }

    pub fn duplicate_module(name: &str, span: Span, first: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::DuplicateDefinition,
            format!("module `{name}` is declared more than once in this file"),
            span,
        )
        .with_related(first, "first declared here")
    }

    // ---- linker ----

    pub fn unresolved_import(target: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::UnresolvedImport,
            format!("cannot find module `{target}`"),
            span,
        )
    }

    pub fn import_cycle(cycle: &[String], span: Span) -> Diagnostic {
        let mut path = cycle.join(" -> ");
        if let Some(first) = cycle.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        Diagnostic::new(DiagnosticCode::ImportCycle, format!("import cycle: {path}"), span)
            .with_note("modules in a cycle do not see each other's symbols")
    }

    pub fn redundant_import(target: &str, span: Span, original: Option<Span>) -> Diagnostic {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::RedundantImport,
            format!("import of `{target}` is redundant"),
            span,
        );
        match original {
            Some(original) => diagnostic.with_related(original, "already imported here"),
            None => diagnostic,
        }
    }

    pub fn duplicate_definition(name: &str, span: Span, first: Option<Span>) -> Diagnostic {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::DuplicateDefinition,
            format!("symbol `{name}` is defined more than once in this module"),
            span,
        );
        match first {
            Some(first) => diagnostic.with_related(first, "first defined here"),
            None => diagnostic,
        }
    }

    pub fn unresolved_reference(name: &str, qualifier: Option<&str>, span: Span) -> Diagnostic {
        let target = match qualifier {
            Some(module) => format!("{module}?{name}"),
            None => name.to_string(),
        };
        Diagnostic::new(
            DiagnosticCode::UnresolvedReference,
            format!("cannot resolve symbol `{target}`"),
            span,
        )
        .with_note("is the module imported?")
    }

    pub fn missing_verbalization(symbol: &str, language: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MissingVerbalization,
            format!("symbol `{symbol}` has no `{language}` definition"),
            span,
        )
    }

    pub fn reference_to_noverb(symbol: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::ReferenceToNoverb,
            format!("symbol `{symbol}` is marked noverb"),
            span,
        )
    }

    pub fn advisory(text: &str, confidence: f32, span: Span) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::Advisory,
            format!("possible term without reference: `{text}`"),
            span,
        )
        .with_note(format!("confidence {confidence:.2}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Span;

    #[test]
    fn test_catalog_uses_default_severities() {
        let d = errors::redundant_import("x", Span::new(0, 1), Some(Span::new(5, 6)));
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.related.len(), 1);
        let d = errors::missing_verbalization("thing", "en", Span::new(0, 1));
        assert_eq!(d.severity, Severity::Info);
    }

    #[test]
    fn test_cycle_message_closes_the_loop() {
        let d = errors::import_cycle(&["a".into(), "b".into()], Span::new(0, 1));
        assert_eq!(d.message, "import cycle: a -> b -> a");
    }
}
