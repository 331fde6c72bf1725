//! Definition, reference and symbol-introduction macros.

use stex_core::lang::environments::ModuleKind;
use stex_core::lang::macros::{DefinitionVariant, ReferenceVariant, SymbolVariant};

use super::Compiler;
use super::args::{self, Options};
use crate::frontend::ast::{InlineEnv, Rarg, Span};
use crate::frontend::diagnostics::errors;
use crate::frontend::location::ModuleId;
use crate::frontend::symbols::{Reference, ReferenceId, ReferenceKind, Symbol, SymbolFamily, SymbolId};

/// What a macro handler needs to know about the module it appears in.
pub(super) struct Enclosing {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub signature: Option<String>,
}

impl Compiler<'_> {
    /// Check the group counts of a macro; on mismatch record one diagnostic and return `false`.
    pub(super) fn check_arity(&mut self, inline: &InlineEnv, expected: usize, rargs: usize, oargs: usize) -> bool {
        if rargs != expected {
            self.diagnostics
                .push(errors::macro_arity(inline.macro_name(), expected, rargs, inline.span));
            return false;
        }
        self.check_options(inline, oargs)
    }

    pub(super) fn check_options(&mut self, inline: &InlineEnv, oargs: usize) -> bool {
        if oargs > 1 {
            self.diagnostics
                .push(errors::too_many_options(inline.macro_name(), oargs, inline.span));
            return false;
        }
        true
    }

    /// The innermost module, or a scope diagnostic when there is none.
    pub(super) fn enclosing(&mut self, inline: &InlineEnv) -> Option<Enclosing> {
        match self.current_module() {
            Some(module) => Some(Enclosing {
                id: module.id.clone(),
                kind: module.kind,
                signature: module.signature.clone(),
            }),
            None => {
                self.diagnostics
                    .push(errors::outside_module(inline.macro_name(), inline.span));
                None
            }
        }
    }

    pub(super) fn definition(&mut self, inline: &InlineEnv, variant: DefinitionVariant) {
        let rargs: Vec<&Rarg> = inline.rargs().collect();
        if !self.check_arity(inline, variant.required_rargs(), rargs.len(), inline.oargs().count()) {
            return;
        }
        let Some(module) = self.enclosing(inline) else {
            return;
        };

        let options = Options::read(inline.oargs(), self.source);
        let texts = args::rarg_texts(&rargs, self.source);
        let skip = usize::from(variant.alternative);
        let parts = &texts[skip..];
        let name = match options.get("name") {
            Some(name) if !name.text.is_empty() => name.text.clone(),
            _ => args::symbol_name(parts),
        };
        let base = if variant.alternative {
            texts[0].clone()
        } else {
            parts.join(" ")
        };
        let display = variant.display(&base);
        let name_span = args::name_span(inline, &rargs[skip..]);
        let (noverb, noverb_langs) = noverb(&options);

        self.symbols.push(Symbol {
            id: SymbolId {
                module: module.id.clone(),
                name: name.clone(),
            },
            family: SymbolFamily::Defi,
            display_forms: vec![display.clone()],
            base_forms: parts.to_vec(),
            span: inline.span,
            name_span,
            noverb,
            noverb_langs,
            module_kind: module.kind,
        });

        if module.kind.is_language_bound() {
            self.push_reference(
                module.id,
                module.signature,
                name,
                ReferenceKind::Definition,
                (inline.span, name_span),
                display,
            );
        }
    }

    pub(super) fn reference(&mut self, inline: &InlineEnv, variant: ReferenceVariant) {
        let rargs: Vec<&Rarg> = inline.rargs().collect();
        if !self.check_arity(inline, variant.required_rargs(), rargs.len(), inline.oargs().count()) {
            return;
        }
        let options = Options::read(inline.oargs(), self.source);
        if options.positional.len() > 1 {
            self.diagnostics.push(errors::too_many_options(
                inline.macro_name(),
                options.positional.len(),
                inline.span,
            ));
            return;
        }
        let Some(module) = self.enclosing(inline) else {
            return;
        };

        let annotation = options.positional.first().map(|a| a.text.as_str());
        let (qualifier, explicit_name) = match annotation {
            Some(text) => match text.split_once('?') {
                Some((module, symbol)) => (non_empty(module), non_empty(symbol)),
                None => (non_empty(text), None),
            },
            None => (None, None),
        };
        if variant.module_qualified && !annotation.is_some_and(|a| a.contains('?')) {
            self.diagnostics
                .push(errors::missing_qualifier(inline.macro_name(), inline.span));
        }

        let texts = args::rarg_texts(&rargs, self.source);
        let skip = usize::from(variant.alternative);
        let parts = &texts[skip..];
        let name = explicit_name.unwrap_or_else(|| args::symbol_name(parts));
        let qualifier = qualifier.or_else(|| {
            if module.kind.is_language_bound() {
                module.signature.clone()
            } else {
                None
            }
        });
        let base = if variant.alternative {
            texts[0].clone()
        } else {
            parts.join(" ")
        };
        let name_span = args::name_span(inline, &rargs[skip..]);

        self.push_reference(
            module.id,
            qualifier,
            name,
            ReferenceKind::Tref,
            (inline.span, name_span),
            variant.display(&base),
        );
    }

    pub(super) fn symbol_introduction(&mut self, inline: &InlineEnv, variant: SymbolVariant) {
        let rargs: Vec<&Rarg> = inline.rargs().collect();
        let oargs = inline.oargs().count();
        let well_formed = match variant {
            SymbolVariant::Sym { arity, .. } => self.check_arity(inline, usize::from(arity), rargs.len(), oargs),
            SymbolVariant::Symdef { .. } if rargs.is_empty() => {
                self.diagnostics
                    .push(errors::too_few_arguments(inline.macro_name(), 1, 0, inline.span));
                false
            }
            SymbolVariant::Symdef { .. } => self.check_options(inline, oargs),
        };
        if !well_formed {
            return;
        }
        let Some(module) = self.enclosing(inline) else {
            return;
        };
        if module.kind.is_language_bound() {
            self.diagnostics.push(errors::not_allowed_in_binding(
                &format!("\\{}", inline.macro_name()),
                inline.span,
            ));
            return;
        }

        let options = Options::read(inline.oargs(), self.source);
        let texts = args::rarg_texts(&rargs, self.source);
        let (name, family, named_by) = match variant {
            SymbolVariant::Sym { .. } => (args::symbol_name(&texts), SymbolFamily::Symi, rargs.len()),
            SymbolVariant::Symdef { .. } => {
                let name = match options.get("name") {
                    Some(name) if !name.text.is_empty() => name.text.clone(),
                    _ => texts[0].clone(),
                };
                (name, SymbolFamily::Symdef, 1)
            }
        };
        let (noverb, noverb_langs) = noverb(&options);

        self.symbols.push(Symbol {
            id: SymbolId {
                module: module.id,
                name,
            },
            family,
            display_forms: Vec::new(),
            base_forms: texts[..named_by].to_vec(),
            span: inline.span,
            name_span: args::name_span(inline, &rargs[..named_by]),
            noverb,
            noverb_langs,
            module_kind: module.kind,
        });
    }

    fn push_reference(
        &mut self,
        module: ModuleId,
        qualifier: Option<String>,
        name: String,
        kind: ReferenceKind,
        (span, name_span): (Span, Span),
        display: String,
    ) {
        let id = ReferenceId {
            file: self.file.clone(),
            index: self.references.len(),
        };
        self.references.push(Reference {
            id,
            module,
            qualifier,
            name,
            kind,
            span,
            name_span,
            display,
        });
    }
}

/// `noverb` as a bare flag, and the languages of `noverb=..`.
fn noverb(options: &Options) -> (bool, Vec<String>) {
    let langs = options
        .get("noverb")
        .map(|v| args::language_list(&v.text))
        .unwrap_or_default();
    (options.has_flag("noverb"), langs)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
