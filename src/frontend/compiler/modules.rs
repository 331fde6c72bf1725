//! Module environments: `modsig`, `modnl`, `mhmodnl` and `module`.

use stex_core::lang::environments::{self, ModuleEnvId, ModuleKind};

use super::Compiler;
use super::args::Options;
use crate::frontend::ast::{Env, Rarg, Span};
use crate::frontend::diagnostics::errors;
use crate::frontend::location::ModuleId;
use crate::frontend::symbols::{ImportEdge, Locator, ModuleDecl};

/// Name, name span, language and signature read from a module environment's arguments.
struct Identity {
    name: String,
    name_span: Span,
    language: Option<String>,
    signature: Option<String>,
}

impl Compiler<'_> {
    pub(super) fn module_environment(&mut self, env: &Env, id: ModuleEnvId) {
        let info = environments::module_env_info(id);
        let rargs: Vec<&Rarg> = env.begin.rargs().collect();
        if rargs.len() < info.rargs {
            self.diagnostics.push(errors::macro_arity(
                &format!("begin{{{}}}", info.canonical),
                info.rargs,
                rargs.len(),
                env.begin.span,
            ));
            self.walk_body(&env.body);
            return;
        }

        if info.kind.allows_signature_constructs()
            && self.current_module().is_some_and(|m| !m.kind.allows_signature_constructs())
        {
            self.diagnostics.push(errors::not_allowed_in_binding(
                &format!("\\begin{{{}}}", info.canonical),
                env.begin.span,
            ));
        }

        let identity = self.module_identity(env, info.kind, &rargs);
        if info.kind == ModuleKind::Signature && identity.name != self.file.name {
            self.diagnostics.push(errors::file_name_mismatch(
                &identity.name,
                &self.file.name,
                identity.name_span,
            ));
        }

        let index = match self.modules.iter().position(|m| m.id.name == identity.name) {
            Some(existing) => {
                let first = self.modules[existing].name_span;
                self.diagnostics
                    .push(errors::duplicate_module(&identity.name, identity.name_span, first));
                existing
            }
            None => self.declare_module(env, info.kind, info.canonical, identity),
        };

        self.module_stack.push(index);
        self.walk_body(&env.body);
        self.module_stack.pop();
    }

    fn module_identity(&self, env: &Env, kind: ModuleKind, rargs: &[&Rarg]) -> Identity {
        match (kind, rargs) {
            (ModuleKind::Signature, [name, ..]) => Identity {
                name: name.body.text(self.source),
                name_span: name.span,
                language: None,
                signature: None,
            },
            (ModuleKind::LanguageBound | ModuleKind::LanguageBoundWithLoadPath, [name, lang, ..]) => {
                let signature = name.body.text(self.source);
                let language = lang.body.text(self.source);
                Identity {
                    name: format!("{signature}.{language}"),
                    name_span: name.span.merge(lang.span),
                    language: Some(language),
                    signature: Some(signature),
                }
            }
            _ => {
                let options = Options::read(env.begin.oargs(), self.source);
                match options.get("id") {
                    Some(id) if !id.text.is_empty() => Identity {
                        name: id.text.clone(),
                        name_span: id.span,
                        language: None,
                        signature: None,
                    },
                    _ => Identity {
                        name: self.file.name.clone(),
                        name_span: env.begin.span,
                        language: None,
                        signature: None,
                    },
                }
            }
        }
    }

    fn declare_module(&mut self, env: &Env, kind: ModuleKind, canonical: &str, identity: Identity) -> usize {
        let id = ModuleId::new(self.file.clone(), identity.name);
        if let Some(signature) = &identity.signature {
            self.imports.push(ImportEdge {
                source: id.clone(),
                locator: Locator::Repository {
                    repository: self.file.repository.clone(),
                    directory: self.file.directory.clone(),
                    file: signature.clone(),
                    module: signature.clone(),
                },
                export: false,
                macro_name: canonical.to_string(),
                span: env.begin.span,
                implicit: true,
            });
        }
        self.modules.push(ModuleDecl {
            id,
            kind,
            language: identity.language,
            signature: identity.signature,
            span: env.span,
            name_span: identity.name_span,
        });
        self.modules.len() - 1
    }
}
