//! Import macros and their locators.

use stex_core::lang::imports::{self, ImportMacroId, LocatorStyle};

use super::Compiler;
use super::args::Options;
use crate::frontend::ast::{InlineEnv, Rarg};
use crate::frontend::diagnostics::errors;
use crate::frontend::symbols::{ImportEdge, Locator};

impl Compiler<'_> {
    pub(super) fn import(&mut self, inline: &InlineEnv, id: ImportMacroId) {
        let info = imports::info_for(id);
        let rargs: Vec<&Rarg> = inline.rargs().collect();
        if !self.check_arity(inline, 1, rargs.len(), inline.oargs().count()) {
            return;
        }
        let Some(module) = self.enclosing(inline) else {
            return;
        };
        if !module.kind.allows_signature_constructs() && !info.allowed_in_bindings {
            self.diagnostics.push(errors::not_allowed_in_binding(
                &format!("\\{}", inline.macro_name()),
                inline.span,
            ));
            return;
        }

        let target = rargs[0].body.text(self.source);
        let options = Options::read(inline.oargs(), self.source);
        let locator = match info.style {
            LocatorStyle::Repository => match options.positional.first() {
                Some(repository) => Locator::Repository {
                    repository: repository.text.clone(),
                    directory: String::new(),
                    file: target.clone(),
                    module: target,
                },
                None => Locator::Relative { module: target },
            },
            LocatorStyle::MathHub | LocatorStyle::Module => self.keyed_locator(&options, target),
        };

        self.imports.push(ImportEdge {
            source: module.id,
            locator,
            export: info.exports,
            macro_name: info.canonical.to_string(),
            span: inline.span,
            implicit: false,
        });
    }

    /// Locator of `\importmhmodule[mhrepos=..,dir=..,path=..,load=..]{module}` and friends.
    fn keyed_locator(&mut self, options: &Options, module: String) -> Locator {
        if let Some(load) = options.get("load") {
            return Locator::RootPath {
                path: load.text.trim_matches('/').to_string(),
                module,
            };
        }

        let deprecated = options.get("repos");
        if let Some(repos) = deprecated {
            self.diagnostics
                .push(errors::deprecated_argument("repos", "mhrepos", repos.span));
        }
        let mhrepos = options.get("mhrepos").or(deprecated);
        if let Some(repos) = mhrepos {
            if repos.text.trim_matches('/') == self.file.repository {
                self.diagnostics
                    .push(errors::is_current_directory("mhrepos", &repos.text, repos.span));
            }
        }
        let repository = match mhrepos {
            Some(repos) => repos.text.trim_matches('/').to_string(),
            None => self.file.repository.clone(),
        };

        if let Some(dir) = options.get("dir") {
            let directory = dir.text.trim_matches('/').to_string();
            if repository == self.file.repository && directory == self.file.directory {
                self.diagnostics
                    .push(errors::is_current_directory("dir", &dir.text, dir.span));
            }
            return Locator::Repository {
                repository,
                directory,
                file: module.clone(),
                module,
            };
        }
        if let Some(path) = options.get("path") {
            let path = path.text.trim_matches('/');
            let (directory, file) = path.rsplit_once('/').unwrap_or(("", path));
            return Locator::Repository {
                repository,
                directory: directory.to_string(),
                file: file.to_string(),
                module,
            };
        }
        if mhrepos.is_some() {
            return Locator::Repository {
                repository,
                directory: String::new(),
                file: module.clone(),
                module,
            };
        }
        Locator::SameFile { module }
    }
}
