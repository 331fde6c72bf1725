//! Per-file compiler for stex documents.
//!
//! Walks one file's syntax tree and extracts what the linker needs: module declarations, symbols,
//! references and import edges, plus local diagnostics. The compiler is pure: it reads nothing
//! but the text it is given, so compiling the same text twice yields equal units.
//!
//! ## Notes
//!
//! - **Module stack**: definitions, references and imports bind to the innermost open module.
//! - **Arity first**: a macro with the wrong number of argument groups yields one `MacroArity`
//!   diagnostic and nothing else; scope rules are only checked for well-formed macros.
//! - **Nested macros**: argument groups are walked too, so `\defi{\trefi{x}}` yields both.
//!
//! ## Examples
//!
//! ```rust
//! use stexls::frontend::compiler::compile;
//! use stexls::frontend::location::FileId;
//!
//! let unit = compile(&FileId::new("repo", "", "x"), r"\begin{modsig}{x}\symi{thing}\end{modsig}");
//! assert_eq!(unit.symbols.len(), 1);
//! assert!(unit.diagnostics.is_empty());
//! ```

mod args;
mod imports;
mod macros;
mod modules;

use stex_core::lang::environments;
use stex_core::lang::macros::{self as families, MacroFamily};

use crate::frontend::ast::{Arg, Body, SyntaxNode};
use crate::frontend::cache::Fingerprint;
use crate::frontend::diagnostics::{Diagnostic, LineIndex};
use crate::frontend::location::FileId;
use crate::frontend::symbols::{CompiledUnit, ImportEdge, ModuleDecl, Reference, Symbol};
use crate::frontend::{lexer, parser};

/// Compiler state for one file.
struct Compiler<'s> {
    file: FileId,
    source: &'s str,
    /// Indices into `modules`, innermost last.
    module_stack: Vec<usize>,
    modules: Vec<ModuleDecl>,
    symbols: Vec<Symbol>,
    references: Vec<Reference>,
    imports: Vec<ImportEdge>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s> Compiler<'s> {
    fn new(file: FileId, source: &'s str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            file,
            source,
            module_stack: Vec::new(),
            modules: Vec::new(),
            symbols: Vec::new(),
            references: Vec::new(),
            imports: Vec::new(),
            diagnostics,
        }
    }

    fn current_module(&self) -> Option<&ModuleDecl> {
        self.module_stack.last().and_then(|&i| self.modules.get(i))
    }

    fn walk_body(&mut self, body: &Body) {
        for child in &body.children {
            self.walk_node(child);
        }
    }

    fn walk_args(&mut self, args: &[Arg]) {
        for arg in args {
            match arg {
                Arg::Rarg(rarg) => self.walk_body(&rarg.body),
                Arg::Oarg(oarg) => {
                    for kv in &oarg.args.args {
                        self.walk_body(&kv.value);
                    }
                }
            }
        }
    }

    fn walk_node(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::Env(env) => match environments::module_env(env.name()) {
                Some(id) => self.module_environment(env, id),
                None => {
                    self.walk_args(&env.begin.args);
                    self.walk_body(&env.body);
                }
            },
            SyntaxNode::InlineEnv(inline) => {
                if let Some(family) = families::decode(inline.macro_name()) {
                    match family {
                        MacroFamily::Definition(variant) => self.definition(inline, variant),
                        MacroFamily::Reference(variant) => self.reference(inline, variant),
                        MacroFamily::Symbol(variant) => self.symbol_introduction(inline, variant),
                        MacroFamily::Import(id) => self.import(inline, id),
                    }
                }
                self.walk_args(&inline.args);
            }
            SyntaxNode::Group(group) => self.walk_body(&group.body),
            SyntaxNode::Math(_) | SyntaxNode::Token(_) => {}
        }
    }

    fn finish(self, tree: Body, fingerprint: Fingerprint) -> CompiledUnit {
        CompiledUnit {
            file: self.file,
            fingerprint,
            tree,
            line_index: LineIndex::new(self.source),
            modules: self.modules,
            symbols: self.symbols,
            references: self.references,
            imports: self.imports,
            diagnostics: self.diagnostics,
        }
    }
}

/// Compile one file's text into a [`CompiledUnit`].
///
/// Never fails: syntax problems and misuse of stex macros are recorded as diagnostics on the unit.
#[tracing::instrument(skip_all, fields(file = %file, len = text.len()))]
pub fn compile(file: &FileId, text: &str) -> CompiledUnit {
    let tokens = lexer::lex(text);
    let parsed = parser::parse(&tokens);
    let mut compiler = Compiler::new(file.clone(), text, parsed.diagnostics);
    compiler.walk_body(&parsed.root);
    let unit = compiler.finish(parsed.root, Fingerprint::of(text));
    tracing::debug!(
        modules = unit.modules.len(),
        symbols = unit.symbols.len(),
        references = unit.references.len(),
        imports = unit.imports.len(),
        diagnostics = unit.diagnostics.len(),
        "compiled"
    );
    unit
}

#[cfg(test)]
mod tests;
