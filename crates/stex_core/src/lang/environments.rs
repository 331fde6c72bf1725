//! Environment and command vocabulary.
//!
//! Three groups of names change how text is read:
//! - **module environments** open a named scope that owns symbols (`modsig`, `modnl`, `mhmodnl`, `module`);
//! - **math environments** are opaque to the lexer (`\begin{align} .. \end{align}` is one token);
//! - **verbatim commands** (`\verb|..|`, `\lstinline{..}`) have their arguments skipped uninterpreted.

/// Kind of a module scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModuleKind {
    /// `modsig`: declares the language-independent symbols.
    Signature,
    /// `modnl`: verbalizes a signature in one language.
    LanguageBound,
    /// `module`: declares and defines in one place.
    MonoLingual,
    /// `mhmodnl`: a binding whose signature is found through the MathHub load path.
    LanguageBoundWithLoadPath,
}

impl ModuleKind {
    pub fn is_language_bound(self) -> bool {
        matches!(self, ModuleKind::LanguageBound | ModuleKind::LanguageBoundWithLoadPath)
    }

    /// Whether `gimport` and nested `module`/`modsig` environments may appear in this scope.
    pub fn allows_signature_constructs(self) -> bool {
        !self.is_language_bound()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Signature => "signature",
            ModuleKind::LanguageBound => "language-bound",
            ModuleKind::MonoLingual => "mono-lingual",
            ModuleKind::LanguageBoundWithLoadPath => "language-bound-with-load-path",
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier for a module-opening environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleEnvId {
    Modsig,
    Modnl,
    Mhmodnl,
    Module,
}

/// Metadata for a module-opening environment.
#[derive(Debug, Clone, Copy)]
pub struct ModuleEnvInfo {
    pub id: ModuleEnvId,
    pub canonical: &'static str,
    pub kind: ModuleKind,
    /// Curly groups carried after `\begin{..}`: `{name}` or `{name}{lang}`.
    pub rargs: usize,
}

/// Registry of module-opening environments.
pub const MODULE_ENVIRONMENTS: &[ModuleEnvInfo] = &[
    ModuleEnvInfo {
        id: ModuleEnvId::Modsig,
        canonical: "modsig",
        kind: ModuleKind::Signature,
        rargs: 1,
    },
    ModuleEnvInfo {
        id: ModuleEnvId::Modnl,
        canonical: "modnl",
        kind: ModuleKind::LanguageBound,
        rargs: 2,
    },
    ModuleEnvInfo {
        id: ModuleEnvId::Mhmodnl,
        canonical: "mhmodnl",
        kind: ModuleKind::LanguageBoundWithLoadPath,
        rargs: 2,
    },
    ModuleEnvInfo {
        id: ModuleEnvId::Module,
        canonical: "module",
        kind: ModuleKind::MonoLingual,
        rargs: 0,
    },
];

/// Resolve an environment name (optionally starred) to a module environment.
pub fn module_env(name: &str) -> Option<ModuleEnvId> {
    let name = name.strip_suffix('*').unwrap_or(name);
    MODULE_ENVIRONMENTS.iter().find(|e| e.canonical == name).map(|e| e.id)
}

pub fn module_env_info(id: ModuleEnvId) -> &'static ModuleEnvInfo {
    match id {
        ModuleEnvId::Modsig => &MODULE_ENVIRONMENTS[0],
        ModuleEnvId::Modnl => &MODULE_ENVIRONMENTS[1],
        ModuleEnvId::Mhmodnl => &MODULE_ENVIRONMENTS[2],
        ModuleEnvId::Module => &MODULE_ENVIRONMENTS[3],
    }
}

/// Environments whose body the lexer captures as one opaque math token.
pub const MATH_ENVIRONMENTS: &[&str] = &[
    "math",
    "displaymath",
    "align",
    "flalign",
    "flmath",
    "equation",
    "verbatim",
];

/// Whether `\begin{name}` opens an opaque span. Starred variants count.
pub fn is_math_environment(name: &str) -> bool {
    let name = name.strip_suffix('*').unwrap_or(name);
    MATH_ENVIRONMENTS.contains(&name)
}

/// Commands whose arguments are skipped without interpretation.
pub const VERBATIM_COMMANDS: &[&str] = &["verb", "lstinline", "mintinline", "inlinecode"];

pub fn is_verbatim_command(name: &str) -> bool {
    let name = name.strip_suffix('*').unwrap_or(name);
    VERBATIM_COMMANDS.contains(&name)
}

/// Delimiters accepted by `\verb!..!`-style inline verbatim.
pub const VERBATIM_DELIMITERS: &[char] = &['!', '-', '|', '+'];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_env_info_matches_registry_order() {
        for entry in MODULE_ENVIRONMENTS {
            assert_eq!(module_env_info(entry.id).id, entry.id);
            assert_eq!(module_env(entry.canonical), Some(entry.id));
        }
    }

    #[test]
    fn module_kinds_classify_bindings() {
        assert!(ModuleKind::LanguageBound.is_language_bound());
        assert!(ModuleKind::LanguageBoundWithLoadPath.is_language_bound());
        assert!(ModuleKind::Signature.allows_signature_constructs());
        assert!(ModuleKind::MonoLingual.allows_signature_constructs());
        assert_eq!(ModuleKind::LanguageBound.to_string(), "language-bound");
    }

    #[test]
    fn math_environments_accept_starred_variants() {
        assert!(is_math_environment("equation"));
        assert!(is_math_environment("align*"));
        assert!(!is_math_environment("itemize"));
        assert!(!is_math_environment("align**"));
    }

    #[test]
    fn verbatim_commands() {
        assert!(is_verbatim_command("verb"));
        assert!(is_verbatim_command("verb*"));
        assert!(!is_verbatim_command("textbf"));
    }
}
