//! Macro family decoding.
//!
//! stex spells one concept many ways: `\defi`, `\defii`, `\Defis`, `\adefiii*`, `\mtrefi`, ... Each
//! spelling is decoded into a single tagged value so the compiler handles one code path per family.
//!
//! ## Grammar of a family spelling
//!
//! ```text
//! definition := [m][a] (def | Def) numeral [s] [*]
//! reference  := [m][a] (tref | Tref) numeral [s] [*]
//! symbol     := sym numeral [s] [*] | symdef [*]
//! numeral    := i | ii | iii | iv
//! ```
//!
//! ## Examples
//! ```rust
//! use stex_core::lang::macros::{self, MacroFamily};
//!
//! let Some(MacroFamily::Definition(v)) = macros::decode("adefii") else { panic!() };
//! assert_eq!(v.required_rargs(), 3);
//! assert_eq!(macros::decode("textbf"), None);
//! ```

use crate::lang::imports::{self, ImportMacroId};
use crate::roman;

/// Decoded flags of a definition or reference spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionVariant {
    /// Number of name-bearing curly groups (1..=4).
    pub arity: u8,
    /// `a` prefix: an extra leading curly group carries the display text.
    pub alternative: bool,
    /// Upper-case spelling (`Defi`, `Trefi`): capitalize the first letter of the display form.
    pub capitalize: bool,
    /// Trailing `s`: append a plural `s` to the display form.
    pub pluralize: bool,
    /// `m` prefix: the module qualifier is mandatory.
    pub module_qualified: bool,
    pub starred: bool,
}

/// References decode exactly like definitions.
pub type ReferenceVariant = DefinitionVariant;

impl DefinitionVariant {
    /// Number of curly groups the macro must carry.
    pub fn required_rargs(&self) -> usize {
        usize::from(self.arity) + usize::from(self.alternative)
    }

    /// Apply the capitalization/pluralization sugar to a display form.
    ///
    /// ## Examples
    /// ```rust
    /// use stex_core::lang::macros::{self, MacroFamily};
    ///
    /// let Some(MacroFamily::Definition(v)) = macros::decode("Defis") else { panic!() };
    /// assert_eq!(v.display("prime number"), "Prime numbers");
    /// ```
    pub fn display(&self, base: &str) -> String {
        let mut out = if self.capitalize {
            capitalize_first(base)
        } else {
            base.to_string()
        };
        if self.pluralize {
            out.push('s');
        }
        out
    }
}

/// Decoded symbol-introduction spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolVariant {
    /// `symi` .. `symiv`.
    Sym { arity: u8, pluralize: bool, starred: bool },
    /// `symdef`: the name comes from `name=` or the first curly group.
    Symdef { starred: bool },
}

/// A recognized stex macro family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroFamily {
    Definition(DefinitionVariant),
    Reference(ReferenceVariant),
    Symbol(SymbolVariant),
    Import(ImportMacroId),
}

/// Decode a macro name (without the leading backslash) into its family.
pub fn decode(name: &str) -> Option<MacroFamily> {
    if let Some(id) = imports::from_str(name) {
        return Some(MacroFamily::Import(id));
    }
    let (name, starred) = match name.strip_suffix('*') {
        Some(rest) => (rest, true),
        None => (name, false),
    };
    if name == "symdef" {
        return Some(MacroFamily::Symbol(SymbolVariant::Symdef { starred }));
    }
    decode_numbered(name, false, starred).or_else(|| {
        name.strip_suffix('s')
            .and_then(|singular| decode_numbered(singular, true, starred))
    })
}

fn decode_numbered(name: &str, pluralize: bool, starred: bool) -> Option<MacroFamily> {
    let (stem, arity) = roman::split_suffix(name)?;
    if stem == "sym" {
        return Some(MacroFamily::Symbol(SymbolVariant::Sym {
            arity,
            pluralize,
            starred,
        }));
    }
    let (prefix, core) = split_prefix(stem)?;
    let (module_qualified, alternative) = decode_prefix(prefix)?;
    let variant = |capitalize| DefinitionVariant {
        arity,
        alternative,
        capitalize,
        pluralize,
        module_qualified,
        starred,
    };
    match core {
        "def" => Some(MacroFamily::Definition(variant(false))),
        "Def" => Some(MacroFamily::Definition(variant(true))),
        "tref" => Some(MacroFamily::Reference(variant(false))),
        "Tref" => Some(MacroFamily::Reference(variant(true))),
        _ => None,
    }
}

/// Split `stem` into its `m`/`a` prefix and the family core.
fn split_prefix(stem: &str) -> Option<(&str, &str)> {
    let at = stem.find(['d', 'D', 't', 'T'])?;
    Some(stem.split_at(at))
}

fn decode_prefix(prefix: &str) -> Option<(bool, bool)> {
    let (mut m, mut a) = (false, false);
    for c in prefix.chars() {
        match c {
            'm' if !m => m = true,
            'a' if !a => a = true,
            _ => return None,
        }
    }
    Some((m, a))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str) -> DefinitionVariant {
        match decode(name) {
            Some(MacroFamily::Definition(v)) => v,
            other => panic!("{name} decoded as {other:?}"),
        }
    }

    fn reference(name: &str) -> ReferenceVariant {
        match decode(name) {
            Some(MacroFamily::Reference(v)) => v,
            other => panic!("{name} decoded as {other:?}"),
        }
    }

    #[test]
    fn definition_family_arity_and_sugar() {
        let v = definition("defi");
        assert_eq!((v.arity, v.capitalize, v.pluralize, v.alternative), (1, false, false, false));

        let v = definition("Defiii");
        assert_eq!((v.arity, v.capitalize, v.pluralize), (3, true, false));

        let v = definition("defis");
        assert_eq!((v.arity, v.pluralize), (1, true));

        let v = definition("Defivs");
        assert_eq!((v.arity, v.capitalize, v.pluralize), (4, true, true));

        let v = definition("adefii");
        assert!(v.alternative);
        assert_eq!(v.required_rargs(), 3);

        let v = definition("mdefi*");
        assert!(v.module_qualified && v.starred);
    }

    #[test]
    fn reference_family_decodes_qualifier_prefix() {
        let v = reference("mtrefi");
        assert!(v.module_qualified);
        assert_eq!(v.arity, 1);

        let v = reference("Trefiis");
        assert_eq!((v.arity, v.capitalize, v.pluralize), (2, true, true));

        let v = reference("atrefi");
        assert_eq!(v.required_rargs(), 2);
    }

    #[test]
    fn symbol_family_and_symdef() {
        assert_eq!(
            decode("symii"),
            Some(MacroFamily::Symbol(SymbolVariant::Sym {
                arity: 2,
                pluralize: false,
                starred: false
            }))
        );
        assert_eq!(
            decode("symdef*"),
            Some(MacroFamily::Symbol(SymbolVariant::Symdef { starred: true }))
        );
    }

    #[test]
    fn unrelated_names_do_not_decode() {
        for name in ["textbf", "def", "defv", "ref", "mmdefi", "aadefi", "xdefi", "sym", "begin"] {
            assert_eq!(decode(name), None, "{name} should not decode");
        }
    }

    #[test]
    fn display_applies_sugar() {
        assert_eq!(definition("defi").display("set"), "set");
        assert_eq!(definition("Defi").display("set"), "Set");
        assert_eq!(definition("defis").display("set"), "sets");
        assert_eq!(definition("Defis").display(""), "s");
    }
}
