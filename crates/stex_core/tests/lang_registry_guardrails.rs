use std::collections::HashSet;

use stex_core::lang::environments;
use stex_core::lang::imports;
use stex_core::lang::macros::{self, MacroFamily};
use stex_core::roman;

#[test]
fn import_spellings_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in imports::IMPORT_MACROS {
        assert_eq!(
            imports::from_str(info.canonical),
            Some(info.id),
            "import spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(imports::as_str(info.id), info.canonical);
        assert!(seen.insert(info.canonical), "duplicate import spelling {:?}", info.canonical);
    }
}

#[test]
fn import_macros_decode_as_imports_not_macro_families() {
    for info in imports::IMPORT_MACROS {
        assert_eq!(macros::decode(info.canonical), Some(MacroFamily::Import(info.id)));
    }
}

#[test]
fn module_environment_spellings_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for info in environments::MODULE_ENVIRONMENTS {
        assert_eq!(environments::module_env(info.canonical), Some(info.id));
        assert!(seen.insert(info.canonical), "duplicate environment {:?}", info.canonical);
        assert!(
            !environments::is_math_environment(info.canonical),
            "module environment {} must not be opaque",
            info.canonical
        );
    }
}

#[test]
fn every_numeral_decodes_in_every_family() {
    for arity in 1..=roman::MAX_ARITY {
        let numeral = roman::encode(arity).unwrap();
        for spelling in [
            format!("def{numeral}"),
            format!("Def{numeral}"),
            format!("adef{numeral}s"),
            format!("tref{numeral}"),
            format!("mtref{numeral}"),
            format!("sym{numeral}"),
        ] {
            assert!(macros::decode(&spelling).is_some(), "{spelling} must decode");
        }
    }
}

#[test]
fn vocabulary_groups_do_not_overlap() {
    for name in environments::VERBATIM_COMMANDS {
        assert_eq!(macros::decode(name), None, "{name} is both verbatim and a macro family");
    }
    for name in environments::MATH_ENVIRONMENTS {
        assert!(environments::module_env(name).is_none());
    }
}
