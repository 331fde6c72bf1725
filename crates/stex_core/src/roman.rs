//! Roman numeral suffixes used by stex macro families (`defi`, `defii`, `defiii`, `defiv`).
//!
//! Only the numerals the dialect actually uses are recognized: `i` through `iv`.

/// Largest arity expressible by a macro suffix.
pub const MAX_ARITY: u8 = 4;

const NUMERALS: &[(&str, u8)] = &[("i", 1), ("ii", 2), ("iii", 3), ("iv", 4)];

/// Decode a roman numeral suffix into an arity.
///
/// ## Examples
/// ```rust
/// use stex_core::roman;
///
/// assert_eq!(roman::decode("iii"), Some(3));
/// assert_eq!(roman::decode("v"), None);
/// ```
pub fn decode(numeral: &str) -> Option<u8> {
    NUMERALS.iter().find(|(s, _)| *s == numeral).map(|(_, n)| *n)
}

/// Encode an arity as its roman numeral suffix.
pub fn encode(arity: u8) -> Option<&'static str> {
    NUMERALS.iter().find(|(_, n)| *n == arity).map(|(s, _)| *s)
}

/// Split `name` into a leading stem and the longest trailing numeral accepted by [`decode`].
///
/// Returns `None` when the name does not end in a numeral.
pub fn split_suffix(name: &str) -> Option<(&str, u8)> {
    // Longest match first so `iii` is not read as `ii` + stray `i`.
    for (numeral, arity) in NUMERALS.iter().rev() {
        if let Some(stem) = name.strip_suffix(numeral) {
            return Some((stem, *arity));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_encode_agree() {
        for arity in 1..=MAX_ARITY {
            let numeral = encode(arity).unwrap();
            assert_eq!(decode(numeral), Some(arity));
        }
        assert_eq!(encode(0), None);
        assert_eq!(encode(5), None);
    }

    #[test]
    fn split_suffix_prefers_longest_numeral() {
        assert_eq!(split_suffix("defiii"), Some(("def", 3)));
        assert_eq!(split_suffix("defiv"), Some(("def", 4)));
        assert_eq!(split_suffix("symi"), Some(("sym", 1)));
        assert_eq!(split_suffix("symdef"), None);
    }
}
