//! Argument reading shared by the macro handlers.

use crate::frontend::ast::{Body, InlineEnv, Oarg, Rarg, Span, SyntaxNode};

/// One value of an optional argument, with the key it was given under.
#[derive(Debug, Clone)]
pub(super) struct OptionValue {
    pub text: String,
    pub span: Span,
}

/// The entries of a macro's optional arguments, flattened.
#[derive(Debug, Default)]
pub(super) struct Options {
    pub positional: Vec<OptionValue>,
    pub named: Vec<(String, OptionValue)>,
}

impl Options {
    pub fn read<'a>(oargs: impl IntoIterator<Item = &'a Oarg>, source: &str) -> Self {
        let mut options = Options::default();
        for oarg in oargs {
            for kv in &oarg.args.args {
                let value = OptionValue {
                    text: value_text(&kv.value, source),
                    span: kv.span,
                };
                match &kv.key {
                    Some(key) => options.named.push((key.text.trim().to_string(), value)),
                    None if value.text.is_empty() => {}
                    None => options.positional.push(value),
                }
            }
        }
        options
    }

    /// First value given under `key`.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether a bare positional `flag` is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.positional.iter().any(|v| v.text == flag)
    }
}

/// Text of an option value.
///
/// A value written as `\MathHub{path}` reads as `path`.
fn value_text(value: &Body, source: &str) -> String {
    match value.children.as_slice() {
        [SyntaxNode::InlineEnv(inline)] if inline.macro_name() == "MathHub" => match inline.rargs().next() {
            Some(rarg) => rarg.body.text(source),
            None => value.text(source),
        },
        _ => value.text(source),
    }
}

/// Normalized text of each curly group.
pub(super) fn rarg_texts(rargs: &[&Rarg], source: &str) -> Vec<String> {
    rargs.iter().map(|r| r.body.text(source)).collect()
}

/// Join name parts into a symbol name: whitespace anywhere becomes `-`.
pub(super) fn symbol_name(parts: &[String]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join("-")
}

/// Span covering the given groups, or the macro name when there are none.
pub(super) fn name_span(inline: &InlineEnv, rargs: &[&Rarg]) -> Span {
    match (rargs.first(), rargs.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => inline.name.span,
    }
}

/// Languages listed in a `noverb=` value: `de` or `{de,en}`.
pub(super) fn language_list(text: &str) -> Vec<String> {
    text.trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_name_replaces_whitespace() {
        let parts = vec!["summation".to_string(), "index".to_string()];
        assert_eq!(symbol_name(&parts), "summation-index");
        assert_eq!(symbol_name(&["prime  number".to_string()]), "prime-number");
    }

    #[test]
    fn test_language_list_forms() {
        assert_eq!(language_list("de"), ["de"]);
        assert_eq!(language_list("{de, en}"), ["de", "en"]);
        assert!(language_list("{}").is_empty());
    }
}
