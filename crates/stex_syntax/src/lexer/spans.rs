//! Math and verbatim span scanning.
//!
//! Both modes are opaque: once opened, raw text is swallowed until the closer without looking at
//! braces, escapes or commands inside. Each call consumes the whole span and pops its mode.

use super::{Lexer, Mark, MathCloser, TokenKind, VerbatimCloser};

impl<'a> Lexer<'a> {
    pub(super) fn scan_math(&mut self, closer: &MathCloser, open: Mark) {
        let rest = self.rest();
        let found = match closer {
            MathCloser::Dollar => find_unescaped_dollar(rest).map(|i| i + 1),
            MathCloser::DoubleDollar => rest.find("$$").map(|i| i + 2),
            MathCloser::Paren => rest.find("\\)").map(|i| i + 2),
            MathCloser::Bracket => rest.find("\\]").map(|i| i + 2),
            MathCloser::Environment(name) => {
                let end = format!("\\end{{{name}}}");
                rest.find(&end).map(|i| i + end.len())
            }
        };
        self.modes.pop();
        match found {
            Some(len) => {
                self.advance_to(self.pos + len);
                self.add_token_from(TokenKind::Math, open);
            }
            None => {
                self.advance_to(self.source.len());
                self.add_token_from(TokenKind::Error, open);
            }
        }
    }

    pub(super) fn scan_verbatim(&mut self, closer: VerbatimCloser, open: Mark) {
        self.modes.pop();
        match closer {
            VerbatimCloser::Delimiter(delim) => {
                self.advance();
                if self.skip_until_on_line(delim) {
                    self.add_token_from(TokenKind::Verbatim, open);
                } else {
                    self.add_token_from(TokenKind::Error, open);
                }
            }
            VerbatimCloser::Angle => {
                self.advance();
                if !self.skip_until_on_line('>') {
                    self.add_token_from(TokenKind::Error, open);
                }
            }
            VerbatimCloser::Groups => {
                let mut terminated = true;
                while let Some(c) = self.peek() {
                    let close = match c {
                        '{' => '}',
                        '[' => ']',
                        _ => break,
                    };
                    if !self.skip_balanced(c, close) {
                        terminated = false;
                        break;
                    }
                }
                let kind = if terminated { TokenKind::Verbatim } else { TokenKind::Error };
                self.add_token_from(kind, open);
            }
        }
    }

    /// Consume through the next `delim` on the current line.
    ///
    /// Returns `false` (positioned before the line break) if the line ends first.
    fn skip_until_on_line(&mut self, delim: char) -> bool {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return false;
            }
            self.advance();
            if c == delim {
                return true;
            }
        }
        false
    }

    /// Consume one `open .. close` group, counting nesting of the same pair. Escaped delimiters
    /// (`\{`) do not count.
    fn skip_balanced(&mut self, open: char, close: char) -> bool {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if c == '\\' && matches!(self.peek_next(), Some(n) if n == open || n == close) {
                self.advance();
                self.advance();
                continue;
            }
            self.advance();
            if c == open {
                depth += 1;
            } else if c == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }
}

/// Byte index of the first `$` not preceded by an escaping backslash.
fn find_unescaped_dollar(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '$' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::find_unescaped_dollar;

    #[test]
    fn test_find_unescaped_dollar_skips_escapes() {
        assert_eq!(find_unescaped_dollar(r"a\$b$"), Some(4));
        assert_eq!(find_unescaped_dollar(r"a\\$"), Some(3));
        assert_eq!(find_unescaped_dollar("abc"), None);
    }
}
