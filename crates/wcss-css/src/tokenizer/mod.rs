//! WCSS tokenizer.
//!
//! The tokenizer is driven by the parser one token at a time: what counts as
//! a separator depends on what the parser is reading (a selector, a property
//! name, a value list), so every call takes a [`TokenMode`].
//!
//! Tokens are plain strings. Inside a segment (`(...)`, `"..."` or `'...'`)
//! separators and comment starts lose their meaning, so `url(a b.png)` and
//! `"x, y"` come back whole.

mod reader;

use bitflags::bitflags;

pub use reader::CharReader;

bitflags! {
    /// How [`CssTokenizer::next_token`] treats separators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TokenMode: u8 {
        /// Skip line breaks and a leading `;` instead of stopping at them.
        const CROSS_NEWLINE = 1;
        /// Keep `,` inside the token.
        const IGNORE_COMMAS = 1 << 1;
        /// Keep `:` inside the token (selectors with pseudo-classes).
        const IGNORE_COLONS = 1 << 2;
        /// Keep whitespace inside the token (whole-value reads).
        const IGNORE_WHITESPACE = 1 << 3;
    }
}

impl TokenMode {
    /// Between rules: selectors, braces and property names.
    pub const RULE: Self = Self::CROSS_NEWLINE.union(Self::IGNORE_COLONS);
    /// A property name inside a declaration block.
    pub const PROPERTY: Self = Self::CROSS_NEWLINE;
    /// One space separated value of a declaration.
    pub const VALUE: Self = Self::empty();
    /// A value that may contain commas.
    pub const VALUE_LIST: Self = Self::IGNORE_COMMAS;
    /// A value read whole up to `;` or `}`.
    pub const WHOLE_VALUE: Self = Self::IGNORE_COMMAS.union(Self::IGNORE_WHITESPACE);
    /// At-rule preludes such as media lists and import targets.
    pub const PRELUDE: Self = Self::all();
}

/// CSS whitespace, including bare CR and LF.
const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r')
}

const fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

/// Pull tokenizer over a decoded stylesheet.
#[derive(Debug, Clone)]
pub struct CssTokenizer {
    reader: CharReader,
}

impl CssTokenizer {
    /// Create a tokenizer over `input`.
    pub fn new(input: &str) -> Self {
        Self {
            reader: CharReader::new(input),
        }
    }

    /// True once the input is exhausted.
    pub fn is_at_end(&self) -> bool {
        self.reader.is_at_end()
    }

    /// Read the next token.
    ///
    /// Returns `None` at end of input, and, unless
    /// [`TokenMode::CROSS_NEWLINE`] is set, at a line break or `;` with
    /// nothing read yet. `{`, `}` and `*` are returned as single character
    /// tokens when crossing newlines and end any token in progress.
    /// A trailing `>` or `+`, or a `,` when commas are not ignored, is
    /// appended to the token so the parser can see the combinator.
    pub fn next_token(&mut self, mode: TokenMode) -> Option<String> {
        let cross_newline = mode.contains(TokenMode::CROSS_NEWLINE);
        let ignore_commas = mode.contains(TokenMode::IGNORE_COMMAS);
        let ignore_colons = mode.contains(TokenMode::IGNORE_COLONS);
        let ignore_whitespace = mode.contains(TokenMode::IGNORE_WHITESPACE);

        let mut token = String::new();
        let mut c = self.reader.read();
        while let Some(ch) = c.filter(|&ch| is_whitespace(ch)) {
            if !cross_newline && is_line_break(ch) {
                return None;
            }
            c = self.reader.read();
        }
        if cross_newline && c == Some(';') {
            c = self.skip_whitespace();
        }

        let mut segment: Option<char> = None;
        while let Some(ch) = c {
            let in_segment = segment.is_some();
            let continues = (!is_whitespace(ch) || in_segment || ignore_whitespace)
                && ch != ';'
                && (ch != ':' || in_segment || ignore_colons)
                && (ch != ',' || in_segment || ignore_commas)
                && (!matches!(ch, '>' | '+') || in_segment);
            if !continues {
                break;
            }

            if !in_segment && ch == '/' && self.skip_comment() {
                c = self.skip_whitespace();
                continue;
            }

            if !in_segment && matches!(ch, '{' | '}' | '*') {
                if token.is_empty() {
                    if !cross_newline {
                        self.reader.unread();
                        return None;
                    }
                    return Some(ch.to_string());
                }
                self.reader.unread();
                break;
            }

            token.push(ch);
            if ch == '(' {
                segment = Some(')');
            } else if segment.is_none() && matches!(ch, '"' | '\'') {
                segment = Some(ch);
            } else if segment == Some(ch) {
                segment = None;
            }
            c = self.reader.read();
        }

        if let Some(ch) = c {
            if (ch == ',' && !ignore_commas) || ch == '>' || ch == '+' {
                token.push(ch);
            }
            if !cross_newline && ch == ';' && !token.is_empty() {
                self.reader.unread();
            }
        }

        (!token.is_empty()).then_some(token)
    }

    /// Called after a `/`. Consumes a whole `/* ... */` comment and returns
    /// true, or leaves the input untouched and returns false.
    fn skip_comment(&mut self) -> bool {
        match self.reader.read() {
            Some('*') => {}
            Some(_) => {
                self.reader.unread();
                return false;
            }
            None => return false,
        }
        let mut last = '\0';
        while let Some(c) = self.reader.read() {
            if last == '*' && c == '/' {
                break;
            }
            last = c;
        }
        true
    }

    fn skip_whitespace(&mut self) -> Option<char> {
        let mut c = self.reader.read();
        while c.is_some_and(is_whitespace) {
            c = self.reader.read();
        }
        c
    }

    /// Skip past the next `{`, then return everything up to its matching
    /// `}`. Nested braces are kept. Stops quietly at end of input.
    pub fn read_block(&mut self) -> String {
        while let Some(c) = self.reader.read() {
            if c == '{' {
                break;
            }
        }
        self.read_block_body()
    }

    /// Like [`Self::read_block`] when the opening `{` was already consumed.
    pub fn read_block_body(&mut self) -> String {
        let mut block = String::new();
        let mut depth = 1;
        while let Some(c) = self.reader.read() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            block.push(c);
        }
        block
    }

    /// Skip an at-rule this engine does not implement: up to and including
    /// the next `;`, or a whole `{...}` block if one comes first.
    pub fn skip_statement(&mut self) {
        while let Some(c) = self.reader.read() {
            match c {
                ';' => return,
                '{' => {
                    self.reader.unread();
                    let _ = self.read_block();
                    return;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str, mode: TokenMode) -> Vec<String> {
        let mut tokenizer = CssTokenizer::new(input);
        std::iter::from_fn(|| tokenizer.next_token(mode)).collect()
    }

    #[test]
    fn test_rule_tokens() {
        assert_eq!(
            collect("p.warn {color:red}", TokenMode::RULE),
            vec!["p.warn", "{", "color:red", "}"]
        );
    }

    #[test]
    fn test_comments_are_stripped() {
        assert_eq!(
            collect("/* lead */ h1 /* mid */ { }", TokenMode::RULE),
            vec!["h1", "{", "}"]
        );
        assert_eq!(collect("a/**/b", TokenMode::RULE), vec!["ab"]);
    }

    #[test]
    fn test_combinators_stay_attached() {
        assert_eq!(collect("div> p", TokenMode::RULE), vec!["div>", "p"]);
        assert_eq!(collect("h1, h2", TokenMode::RULE), vec!["h1,", "h2"]);
        assert_eq!(collect("a + b", TokenMode::RULE), vec!["a", "+", "b"]);
    }

    #[test]
    fn test_value_stops_at_semicolon_without_consuming_it() {
        let mut tokenizer = CssTokenizer::new("1px solid;color");
        assert_eq!(tokenizer.next_token(TokenMode::VALUE).as_deref(), Some("1px"));
        assert_eq!(tokenizer.next_token(TokenMode::VALUE).as_deref(), Some("solid"));
        assert_eq!(tokenizer.next_token(TokenMode::VALUE), None);
        assert_eq!(tokenizer.next_token(TokenMode::PROPERTY).as_deref(), Some("color"));
    }

    #[test]
    fn test_segments_keep_separators() {
        assert_eq!(
            collect("url(a b.png) 'x, y'", TokenMode::VALUE),
            vec!["url(a b.png)", "'x, y'"]
        );
    }

    #[test]
    fn test_value_does_not_cross_closing_brace() {
        let mut tokenizer = CssTokenizer::new("red}");
        assert_eq!(tokenizer.next_token(TokenMode::VALUE).as_deref(), Some("red"));
        assert_eq!(tokenizer.next_token(TokenMode::VALUE), None);
        assert_eq!(tokenizer.next_token(TokenMode::RULE).as_deref(), Some("}"));
    }

    #[test]
    fn test_read_block_tracks_nesting() {
        let mut tokenizer = CssTokenizer::new(" handheld { a { b } } rest");
        let block = tokenizer.read_block();
        assert_eq!(block, " a { b } ");
        assert_eq!(tokenizer.next_token(TokenMode::RULE).as_deref(), Some("rest"));
    }
}
