//! Fenced code block meta string parsing.
//!
//! The meta string is whatever follows the language on the opening fence, so
//! for a fence opened with `ts title="Hello World" highlight` it is
//! `title="Hello World" highlight`.
//!
//! Bare identifiers become flags, `key=value` pairs (spaces around `=` are
//! tolerated) become text values, and double-quoted values may contain
//! spaces and `=`.

use indexmap::IndexMap;

/// A single parsed meta attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// A bare identifier such as `highlight`.
    Flag,
    /// The value of a `key=value` pair with surrounding quotes removed.
    Text(String),
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

/// Parsed meta attributes in source order. Later duplicates overwrite earlier values.
pub type CodeMeta = IndexMap<String, MetaValue>;

/// Parses a code fence meta string into ordered attributes.
///
/// Never fails: malformed input yields whatever could be tokenized.
///
/// # Examples
///
/// ```
/// use jana_core::meta::{MetaValue, parse_meta};
///
/// let meta = parse_meta(r#"lang=ts title="My Code" highlight"#);
/// assert_eq!(meta.get("lang"), Some(&MetaValue::from("ts")));
/// assert_eq!(meta.get("title"), Some(&MetaValue::from("My Code")));
/// assert_eq!(meta.get("highlight"), Some(&MetaValue::Flag));
/// ```
pub fn parse_meta(meta: &str) -> CodeMeta {
    let mut attrs = CodeMeta::new();
    let mut scanner = Scanner::new(meta);

    loop {
        scanner.skip_whitespace();
        if scanner.is_done() {
            break;
        }

        let key = scanner.take_while(|c| !c.is_whitespace() && c != '=');
        if key.is_empty() {
            // Stray `=` with no key in front of it.
            scanner.bump();
            continue;
        }

        let checkpoint = scanner.pos;
        scanner.skip_whitespace();
        if scanner.peek() == Some('=') {
            scanner.bump();
            scanner.skip_whitespace();
            let value = scanner.take_value();
            attrs.insert(key.to_string(), MetaValue::Text(value.to_string()));
        } else {
            scanner.pos = checkpoint;
            attrs.insert(key.to_string(), MetaValue::Flag);
        }
    }

    attrs
}

/// Parses an optional meta string; `None` yields an empty map.
pub fn parse_optional_meta(meta: Option<&str>) -> CodeMeta {
    meta.map(parse_meta).unwrap_or_default()
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Reads a double-quoted or bare value. An unterminated quote runs to the end.
    fn take_value(&mut self) -> &'a str {
        if self.peek() == Some('"') {
            self.bump();
            let value = self.take_while(|c| c != '"');
            self.bump();
            value
        } else {
            self.take_while(|c| !c.is_whitespace())
        }
    }
}
