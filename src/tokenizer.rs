//! Identifier splitting.
//!
//! Turns a qualified identifier such as `java.util.concurrent.ConcurrentHashMap`
//! into ordered lowercase components:
//!
//! ```text
//! java | util | concurrent | concurrent | hash | map
//! ```
//!
//! Segments before the last delimiter are kept whole (package names). The last
//! segment is split on camel-case boundaries:
//! - lowercase or digit followed by uppercase: `HashMap` -> `Hash`, `Map`
//! - end of an uppercase run followed by lowercase: `URIBuilder` -> `URI`, `Builder`
//! - letter/digit transitions: `Jsr320` -> `Jsr`, `320`
//! - any other character (`$`, `_`, ...) separates and is dropped
//!
//! Components are byte ranges into the original string. Lowercasing keeps the
//! UTF-8 length of every char, so the same ranges address both the original
//! and the lowercased text.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// How raw identifiers are split into segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tokenizer {
    /// Source-level names: `java.util.HashMap`, nested classes as `Map.Entry` or `Map$Entry`.
    #[default]
    Java,
    /// JVM internal names and descriptors: `java/util/HashMap`, `Ljava/util/HashMap;`.
    Bytecode,
}

impl Tokenizer {
    fn delimiter(self) -> char {
        match self {
            Tokenizer::Java => '.',
            Tokenizer::Bytecode => '/',
        }
    }

    /// Byte offset where the simple name of `s` starts: just past the last
    /// delimiter, or 0 when there is none.
    pub fn simple_name_start(self, s: &str) -> usize {
        s.rfind(self.delimiter()).map_or(0, |i| i + self.delimiter().len_utf8())
    }

    /// Split `s` into component byte ranges, in order.
    pub fn split(self, s: &str) -> Vec<Range<usize>> {
        let (body, base) = match self {
            Tokenizer::Java => (s, 0),
            Tokenizer::Bytecode => strip_descriptor(s),
        };

        let mut components = Vec::new();
        let delimiter = self.delimiter();
        let mut offset = base;
        let mut segments = body.split(delimiter).peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                if !segment.is_empty() {
                    components.push(offset..offset + segment.len());
                }
            } else {
                split_camel_case(segment, offset, &mut components);
            }
            offset += segment.len() + delimiter.len_utf8();
        }
        components
    }
}

/// `Ljava/lang/String;` -> `java/lang/String` (with its offset in `s`).
fn strip_descriptor(s: &str) -> (&str, usize) {
    match s.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')) {
        Some(inner) => (inner, 1),
        None => (s, 0),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Digit
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_alphabetic() {
        CharClass::Lower
    } else {
        CharClass::Other
    }
}

/// Split one simple name on camel-case boundaries, appending ranges offset by `base`.
pub fn split_camel_case(segment: &str, base: usize, out: &mut Vec<Range<usize>>) {
    let chars: Vec<(usize, char)> = segment.char_indices().collect();
    let mut start: Option<usize> = None;
    let mut prev = CharClass::Other;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        let class = classify(c);
        if class == CharClass::Other {
            if let Some(s) = start.take() {
                out.push(base + s..base + pos);
            }
            prev = class;
            continue;
        }

        if let Some(s) = start {
            let next_is_lower = chars
                .get(i + 1)
                .is_some_and(|&(_, n)| classify(n) == CharClass::Lower);
            let boundary = match (prev, class) {
                (CharClass::Lower, CharClass::Upper) => true,
                (CharClass::Upper, CharClass::Upper) => next_is_lower,
                (CharClass::Digit, CharClass::Digit) => false,
                (CharClass::Digit, _) | (_, CharClass::Digit) => true,
                _ => false,
            };
            if boundary {
                out.push(base + s..base + pos);
                start = Some(pos);
            }
        } else {
            start = Some(pos);
        }
        prev = class;
    }

    if let Some(s) = start {
        out.push(base + s..base + segment.len());
    }
}

/// Lowercase a single char without changing its UTF-8 length.
#[inline]
pub fn lower_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
        _ => c,
    }
}

/// Lowercase `s` char by char; the result has the same byte layout as `s`.
pub fn lowercase(s: &str) -> String {
    s.chars().map(lower_char).collect()
}

/// An identifier together with its lowercase components.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitName {
    text: String,
    lower: String,
    components: Vec<Range<usize>>,
}

impl SplitName {
    pub fn new(text: impl Into<String>, tokenizer: Tokenizer) -> Self {
        let text = text.into();
        let components = tokenizer.split(&text);
        let lower = lowercase(&text);
        Self {
            text,
            lower,
            components,
        }
    }

    /// The original string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Component byte ranges into [`as_str`](Self::as_str).
    #[inline]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.components
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Lowercase bytes of component `i`.
    #[inline]
    pub fn component(&self, i: usize) -> &[u8] {
        &self.lower.as_bytes()[self.components[i].clone()]
    }

    /// Lowercase components in order.
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.iter().map(|r| &self.lower[r.clone()])
    }

    /// Component `i` with its original casing.
    pub fn original_component(&self, i: usize) -> &str {
        &self.text[self.components[i].clone()]
    }

    /// Length of the simple-name part, counted from the first uppercase char.
    ///
    /// Package names are assumed lowercase; nested classes stay part of the
    /// simple name. Names without an uppercase char count as `len + 1`.
    pub fn simple_name_len(&self) -> usize {
        match self.text.find(|c: char| c.is_uppercase()) {
            Some(i) => self.text.len() - i,
            None => self.text.len() + 1,
        }
    }

    /// Index of the first component of the simple name, the part after the
    /// last delimiter of `tokenizer`.
    pub fn simple_name_component(&self, tokenizer: Tokenizer) -> usize {
        let start = tokenizer.simple_name_start(&self.text);
        self.components.iter().take_while(|r| r.start < start).count()
    }

    /// The same text with only the components from `first` on.
    ///
    /// Ranges keep addressing the full text, so highlights computed against
    /// the suffix apply to the original string unchanged.
    pub fn suffix(&self, first: usize) -> SplitName {
        SplitName {
            text: self.text.clone(),
            lower: self.lower.clone(),
            components: self.components[first.min(self.components.len())..].to_vec(),
        }
    }

    /// Whether the component ranges and the lowercase copy line up with the
    /// text. Always true for names built by [`new`](Self::new).
    pub(crate) fn is_consistent(&self) -> bool {
        self.lower.len() == self.text.len()
            && self.components.iter().all(|r| {
                r.start < r.end
                    && r.end <= self.text.len()
                    && self.text.is_char_boundary(r.start)
                    && self.text.is_char_boundary(r.end)
                    && self.lower.is_char_boundary(r.start)
                    && self.lower.is_char_boundary(r.end)
            })
    }

    /// Ordering key that puts short class names first.
    pub fn relevance_key(&self) -> (usize, usize, &str) {
        (self.simple_name_len(), self.text.len(), &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(s: &str) -> Vec<String> {
        SplitName::new(s, Tokenizer::Java)
            .components()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(components("ConcurrentHashMap"), ["concurrent", "hash", "map"]);
        assert_eq!(components("hashCode"), ["hash", "code"]);
    }

    #[test]
    fn test_packages_are_whole_components() {
        assert_eq!(
            components("java.util.concurrent.ConcurrentHashMap"),
            ["java", "util", "concurrent", "concurrent", "hash", "map"]
        );
        assert_eq!(components("java.util"), ["java", "util"]);
        assert_eq!(components("java.lang.String"), ["java", "lang", "string"]);
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(components("URI"), ["uri"]);
        assert_eq!(components("URIBuilder"), ["uri", "builder"]);
        assert_eq!(components("HTMLParserFactory"), ["html", "parser", "factory"]);
    }

    #[test]
    fn test_digits() {
        assert_eq!(components("Jsr320"), ["jsr", "320"]);
        assert_eq!(components("JSR320"), ["jsr", "320"]);
        assert_eq!(components("Base64Codec"), ["base", "64", "codec"]);
    }

    #[test]
    fn test_separators_are_dropped() {
        assert_eq!(components("java.util.Map$Entry"), ["java", "util", "map", "entry"]);
        assert_eq!(components("MAX_VALUE"), ["max", "value"]);
        assert_eq!(components("a..B"), ["a", "b"]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(components("").is_empty());
        assert_eq!(components("string"), ["string"]);
    }

    #[test]
    fn test_bytecode() {
        let name = SplitName::new("Ljava/lang/String;", Tokenizer::Bytecode);
        assert_eq!(name.components().collect::<Vec<_>>(), ["java", "lang", "string"]);
        assert_eq!(name.original_component(2), "String");

        let name = SplitName::new("java/util/HashMap", Tokenizer::Bytecode);
        assert_eq!(name.components().collect::<Vec<_>>(), ["java", "util", "hash", "map"]);
    }

    #[test]
    fn test_ranges_address_original() {
        let name = SplitName::new("java.util.HashMap", Tokenizer::Java);
        assert_eq!(name.ranges(), &[0..4, 5..9, 10..14, 14..17]);
        assert_eq!(name.original_component(2), "Hash");
        assert_eq!(name.component(3), b"map");
    }

    #[test]
    fn test_lowercase_keeps_layout() {
        let s = "ÄrgerMitKelvin\u{212A}";
        let lower = lowercase(s);
        assert_eq!(lower.len(), s.len());
        assert!(lower.starts_with("ärger"));
    }

    #[test]
    fn test_relevance_key() {
        let short = SplitName::new("xxxxx.LongerName", Tokenizer::Java);
        let long = SplitName::new("long.ShortName", Tokenizer::Java);
        assert_eq!(short.simple_name_len(), 10);
        assert_eq!(long.simple_name_len(), 9);
        assert!(long.relevance_key() < short.relevance_key());

        let package = SplitName::new("java.util", Tokenizer::Java);
        assert_eq!(package.simple_name_len(), 10);
    }

    #[test]
    fn test_simple_name_suffix() {
        let name = SplitName::new("java.util.Map$Entry", Tokenizer::Java);
        let first = name.simple_name_component(Tokenizer::Java);
        assert_eq!(first, 2);
        let simple = name.suffix(first);
        assert_eq!(simple.components().collect::<Vec<_>>(), ["map", "entry"]);
        assert_eq!(simple.ranges(), &[10..13, 14..19]);

        let name = SplitName::new("Ljava/lang/String;", Tokenizer::Bytecode);
        assert_eq!(name.simple_name_component(Tokenizer::Bytecode), 2);

        let name = SplitName::new("MyName", Tokenizer::Java);
        assert_eq!(name.simple_name_component(Tokenizer::Java), 0);
        assert_eq!(name.suffix(5).component_count(), 0);
    }
}
