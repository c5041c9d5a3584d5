//! Naming support for grammar output: word-splitting case conversion,
//! Unicode names for punctuation tokens, and the hardcoded fallbacks used
//! when no other naming rule applies.
//!
//! Rule and terminal names in the emitted grammar are derived from free
//! text (level descriptions, token surface text, scraped operator names),
//! so everything funnels through `snake_case` or `constant_case` before it
//! becomes an identifier.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;

/// Names for the ASCII punctuation characters a token may consist of.
///
/// The standard Unicode character names, as `unicodedata.name` would
/// report them. A static map avoids pulling in a full name table for the
/// handful of characters a query language can use as operators.
static CHAR_NAMES: phf::Map<char, &'static str> = phf_map! {
    '!' => "EXCLAMATION MARK",
    '"' => "QUOTATION MARK",
    '#' => "NUMBER SIGN",
    '$' => "DOLLAR SIGN",
    '%' => "PERCENT SIGN",
    '&' => "AMPERSAND",
    '\'' => "APOSTROPHE",
    '(' => "LEFT PARENTHESIS",
    ')' => "RIGHT PARENTHESIS",
    '*' => "ASTERISK",
    '+' => "PLUS SIGN",
    ',' => "COMMA",
    '-' => "HYPHEN-MINUS",
    '.' => "FULL STOP",
    '/' => "SOLIDUS",
    ':' => "COLON",
    ';' => "SEMICOLON",
    '<' => "LESS-THAN SIGN",
    '=' => "EQUALS SIGN",
    '>' => "GREATER-THAN SIGN",
    '?' => "QUESTION MARK",
    '@' => "COMMERCIAL AT",
    '[' => "LEFT SQUARE BRACKET",
    '\\' => "REVERSE SOLIDUS",
    ']' => "RIGHT SQUARE BRACKET",
    '^' => "CIRCUMFLEX ACCENT",
    '_' => "LOW LINE",
    '`' => "GRAVE ACCENT",
    '{' => "LEFT CURLY BRACKET",
    '|' => "VERTICAL LINE",
    '}' => "RIGHT CURLY BRACKET",
    '~' => "TILDE",
};

/// Token texts that defeat every generic naming rule.
static HARDCODED_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "!=" => "not equal",
};

static WORD_SEQUENCE_RE: Lazy<Regex> = Lazy::new(|| {
    #[expect(clippy::expect_used, reason = "pattern is a literal and always compiles")]
    Regex::new(r"^\w+(\s+\w+)*$").expect("word sequence pattern")
});

/// Whether `text` is a plain sequence of identifier-like words.
///
/// Such a token can be named after its own surface text (`does not
/// contain` becomes `DOES_NOT_CONTAIN`); anything else needs an inferred
/// or hardcoded name.
#[must_use]
pub fn is_word_sequence(text: &str) -> bool {
    WORD_SEQUENCE_RE.is_match(text)
}

/// Look up the Unicode name of a single-character token.
#[must_use]
pub fn char_name(ch: char) -> Option<&'static str> {
    CHAR_NAMES.get(&ch).copied()
}

/// Look up the fixed fallback name for a token text, if one exists.
#[must_use]
pub fn hardcoded_name(text: &str) -> Option<&'static str> {
    HARDCODED_NAMES.get(text).copied()
}

/// Convert free text to `snake_case`, or `None` when no word characters
/// survive.
///
/// Words are split on punctuation and whitespace as well as on camel-case
/// boundaries; digits stay attached to the preceding word.
///
/// # Examples
///
/// ```rust
/// use relgram::grammar::names::snake_case;
///
/// assert_eq!(snake_case("Grammatic Value"), Some("grammatic_value".into()));
/// assert_eq!(snake_case("Hell0World"), Some("hell0_world".into()));
/// assert_eq!(snake_case("!@#$"), None);
/// ```
#[must_use]
pub fn snake_case(text: &str) -> Option<String> {
    let words = split_words(text);
    if words.is_empty() {
        return None;
    }
    Some(words.join("_").to_lowercase())
}

/// Convert free text to `CONSTANT_CASE`, or `None` when no word characters
/// survive.
#[must_use]
pub fn constant_case(text: &str) -> Option<String> {
    let words = split_words(text);
    if words.is_empty() {
        return None;
    }
    Some(words.join("_").to_uppercase())
}

/// Split text into words at non-alphanumeric characters and lower-to-upper
/// camel boundaries.
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            let camel_boundary = prev
                .is_some_and(|p| (p.is_lowercase() || p.is_numeric()) && ch.is_uppercase());
            if camel_boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev = Some(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("    ", None)]
    #[case("!@#$", None)]
    #[case("23skidoo", Some("23skidoo"))]
    #[case("hello", Some("hello"))]
    #[case("Hello", Some("hello"))]
    #[case("HELLO", Some("hello"))]
    #[case("hello-world", Some("hello_world"))]
    #[case("HelloWorld", Some("hello_world"))]
    #[case("Hell0World", Some("hell0_world"))]
    #[case("Hello World!", Some("hello_world"))]
    #[case("Hello, World!", Some("hello_world"))]
    fn snake_cases(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(snake_case(input).as_deref(), expected);
    }

    #[rstest]
    #[case("23skidoo", Some("23SKIDOO"))]
    #[case("hello-world", Some("HELLO_WORLD"))]
    #[case("less than or equal to", Some("LESS_THAN_OR_EQUAL_TO"))]
    #[case("HYPHEN-MINUS", Some("HYPHEN_MINUS"))]
    #[case("", None)]
    fn constant_cases(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(constant_case(input).as_deref(), expected);
    }

    #[rstest]
    #[case("is", true)]
    #[case("does not contain", true)]
    #[case("item_2", true)]
    #[case("!=", false)]
    #[case("(", false)]
    #[case("a b,c", false)]
    fn word_sequences(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_word_sequence(input), expected);
    }

    #[rstest]
    #[case('(', Some("LEFT PARENTHESIS"))]
    #[case('=', Some("EQUALS SIGN"))]
    #[case('&', Some("AMPERSAND"))]
    #[case('a', None)]
    fn char_names(#[case] ch: char, #[case] expected: Option<&str>) {
        assert_eq!(char_name(ch), expected);
    }

    #[test]
    fn hardcoded_not_equal() {
        assert_eq!(hardcoded_name("!="), Some("not equal"));
        assert_eq!(hardcoded_name("=="), None);
    }
}
