//! Longest-match tokenizer for raw query expressions.
//!
//! The prelexer is independently usable and does not touch the grammar
//! compiler: it slices an input string into categorized tokens (strings,
//! integers, operators, keywords, other words) with byte spans and a
//! normalized form. A raw [`logos`] scan recognizes the lexical shapes;
//! a merge pass then folds runs of words separated only by whitespace
//! into the longest matching multi-word keyword.
//!
//! Tokens cover the input exactly: concatenating every token's surface
//! text with the skipped whitespace reproduces the input. Normalization
//! never changes a surface slice, so spans stay trustworthy even for
//! typo-corrected operators.

use std::fmt;

use logos::Logos;
use thiserror::Error;

/// Longest keyword phrase in [`KEYWORDS`], in words.
const MAX_KEYWORD_WORDS: usize = 7;

/// Multi-word phrases recognized as single keywords, lowercase. Matching
/// is case-insensitive and tolerates irregular whitespace between words.
static KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "a",
    "an",
    "and",
    "as",
    "contains",
    "does not contain",
    "does not end with",
    "does not equal",
    "does not start with",
    "else",
    "ends with",
    "equals",
    "exist",
    "exist no",
    "exists",
    "exists no",
    "false",
    "if",
    "is",
    "is contained by",
    "is equal to",
    "is greater than",
    "is greater than or equal to",
    "is less than",
    "is less than or equal to",
    "is not",
    "is not contained by",
    "is not equal to",
    "is not greater than",
    "is not greater than or equal to",
    "is not less than",
    "is not less than or equal to",
    "it",
    "item",
    "items",
    "mod",
    "nil",
    "not",
    "nothing",
    "nothings",
    "null",
    "number",
    "of",
    "or",
    "starts with",
    "the",
    "then",
    "there do not exist",
    "there does not exist",
    "there exist",
    "there exist no",
    "there exists",
    "there exists no",
    "true",
    "whose",
};

/// Common typo spellings mapped to the operator they stand for. The
/// surface text keeps the typo; only the normalized form is corrected.
static OPERATOR_TYPOS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "\u{2013}" => "-",
};

/// First characters of every operator spelling, used to classify scan
/// failures.
static OPERATOR_INDICATORS: phf::Set<char> = phf::phf_set! {
    '=', '<', '>', '&', ';', '(', ')', '*', ',', '+', '/', '|', '-', '!',
    '\u{2013}',
};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n\x0b\x0c]+")]
    Whitespace,
    #[regex(r#""([^"%]|%[0-9a-fA-F][0-9a-fA-F])*""#)]
    Str,
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[a-zA-Z][_a-zA-Z0-9]*")]
    Word,
    #[token("!=")]
    #[token("\u{2013}")]
    #[regex(r"[=<>&;()*,+/|-]")]
    Operator,
}

/// Category of one prelexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    String,
    Integer,
    Operator,
    Keyword,
    Word,
}

impl TokenCategory {
    /// One-letter tag used by the line-oriented dump format.
    #[must_use]
    pub fn initial(self) -> char {
        match self {
            Self::String => 'S',
            Self::Integer => 'I',
            Self::Operator => 'O',
            Self::Keyword => 'K',
            Self::Word => 'W',
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Operator => "operator",
            Self::Keyword => "keyword",
            Self::Word => "word",
        };
        f.write_str(name)
    }
}

/// One token of the input, with its exact surface slice, byte span, and
/// normalized form (keywords uppercased and hyphen-joined, words
/// lowercased, typo operators corrected; other categories unchanged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrelexedToken {
    pub category: TokenCategory,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub normalized: String,
}

/// Tokenization failure. Both kinds carry the unconsumed remainder of
/// the input alongside the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrelexError {
    /// A recognizable token shape started but did not complete, such as an
    /// unterminated string or a lone `!`.
    #[error("bad {category} at byte {position}: {rest:?}")]
    Lexical {
        category: TokenCategory,
        position: usize,
        rest: String,
    },
    /// A character no token can start with.
    #[error("unexpected character {found:?} at byte {position}: {rest:?}")]
    Structural {
        found: char,
        position: usize,
        rest: String,
    },
}

/// Tokenize one expression.
///
/// # Examples
///
/// ```rust
/// use relgram::prelexer::prelex;
///
/// let tokens = prelex("123a")?;
/// let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
/// assert_eq!(normalized, vec!["123", "A"]);
/// # Ok::<(), relgram::prelexer::PrelexError>(())
/// ```
///
/// # Errors
///
/// Returns [`PrelexError::Lexical`] when a token shape starts but cannot
/// complete and [`PrelexError::Structural`] for a character no token can
/// start with.
pub fn prelex(expression: &str) -> Result<Vec<PrelexedToken>, PrelexError> {
    let mut raw: Vec<RawPiece<'_>> = Vec::new();
    let mut lexer = RawToken::lexer(expression);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => raw.push(RawPiece {
                kind,
                slice: lexer.slice(),
                start: span.start,
                end: span.end,
            }),
            Err(()) => return Err(classify_failure(expression, span.start)),
        }
    }

    let mut tokens = Vec::new();
    let mut i = 0usize;
    while let Some(piece) = raw.get(i) {
        let consumed = match piece.kind {
            RawToken::Whitespace => 1,
            RawToken::Str => {
                tokens.push(piece.simple(TokenCategory::String));
                1
            }
            RawToken::Integer => {
                tokens.push(piece.simple(TokenCategory::Integer));
                1
            }
            RawToken::Operator => {
                let normalized = OPERATOR_TYPOS
                    .get(piece.slice)
                    .copied()
                    .unwrap_or(piece.slice);
                tokens.push(PrelexedToken {
                    category: TokenCategory::Operator,
                    text: piece.slice.to_owned(),
                    start: piece.start,
                    end: piece.end,
                    normalized: normalized.to_owned(),
                });
                1
            }
            RawToken::Word => match keyword_at(&raw, i) {
                Some((token, consumed)) => {
                    tokens.push(token);
                    consumed
                }
                None => {
                    tokens.push(PrelexedToken {
                        category: TokenCategory::Word,
                        text: piece.slice.to_owned(),
                        start: piece.start,
                        end: piece.end,
                        normalized: piece.slice.to_lowercase(),
                    });
                    1
                }
            },
        };
        i = i.saturating_add(consumed);
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy)]
struct RawPiece<'a> {
    kind: RawToken,
    slice: &'a str,
    start: usize,
    end: usize,
}

impl RawPiece<'_> {
    fn simple(&self, category: TokenCategory) -> PrelexedToken {
        PrelexedToken {
            category,
            text: self.slice.to_owned(),
            start: self.start,
            end: self.end,
            normalized: self.slice.to_owned(),
        }
    }
}

/// Try to fold the run of whitespace-separated words starting at `at`
/// into the longest matching keyword phrase. Returns the keyword token
/// and the number of raw pieces it consumed.
fn keyword_at(raw: &[RawPiece<'_>], at: usize) -> Option<(PrelexedToken, usize)> {
    let mut words: Vec<&str> = Vec::new();
    let mut j = at;
    loop {
        let Some(piece) = raw.get(j) else { break };
        if piece.kind != RawToken::Word {
            break;
        }
        words.push(piece.slice);
        if words.len() == MAX_KEYWORD_WORDS {
            break;
        }
        match raw.get(j.saturating_add(1)) {
            Some(ws) if ws.kind == RawToken::Whitespace => j = j.saturating_add(2),
            _ => break,
        }
    }

    for n in (1..=words.len()).rev() {
        let Some(prefix) = words.get(..n) else {
            continue;
        };
        let phrase = prefix.join(" ").to_lowercase();
        if !KEYWORDS.contains(phrase.as_str()) {
            continue;
        }
        let consumed = n.saturating_mul(2).saturating_sub(1);
        let pieces = raw.get(at..at.saturating_add(consumed))?;
        let text: String = pieces.iter().map(|p| p.slice).collect();
        let normalized = pieces
            .iter()
            .filter(|p| p.kind == RawToken::Word)
            .map(|p| p.slice.to_uppercase())
            .collect::<Vec<String>>()
            .join("-");
        let start = pieces.first()?.start;
        let end = pieces.last()?.end;
        return Some((
            PrelexedToken {
                category: TokenCategory::Keyword,
                text,
                start,
                end,
                normalized,
            },
            consumed,
        ));
    }
    None
}

/// Name the token shape that failed, from the first unconsumed character.
fn classify_failure(expression: &str, position: usize) -> PrelexError {
    let rest = expression.get(position..).unwrap_or("").to_owned();
    let found = rest.chars().next().unwrap_or('\u{fffd}');
    let category = if found == '"' {
        TokenCategory::String
    } else if found.is_numeric() {
        TokenCategory::Integer
    } else if found.is_alphabetic() {
        TokenCategory::Word
    } else if OPERATOR_INDICATORS.contains(&found) {
        TokenCategory::Operator
    } else {
        return PrelexError::Structural {
            found,
            position,
            rest,
        };
    };
    PrelexError::Lexical {
        category,
        position,
        rest,
    }
}
