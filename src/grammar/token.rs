//! Standin and finalized token records.
//!
//! While the tabular specification is scanned, each distinct surface text
//! accumulates into a [`StandinToken`]: grammatic values, the most recent
//! description, an inferred lexical priority, and an operator name scraped
//! from the description. Once scanning completes the standin is frozen
//! into an immutable [`Token`].

use std::collections::BTreeSet;

use super::GrammarError;
use super::names::{char_name, constant_case, hardcoded_name, is_word_sequence};

/// A finalized lexical token of the target language.
///
/// Ordered by `(text, name, priority, description)`. Two tokens with
/// different surface text are always distinct, even when equivalent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    text: String,
    name: String,
    priority: usize,
    description: String,
}

impl Token {
    /// Exact surface text of the token.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Canonical `CONSTANT_CASE` name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lexical priority; 1 unless another token is a proper prefix of this
    /// one.
    #[must_use]
    pub fn priority(&self) -> usize {
        self.priority
    }

    /// Description carried over from the specification (empty when the
    /// specification gave none).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Name as emitted in the Terminals section: the bare name at priority
    /// 1, otherwise `NAME.<priority>` so a longest-match lexer prefers the
    /// longer alternative.
    #[must_use]
    pub fn marked_name(&self) -> String {
        if self.priority == 1 {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.priority)
        }
    }

    /// Terminal pattern for the token: words escaped for literal matching
    /// and joined with `\s+` so multi-word tokens tolerate irregular
    /// spacing, wrapped in `/…/` delimiters.
    #[must_use]
    pub fn escaped_pattern(&self) -> String {
        let escaped_words: Vec<String> = self
            .text
            .split_whitespace()
            .map(regex::escape)
            .collect();
        let escaped = escaped_words.join(r"\s+").replace('/', r"\/");
        format!("/{escaped}/")
    }
}

/// An equivalence group of interchangeable tokens.
///
/// The namesake is the member with the shortest canonical name; every
/// token belongs to exactly one group and `namesake ∈ members` always
/// holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenGroup {
    namesake: Token,
    members: BTreeSet<Token>,
}

impl TokenGroup {
    pub(crate) fn new(namesake: Token, members: BTreeSet<Token>) -> Self {
        debug_assert!(members.contains(&namesake));
        Self { namesake, members }
    }

    /// The representative member.
    #[must_use]
    pub fn namesake(&self) -> &Token {
        &self.namesake
    }

    /// All members, including the namesake.
    #[must_use]
    pub fn members(&self) -> &BTreeSet<Token> {
        &self.members
    }

    /// Group name: the namesake's name, suffixed when the group holds more
    /// than one member.
    #[must_use]
    pub fn name(&self) -> String {
        if self.members.len() == 1 {
            self.namesake.name.clone()
        } else {
            format!("{}_TOKENS", self.namesake.name)
        }
    }
}

/// Mutable accumulator for one surface text, owned by the token builder
/// until the scan completes.
#[derive(Debug, Clone)]
pub(crate) struct StandinToken {
    pub(crate) text: String,
    pub(crate) priority: usize,
    pub(crate) grammatic_values: BTreeSet<String>,
    pub(crate) description: Option<String>,
    pub(crate) operator_name: Option<String>,
    pub(crate) found_equivalence: bool,
    pub(crate) name: Option<String>,
}

impl StandinToken {
    pub(crate) fn new(text: String) -> Self {
        Self {
            text,
            priority: 1,
            grammatic_values: BTreeSet::new(),
            description: None,
            operator_name: None,
            found_equivalence: false,
            name: None,
        }
    }

    /// Record the operator name scraped from the description. A second
    /// assignment means inference ran twice over the same token and is a
    /// construction error.
    pub(crate) fn set_operator_name(&mut self, name: String) -> Result<(), GrammarError> {
        if let Some(existing) = &self.operator_name {
            return Err(GrammarError::OperatorNameConflict {
                token: self.text.clone(),
                existing: existing.clone(),
                new: name,
            });
        }
        self.operator_name = Some(name);
        Ok(())
    }

    /// Choose the canonical name, in order of preference: the surface text
    /// itself when it is a plain word sequence, the scraped operator name,
    /// the Unicode name of a single-character token, then the hardcoded
    /// fallback table.
    pub(crate) fn infer_name(&mut self) -> Result<(), GrammarError> {
        let raw = if is_word_sequence(&self.text) {
            Some(self.text.clone())
        } else {
            self.operator_name
                .clone()
                .or_else(|| single_char_name(&self.text).map(str::to_owned))
                .or_else(|| hardcoded_name(&self.text).map(str::to_owned))
        };
        let raw = raw.ok_or_else(|| GrammarError::NameInference {
            token: self.text.clone(),
        })?;
        let name = constant_case(&raw).ok_or_else(|| GrammarError::NameInference {
            token: self.text.clone(),
        })?;
        self.name = Some(name);
        Ok(())
    }

    /// Freeze into an immutable [`Token`]; requires [`Self::infer_name`] to
    /// have run.
    pub(crate) fn finalize(&self) -> Result<Token, GrammarError> {
        let name = self.name.clone().ok_or_else(|| GrammarError::NameInference {
            token: self.text.clone(),
        })?;
        Ok(Token {
            text: self.text.clone(),
            name,
            priority: self.priority,
            description: self.description.clone().unwrap_or_default(),
        })
    }
}

fn single_char_name(text: &str) -> Option<&'static str> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => char_name(ch),
        _ => None,
    }
}

/// Count-based prefix priority: each distinct token text that is a proper
/// prefix of another bumps the longer one's priority by 1, so that among
/// alternatives matching the same input prefix the longest carries the
/// highest priority.
pub(crate) fn infer_priorities<'a, I>(standins: I)
where
    I: IntoIterator<Item = &'a mut StandinToken>,
{
    let mut standins: Vec<&mut StandinToken> = standins.into_iter().collect();
    let texts: Vec<String> = standins.iter().map(|s| s.text.clone()).collect();
    for standin in &mut standins {
        let bumps = texts
            .iter()
            .filter(|t| t.as_str() != standin.text && standin.text.starts_with(t.as_str()))
            .count();
        standin.priority = standin.priority.saturating_add(bumps);
    }
}
