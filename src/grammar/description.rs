//! Heuristic scraping of token descriptions.
//!
//! The tabular specification declares structural facts (operator names,
//! token equivalences) only in free-text descriptions such as "Equivalent
//! to the 'is' keyword.". Every pattern that recovers such a fact lives
//! here, behind [`infer_from_description`], so the heuristics can be
//! tested on their own and a structured input format could bypass them
//! wholesale.
//!
//! Descriptions in the wild use typographic single quotes; hand-written
//! tables use straight quotes. The patterns accept both.

use once_cell::sync::Lazy;
use regex::Regex;

/// Facts recovered from one description text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredFacts {
    /// Human-readable operator name, from the first matching name pattern.
    pub operator_name: Option<String>,
    /// Surface texts (or phrases) the description declares this token
    /// equivalent to, in pattern order. Unresolvable entries are possible;
    /// resolution against the token table is the caller's concern.
    pub equivalence_targets: Vec<String>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            #[expect(clippy::expect_used, reason = "patterns are literals and always compile")]
            Regex::new(p).expect("description pattern")
        })
        .collect()
}

/// Ordered operator-name patterns; the first match wins.
static OPERATOR_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"The ['‘]([^.]+)['’] operator\.",
        r"The ([^.]+) operator[.,]",
    ])
});

/// Ordered equivalence-target patterns; every match contributes a target.
static EQUIVALENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"Equivalent to the ['‘]([^.]+)['’] (?:keyword|operator)\.",
        r"Equivalent to ['‘]([^.]+)['’]",
        r"The ['‘]([^.]+)['’] comparison\.",
        r"Equivalent to the keyword ['‘]([^.]+)['’] and the ['‘][^.]+['’] operator\.",
        r"Equivalent to the keyword ['‘][^.]+['’] and the ['‘]([^.]+)['’] operator\.",
        r"Equivalent to ([^.]+) or ['‘][^.]+['’]\.",
        r"Equivalent to [^.]+ or ['‘]([^.]+)['’]\.",
    ])
});

/// Scrape one description for an operator name and equivalence targets.
///
/// # Examples
///
/// ```rust
/// use relgram::grammar::description::infer_from_description;
///
/// let facts = infer_from_description("Equivalent to the 'is' keyword.");
/// assert_eq!(facts.equivalence_targets, vec!["is".to_string()]);
///
/// let facts = infer_from_description("The 'greater than' operator.");
/// assert_eq!(facts.operator_name.as_deref(), Some("greater than"));
/// ```
#[must_use]
pub fn infer_from_description(text: &str) -> InferredFacts {
    let mut facts = InferredFacts::default();
    for pattern in OPERATOR_NAME_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            facts.operator_name = captures.get(1).map(|m| m.as_str().to_owned());
            break;
        }
    }
    for pattern in EQUIVALENCE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(target) = captures.get(1) {
                facts.equivalence_targets.push(target.as_str().to_owned());
            }
        }
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("The \u{2018}greater than\u{2019} operator.", Some("greater than"))]
    #[case("The collection operator. Collects its operands into one plural result.", Some("collection"))]
    #[case("The multiplication operator.", Some("multiplication"))]
    #[case("The string concatenation operator.", Some("string concatenation"))]
    #[case("Returns TRUE when a string ends with the specified substring.", None)]
    #[case("", None)]
    fn operator_names(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(infer_from_description(text).operator_name.as_deref(), expected);
    }

    #[rstest]
    #[case("Equivalent to the \u{2018}is\u{2019} keyword.", vec!["is"])]
    #[case("Equivalent to the 'is' keyword.", vec!["is"])]
    #[case("Equivalent to \u{2018}not exist\u{2019}.", vec!["not exist"])]
    #[case("The \u{2018}>=\u{2019} comparison.", vec![">="])]
    #[case(
        "Equivalent to the keyword \u{2018}is not\u{2019} and the \u{2018}!=\u{2019} operator.",
        vec!["is not", "!="]
    )]
    #[case(
        "Equivalent to is less than or equal to or \u{2018}<=\u{2019}.",
        vec!["is less than or equal to", "<="]
    )]
    #[case("Used to access a property of an object.", vec![])]
    fn equivalence_targets(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(infer_from_description(text).equivalence_targets, expected);
    }

    #[test]
    fn keyword_reference_does_not_double_count() {
        // The bare "Equivalent to '...'" pattern must not also fire when the
        // longer keyword form matched; "the" separates them.
        let facts = infer_from_description(
            "Returns TRUE when two objects are equal. Equivalent to the \u{2018}=\u{2019} operator.",
        );
        assert_eq!(facts.equivalence_targets, vec!["=".to_string()]);
    }
}
