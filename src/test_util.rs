//! Helpers for constructing specification rows in tests.
//!
//! These builders reduce boilerplate when assembling row sets for the
//! grammar compiler, and [`sample_rows`] provides a small but complete
//! language covering every precedence-level category.

use crate::table::Row;

/// A minimal row: token text and grammatic value only.
#[must_use]
pub fn row(token: &str, grammatic_value: &str) -> Row {
    Row {
        worry: None,
        token: token.to_owned(),
        grammatic_value: grammatic_value.to_owned(),
        associativity: None,
        description: None,
        precedence: None,
    }
}

/// A row carrying a free-text description.
#[must_use]
pub fn described_row(token: &str, grammatic_value: &str, description: &str) -> Row {
    Row {
        description: Some(description.to_owned()),
        ..row(token, grammatic_value)
    }
}

/// A precedence-level row.
#[must_use]
pub fn level_row(
    token: &str,
    grammatic_value: &str,
    description: &str,
    precedence: f64,
    associativity: Option<&str>,
) -> Row {
    Row {
        associativity: associativity.map(str::to_owned),
        precedence: Some(precedence),
        ..described_row(token, grammatic_value, description)
    }
}

/// A five-level sample language: parenthesization, a unary operator, a
/// right-associative comparison level with an operator spelling declared
/// equivalent to a keyword, and two left-associative boolean levels.
#[must_use]
pub fn sample_rows() -> Vec<Row> {
    vec![
        level_row("(", "left-paren", "parentheses", 1.0, None),
        level_row(")", "right-paren", "parentheses", 1.0, None),
        level_row("not", "not-keyword", "unary operator", 2.0, None),
        level_row("is", "comparison-op", "comparison", 3.0, None),
        described_row("=", "comparison-op", "Equivalent to the 'is' keyword."),
        row("is not", "negated-comparison"),
        described_row(
            "!=",
            "negated-comparison",
            "Equivalent to the 'is not' keyword.",
        ),
        level_row("and", "and-keyword", "AND", 4.0, Some("left")),
        level_row("or", "or-keyword", "OR", 5.0, Some("left")),
    ]
}
