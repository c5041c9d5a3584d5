//! Shared test utilities for integration tests.
//!
//! These helpers build specification rows and render grammars to strings.
//! They mirror a subset of the `relgram::test_util` module without
//! requiring the `test-support` feature, enabling integration tests to
//! compile against the published library.

#![expect(
    dead_code,
    reason = "helpers are reused across multiple tests so some may be unused"
)]

use relgram::grammar::{Grammar, GrammarWriter};
use relgram::table::Row;

/// A minimal row: token text and grammatic value only.
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
pub fn described_row(token: &str, grammatic_value: &str, description: &str) -> Row {
    Row {
        description: Some(description.to_owned()),
        ..row(token, grammatic_value)
    }
}

/// A precedence-level row.
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

/// Compile rows, panicking with the construction error on failure.
pub fn compile(rows: &[Row]) -> Grammar {
    Grammar::from_rows(rows).unwrap_or_else(|e| panic!("construction failed: {e}"))
}

/// Render a grammar to a string.
pub fn render(grammar: &Grammar) -> String {
    let mut buffer = Vec::new();
    let mut writer = GrammarWriter::new(grammar, &mut buffer);
    writer
        .write_grammar()
        .unwrap_or_else(|e| panic!("write failed: {e}"));
    drop(writer);
    String::from_utf8(buffer).unwrap_or_else(|e| panic!("output not utf-8: {e}"))
}

/// Render a grammar with the trailing import reference block.
pub fn render_with_module(grammar: &Grammar, module_name: &str) -> String {
    let mut buffer = Vec::new();
    let mut writer = GrammarWriter::new(grammar, &mut buffer).with_module_name(module_name);
    writer
        .write_grammar()
        .unwrap_or_else(|e| panic!("write failed: {e}"));
    drop(writer);
    String::from_utf8(buffer).unwrap_or_else(|e| panic!("output not utf-8: {e}"))
}

/// Whitespace-split views of every non-blank output line, for assertions
/// that ignore column alignment.
pub fn split_lines(output: &str) -> Vec<Vec<&str>> {
    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<&str>>())
        .filter(|words| !words.is_empty())
        .collect()
}
