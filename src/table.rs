//! Tabular specification input.
//!
//! The grammar compiler consumes a comma-separated table with a header
//! row. Headers are normalized to `snake_case`, the legacy `original_gv`
//! column is accepted as an alias for `token`, blank cells are treated as
//! absent, and rows whose worry category is on the ignore list are dropped
//! before any other processing.

use std::collections::HashMap;
use std::mem::take;

use log::debug;
use thiserror::Error;

use crate::grammar::names::snake_case;

/// Worry categories whose rows carry no lexical or grammatical weight.
static WORRIES_TO_IGNORE: phf::Set<&'static str> = phf::phf_set! {
    "pseudokeyword",
};

/// One normalized specification row. Pure data; all interpretation happens
/// in the grammar compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Category tag; rows with an ignored category never reach this type.
    pub worry: Option<String>,
    /// Exact surface text of the token.
    pub token: String,
    /// Grammatical role tag.
    pub grammatic_value: String,
    /// `"left"` marks a left-associative precedence level.
    pub associativity: Option<String>,
    /// Free-text description; scraped for operator names and equivalences.
    pub description: Option<String>,
    /// Numeric precedence; present only on precedence-level rows.
    pub precedence: Option<f64>,
}

/// Malformed specification input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("unterminated quoted field at line {line}")]
    UnterminatedQuote { line: usize },
    #[error("record {record} is missing required column {column:?}")]
    MissingColumn {
        record: usize,
        column: &'static str,
    },
    #[error("record {record} has non-numeric precedence {value:?}")]
    InvalidPrecedence { record: usize, value: String },
}

/// Parse the whole specification table.
///
/// # Errors
///
/// Returns a [`TableError`] for an unterminated quoted field, a record
/// missing the token or grammatic-value column, or a precedence cell that
/// is not a number.
pub fn parse_table(input: &str) -> Result<Vec<Row>, TableError> {
    let mut records = parse_records(input)?.into_iter();
    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header
        .iter()
        .map(|h| snake_case(h).unwrap_or_else(|| h.trim().to_lowercase()))
        .collect();

    let mut rows = Vec::new();
    let mut ignored = 0usize;
    for (idx, record) in records.enumerate() {
        let record_no = idx.saturating_add(1);
        let cells: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, v)| !v.is_empty())
            .map(|(h, v)| (h.as_str(), v.as_str()))
            .collect();

        let worry = cells.get("worry").copied();
        if worry.is_some_and(|w| WORRIES_TO_IGNORE.contains(w)) {
            ignored = ignored.saturating_add(1);
            continue;
        }
        let token = cells
            .get("token")
            .or_else(|| cells.get("original_gv"))
            .copied()
            .ok_or(TableError::MissingColumn {
                record: record_no,
                column: "token",
            })?;
        let grammatic_value =
            cells
                .get("grammatic_value")
                .copied()
                .ok_or(TableError::MissingColumn {
                    record: record_no,
                    column: "grammatic_value",
                })?;
        let precedence = cells
            .get("precedence")
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| TableError::InvalidPrecedence {
                        record: record_no,
                        value: (*v).to_owned(),
                    })
            })
            .transpose()?;

        rows.push(Row {
            worry: worry.map(str::to_owned),
            token: token.to_owned(),
            grammatic_value: grammatic_value.to_owned(),
            associativity: cells.get("associativity").copied().map(str::to_owned),
            description: cells.get("description").copied().map(str::to_owned),
            precedence,
        });
    }
    debug!("parsed {} rows ({ignored} ignored)", rows.len());
    Ok(rows)
}

/// Split comma-separated input into records of fields. Quoted fields may
/// contain commas, doubled quotes, and newlines; CR is dropped so CRLF
/// input parses the same as LF input.
fn parse_records(input: &str) -> Result<Vec<Vec<String>>, TableError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut seen_content = false;
    let mut line = 1usize;

    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    line = line.saturating_add(1);
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = true;
                seen_content = true;
            }
            ',' => {
                record.push(take(&mut field));
                seen_content = true;
            }
            '\r' => {}
            '\n' => {
                line = line.saturating_add(1);
                if seen_content || !field.is_empty() {
                    record.push(take(&mut field));
                    records.push(take(&mut record));
                    seen_content = false;
                }
            }
            _ => {
                field.push(ch);
                seen_content = true;
            }
        }
    }
    if in_quotes {
        return Err(TableError::UnterminatedQuote { line });
    }
    if seen_content || !field.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}
