//! Library crate for relgram.
//!
//! Exposes the tabular specification reader, the grammar compiler with its
//! text writer, and the standalone prelexer.

#![forbid(unsafe_code)]

pub mod grammar;
pub mod prelexer;
pub mod table;

// Only expose test utilities to tests and opt-in consumers.
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_util;

pub use grammar::{Grammar, GrammarError, GrammarWriter};
pub use prelexer::{PrelexError, PrelexedToken, TokenCategory, prelex};
pub use table::{Row, TableError, parse_table};
