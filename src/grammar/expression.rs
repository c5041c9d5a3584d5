//! Precedence levels of the synthesized expression grammar.
//!
//! Rows carrying a precedence are grouped into per-level
//! [`StandinExpression`] records, validated for level-wide consistency,
//! and linked into a chain of [`Expression`] values ordered by strictly
//! increasing precedence. The chain ends with a synthetic start level; the
//! level with the lowest precedence has no predecessor and acts as the
//! chain's sentinel end.

use std::cmp::Ordering;
use std::fmt;

use super::names::snake_case;
use super::token::TokenGroup;
use super::{GrammarError, START_RULE_NAME};

/// Numeric precedence of one level, total-ordered so levels can be sorted
/// and keyed even though the specification supplies floating-point values.
#[derive(Debug, Clone, Copy)]
pub struct Precedence(f64);

impl Precedence {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Precedence of the synthetic start level, one above the given level.
    #[expect(clippy::float_arithmetic, reason = "start level sits one step above the chain")]
    pub(crate) fn successor(self) -> Self {
        Self(self.0 + 1.0)
    }
}

// Equality follows the same total order as `cmp`, so `BTreeMap` keying
// and `==` never disagree (notably for `-0.0` and `0.0`).
impl PartialEq for Precedence {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Precedence {}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Precedence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One precedence-bearing specification row, before grouping.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StandinExpression {
    pub(crate) grammatic_value: String,
    pub(crate) precedence: Precedence,
    pub(crate) token_text: String,
    pub(crate) description: String,
    pub(crate) left_associative: bool,
}

/// Rule-synthesis category of a level, decided once at construction time
/// from the level description and associativity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Grouping level; carries the resolved open/close group names.
    Parenthesization {
        open_group: String,
        close_group: String,
    },
    /// Optional prefix operator applied to the next tighter level.
    UnaryPrefix,
    /// Binary operator recursing through the rule's own name on the left.
    LeftAssocBinary,
    /// Binary operator recursing on the right; also the default.
    RightAssocBinary,
}

/// One finalized precedence level of the expression chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    precedence: Precedence,
    description: String,
    name: String,
    left_associative: bool,
    kind: ExpressionKind,
    preceding: Option<usize>,
    token_groups: Vec<TokenGroup>,
}

impl Expression {
    pub(crate) fn new(
        precedence: Precedence,
        description: String,
        left_associative: bool,
        kind: ExpressionKind,
        preceding: Option<usize>,
        token_groups: Vec<TokenGroup>,
    ) -> Result<Self, GrammarError> {
        let name = if description == START_RULE_NAME {
            START_RULE_NAME.to_owned()
        } else {
            snake_case(&format!("{description} expr")).ok_or_else(|| {
                GrammarError::InvalidRuleName {
                    description: description.clone(),
                }
            })?
        };
        Ok(Self {
            precedence,
            description,
            name,
            left_associative,
            kind,
            preceding,
            token_groups,
        })
    }

    #[must_use]
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Rule name in the emitted grammar (`products` → `products_expr`; the
    /// synthetic start level is simply `expr`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn left_associative(&self) -> bool {
        self.left_associative
    }

    #[must_use]
    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    /// Index of the next looser-binding level in the chain, or `None` for
    /// the sentinel end of the chain.
    #[must_use]
    pub fn preceding(&self) -> Option<usize> {
        self.preceding
    }

    #[must_use]
    pub fn token_groups(&self) -> &[TokenGroup] {
        &self.token_groups
    }

    /// Rule name with the inline marker used in the Rules section.
    #[must_use]
    pub fn marked_name(&self) -> String {
        format!("?{}", self.name)
    }

    /// Name of the level's indirection rule, forwarding to the preceding
    /// level so higher rules never reference a lower rule name directly.
    #[must_use]
    pub fn hook_name(&self) -> String {
        let stem = self.name.strip_suffix("_expr").unwrap_or(&self.name);
        format!("{stem}_hook")
    }

    /// Hook name with the inline marker.
    #[must_use]
    pub fn marked_hook_name(&self) -> String {
        format!("?{}", self.hook_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 2.0)]
    #[case(-3.0, 4.5)]
    fn precedence_orders_by_value(#[case] lo: f64, #[case] hi: f64) {
        assert!(Precedence::new(lo) < Precedence::new(hi));
    }

    #[test]
    fn precedence_successor_is_greater() {
        let p = Precedence::new(10.0);
        assert!(p.successor() > p);
    }

    #[test]
    fn precedence_equality_agrees_with_ordering_for_signed_zero() {
        let neg = Precedence::new(-0.0);
        let pos = Precedence::new(0.0);
        assert_eq!(neg.cmp(&pos), Ordering::Less);
        assert_ne!(neg, pos);
        assert_eq!(neg, Precedence::new(-0.0));
    }

    fn level(description: &str) -> Expression {
        Expression::new(
            Precedence::new(1.0),
            description.to_owned(),
            false,
            ExpressionKind::RightAssocBinary,
            None,
            Vec::new(),
        )
        .unwrap_or_else(|e| panic!("level construction failed: {e}"))
    }

    #[rstest]
    #[case("products", "products_expr", "products_hook")]
    #[case("unary operator", "unary_operator_expr", "unary_operator_hook")]
    #[case("AND", "and_expr", "and_hook")]
    #[case("expr", "expr", "expr_hook")]
    fn rule_and_hook_names(
        #[case] description: &str,
        #[case] name: &str,
        #[case] hook: &str,
    ) {
        let expr = level(description);
        assert_eq!(expr.name(), name);
        assert_eq!(expr.hook_name(), hook);
        assert_eq!(expr.marked_name(), format!("?{name}"));
        assert_eq!(expr.marked_hook_name(), format!("?{hook}"));
    }
}
