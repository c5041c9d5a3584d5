//! Grammar compilation pipeline.
//!
//! [`Grammar::from_rows`] turns the normalized specification rows into a
//! deduplicated token model, a partition of tokens into equivalence
//! groups, and a precedence-ordered expression chain, in one forward pass:
//! token building → equivalence classing → chain building. Construction
//! either succeeds completely or fails with a [`GrammarError`]; a
//! partially built model is never observable. The finished value is
//! immutable and is rendered by [`GrammarWriter`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};
use thiserror::Error;

use crate::table::Row;

pub mod description;
mod equivalence;
pub mod expression;
pub mod names;
pub mod token;
pub mod writer;

pub use expression::{Expression, ExpressionKind, Precedence};
pub use token::{Token, TokenGroup};
pub use writer::GrammarWriter;

use description::infer_from_description;
use equivalence::DisjointSet;
use expression::StandinExpression;
use token::{StandinToken, infer_priorities};

/// Name of the synthetic top-level rule.
pub const START_RULE_NAME: &str = "expr";
/// Name of the base value rule referenced by the parenthesization level.
pub const VALUE_RULE_NAME: &str = "value";

/// Level description selecting the parenthesization synthesis policy.
pub const DESC_PARENTHESES: &str = "parentheses";
/// Level description selecting the unary prefix synthesis policy.
pub const DESC_UNARY_OPERATOR: &str = "unary operator";
/// Associativity cell value marking a left-associative level.
pub const ASSOC_LEFT: &str = "left";

const TOKEN_LEFT_PARENTHESIS: &str = "(";
const TOKEN_RIGHT_PARENTHESIS: &str = ")";

/// Fatal construction-time failure of the grammar compiler.
///
/// None of these are recoverable: a grammar model that failed validation
/// has no well-defined meaning for the writer, so construction aborts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("operator name for token {token:?} already set to {existing:?}, refusing {new:?}")]
    OperatorNameConflict {
        token: String,
        existing: String,
        new: String,
    },
    #[error("unable to infer a canonical name for token {token:?}")]
    NameInference { token: String },
    #[error("token name {name:?} derived for both {first:?} and {second:?}")]
    DuplicateTokenName {
        name: String,
        first: String,
        second: String,
    },
    #[error("equivalence class for token {token:?} is empty")]
    EmptyEquivalenceClass { token: String },
    #[error("token group name {name:?} derived for more than one group")]
    DuplicateGroupName { name: String },
    #[error("precedence level {precedence} mixes descriptions {values:?}")]
    NonSingularDescription {
        precedence: Precedence,
        values: Vec<String>,
    },
    #[error("precedence level {precedence} mixes associativities")]
    NonSingularAssociativity { precedence: Precedence },
    #[error("row for token {token:?} at precedence {precedence} carries no description")]
    MissingLevelDescription {
        precedence: Precedence,
        token: String,
    },
    #[error("precedence level {precedence} references unknown token {token:?}")]
    UnknownLevelToken {
        precedence: Precedence,
        token: String,
    },
    #[error("level description {description:?} used at more than one precedence")]
    DuplicateLevelDescription { description: String },
    #[error("level description {description:?} is reserved for the start rule")]
    ReservedLevelDescription { description: String },
    #[error("parenthesization level {precedence} has no open-group token")]
    MissingOpenParenthesis { precedence: Precedence },
    #[error("parenthesization level {precedence} has no close-group token")]
    MissingCloseParenthesis { precedence: Precedence },
    #[error("specification contains no precedence levels")]
    NoPrecedenceLevels,
    #[error("unable to derive a rule name from level description {description:?}")]
    InvalidRuleName { description: String },
}

/// The compiled grammar model: finalized tokens, equivalence groups, and
/// the expression chain, plus the diagnostics gathered while resolving
/// description references.
#[derive(Debug)]
pub struct Grammar {
    tokens_by_name: BTreeMap<String, Token>,
    tokens_by_text: HashMap<String, Token>,
    groups_by_name: BTreeMap<String, TokenGroup>,
    group_by_text: HashMap<String, TokenGroup>,
    expressions: Vec<Expression>,
    unexpected_equivalence_targets: BTreeSet<String>,
    gv_fallback_hits: usize,
}

impl Grammar {
    /// Compile specification rows into a grammar model.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for any of the fatal conditions detected
    /// during construction: conflicting operator names, unnameable tokens,
    /// name collisions, inconsistent precedence levels, or a
    /// parenthesization level missing its open or close token.
    pub fn from_rows(rows: &[Row]) -> Result<Self, GrammarError> {
        let (mut standins, standin_exprs) = collect_standins(rows)?;
        debug!("collected {} standin tokens", standins.len());

        infer_priorities(standins.values_mut());
        infer_operator_names(&mut standins)?;

        let outcome = build_equivalence_classes(&mut standins);
        debug!(
            "derived {} equivalence classes ({} unexpected targets, {} fallback hits)",
            outcome.classes.len(),
            outcome.unexpected.len(),
            outcome.fallback_hits,
        );

        for standin in standins.values_mut() {
            standin.infer_name()?;
        }
        let (tokens_by_text, tokens_by_name) = finalize_tokens(&standins)?;
        verify_partition(&standins, &outcome.classes)?;

        let (groups_by_name, group_by_text) =
            build_token_groups(&outcome.classes, &tokens_by_text)?;
        let expressions = build_expression_chain(standin_exprs, &group_by_text)?;
        debug!(
            "built expression chain with {} levels (including start)",
            expressions.len()
        );

        Ok(Self {
            tokens_by_name,
            tokens_by_text,
            groups_by_name,
            group_by_text,
            expressions,
            unexpected_equivalence_targets: outcome.unexpected,
            gv_fallback_hits: outcome.fallback_hits,
        })
    }

    /// All finalized tokens in canonical-name order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&Token> {
        self.tokens_by_name.values().collect()
    }

    /// Token for an exact surface text.
    #[must_use]
    pub fn token(&self, text: &str) -> Option<&Token> {
        self.tokens_by_text.get(text)
    }

    /// All equivalence groups in group-name order.
    #[must_use]
    pub fn token_groups(&self) -> Vec<&TokenGroup> {
        self.groups_by_name.values().collect()
    }

    /// The equivalence group containing the token with this surface text.
    #[must_use]
    pub fn group_for_token_text(&self, text: &str) -> Option<&TokenGroup> {
        self.group_by_text.get(text)
    }

    /// Expression chain in ascending precedence order, the synthetic start
    /// level last.
    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Equivalence targets scraped from descriptions that resolved to no
    /// token, directly or through a grammatic value.
    #[must_use]
    pub fn unexpected_equivalence_targets(&self) -> &BTreeSet<String> {
        &self.unexpected_equivalence_targets
    }

    /// How often equivalence resolution fell back to a token's grammatic
    /// value. Non-zero values suggest specification drift worth reviewing.
    #[must_use]
    pub fn gv_fallback_hits(&self) -> usize {
        self.gv_fallback_hits
    }
}

fn collect_standins(
    rows: &[Row],
) -> Result<(BTreeMap<String, StandinToken>, Vec<StandinExpression>), GrammarError> {
    let mut standins: BTreeMap<String, StandinToken> = BTreeMap::new();
    let mut standin_exprs = Vec::new();
    for row in rows {
        let standin = standins
            .entry(row.token.clone())
            .or_insert_with(|| StandinToken::new(row.token.clone()));
        standin.grammatic_values.insert(row.grammatic_value.clone());
        standin.description = row.description.clone();
        if let Some(value) = row.precedence {
            let precedence = Precedence::new(value);
            let description = row.description.clone().ok_or_else(|| {
                GrammarError::MissingLevelDescription {
                    precedence,
                    token: row.token.clone(),
                }
            })?;
            standin_exprs.push(StandinExpression {
                grammatic_value: row.grammatic_value.clone(),
                precedence,
                token_text: row.token.clone(),
                description,
                left_associative: row.associativity.as_deref() == Some(ASSOC_LEFT),
            });
        }
    }
    Ok((standins, standin_exprs))
}

fn infer_operator_names(
    standins: &mut BTreeMap<String, StandinToken>,
) -> Result<(), GrammarError> {
    for standin in standins.values_mut() {
        let Some(description) = standin.description.clone() else {
            continue;
        };
        if let Some(operator_name) = infer_from_description(&description).operator_name {
            standin.set_operator_name(operator_name)?;
        }
    }
    Ok(())
}

struct EquivalenceOutcome {
    /// Classes as lists of surface texts, both in deterministic order.
    classes: Vec<Vec<String>>,
    unexpected: BTreeSet<String>,
    fallback_hits: usize,
}

/// Union tokens that a description declares synonymous.
///
/// A target that is no token's surface text may still be one of the
/// referring token's grammatic values that is itself a token text; that
/// fallback crosses namespaces and is counted so drift in the
/// specification stays visible.
fn build_equivalence_classes(standins: &mut BTreeMap<String, StandinToken>) -> EquivalenceOutcome {
    let texts: Vec<String> = standins.keys().cloned().collect();
    let index: HashMap<&str, usize> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();
    let mut sets = DisjointSet::with_len(texts.len());
    let mut unexpected = BTreeSet::new();
    let mut fallback_hits = 0usize;

    for (i, text) in texts.iter().enumerate() {
        let (description, grammatic_values) = match standins.get(text) {
            Some(s) => (s.description.clone(), s.grammatic_values.clone()),
            None => continue,
        };
        let Some(description) = description else {
            continue;
        };
        let mut found = false;
        for target in infer_from_description(&description).equivalence_targets {
            let resolved = if index.contains_key(target.as_str()) {
                Some(target.clone())
            } else {
                let via_gv = grammatic_values
                    .iter()
                    .find(|gv| index.contains_key(gv.as_str()))
                    .cloned();
                if let Some(gv) = &via_gv {
                    fallback_hits = fallback_hits.saturating_add(1);
                    warn!(
                        "equivalence target {target:?} of token {text:?} resolved through grammatic value {gv:?}"
                    );
                }
                via_gv
            };
            match resolved.and_then(|r| index.get(r.as_str()).copied()) {
                Some(j) => {
                    sets.union(i, j);
                    found = true;
                }
                None => {
                    warn!("unexpected equivalence target {target:?} in description of token {text:?}");
                    unexpected.insert(target);
                }
            }
        }
        if found {
            if let Some(standin) = standins.get_mut(text) {
                standin.found_equivalence = true;
            }
        }
    }

    let classes = sets
        .classes()
        .into_iter()
        .map(|class| {
            class
                .into_iter()
                .filter_map(|i| texts.get(i).cloned())
                .collect()
        })
        .collect();
    EquivalenceOutcome {
        classes,
        unexpected,
        fallback_hits,
    }
}

/// Every token must appear in exactly one class, at minimum its own.
fn verify_partition(
    standins: &BTreeMap<String, StandinToken>,
    classes: &[Vec<String>],
) -> Result<(), GrammarError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for class in classes {
        for text in class {
            seen.insert(text.as_str());
        }
    }
    for text in standins.keys() {
        if !seen.contains(text.as_str()) {
            return Err(GrammarError::EmptyEquivalenceClass {
                token: text.clone(),
            });
        }
    }
    Ok(())
}

type TokenMaps = (HashMap<String, Token>, BTreeMap<String, Token>);

fn finalize_tokens(standins: &BTreeMap<String, StandinToken>) -> Result<TokenMaps, GrammarError> {
    let mut by_text = HashMap::new();
    let mut by_name: BTreeMap<String, Token> = BTreeMap::new();
    for standin in standins.values() {
        let token = standin.finalize()?;
        if let Some(existing) = by_name.get(token.name()) {
            return Err(GrammarError::DuplicateTokenName {
                name: token.name().to_owned(),
                first: existing.text().to_owned(),
                second: token.text().to_owned(),
            });
        }
        by_name.insert(token.name().to_owned(), token.clone());
        by_text.insert(token.text().to_owned(), token);
    }
    Ok((by_text, by_name))
}

type GroupMaps = (BTreeMap<String, TokenGroup>, HashMap<String, TokenGroup>);

fn build_token_groups(
    classes: &[Vec<String>],
    tokens_by_text: &HashMap<String, Token>,
) -> Result<GroupMaps, GrammarError> {
    let mut by_name: BTreeMap<String, TokenGroup> = BTreeMap::new();
    let mut by_text = HashMap::new();
    for class in classes {
        let members: BTreeSet<Token> = class
            .iter()
            .filter_map(|text| tokens_by_text.get(text).cloned())
            .collect();
        // Shortest canonical name wins; ties fall back to token order.
        let Some(namesake) = members
            .iter()
            .min_by(|a, b| a.name().len().cmp(&b.name().len()).then_with(|| a.cmp(b)))
            .cloned()
        else {
            continue;
        };
        let group = TokenGroup::new(namesake, members);
        let name = group.name();
        if by_name.contains_key(&name) {
            return Err(GrammarError::DuplicateGroupName { name });
        }
        for member in group.members() {
            by_text.insert(member.text().to_owned(), group.clone());
        }
        by_name.insert(name, group);
    }
    Ok((by_name, by_text))
}

fn build_expression_chain(
    standin_exprs: Vec<StandinExpression>,
    group_by_text: &HashMap<String, TokenGroup>,
) -> Result<Vec<Expression>, GrammarError> {
    let mut by_precedence: BTreeMap<Precedence, Vec<StandinExpression>> = BTreeMap::new();
    for standin in standin_exprs {
        by_precedence
            .entry(standin.precedence)
            .or_default()
            .push(standin);
    }
    if by_precedence.is_empty() {
        return Err(GrammarError::NoPrecedenceLevels);
    }

    let mut seen_descriptions: BTreeSet<String> = BTreeSet::new();
    let mut expressions: Vec<Expression> = Vec::new();
    for (precedence, standins) in by_precedence {
        let descriptions: BTreeSet<&str> =
            standins.iter().map(|s| s.description.as_str()).collect();
        let Some(&description) = descriptions.iter().next() else {
            continue;
        };
        if descriptions.len() != 1 {
            return Err(GrammarError::NonSingularDescription {
                precedence,
                values: descriptions.iter().map(|d| (*d).to_owned()).collect(),
            });
        }
        let associativities: BTreeSet<bool> =
            standins.iter().map(|s| s.left_associative).collect();
        if associativities.len() != 1 {
            return Err(GrammarError::NonSingularAssociativity { precedence });
        }
        let left_associative = associativities.contains(&true);

        let mut token_groups = Vec::new();
        for standin in &standins {
            let group = group_by_text.get(&standin.token_text).cloned().ok_or_else(|| {
                GrammarError::UnknownLevelToken {
                    precedence,
                    token: standin.token_text.clone(),
                }
            })?;
            token_groups.push(group);
        }

        let description = description.to_owned();
        // The start rule name is synthesized after the chain; a level
        // claiming it would emit colliding rule and hook names.
        if description == START_RULE_NAME {
            return Err(GrammarError::ReservedLevelDescription { description });
        }
        if !seen_descriptions.insert(description.clone()) {
            return Err(GrammarError::DuplicateLevelDescription { description });
        }
        let kind = resolve_kind(precedence, &description, left_associative, &token_groups)?;
        let preceding = expressions.len().checked_sub(1);
        expressions.push(Expression::new(
            precedence,
            description,
            left_associative,
            kind,
            preceding,
            token_groups,
        )?);
    }

    let Some(last_index) = expressions.len().checked_sub(1) else {
        return Err(GrammarError::NoPrecedenceLevels);
    };
    let last_precedence = expressions
        .last()
        .map(Expression::precedence)
        .unwrap_or_else(|| Precedence::new(0.0));
    expressions.push(Expression::new(
        last_precedence.successor(),
        START_RULE_NAME.to_owned(),
        false,
        ExpressionKind::RightAssocBinary,
        Some(last_index),
        Vec::new(),
    )?);
    Ok(expressions)
}

fn resolve_kind(
    precedence: Precedence,
    description: &str,
    left_associative: bool,
    token_groups: &[TokenGroup],
) -> Result<ExpressionKind, GrammarError> {
    if description == DESC_PARENTHESES {
        let open_group = token_groups
            .iter()
            .find(|g| g.namesake().text() == TOKEN_LEFT_PARENTHESIS)
            .map(TokenGroup::name)
            .ok_or(GrammarError::MissingOpenParenthesis { precedence })?;
        let close_group = token_groups
            .iter()
            .find(|g| g.namesake().text() == TOKEN_RIGHT_PARENTHESIS)
            .map(TokenGroup::name)
            .ok_or(GrammarError::MissingCloseParenthesis { precedence })?;
        return Ok(ExpressionKind::Parenthesization {
            open_group,
            close_group,
        });
    }
    if description == DESC_UNARY_OPERATOR {
        return Ok(ExpressionKind::UnaryPrefix);
    }
    if left_associative {
        return Ok(ExpressionKind::LeftAssocBinary);
    }
    Ok(ExpressionKind::RightAssocBinary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{described_row, level_row, row, sample_rows};

    fn compile(rows: &[Row]) -> Grammar {
        Grammar::from_rows(rows).unwrap_or_else(|e| panic!("construction failed: {e}"))
    }

    #[test]
    fn equivalence_union_picks_shortest_namesake() {
        let grammar = compile(&sample_rows());
        let group = grammar
            .group_for_token_text("=")
            .unwrap_or_else(|| panic!("no group for '='"));
        assert_eq!(group.name(), "IS_TOKENS");
        assert_eq!(group.namesake().text(), "is");
        let texts: Vec<&str> = group.members().iter().map(Token::text).collect();
        assert_eq!(texts, vec!["=", "is"]);
    }

    #[test]
    fn groups_partition_the_token_set() {
        let grammar = compile(&sample_rows());
        let member_count: usize = grammar
            .token_groups()
            .iter()
            .map(|g| g.members().len())
            .sum();
        assert_eq!(member_count, grammar.tokens().len());
        for token in grammar.tokens() {
            let group = grammar
                .group_for_token_text(token.text())
                .unwrap_or_else(|| panic!("token {:?} has no group", token.text()));
            assert!(group.members().contains(token));
        }
    }

    #[test]
    fn proper_prefix_bumps_priority() {
        let grammar = compile(&sample_rows());
        assert_eq!(grammar.token("is").map(Token::priority), Some(1));
        assert_eq!(grammar.token("is not").map(Token::priority), Some(2));
        assert_eq!(
            grammar.token("is not").map(Token::marked_name),
            Some("IS_NOT.2".to_owned())
        );
    }

    #[test]
    fn chain_ascends_and_ends_with_start_rule() {
        let grammar = compile(&sample_rows());
        let exprs = grammar.expressions();
        assert_eq!(exprs.len(), 6);
        for pair in exprs.windows(2) {
            if let [a, b] = pair {
                assert!(a.precedence() < b.precedence());
            }
        }
        for (i, expr) in exprs.iter().enumerate() {
            assert_eq!(expr.preceding(), i.checked_sub(1));
        }
        assert_eq!(exprs.last().map(Expression::name), Some(START_RULE_NAME));
    }

    #[test]
    fn level_kinds_follow_descriptions() {
        let grammar = compile(&sample_rows());
        let kinds: Vec<&ExpressionKind> =
            grammar.expressions().iter().map(Expression::kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ExpressionKind::Parenthesization {
                    open_group: "LEFT_PARENTHESIS".to_owned(),
                    close_group: "RIGHT_PARENTHESIS".to_owned(),
                },
                &ExpressionKind::UnaryPrefix,
                &ExpressionKind::RightAssocBinary,
                &ExpressionKind::LeftAssocBinary,
                &ExpressionKind::LeftAssocBinary,
                &ExpressionKind::RightAssocBinary,
            ]
        );
    }

    #[test]
    fn operator_name_feeds_token_naming() {
        let rows = vec![
            level_row("&", "concat-op", "collection", 1.0, None),
            described_row("&", "concat-op", "The string concatenation operator."),
        ];
        let grammar = compile(&rows);
        assert_eq!(
            grammar.token("&").map(Token::name),
            Some("STRING_CONCATENATION")
        );
    }

    #[test]
    fn grammatic_value_fallback_is_counted() {
        let rows = vec![
            level_row("is", "is-kw", "comparison", 1.0, None),
            described_row("equals", "is", "Equivalent to the 'was' keyword."),
        ];
        let grammar = compile(&rows);
        assert_eq!(grammar.gv_fallback_hits(), 1);
        assert!(grammar.unexpected_equivalence_targets().is_empty());
        let group = grammar
            .group_for_token_text("equals")
            .unwrap_or_else(|| panic!("no group for 'equals'"));
        assert_eq!(group.namesake().text(), "is");
    }

    #[test]
    fn unresolvable_target_is_recorded_not_fatal() {
        let rows = vec![
            level_row("is", "is-kw", "comparison", 1.0, None),
            described_row("equals", "eq-kw", "Equivalent to the 'was' keyword."),
        ];
        let grammar = compile(&rows);
        assert_eq!(grammar.gv_fallback_hits(), 0);
        assert!(grammar.unexpected_equivalence_targets().contains("was"));
        let group = grammar
            .group_for_token_text("equals")
            .unwrap_or_else(|| panic!("no group for 'equals'"));
        assert_eq!(group.members().len(), 1);
    }

    #[test]
    fn mixed_level_descriptions_fail() {
        let rows = vec![
            level_row("and", "and-kw", "AND", 1.0, None),
            level_row("or", "or-kw", "OR", 1.0, None),
        ];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::NonSingularDescription { .. })
        ));
    }

    #[test]
    fn mixed_level_associativities_fail() {
        let rows = vec![
            level_row("and", "and-kw", "AND", 1.0, Some("left")),
            level_row("&", "and-kw", "AND", 1.0, None),
        ];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::NonSingularAssociativity { .. })
        ));
    }

    #[test]
    fn parenthesization_without_close_fails() {
        let rows = vec![level_row("(", "left-paren", "parentheses", 1.0, None)];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::MissingCloseParenthesis { .. })
        ));
    }

    #[test]
    fn reused_level_description_fails() {
        let rows = vec![
            level_row("and", "and-kw", "AND", 1.0, None),
            level_row("or", "or-kw", "AND", 2.0, None),
        ];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::DuplicateLevelDescription { description }) if description == "AND"
        ));
    }

    #[test]
    fn start_rule_name_is_not_a_valid_level_description() {
        let rows = vec![level_row("and", "and-kw", "expr", 1.0, None)];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::ReservedLevelDescription { description }) if description == "expr"
        ));
    }

    #[test]
    fn specification_without_levels_fails() {
        let rows = vec![row("and", "and-kw")];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::NoPrecedenceLevels)
        ));
    }

    #[test]
    fn colliding_canonical_names_fail() {
        let rows = vec![
            level_row("is", "is-kw", "comparison", 1.0, None),
            row("Is", "is-kw"),
        ];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::DuplicateTokenName { name, .. }) if name == "IS"
        ));
    }

    #[test]
    fn precedence_row_without_description_fails() {
        let rows = vec![Row {
            precedence: Some(1.0),
            ..row("and", "and-kw")
        }];
        assert!(matches!(
            Grammar::from_rows(&rows),
            Err(GrammarError::MissingLevelDescription { token, .. }) if token == "and"
        ));
    }
}
