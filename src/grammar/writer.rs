//! Text rendering of a compiled [`Grammar`].
//!
//! The writer is append-only over its sink and never mutates the model.
//! Output order is fixed: a Rules section (expression levels in ascending
//! precedence, the synthetic start rule last, then one hook-indirection
//! line per level), a Terminals section (multi-member groups first, then
//! tokens blocked by shared description), and optionally a trailing block
//! of import reference lines meant for copy-paste, not machine parsing.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use super::{
    Expression, ExpressionKind, Grammar, START_RULE_NAME, Token, TokenGroup, VALUE_RULE_NAME,
};

/// Renders one [`Grammar`] to an [`io::Write`] sink.
pub struct GrammarWriter<'a, W: Write> {
    grammar: &'a Grammar,
    module_name: Option<String>,
    out: W,
    names_for_import: Vec<String>,
}

impl<'a, W: Write> GrammarWriter<'a, W> {
    #[must_use]
    pub fn new(grammar: &'a Grammar, out: W) -> Self {
        Self {
            grammar,
            module_name: None,
            out,
            names_for_import: Vec::new(),
        }
    }

    /// Enable the trailing `// %import module.name` block.
    #[must_use]
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    /// Render the whole grammar.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the sink.
    pub fn write_grammar(&mut self) -> io::Result<()> {
        self.write_rules()?;
        self.write_terminals()?;
        if let Some(module) = self.module_name.clone() {
            self.blank()?;
            for name in self.names_for_import.clone() {
                writeln!(self.out, "// %import {module}.{name}")?;
            }
            self.blank()?;
        }
        Ok(())
    }

    fn write_rules(&mut self) -> io::Result<()> {
        self.write_header("Rules")?;
        self.write_expression_rules()
    }

    fn write_terminals(&mut self) -> io::Result<()> {
        self.write_header("Terminals")?;
        self.write_token_groups()?;
        self.write_tokens()
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.blank()?;
        writeln!(self.out, "//")?;
        writeln!(self.out, "// {header}")?;
        writeln!(self.out, "//")?;
        self.blank()
    }

    fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.trim_end())
    }

    fn write_expression_rules(&mut self) -> io::Result<()> {
        let grammar = self.grammar;
        let exprs = grammar.expressions();
        let name_width = exprs
            .iter()
            .map(|e| e.marked_name().len())
            .max()
            .unwrap_or(0);

        for expr in exprs {
            let mut altlines = alternative_lines(expr);
            align_columns(&mut altlines);
            let mut prefix = expr.marked_name();
            let mut sep = ':';
            for words in &altlines {
                let rendered =
                    format!("{prefix:<name_width$} {sep} {}", words.join("  "));
                self.line(&rendered)?;
                prefix = String::new();
                sep = '|';
            }
            self.blank()?;
            self.names_for_import.push(expr.name().to_owned());
        }

        // Hook indirection keeps higher rules referencing only hooks; the
        // tightest level loops back to the start rule, which is what lets
        // parenthesization contain a full expression.
        for expr in exprs {
            let preceding_name = expr
                .preceding()
                .and_then(|i| exprs.get(i))
                .map_or(START_RULE_NAME, Expression::name);
            let marked_hook = expr.marked_hook_name();
            let rendered = format!("{marked_hook:<name_width$} : {preceding_name}");
            self.line(&rendered)?;
            self.names_for_import.push(expr.hook_name());
        }
        Ok(())
    }

    fn write_token_groups(&mut self) -> io::Result<()> {
        let grammar = self.grammar;
        let groups: Vec<&TokenGroup> = grammar
            .token_groups()
            .into_iter()
            .filter(|g| g.members().len() != 1)
            .collect();
        let name_width = groups.iter().map(|g| g.name().len()).max().unwrap_or(0);
        for group in groups {
            let mut members: Vec<&Token> = group.members().iter().collect();
            // Longest surface text first; ties fall back to token order.
            members.sort_by(|a, b| {
                b.text()
                    .len()
                    .cmp(&a.text().len())
                    .then_with(|| a.cmp(b))
            });
            let mut prefix = group.name();
            let mut sep = ':';
            for token in members {
                let rendered = format!("{prefix:<name_width$} {sep} {}", token.name());
                self.line(&rendered)?;
                prefix = String::new();
                sep = '|';
            }
            self.blank()?;
            self.names_for_import.push(group.name());
        }
        Ok(())
    }

    fn write_tokens(&mut self) -> io::Result<()> {
        let grammar = self.grammar;
        let tokens = grammar.tokens();
        let name_width = tokens
            .iter()
            .map(|t| t.marked_name().len())
            .max()
            .unwrap_or(0);
        let mut by_description: BTreeMap<&str, Vec<&Token>> = BTreeMap::new();
        for token in tokens.iter().copied() {
            by_description
                .entry(token.description())
                .or_default()
                .push(token);
        }
        let mut pending: BTreeSet<&str> = tokens.iter().map(|t| t.text()).collect();

        for token in tokens.iter().copied() {
            if !pending.contains(token.text()) {
                continue;
            }
            let block: Vec<&Token> = if token.description().is_empty() {
                vec![token]
            } else {
                for sentence in token.description().split(". ") {
                    let sentence = sentence.trim_end_matches('.');
                    writeln!(self.out, "// {sentence}.")?;
                }
                by_description
                    .get(token.description())
                    .cloned()
                    .unwrap_or_default()
            };
            for member in block {
                let rendered = format!(
                    "{:<name_width$} : {}",
                    member.marked_name(),
                    member.escaped_pattern()
                );
                self.line(&rendered)?;
                pending.remove(member.text());
                self.names_for_import.push(member.name().to_owned());
            }
            self.blank()?;
        }
        Ok(())
    }
}

/// Alternative lines for one level, one `Vec` of column words each, before
/// alignment.
fn alternative_lines(expr: &Expression) -> Vec<Vec<String>> {
    let hook = expr.hook_name();
    let mut altlines = Vec::new();
    match expr.kind() {
        ExpressionKind::Parenthesization {
            open_group,
            close_group,
        } => {
            altlines.push(vec![open_group.clone(), hook, close_group.clone()]);
            altlines.push(vec![
                VALUE_RULE_NAME.to_owned(),
                String::new(),
                String::new(),
            ]);
        }
        ExpressionKind::UnaryPrefix => {
            for group in expr.token_groups() {
                altlines.push(vec![group.name(), hook.clone()]);
            }
            altlines.push(vec![String::new(), hook]);
        }
        ExpressionKind::LeftAssocBinary => {
            for group in expr.token_groups() {
                altlines.push(vec![expr.name().to_owned(), group.name(), hook.clone()]);
            }
            altlines.push(vec![String::new(), String::new(), hook]);
        }
        ExpressionKind::RightAssocBinary => {
            for group in expr.token_groups() {
                altlines.push(vec![hook.clone(), group.name(), expr.name().to_owned()]);
            }
            altlines.push(vec![hook, String::new(), String::new()]);
        }
    }
    altlines
}

/// Pad every column to its widest entry so alternatives line up.
fn align_columns(altlines: &mut [Vec<String>]) {
    let columns = altlines.iter().map(Vec::len).max().unwrap_or(0);
    for i in 0..columns {
        let width = altlines
            .iter()
            .filter_map(|words| words.get(i))
            .map(String::len)
            .max()
            .unwrap_or(0);
        for words in altlines.iter_mut() {
            if let Some(word) = words.get_mut(i) {
                let pad = width.saturating_sub(word.len());
                word.push_str(&" ".repeat(pad));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_columns_pads_to_widest_entry() {
        let mut altlines = vec![
            vec!["a".to_owned(), "long_name".to_owned()],
            vec!["longer".to_owned(), "b".to_owned()],
        ];
        align_columns(&mut altlines);
        assert_eq!(
            altlines,
            vec![
                vec!["a     ".to_owned(), "long_name".to_owned()],
                vec!["longer".to_owned(), "b        ".to_owned()],
            ]
        );
    }

    #[test]
    fn align_columns_tolerates_ragged_rows() {
        let mut altlines = vec![
            vec!["open".to_owned(), "hook".to_owned(), "close".to_owned()],
            vec!["value".to_owned()],
        ];
        align_columns(&mut altlines);
        assert_eq!(
            altlines
                .first()
                .and_then(|words| words.first())
                .map(String::as_str),
            Some("open ")
        );
        assert_eq!(
            altlines.get(1).map(Vec::len),
            Some(1)
        );
    }
}
