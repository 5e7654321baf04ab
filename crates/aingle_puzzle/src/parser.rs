//! Puzzle text parser.
//!
//! One statement per line:
//!
//! ```text
//! // comments start with // or #
//! hecho: (vive_en, juan, casa_roja)
//! regla: (vive_en, X, H) AND (casa, color, H, rojo) -> (es, X, ingles)
//! ```
//!
//! `fact:` and `rule:` are accepted as aliases and keywords are
//! case-insensitive. Arguments starting with an uppercase letter and made of
//! letters, digits and `_` are variables; anything else is a constant, and
//! `f(a, b)` is a compound term.

use std::path::Path;

use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::fact::Fact;
use crate::knowledge::KnowledgeBase;
use crate::rule::Rule;
use crate::term::Term;

/// Parses puzzle text into a [`KnowledgeBase`].
#[derive(Debug, Clone)]
pub struct PuzzleParser {
    fact_line: Regex,
    rule_line: Regex,
    conjunction: Regex,
}

impl PuzzleParser {
    /// Compiles the line patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            fact_line: Regex::new(r"(?i)^(?:hecho|fact)\s*:\s*(.+)$")?,
            rule_line: Regex::new(r"(?i)^(?:regla|rule)\s*:\s*(.+?)\s*->\s*(.+)$")?,
            conjunction: Regex::new(r"(?i)\bAND\b")?,
        })
    }

    /// Parses a whole puzzle.
    ///
    /// Blank lines and comments are ignored. Lines that are neither a fact
    /// nor a rule are skipped with a warning. A fact or rule whose body is
    /// malformed fails the whole parse with [`Error::Parse`].
    pub fn parse(&self, content: &str) -> Result<KnowledgeBase> {
        let mut kb = KnowledgeBase::new();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = self.rule_line.captures(line) {
                let rule = self.parse_rule(line_no, &caps[1], &caps[2])?;
                debug!("Line {}: rule {}", line_no, rule);
                kb.add_rule(rule);
            } else if let Some(caps) = self.fact_line.captures(line) {
                let fact = parse_fact(line_no, &caps[1])?;
                debug!("Line {}: fact {}", line_no, fact);
                if !kb.add_fact(fact) {
                    debug!("Line {}: duplicate fact ignored", line_no);
                }
            } else {
                warn!("Line {}: unrecognised statement skipped: {}", line_no, line);
            }
        }

        Ok(kb)
    }

    fn parse_rule(&self, line: usize, antecedents: &str, consequent: &str) -> Result<Rule> {
        let mut clauses = Vec::new();
        let mut start = 0;
        for m in self.conjunction.find_iter(antecedents) {
            // AND inside an argument list is part of a term, not a separator.
            if depth(&antecedents[..m.start()]) == 0 {
                clauses.push(&antecedents[start..m.start()]);
                start = m.end();
            }
        }
        clauses.push(&antecedents[start..]);

        let antecedents = clauses
            .into_iter()
            .map(|clause| parse_fact(line, clause))
            .collect::<Result<Vec<_>>>()?;
        let consequent = parse_fact(line, consequent)?;

        Rule::new(antecedents, consequent).map_err(|e| Error::parse(line, e.to_string()))
    }
}

/// Reads and parses a puzzle file.
pub fn load_puzzle(path: impl AsRef<Path>) -> Result<KnowledgeBase> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
    PuzzleParser::new()?.parse(&content)
}

/// Parses `(predicate, arg, ...)`.
fn parse_fact(line: usize, text: &str) -> Result<Fact> {
    let text = text.trim();
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| {
            Error::parse(
                line,
                format!("expected '(predicate, args...)', found '{}'", text),
            )
        })?;

    let mut parts = split_top_level(line, inner)?.into_iter();
    let predicate = parts
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::parse(line, format!("missing predicate in '{}'", text)))?;
    if predicate.contains(['(', ')']) {
        return Err(Error::parse(line, format!("invalid predicate '{}'", predicate)));
    }

    let args = parts
        .map(|arg| parse_term(line, arg))
        .collect::<Result<Vec<_>>>()?;
    Ok(Fact::new(predicate, args))
}

fn parse_term(line: usize, text: &str) -> Result<Term> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::parse(line, "empty argument"));
    }

    if let Some(open) = text.find('(') {
        let functor = text[..open].trim();
        let inner = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| Error::parse(line, format!("unbalanced parentheses in '{}'", text)))?;
        if functor.is_empty() {
            return Err(Error::parse(line, format!("missing functor in '{}'", text)));
        }
        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_top_level(line, inner)?
                .into_iter()
                .map(|arg| parse_term(line, arg))
                .collect::<Result<Vec<_>>>()?
        };
        return Ok(Term::compound(functor, args));
    }
    if text.contains(')') {
        return Err(Error::parse(line, format!("unbalanced parentheses in '{}'", text)));
    }

    let is_variable = text.starts_with(|c: char| c.is_uppercase())
        && text.chars().all(|c| c.is_alphanumeric() || c == '_');
    Ok(if is_variable {
        Term::var(text)
    } else {
        Term::constant(text)
    })
}

/// Splits on commas that are not nested inside parentheses.
fn split_top_level(line: usize, text: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut level = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => level += 1,
            ')' => {
                level = level.checked_sub(1).ok_or_else(|| {
                    Error::parse(line, format!("unbalanced parentheses in '{}'", text))
                })?;
            }
            ',' if level == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if level != 0 {
        return Err(Error::parse(line, format!("unbalanced parentheses in '{}'", text)));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Parenthesis nesting depth at the end of `text`.
fn depth(text: &str) -> isize {
    text.chars().fold(0, |d, c| match c {
        '(' => d + 1,
        ')' => d - 1,
        _ => d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<KnowledgeBase> {
        PuzzleParser::new().unwrap().parse(text)
    }

    #[test]
    fn test_parse_facts_and_rules() {
        let kb = parse(
            "// Casas\n\
             hecho: (vive_en, juan, casa_roja)\n\
             \n\
             regla: (vive_en, X, casa_roja) -> (es, X, ingles)\n",
        )
        .unwrap();

        assert_eq!(kb.len(), 1);
        assert!(kb.contains(&fact!("vive_en", "juan", "casa_roja")));
        assert_eq!(kb.rules().len(), 1);
        assert_eq!(
            kb.rules()[0].to_string(),
            "vive_en(X, casa_roja) -> es(X, ingles)"
        );
    }

    #[test]
    fn test_aliases_and_case() {
        let kb = parse(
            "FACT: (casa, color, casa1, rojo)\n\
             Rule: (casa, color, H, C) and (vive_en, P, H) -> (prefiere, P, C)\n",
        )
        .unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.rules()[0].antecedents().len(), 2);
    }

    #[test]
    fn test_variables_and_constants() {
        let kb = parse("hecho: (p, X, juan, Casa_1, 3, Rojo-claro)").unwrap();
        let fact = &kb.facts()[0];
        assert_eq!(
            fact.args,
            vec![
                Term::var("X"),
                Term::constant("juan"),
                Term::var("Casa_1"),
                Term::constant("3"),
                Term::constant("Rojo-claro"),
            ]
        );
    }

    #[test]
    fn test_compound_arguments() {
        let kb = parse("hecho: (junto, par(casa1, casa2), X)").unwrap();
        assert_eq!(
            kb.facts()[0].args[0],
            Term::compound("par", vec![Term::constant("casa1"), Term::constant("casa2")])
        );
    }

    #[test]
    fn test_and_inside_term_is_not_a_separator() {
        let kb = parse("regla: (p, f(a AND b)) AND (q, X) -> (r, X)").unwrap();
        assert_eq!(kb.rules()[0].antecedents().len(), 2);
    }

    #[test]
    fn test_unknown_lines_and_comments_are_skipped() {
        let kb = parse("# header\nesto no es nada\nhecho: (p, a)\n").unwrap();
        assert_eq!(kb.len(), 1);
        assert!(kb.rules().is_empty());
    }

    #[test]
    fn test_malformed_fact_reports_line() {
        let err = parse("hecho: (p, a)\nhecho: p, a\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = parse("hecho: (p, a,)").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        let err = parse("hecho: (p, f(a)").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_rule_without_antecedents_is_rejected() {
        let err = parse("regla: -> (es, X, ingles)").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_facts_collapse() {
        let kb = parse("hecho: (p, a)\nhecho: (p,a)\n").unwrap();
        assert_eq!(kb.len(), 1);
    }
}
