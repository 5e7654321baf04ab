//! Inference rules and the rule applier.
//!
//! A rule is a conjunction of antecedent patterns implying one consequent.
//! Applying a rule walks the cross product of antecedents × known facts
//! depth first, pruning as soon as a clause fails to unify or its bindings
//! disagree with the ones accumulated so far.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::fact::Fact;
use crate::unify::Substitution;

/// A logical rule: `antecedent_1 AND ... AND antecedent_n -> consequent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    antecedents: Vec<Fact>,
    consequent: Fact,
}

impl Rule {
    /// Creates a rule. Fails if `antecedents` is empty.
    pub fn new(antecedents: Vec<Fact>, consequent: Fact) -> Result<Self> {
        if antecedents.is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule deriving {} has no antecedents",
                consequent
            )));
        }
        Ok(Self {
            antecedents,
            consequent,
        })
    }

    /// Creates a rule with exactly one antecedent.
    pub fn single(antecedent: Fact, consequent: Fact) -> Self {
        Self {
            antecedents: vec![antecedent],
            consequent,
        }
    }

    /// Starts a fluent rule definition.
    pub fn when(antecedent: Fact) -> RuleBuilder {
        RuleBuilder {
            antecedents: vec![antecedent],
        }
    }

    /// The antecedent clauses, in declaration order.
    pub fn antecedents(&self) -> &[Fact] {
        &self.antecedents
    }

    /// The consequent pattern.
    pub fn consequent(&self) -> &Fact {
        &self.consequent
    }

    /// Lazily enumerates every substitution under which all antecedents are
    /// satisfied by `facts`.
    pub fn matches<'a>(&'a self, facts: &'a [&'a Fact]) -> AntecedentMatches<'a> {
        AntecedentMatches::new(&self.antecedents, facts)
    }

    /// Derives the ground consequents this rule yields against `facts`.
    ///
    /// One fact is produced per satisfying combination, so the result may
    /// contain duplicates and facts already known; the caller filters them.
    /// Instantiations that are not fully ground are dropped.
    pub fn apply(&self, facts: &[&Fact]) -> Vec<Fact> {
        self.matches(facts)
            .map(|subst| self.consequent.apply(&subst))
            .filter(Fact::is_ground)
            .collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, antecedent) in self.antecedents.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", antecedent)?;
        }
        write!(f, " -> {}", self.consequent)
    }
}

/// A builder for creating `Rule`s using a fluent API.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    antecedents: Vec<Fact>,
}

impl RuleBuilder {
    /// Adds another antecedent clause.
    pub fn and(mut self, antecedent: Fact) -> Self {
        self.antecedents.push(antecedent);
        self
    }

    /// Finishes the rule with its consequent.
    pub fn infer(self, consequent: Fact) -> Rule {
        Rule {
            antecedents: self.antecedents,
            consequent,
        }
    }
}

struct Frame {
    /// Index of the next fact to try for this frame's clause.
    cursor: usize,
    /// Bindings accumulated from all earlier clauses.
    bindings: Substitution,
}

/// Depth-first enumerator over the substitutions that satisfy a conjunction
/// of antecedent clauses.
///
/// The stack holds one frame per clause being matched; a frame at depth
/// `antecedents.len()` is a complete match and is yielded. Each frame owns
/// its bindings, so abandoning a branch never affects its siblings.
pub struct AntecedentMatches<'a> {
    antecedents: &'a [Fact],
    facts: &'a [&'a Fact],
    stack: Vec<Frame>,
}

impl<'a> AntecedentMatches<'a> {
    fn new(antecedents: &'a [Fact], facts: &'a [&'a Fact]) -> Self {
        Self {
            antecedents,
            facts,
            stack: vec![Frame {
                cursor: 0,
                bindings: Substitution::new(),
            }],
        }
    }
}

impl Iterator for AntecedentMatches<'_> {
    type Item = Substitution;

    fn next(&mut self) -> Option<Substitution> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            if depth == self.antecedents.len() {
                return self.stack.pop().map(|frame| frame.bindings);
            }

            let clause = &self.antecedents[depth];
            let frame = self.stack.last_mut()?;
            let Some(fact) = self.facts.get(frame.cursor) else {
                self.stack.pop();
                continue;
            };
            frame.cursor += 1;

            let merged = clause
                .unifies(fact)
                .and_then(|local| frame.bindings.merged(&local));
            if let Some(bindings) = merged {
                self.stack.push(Frame {
                    cursor: 0,
                    bindings,
                });
            }
        }
    }
}
