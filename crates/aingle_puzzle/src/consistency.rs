//! Consistency checking against functional and one-to-one constraints.
//!
//! A constraint says that, for facts of a given shape, one argument
//! determines another (`es(juan, N)`: a person has one nationality), and
//! optionally the reverse too (`vive_en`: one person per house, one house per
//! person). The checker scans the ground facts once, remembering which fact
//! first claimed each key, and stops at the first disagreement.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fact::Fact;
use crate::term::Term;

/// Restricts a constraint to facts holding a given constant at a position,
/// e.g. `casa(color, _, _)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Argument position of the tag.
    pub position: usize,
    /// Constant the argument must equal.
    pub value: String,
}

/// A uniqueness constraint over one predicate shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalConstraint {
    /// Name used in keys and conflict reports.
    pub name: String,
    /// Predicate the constraint applies to.
    pub predicate: String,
    /// Required arity.
    pub arity: usize,
    /// Optional tag narrowing the predicate shape.
    #[serde(default)]
    pub tag: Option<Tag>,
    /// Position of the determining argument.
    pub key: usize,
    /// Position of the determined argument.
    pub value: usize,
    /// Whether the value also determines the key.
    #[serde(default)]
    pub bijective: bool,
}

impl FunctionalConstraint {
    /// `key` determines `value`, not necessarily the other way round.
    pub fn functional(
        name: impl Into<String>,
        predicate: impl Into<String>,
        arity: usize,
        key: usize,
        value: usize,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: predicate.into(),
            arity,
            tag: None,
            key,
            value,
            bijective: false,
        }
    }

    /// `key` and `value` determine each other.
    pub fn bijection(
        name: impl Into<String>,
        predicate: impl Into<String>,
        arity: usize,
        key: usize,
        value: usize,
    ) -> Self {
        Self {
            bijective: true,
            ..Self::functional(name, predicate, arity, key, value)
        }
    }

    /// Only applies to facts whose argument at `position` is the constant `value`.
    pub fn tagged(mut self, position: usize, value: impl Into<String>) -> Self {
        self.tag = Some(Tag {
            position,
            value: value.into(),
        });
        self
    }

    /// Checks if the constraint governs this fact.
    pub fn applies_to(&self, fact: &Fact) -> bool {
        if fact.predicate != self.predicate || fact.arity() != self.arity {
            return false;
        }
        match &self.tag {
            Some(tag) => matches!(
                fact.args.get(tag.position),
                Some(Term::Constant(c)) if *c == tag.value
            ),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        let tag = self.tag.as_ref().map(|t| t.position);
        let positions = [Some(self.key), Some(self.value), tag];
        if positions.iter().flatten().any(|&p| p >= self.arity) {
            return Err(Error::InvalidConfig(format!(
                "constraint '{}' refers to an argument beyond arity {}",
                self.name, self.arity
            )));
        }
        if self.key == self.value {
            return Err(Error::InvalidConfig(format!(
                "constraint '{}' uses position {} as both key and value",
                self.name, self.key
            )));
        }
        Ok(())
    }
}

/// An ordered collection of uniqueness constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintTable {
    /// Name of this table.
    pub name: String,
    /// Constraints, checked in order for every fact.
    pub constraints: Vec<FunctionalConstraint>,
}

impl ConstraintTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Adds a constraint.
    pub fn add(&mut self, constraint: FunctionalConstraint) {
        self.constraints.push(constraint);
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Checks if empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Rejects constraints whose positions do not fit their arity.
    pub fn validate(&self) -> Result<()> {
        self.constraints.iter().try_for_each(FunctionalConstraint::validate)
    }

    /// Parses and validates a table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: ConstraintTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }
}

/// Two ground facts that disagree under a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Name of the violated constraint.
    pub constraint: String,
    /// The fact that claimed the key first.
    pub first: Fact,
    /// The fact that contradicts it.
    pub second: Fact,
}

impl Conflict {
    /// Generates a human-readable explanation of the conflict.
    pub fn explain(&self) -> String {
        format!(
            "Contradiction under '{}':\n  1. {}\n  2. {}",
            self.constraint, self.first, self.second
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    Forward,
    Reverse,
}

/// Scans fact sets for constraint violations.
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    table: ConstraintTable,
}

impl ConsistencyChecker {
    /// Creates a checker over the given table.
    ///
    /// Constraints that fail validation are dropped with a warning, so every
    /// position the checker reads lies within the fact's arity.
    pub fn new(mut table: ConstraintTable) -> Self {
        table.constraints.retain(|constraint| match constraint.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!("Ignoring constraint in table '{}': {}", table.name, err);
                false
            }
        });
        Self { table }
    }

    /// Number of constraints being enforced.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Checks if no constraint is enforced.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if no two ground facts conflict.
    pub fn is_consistent<'a>(&self, facts: impl IntoIterator<Item = &'a Fact>) -> bool {
        self.find_conflict(facts).is_none()
    }

    /// Returns the first conflict among the ground facts, if any.
    ///
    /// Facts that still contain variables are ignored. Which pair gets
    /// reported depends on iteration order; whether a conflict exists does
    /// not.
    pub fn find_conflict<'a>(
        &self,
        facts: impl IntoIterator<Item = &'a Fact>,
    ) -> Option<Conflict> {
        let mut claims: HashMap<(usize, Direction, &'a Term), &'a Fact> = HashMap::new();

        for fact in facts.into_iter().filter(|f| f.is_ground()) {
            for (index, constraint) in self.table.constraints.iter().enumerate() {
                if !constraint.applies_to(fact) {
                    continue;
                }

                let mut directions = vec![(Direction::Forward, constraint.key, constraint.value)];
                if constraint.bijective {
                    directions.push((Direction::Reverse, constraint.value, constraint.key));
                }

                for (direction, from, to) in directions {
                    let key = (index, direction, &fact.args[from]);
                    match claims.get(&key) {
                        Some(prior) if prior.args[to] != fact.args[to] => {
                            let conflict = Conflict {
                                constraint: constraint.name.clone(),
                                first: (*prior).clone(),
                                second: fact.clone(),
                            };
                            debug!("{}", conflict.explain());
                            return Some(conflict);
                        }
                        Some(_) => {}
                        None => {
                            claims.insert(key, fact);
                        }
                    }
                }
            }
        }

        None
    }
}
