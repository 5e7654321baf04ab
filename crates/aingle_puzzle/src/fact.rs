//! Facts: a predicate applied to an ordered list of terms.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::term::Term;
use crate::unify::{unify_into, Substitution};

/// A logical fact such as `vive_en(juan, casa_roja)`.
///
/// Equality and hashing are structural over `(predicate, args)`, which is
/// what keeps the knowledge base free of value-equal duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    /// Predicate name.
    pub predicate: String,
    /// Argument terms.
    pub args: Vec<Term>,
}

impl Fact {
    /// Creates a new fact.
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if no argument contains a variable.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Returns `true` if the variable `name` occurs in any argument.
    pub fn contains_variable(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg.occurs(name))
    }

    /// Unifies this fact with another against a fresh substitution.
    ///
    /// Predicates and arities must match; arguments are unified pairwise,
    /// failing on the first mismatch.
    pub fn unifies(&self, other: &Fact) -> Option<Substitution> {
        if self.predicate != other.predicate || self.arity() != other.arity() {
            return None;
        }

        let mut subst = Substitution::new();
        for (a, b) in self.args.iter().zip(&other.args) {
            if !unify_into(a, b, &mut subst) {
                return None;
            }
        }
        Some(subst)
    }

    /// Applies a substitution to every argument.
    pub fn apply(&self, subst: &Substitution) -> Fact {
        Fact {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(|arg| subst.apply(arg)).collect(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return f.write_str(&self.predicate);
        }
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unify_with_ground_fact() {
        let pattern = fact!("vive_en", "juan", "C");
        let known = fact!("vive_en", "juan", "casa_roja");
        let s = pattern.unifies(&known).unwrap();
        assert_eq!(s.get("C"), Some(&Term::constant("casa_roja")));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_predicate_or_arity_mismatch() {
        let pattern = fact!("vive_en", "X", "Y");
        assert!(pattern.unifies(&fact!("es", "juan", "ingles")).is_none());
        assert!(pattern.unifies(&fact!("vive_en", "juan")).is_none());
        assert!(pattern.unifies(&fact!("vive_en", "a", "b", "c")).is_none());
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let pattern = fact!("vecino", "X", "X");
        assert!(pattern.unifies(&fact!("vecino", "a", "a")).is_some());
        assert!(pattern.unifies(&fact!("vecino", "a", "b")).is_none());
    }

    #[test]
    fn test_groundness_and_apply() {
        let f = fact!("casa", "color", "H", "C");
        assert!(!f.is_ground());
        assert!(f.contains_variable("H"));
        assert!(!f.contains_variable("X"));

        let s = f.unifies(&fact!("casa", "color", "casa1", "rojo")).unwrap();
        let applied = f.apply(&s);
        assert!(applied.is_ground());
        assert_eq!(applied, fact!("casa", "color", "casa1", "rojo"));
    }

    #[test]
    fn test_value_equality_deduplicates() {
        let mut set = HashSet::new();
        assert!(set.insert(fact!("es", "juan", "ingles")));
        assert!(!set.insert(fact!("es", "juan", "ingles")));
        assert!(set.insert(fact!("es", "maria", "ingles")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(fact!("es", "juan", "ingles").to_string(), "es(juan, ingles)");
        assert_eq!(Fact::new("listo", vec![]).to_string(), "listo");
    }
}
