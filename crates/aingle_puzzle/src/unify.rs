//! Substitutions and Robinson-style unification with occurs check.
//!
//! Unification never mutates the caller's substitution. [`unify`] works on a
//! private copy and hands back the extended substitution only on success, so
//! a failed attempt cannot leak bindings into sibling branches.

use std::collections::HashMap;

use log::trace;

use crate::term::Term;

/// A mapping from variable names to terms.
///
/// Bindings are kept acyclic: no variable is ever bound, directly or through
/// a chain of bindings, to a term containing itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: HashMap<String, Term>,
}

impl Substitution {
    /// Creates an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the term a variable is directly bound to.
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    /// Checks if a variable is bound.
    pub fn is_bound(&self, var: &str) -> bool {
        self.bindings.contains_key(var)
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binds `var` to `term` after resolving `term` through the current
    /// bindings.
    ///
    /// Returns `false`, leaving the substitution unchanged, if `var` is
    /// already bound or the occurs check fails.
    pub fn bind(&mut self, var: impl Into<String>, term: Term) -> bool {
        let var = var.into();
        if self.is_bound(&var) {
            return false;
        }
        let term = self.apply(&term);
        if term.occurs(&var) {
            return false;
        }
        self.bindings.insert(var, term);
        true
    }

    /// Applies the substitution to a term, following chained bindings.
    /// Unbound variables are left untouched.
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Constant(_) => term.clone(),
            Term::Variable(name) => match self.bindings.get(name) {
                Some(bound) => self.apply(bound),
                None => term.clone(),
            },
            Term::Compound(functor, args) => Term::Compound(
                functor.clone(),
                args.iter().map(|arg| self.apply(arg)).collect(),
            ),
        }
    }

    /// Merges `other` into a copy of `self`.
    ///
    /// A variable bound in both must be bound to structurally equal terms,
    /// otherwise the merge fails. Rule variables are never renamed, so one
    /// rule firing uses a single assignment across all its clauses.
    pub fn merged(&self, other: &Substitution) -> Option<Substitution> {
        let mut combined = self.clone();
        for (var, term) in &other.bindings {
            match combined.bindings.get(var) {
                Some(existing) if existing != term => return None,
                Some(_) => {}
                None => {
                    combined.bindings.insert(var.clone(), term.clone());
                }
            }
        }
        Some(combined)
    }
}

/// Binds each pair in order through [`Substitution::bind`]. A pair that
/// `bind` rejects (a variable bound earlier in the sequence, or a failed
/// occurs check) is skipped, so the first binding of a variable wins.
impl FromIterator<(String, Term)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (String, Term)>>(iter: I) -> Self {
        let mut subst = Substitution::new();
        for (var, term) in iter {
            if !subst.bind(var.as_str(), term) {
                trace!("Skipping rejected binding for {}", var);
            }
        }
        subst
    }
}

/// Unifies two terms under an existing substitution.
///
/// Returns the most general extension of `subst` that makes both terms
/// structurally identical, or `None` if no such extension exists.
pub fn unify(t1: &Term, t2: &Term, subst: &Substitution) -> Option<Substitution> {
    let mut working = subst.clone();
    unify_into(t1, t2, &mut working).then_some(working)
}

/// Unifies in place. On failure `subst` may hold partial bindings, so callers
/// only ever pass a scratch copy.
pub(crate) fn unify_into(t1: &Term, t2: &Term, subst: &mut Substitution) -> bool {
    let t1 = subst.apply(t1);
    let t2 = subst.apply(t2);

    match (&t1, &t2) {
        (Term::Variable(var), other) | (other, Term::Variable(var)) => {
            bind_variable(var, other, subst)
        }
        (Term::Constant(c1), Term::Constant(c2)) => c1 == c2,
        (Term::Compound(f1, args1), Term::Compound(f2, args2)) => {
            f1 == f2
                && args1.len() == args2.len()
                && args1
                    .iter()
                    .zip(args2)
                    .all(|(a, b)| unify_into(a, b, subst))
        }
        _ => false,
    }
}

fn bind_variable(var: &str, term: &Term, subst: &mut Substitution) -> bool {
    if let Some(existing) = subst.get(var).cloned() {
        return unify_into(&existing, term, subst);
    }
    // Binding X to X would be a cycle, same as X to f(X).
    if term.occurs(var) {
        return false;
    }
    subst.bindings.insert(var.to_string(), term.clone());
    true
}
