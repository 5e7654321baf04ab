//! Terms: the value language of facts and rules.
//!
//! A term is a constant, a variable or a compound `functor(args...)`.
//! Every operation on terms is an exhaustive match over [`Term`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logic term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A ground atomic value such as `rojo` or `3`.
    Constant(String),
    /// A logic variable, identified by name.
    Variable(String),
    /// A functor applied to an ordered list of arguments.
    Compound(String, Vec<Term>),
}

impl Term {
    /// Creates a constant term.
    pub fn constant(value: impl Into<String>) -> Self {
        Term::Constant(value.into())
    }

    /// Creates a variable term.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Creates a compound term.
    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound(functor.into(), args)
    }

    /// Returns `true` if the term contains no variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Constant(_) => true,
            Term::Variable(_) => false,
            Term::Compound(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// Returns `true` if the variable `name` occurs anywhere in this term.
    pub fn occurs(&self, name: &str) -> bool {
        match self {
            Term::Constant(_) => false,
            Term::Variable(v) => v == name,
            Term::Compound(_, args) => args.iter().any(|arg| arg.occurs(name)),
        }
    }

    /// Visits every variable and constant in the term, depth first.
    pub(crate) fn visit<'a>(
        &'a self,
        on_var: &mut impl FnMut(&'a str),
        on_const: &mut impl FnMut(&'a str),
    ) {
        match self {
            Term::Constant(value) => on_const(value),
            Term::Variable(name) => on_var(name),
            Term::Compound(_, args) => {
                for arg in args {
                    arg.visit(on_var, on_const);
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(value) => f.write_str(value),
            Term::Variable(name) => f.write_str(name),
            Term::Compound(functor, args) if args.is_empty() => f.write_str(functor),
            Term::Compound(functor, args) => {
                write!(f, "{}(", functor)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
