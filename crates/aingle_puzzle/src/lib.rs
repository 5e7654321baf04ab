//! AIngle Puzzle - Logic Grid Puzzle Solver
//!
//! This crate solves Einstein-style logic grid puzzles written as facts and
//! rules. Deduction comes first: rules are applied by forward chaining until
//! nothing new follows. If variables are still free afterwards, a bounded
//! backtracking search assigns them, keeping the first assignment whose
//! deductive closure is complete and free of contradictions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Inference Engine                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Knowledge Base                       │   │
//! │  │  Facts │ Rules │ Forward Chaining │ Unification       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Consistency                          │   │
//! │  │  Functional │ Bijective │ Contradiction Detection     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Search                               │   │
//! │  │  Free Variables │ Candidate Domains │ Backtracking    │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use aingle_puzzle::{InferenceEngine, PuzzleParser};
//!
//! let kb = PuzzleParser::new()?.parse(
//!     "hecho: (vive_en, juan, casa_roja)\n\
//!      regla: (vive_en, X, casa_roja) -> (es, X, ingles)",
//! )?;
//!
//! let mut engine = InferenceEngine::new(kb);
//! let solution = engine.solve().expect("puzzle has a solution");
//! assert_eq!(solution.len(), 2);
//! assert_eq!(solution.inference_steps(), 1);
//! # Ok::<(), aingle_puzzle::Error>(())
//! ```

#[cfg(test)]
#[macro_use]
mod test_support;

pub mod builtin;
pub mod config;
pub mod consistency;
pub mod engine;
pub mod error;
pub mod fact;
pub mod knowledge;
pub mod parser;
pub mod rule;
pub mod search;
pub mod solution;
pub mod term;
pub mod unify;

// Re-exports
pub use builtin::BuiltinConstraints;
pub use config::{DomainHeuristics, SearchLimits, SolverConfig};
pub use consistency::{Conflict, ConsistencyChecker, ConstraintTable, FunctionalConstraint};
pub use engine::{EngineStats, InferenceEngine};
pub use error::{Error, Result};
pub use fact::Fact;
pub use knowledge::{Derivation, KnowledgeBase, PassReport, Saturation};
pub use parser::{load_puzzle, PuzzleParser};
pub use rule::Rule;
pub use search::SearchSpace;
pub use solution::{SolveReport, Solution};
pub use term::Term;
pub use unify::{unify, Substitution};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the fact ceiling.
///
/// # Examples
///
/// ```bash
/// export AINGLE_PUZZLE_MAX_FACTS=500
/// ```
pub const ENV_MAX_FACTS: &str = "AINGLE_PUZZLE_MAX_FACTS";

/// Environment variable overriding the forward-chaining step cap.
pub const ENV_MAX_STEPS: &str = "AINGLE_PUZZLE_MAX_STEPS";

/// Environment variable overriding how many free variables the search
/// explores before truncating.
pub const ENV_MAX_FREE_VARS: &str = "AINGLE_PUZZLE_MAX_FREE_VARS";
