//! Inference Engine
//!
//! Drives a puzzle from its initial facts to a solution:
//! - Forward chaining: apply rules until nothing new can be derived
//! - Consistency: reject fact sets that break a uniqueness constraint
//! - Backtracking: assign candidate values to variables deduction left free
//!
//! ```text
//! Start -> ForwardChaining -> Solved
//!                          -> Inconsistent (fail)
//!                          -> NeedsSearch -> Backtracking -> Solved | Fail
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::builtin::BuiltinConstraints;
use crate::config::SolverConfig;
use crate::consistency::{ConsistencyChecker, ConstraintTable};
use crate::knowledge::KnowledgeBase;
use crate::search::{Backtracker, SearchSpace};
use crate::solution::Solution;

/// Solves a puzzle described by a [`KnowledgeBase`].
///
/// The engine works on a private clone: the knowledge base it was built with
/// is never modified, so [`solve`](Self::solve) can be called repeatedly.
pub struct InferenceEngine {
    /// The puzzle as given.
    kb: KnowledgeBase,
    /// Step cap, fact ceiling and search bounds.
    config: SolverConfig,
    /// Uniqueness constraints used to detect contradictions.
    checker: ConsistencyChecker,
    /// Statistics from the most recent solve.
    stats: EngineStats,
}

/// Where the forward-chaining phase left the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Solved,
    Inconsistent,
    NeedsSearch,
}

impl InferenceEngine {
    /// Creates an engine with the default configuration and the built-in
    /// puzzle constraints.
    pub fn new(kb: KnowledgeBase) -> Self {
        Self::with_config(kb, SolverConfig::default())
    }

    /// Creates an engine with a specific configuration.
    pub fn with_config(kb: KnowledgeBase, config: SolverConfig) -> Self {
        Self {
            kb,
            config,
            checker: ConsistencyChecker::new(BuiltinConstraints::puzzle()),
            stats: EngineStats::default(),
        }
    }

    /// Replaces the constraint table. Constraints whose positions do not fit
    /// their arity are ignored.
    pub fn with_constraints(mut self, table: ConstraintTable) -> Self {
        self.checker = ConsistencyChecker::new(table);
        self
    }

    /// The puzzle this engine solves.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Statistics from the most recent call to [`solve`](Self::solve).
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Attempts to solve the puzzle.
    ///
    /// Returns `None` when the facts are contradictory, the fact ceiling is
    /// exceeded, or the search finds no complete, consistent assignment.
    /// [`stats`](Self::stats) tells these cases apart.
    pub fn solve(&mut self) -> Option<Solution> {
        self.stats = EngineStats::default();

        let mut working = self.kb.clone();
        working.set_max_facts(self.config.max_facts);
        info!(
            "Solving puzzle with {} facts and {} rules",
            working.len(),
            working.rules().len()
        );

        let outcome = working.saturate(self.config.max_steps);
        self.stats.passes += outcome.passes;
        self.stats.derived_facts += outcome.derived;

        if outcome.limit_exceeded {
            self.stats.fact_limit_hit = true;
            warn!("Search space exceeded: more than {} facts", self.config.max_facts);
            return None;
        }
        if !outcome.fixpoint {
            self.stats.step_limit_hit = true;
            warn!(
                "No fixpoint after {} passes, evaluating the facts derived so far",
                self.config.max_steps
            );
        }

        let steps = outcome.productive_passes;
        match self.classify(&working) {
            Verdict::Solved => {
                info!("Solved by deduction in {} steps ({} facts)", steps, working.len());
                Some(Solution::new(working.facts().clone(), steps))
            }
            Verdict::Inconsistent => {
                info!("No solution: initial deduction is contradictory");
                None
            }
            Verdict::NeedsSearch => self.backtrack(&working, steps),
        }
    }

    fn classify(&mut self, kb: &KnowledgeBase) -> Verdict {
        if let Some(conflict) = self.checker.find_conflict(kb.ground_facts()) {
            self.stats.contradictions += 1;
            debug!("{}", conflict.explain());
            return Verdict::Inconsistent;
        }
        if kb.is_complete() {
            Verdict::Solved
        } else {
            Verdict::NeedsSearch
        }
    }

    fn backtrack(&mut self, base: &KnowledgeBase, steps: usize) -> Option<Solution> {
        self.stats.searched = true;

        let space = SearchSpace::discover(base, &self.config);
        self.stats.search_truncated = space.truncated;
        debug!(
            "Deduction left free variables, searching over {}",
            space
                .variables
                .iter()
                .map(|v| format!("{} ({} candidates)", v.name, v.domain.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let max_steps = self.config.max_steps;
        let leaf = Backtracker::new(&space, &self.checker, max_steps, &mut self.stats).run(base);
        match leaf {
            Some(leaf) => {
                let total = steps + leaf.productive_passes;
                info!(
                    "Solved by search after {} branches in {} steps ({} facts)",
                    self.stats.search_branches,
                    total,
                    leaf.kb.len()
                );
                Some(Solution::new(leaf.kb.facts().clone(), total))
            }
            None => {
                info!(
                    "No solution: search exhausted {} branches",
                    self.stats.search_branches
                );
                None
            }
        }
    }
}

/// Collects statistics about a solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Forward-chaining passes run, including those at search leaves.
    pub passes: usize,
    /// Facts added by forward chaining.
    pub derived_facts: usize,
    /// Whether deduction left free variables and the search ran.
    pub searched: bool,
    /// Candidate assignments tried.
    pub search_branches: usize,
    /// Fully assigned knowledge bases evaluated.
    pub leaves_evaluated: usize,
    /// Contradictions encountered.
    pub contradictions: usize,
    /// A fixpoint run stopped at the step cap.
    pub step_limit_hit: bool,
    /// The fact ceiling was exceeded.
    pub fact_limit_hit: bool,
    /// The search dropped variables or candidates to stay within bounds.
    pub search_truncated: bool,
}

impl EngineStats {
    /// Returns `true` if the result may be an approximation: a step cap or
    /// search truncation cut the exploration short.
    pub fn approximated(&self) -> bool {
        self.step_limit_hit || self.search_truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    #[test]
    fn test_engine_creation() {
        let engine = InferenceEngine::new(KnowledgeBase::new());
        assert_eq!(engine.stats(), &EngineStats::default());
        assert_eq!(engine.config().max_facts, 100);
    }

    #[test]
    fn test_empty_puzzle_is_trivially_solved() {
        let mut engine = InferenceEngine::new(KnowledgeBase::new());
        let solution = engine.solve().unwrap();
        assert!(solution.is_empty());
        assert_eq!(solution.inference_steps(), 0);
    }

    #[test]
    fn test_solve_leaves_input_untouched() {
        let kb = KnowledgeBase::with_contents(
            [fact!("vive_en", "juan", "casa_roja")],
            [Rule::single(
                fact!("vive_en", "X", "casa_roja"),
                fact!("es", "X", "ingles"),
            )],
        );
        let mut engine = InferenceEngine::new(kb);

        let solution = engine.solve().unwrap();
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.inference_steps(), 1);
        assert_eq!(engine.knowledge_base().len(), 1);

        // A second solve starts from the same input.
        let again = engine.solve().unwrap();
        assert_eq!(again, solution);
    }

    #[test]
    fn test_inconsistent_input_skips_search() {
        let kb = KnowledgeBase::with_contents(
            [
                fact!("es", "juan", "ingles"),
                fact!("es", "juan", "frances"),
                fact!("vive_en", "juan", "H"),
            ],
            [],
        );
        let mut engine = InferenceEngine::new(kb);
        assert!(engine.solve().is_none());
        assert!(!engine.stats().searched);
        assert_eq!(engine.stats().contradictions, 1);
    }

    #[test]
    fn test_step_cap_is_an_approximation() {
        let kb = KnowledgeBase::with_contents(
            [fact!("a", "x")],
            [
                Rule::single(fact!("a", "X"), fact!("b", "X")),
                Rule::single(fact!("b", "X"), fact!("c", "X")),
            ],
        );
        let mut config = SolverConfig::default();
        config.max_steps = 1;
        let mut engine = InferenceEngine::with_config(kb, config);

        let solution = engine.solve().unwrap();
        assert_eq!(solution.len(), 2);
        assert!(engine.stats().step_limit_hit);
        assert!(engine.stats().approximated());
    }

    #[test]
    fn test_custom_constraints() {
        let kb = KnowledgeBase::with_contents(
            [fact!("es", "juan", "ingles"), fact!("es", "juan", "frances")],
            [],
        );
        let mut engine =
            InferenceEngine::new(kb).with_constraints(BuiltinConstraints::none());
        assert_eq!(engine.solve().unwrap().len(), 2);
    }

    #[test]
    fn test_out_of_range_constraint_does_not_abort_solve() {
        use crate::consistency::FunctionalConstraint;

        let mut table = ConstraintTable::new("broken");
        table.add(FunctionalConstraint::bijection("x", "p", 2, 0, 2));
        let kb = KnowledgeBase::with_contents([fact!("p", "a", "b")], []);

        let mut engine = InferenceEngine::new(kb).with_constraints(table);
        let solution = engine.solve().unwrap();
        assert!(solution.contains(&fact!("p", "a", "b")));
        assert_eq!(engine.stats().contradictions, 0);
    }
}
