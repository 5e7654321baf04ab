//! Solutions and solve reports.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::EngineStats;
use crate::fact::Fact;
use crate::knowledge::KnowledgeBase;

/// A complete, consistent fact set together with how many deduction passes
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    facts: IndexSet<Fact>,
    inference_steps: usize,
}

impl Solution {
    /// Creates a solution.
    pub fn new(facts: IndexSet<Fact>, inference_steps: usize) -> Self {
        Self {
            facts,
            inference_steps,
        }
    }

    /// The final facts: the input facts plus everything derived.
    pub fn facts(&self) -> &IndexSet<Fact> {
        &self.facts
    }

    /// Number of forward-chaining passes that added facts.
    pub fn inference_steps(&self) -> usize {
        self.inference_steps
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if there are no facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Checks if a value-equal fact is part of the solution.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Facts ordered by their display text.
    pub fn sorted_facts(&self) -> Vec<&Fact> {
        let mut facts: Vec<&Fact> = self.facts.iter().collect();
        facts.sort_by_cached_key(|f| f.to_string());
        facts
    }

    /// Facts that were not in `input`, in the order they were added.
    ///
    /// Facts grounded by the search count as new: they replace the
    /// non-ground originals.
    pub fn derived_from<'a>(&'a self, input: &KnowledgeBase) -> Vec<&'a Fact> {
        self.facts.iter().filter(|f| !input.contains(f)).collect()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fact in self.sorted_facts() {
            writeln!(f, "  {}", fact)?;
        }
        write!(
            f,
            "{} facts, {} inference steps",
            self.len(),
            self.inference_steps
        )
    }
}

/// A machine-readable record of one solve, as printed by `aingle-puzzle --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// Path or label of the puzzle.
    pub puzzle: String,
    /// Whether a solution was found.
    pub solved: bool,
    /// Final facts, sorted by display text.
    pub facts: Vec<String>,
    /// Facts not present in the input.
    pub derived: Vec<String>,
    /// Forward-chaining passes that added facts.
    pub inference_steps: usize,
    /// Engine statistics.
    pub stats: EngineStats,
    /// When the solve finished.
    pub solved_at: DateTime<Utc>,
}

impl SolveReport {
    /// Builds a report from the outcome of a solve.
    pub fn new(
        puzzle: impl Into<String>,
        input: &KnowledgeBase,
        solution: Option<&Solution>,
        stats: &EngineStats,
    ) -> Self {
        let (facts, derived, inference_steps) = match solution {
            Some(s) => (
                s.sorted_facts().iter().map(|f| f.to_string()).collect(),
                s.derived_from(input).iter().map(|f| f.to_string()).collect(),
                s.inference_steps(),
            ),
            None => (Vec::new(), Vec::new(), 0),
        };
        Self {
            puzzle: puzzle.into(),
            solved: solution.is_some(),
            facts,
            derived,
            inference_steps,
            stats: stats.clone(),
            solved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> Solution {
        Solution::new(
            [
                fact!("vive_en", "juan", "casa_roja"),
                fact!("es", "juan", "ingles"),
            ]
            .into_iter()
            .collect(),
            1,
        )
    }

    #[test]
    fn test_sorted_facts() {
        let s = solution();
        let sorted: Vec<String> = s.sorted_facts().iter().map(|f| f.to_string()).collect();
        assert_eq!(sorted, vec!["es(juan, ingles)", "vive_en(juan, casa_roja)"]);
    }

    #[test]
    fn test_derived_from_input() {
        let input = KnowledgeBase::with_contents([fact!("vive_en", "juan", "casa_roja")], []);
        let s = solution();
        assert_eq!(s.derived_from(&input), vec![&fact!("es", "juan", "ingles")]);
    }

    #[test]
    fn test_display() {
        let text = solution().to_string();
        assert!(text.starts_with("  es(juan, ingles)\n"));
        assert!(text.ends_with("2 facts, 1 inference steps"));
    }

    #[test]
    fn test_report() {
        let input = KnowledgeBase::with_contents([fact!("vive_en", "juan", "casa_roja")], []);
        let s = solution();
        let report = SolveReport::new("puzzle.txt", &input, Some(&s), &EngineStats::default());
        assert!(report.solved);
        assert_eq!(report.facts.len(), 2);
        assert_eq!(report.derived, vec!["es(juan, ingles)"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["inference_steps"], 1);

        let failed = SolveReport::new("puzzle.txt", &input, None, &EngineStats::default());
        assert!(!failed.solved);
        assert!(failed.facts.is_empty());
    }
}
