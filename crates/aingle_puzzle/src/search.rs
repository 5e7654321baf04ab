//! Backtracking search over the free variables left after deduction.
//!
//! Candidate values come from the constants already mentioned by the puzzle,
//! sorted into categories (numbers, houses, colours, nationalities and
//! everything else). A variable's name picks its category: by default `C…`
//! variables range over colours and `N…` over nationalities.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};

use crate::config::SolverConfig;
use crate::consistency::ConsistencyChecker;
use crate::engine::EngineStats;
use crate::knowledge::KnowledgeBase;
use crate::term::Term;

const NUMBER: &str = "number";
const HOUSE: &str = "house";
const COLOR: &str = "color";
const NATIONALITY: &str = "nationality";
const GENERAL: &str = "general";

/// A variable to assign, with the candidates to try in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeVariable {
    /// Variable name.
    pub name: String,
    /// Candidate values.
    pub domain: Vec<Term>,
}

/// The variables the search will assign, after bounding.
#[derive(Debug, Clone, Default)]
pub struct SearchSpace {
    /// Variables in first-seen order.
    pub variables: Vec<FreeVariable>,
    /// Whether variables or candidates were dropped to stay within bounds.
    pub truncated: bool,
}

impl SearchSpace {
    /// Collects the free variables of `kb` and their candidate domains,
    /// then bounds the result by `config.search`.
    ///
    /// Facts are scanned before rules, and within a rule the antecedents
    /// before the consequent. Variables whose domain comes out empty are
    /// skipped.
    pub fn discover(kb: &KnowledgeBase, config: &SolverConfig) -> Self {
        let mut names: IndexSet<&str> = IndexSet::new();
        let mut categories: IndexMap<&'static str, IndexSet<&str>> = IndexMap::new();

        let terms = kb.facts().iter().flat_map(|f| f.args.iter()).chain(
            kb.rules().iter().flat_map(|r| {
                r.antecedents()
                    .iter()
                    .chain(std::iter::once(r.consequent()))
                    .flat_map(|f| f.args.iter())
            }),
        );
        for term in terms {
            term.visit(
                &mut |name| {
                    names.insert(name);
                },
                &mut |value| {
                    categories
                        .entry(categorize(value, config))
                        .or_default()
                        .insert(value);
                },
            );
        }

        let variables: Vec<FreeVariable> = names
            .into_iter()
            .filter_map(|name| {
                let domain = domain_for(name, &categories, config);
                if domain.is_empty() {
                    trace!("Skipping {}: no candidate values", name);
                    return None;
                }
                Some(FreeVariable {
                    name: name.to_string(),
                    domain,
                })
            })
            .collect();

        Self::bounded(variables, config)
    }

    fn bounded(mut variables: Vec<FreeVariable>, config: &SolverConfig) -> Self {
        let limits = &config.search;
        let oversized = variables.len() > limits.max_free_variables
            || variables.iter().any(|v| v.domain.len() > limits.max_domain_size);
        if !oversized {
            return Self {
                variables,
                truncated: false,
            };
        }

        warn!(
            "Search space too large ({} variables), exploring only the first {} with {} candidates each",
            variables.len(),
            limits.truncated_variables,
            limits.truncated_domain_size
        );
        variables.truncate(limits.truncated_variables);
        for variable in &mut variables {
            variable.domain.truncate(limits.truncated_domain_size);
        }
        Self {
            variables,
            truncated: true,
        }
    }

    /// Number of variables to assign.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns `true` if there is nothing to assign.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

fn categorize(value: &str, config: &SolverConfig) -> &'static str {
    let domains = &config.domains;
    if value.parse::<i64>().is_ok() {
        NUMBER
    } else if value.contains(domains.house_marker.as_str()) {
        HOUSE
    } else if domains.colors.iter().any(|c| c == value) {
        COLOR
    } else if domains.nationalities.iter().any(|n| n == value) {
        NATIONALITY
    } else {
        GENERAL
    }
}

fn domain_for(
    name: &str,
    categories: &IndexMap<&'static str, IndexSet<&str>>,
    config: &SolverConfig,
) -> Vec<Term> {
    let preferred = config
        .domains
        .prefixes
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix.as_str()))
        .map(|(_, category)| category.as_str())
        .filter(|category| categories.contains_key(*category))
        .unwrap_or(GENERAL);

    match categories.get(preferred) {
        Some(values) if !values.is_empty() => values.iter().map(|v| Term::constant(*v)).collect(),
        _ => categories
            .values()
            .flatten()
            .take(config.search.fallback_domain_size)
            .map(|v| Term::constant(*v))
            .collect(),
    }
}

/// A complete, consistent knowledge base found by the search.
#[derive(Debug, Clone)]
pub(crate) struct Leaf {
    /// The solved knowledge base.
    pub(crate) kb: KnowledgeBase,
    /// Forward-chaining passes at the leaf that added facts.
    pub(crate) productive_passes: usize,
}

/// Depth-first assignment of candidate values to free variables.
pub(crate) struct Backtracker<'a> {
    space: &'a SearchSpace,
    checker: &'a ConsistencyChecker,
    max_steps: usize,
    stats: &'a mut EngineStats,
}

impl<'a> Backtracker<'a> {
    pub(crate) fn new(
        space: &'a SearchSpace,
        checker: &'a ConsistencyChecker,
        max_steps: usize,
        stats: &'a mut EngineStats,
    ) -> Self {
        Self {
            space,
            checker,
            max_steps,
            stats,
        }
    }

    /// Returns the first complete, consistent assignment reachable from `base`.
    pub(crate) fn run(&mut self, base: &KnowledgeBase) -> Option<Leaf> {
        self.descend(base, 0)
    }

    fn descend(&mut self, base: &KnowledgeBase, depth: usize) -> Option<Leaf> {
        let Some(variable) = self.space.variables.get(depth) else {
            return self.evaluate_leaf(base);
        };

        for value in &variable.domain {
            self.stats.search_branches += 1;
            debug!("Trying {} = {} at depth {}", variable.name, value, depth);

            let mut branch = base.clone();
            branch.assign(&variable.name, value);

            // Ground facts are never removed, so a conflict here survives to every leaf below.
            if let Some(conflict) = self.checker.find_conflict(branch.ground_facts()) {
                self.stats.contradictions += 1;
                trace!("Pruned: {}", conflict.explain());
                continue;
            }

            if let Some(leaf) = self.descend(&branch, depth + 1) {
                return Some(leaf);
            }
        }
        None
    }

    fn evaluate_leaf(&mut self, base: &KnowledgeBase) -> Option<Leaf> {
        self.stats.leaves_evaluated += 1;

        let mut kb = base.clone();
        let outcome = kb.saturate(self.max_steps);
        self.stats.passes += outcome.passes;
        self.stats.derived_facts += outcome.derived;
        if !outcome.fixpoint && !outcome.limit_exceeded {
            self.stats.step_limit_hit = true;
        }

        if outcome.limit_exceeded {
            self.stats.fact_limit_hit = true;
            debug!("Leaf rejected: fact ceiling exceeded");
            return None;
        }
        if !kb.is_complete() {
            debug!("Leaf rejected: free variables remain");
            return None;
        }
        if let Some(conflict) = self.checker.find_conflict(kb.ground_facts()) {
            self.stats.contradictions += 1;
            debug!("Leaf rejected: {}", conflict.explain());
            return None;
        }

        Some(Leaf {
            kb,
            productive_passes: outcome.productive_passes,
        })
    }
}
