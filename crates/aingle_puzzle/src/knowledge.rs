//! The knowledge base: a deduplicated fact set plus a fixed rule list.
//!
//! Forward chaining runs in passes. Every rule in a pass reads the same
//! snapshot of facts taken at pass start; new facts only become visible to
//! rules in the next pass.

use indexmap::IndexSet;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::rule::Rule;
use crate::term::Term;
use crate::unify::Substitution;

/// Default ceiling on the number of facts a knowledge base may hold.
pub const DEFAULT_MAX_FACTS: usize = 100;

/// Holds the current facts and the rules used to extend them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    facts: IndexSet<Fact>,
    rules: Vec<Rule>,
    max_facts: usize,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with the default fact ceiling.
    pub fn new() -> Self {
        Self {
            facts: IndexSet::new(),
            rules: Vec::new(),
            max_facts: DEFAULT_MAX_FACTS,
        }
    }

    /// Creates a knowledge base from initial facts and rules.
    pub fn with_contents(
        facts: impl IntoIterator<Item = Fact>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        let mut kb = Self::new();
        kb.add_facts(facts);
        kb.rules.extend(rules);
        kb
    }

    /// Sets the fact ceiling enforced by [`forward_chain`](Self::forward_chain).
    pub fn set_max_facts(&mut self, max_facts: usize) {
        self.max_facts = max_facts;
    }

    /// Adds a fact. Returns `false` if a value-equal fact was already present.
    pub fn add_fact(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    /// Adds several facts, ignoring duplicates.
    pub fn add_facts(&mut self, facts: impl IntoIterator<Item = Fact>) {
        self.facts.extend(facts);
    }

    /// Appends a rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Current facts, in insertion order.
    pub fn facts(&self) -> &IndexSet<Fact> {
        &self.facts
    }

    /// Rules, in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Checks if a value-equal fact is present.
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if there are no facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Returns `true` if every fact is ground.
    pub fn is_complete(&self) -> bool {
        self.facts.iter().all(Fact::is_ground)
    }

    /// Iterates over the ground facts only.
    pub fn ground_facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(|f| f.is_ground())
    }

    /// Runs one forward-chaining pass.
    ///
    /// Every rule is applied, in declaration order, to the facts present at
    /// the start of the pass. New facts are deduplicated against the set and
    /// against each other, then added together at the end. The report says
    /// whether anything was added and whether the fact ceiling is now
    /// exceeded, in which case no further passes should run.
    pub fn forward_chain(&mut self) -> PassReport {
        debug!(
            "Forward chaining pass over {} facts and {} rules",
            self.facts.len(),
            self.rules.len()
        );

        let mut new_facts: IndexSet<Fact> = IndexSet::new();
        let mut derived = Vec::new();
        {
            let snapshot: Vec<&Fact> = self.facts.iter().collect();
            for (index, rule) in self.rules.iter().enumerate() {
                trace!("Applying rule {}: {}", index, rule);
                for fact in rule.apply(&snapshot) {
                    if self.facts.contains(&fact) || new_facts.contains(&fact) {
                        trace!("  duplicate ignored: {}", fact);
                        continue;
                    }
                    trace!("  derived: {}", fact);
                    derived.push(Derivation {
                        rule: index,
                        fact: fact.clone(),
                    });
                    new_facts.insert(fact);
                }
            }
        }

        self.facts.extend(new_facts);

        let limit_exceeded = self.facts.len() > self.max_facts;
        if limit_exceeded {
            warn!(
                "Fact ceiling exceeded: {} facts (limit {}), halting forward chaining",
                self.facts.len(),
                self.max_facts
            );
        }

        debug!("Pass added {} facts", derived.len());
        PassReport {
            derived,
            limit_exceeded,
        }
    }

    /// Runs passes until one adds nothing, the fact ceiling is exceeded, or
    /// `max_steps` passes have run.
    pub fn saturate(&mut self, max_steps: usize) -> Saturation {
        let mut outcome = Saturation::default();
        while outcome.passes < max_steps {
            let report = self.forward_chain();
            outcome.passes += 1;
            outcome.derived += report.added();
            if report.changed() {
                outcome.productive_passes += 1;
            }
            if report.limit_exceeded {
                outcome.limit_exceeded = true;
                break;
            }
            if !report.changed() {
                outcome.fixpoint = true;
                break;
            }
        }
        if !outcome.fixpoint && !outcome.limit_exceeded {
            debug!("Step cap of {} passes reached before fixpoint", max_steps);
        }
        outcome
    }

    /// Grounds `var` to `value` in every fact that mentions it.
    ///
    /// Each affected fact is removed and its substituted form inserted, which
    /// may merge it with an existing equal fact. Returns how many facts were
    /// rewritten.
    pub fn assign(&mut self, var: &str, value: &Term) -> usize {
        let mut subst = Substitution::new();
        if !subst.bind(var, value.clone()) {
            return 0;
        }

        let affected: Vec<Fact> = self
            .facts
            .iter()
            .filter(|f| f.contains_variable(var))
            .cloned()
            .collect();

        for fact in &affected {
            self.facts.shift_remove(fact);
        }
        for fact in &affected {
            self.facts.insert(fact.apply(&subst));
        }
        affected.len()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// A fact produced by a rule during a forward-chaining pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// Index of the rule that produced the fact, in declaration order.
    pub rule: usize,
    /// The new fact.
    pub fact: Fact,
}

/// Outcome of one forward-chaining pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// New facts added in this pass, in derivation order.
    pub derived: Vec<Derivation>,
    /// Whether the knowledge base now holds more facts than its ceiling.
    pub limit_exceeded: bool,
}

impl PassReport {
    /// Returns `true` if the pass added at least one fact.
    pub fn changed(&self) -> bool {
        !self.derived.is_empty()
    }

    /// Number of facts added.
    pub fn added(&self) -> usize {
        self.derived.len()
    }
}

/// Outcome of running forward chaining to a fixpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Saturation {
    /// Passes run, including the final one that added nothing.
    pub passes: usize,
    /// Passes that added at least one fact.
    pub productive_passes: usize,
    /// Facts added across all passes.
    pub derived: usize,
    /// Whether a pass added nothing.
    pub fixpoint: bool,
    /// Whether the fact ceiling was exceeded.
    pub limit_exceeded: bool,
}
