//! Configuration for the puzzle solver.
//!
//! [`SolverConfig`] bounds how far the solver may go before giving up or
//! approximating, and carries the vocabulary used to guess candidate values
//! for free variables during search.
//!
//! # Configuration Presets
//!
//! - [`SolverConfig::default()`] - The limits the solver was tuned with
//! - [`SolverConfig::relaxed()`] - Larger limits for bigger grids, at the cost of time
//!
//! # Examples
//!
//! ```
//! # use aingle_puzzle::SolverConfig;
//! let mut config = SolverConfig::default();
//! config.max_steps = 20;
//! assert!(config.validate().is_ok());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::knowledge::DEFAULT_MAX_FACTS;
use crate::{ENV_MAX_FACTS, ENV_MAX_FREE_VARS, ENV_MAX_STEPS};

/// Default cap on forward-chaining passes per fixpoint run.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Bounds on the backtracking search.
///
/// When a puzzle has more than `max_free_variables` free variables, or any
/// candidate domain is larger than `max_domain_size`, the search only
/// explores the first `truncated_variables` variables with the first
/// `truncated_domain_size` candidates each. The result is then an
/// approximation and [`EngineStats::search_truncated`](crate::EngineStats) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Most free variables searched without truncation.
    pub max_free_variables: usize,
    /// Largest domain searched without truncation.
    pub max_domain_size: usize,
    /// Variables kept once truncation kicks in.
    pub truncated_variables: usize,
    /// Candidates kept per variable once truncation kicks in.
    pub truncated_domain_size: usize,
    /// Candidates taken across all categories when a variable's own category is empty.
    pub fallback_domain_size: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_free_variables: 3,
            max_domain_size: 5,
            truncated_variables: 2,
            truncated_domain_size: 3,
            fallback_domain_size: 5,
        }
    }
}

/// Vocabulary used to sort constants into categories and pick a category
/// for each free variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHeuristics {
    /// Substring marking a constant as a house.
    pub house_marker: String,
    /// Constants treated as colours.
    pub colors: Vec<String>,
    /// Constants treated as nationalities.
    pub nationalities: Vec<String>,
    /// Variable-name prefix to category, checked in order.
    pub prefixes: IndexMap<String, String>,
}

impl Default for DomainHeuristics {
    fn default() -> Self {
        Self {
            house_marker: "casa".to_string(),
            colors: words(&["rojo", "azul", "verde", "amarillo", "blanco"]),
            nationalities: words(&["ingles", "español", "noruego", "ucraniano", "japones"]),
            prefixes: [("C", "color"), ("N", "nationality")]
                .into_iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Configuration for an [`InferenceEngine`](crate::InferenceEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Ceiling on the number of facts. Exceeding it fails the solve.
    pub max_facts: usize,
    /// Cap on forward-chaining passes per fixpoint run.
    pub max_steps: usize,
    /// Backtracking search bounds.
    pub search: SearchLimits,
    /// Candidate-domain vocabulary.
    pub domains: DomainHeuristics,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_facts: DEFAULT_MAX_FACTS,
            max_steps: DEFAULT_MAX_STEPS,
            search: SearchLimits::default(),
            domains: DomainHeuristics::default(),
        }
    }
}

impl SolverConfig {
    /// Returns a configuration for larger puzzles.
    ///
    /// This configuration features:
    /// - A ceiling of 1000 facts
    /// - Up to 50 passes per fixpoint
    /// - Search over up to 6 variables with 10 candidates each before truncating
    pub fn relaxed() -> Self {
        Self {
            max_facts: 1000,
            max_steps: 50,
            search: SearchLimits {
                max_free_variables: 6,
                max_domain_size: 10,
                truncated_variables: 4,
                truncated_domain_size: 5,
                fallback_domain_size: 10,
            },
            domains: DomainHeuristics::default(),
        }
    }

    /// Creates a configuration from environment variables, starting from the default.
    ///
    /// Reads [`ENV_MAX_FACTS`], [`ENV_MAX_STEPS`] and [`ENV_MAX_FREE_VARS`].
    /// Unset or unparsable values leave the default in place.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        if let Some(max_facts) = read(ENV_MAX_FACTS) {
            self.max_facts = max_facts;
        }
        if let Some(max_steps) = read(ENV_MAX_STEPS) {
            self.max_steps = max_steps;
        }
        if let Some(max_vars) = read(ENV_MAX_FREE_VARS) {
            self.search.max_free_variables = max_vars;
        }

        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a limit is zero or the truncated
    /// search is larger than the untruncated one.
    ///
    /// ```
    /// # use aingle_puzzle::SolverConfig;
    /// let mut config = SolverConfig::default();
    /// config.max_steps = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.max_facts == 0 {
            return Err(Error::InvalidConfig("max_facts must be at least 1".into()));
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidConfig("max_steps must be at least 1".into()));
        }

        let search = &self.search;
        if search.truncated_variables == 0 || search.truncated_domain_size == 0 {
            return Err(Error::InvalidConfig(
                "truncated search must keep at least one variable and one candidate".into(),
            ));
        }
        if search.truncated_variables > search.max_free_variables
            || search.truncated_domain_size > search.max_domain_size
        {
            return Err(Error::InvalidConfig(format!(
                "truncated search ({} variables x {} candidates) exceeds the untruncated bound ({} x {})",
                search.truncated_variables,
                search.truncated_domain_size,
                search.max_free_variables,
                search.max_domain_size
            )));
        }

        Ok(())
    }
}
