//! End-to-end solver tests
//!
//! Each scenario builds a knowledge base, solves it and checks both the
//! solution and the engine statistics that explain it.

use aingle_puzzle::{Fact, InferenceEngine, KnowledgeBase, Rule, SolverConfig, Term};

fn atom(text: &str) -> Term {
    if text.starts_with(|c: char| c.is_uppercase()) {
        Term::var(text)
    } else {
        Term::constant(text)
    }
}

fn fact(predicate: &str, args: &[&str]) -> Fact {
    Fact::new(predicate, args.iter().map(|a| atom(a)).collect())
}

// ============================================================================
// Deduction only
// ============================================================================

#[test]
fn test_deduction_only_puzzle() {
    let kb = KnowledgeBase::with_contents(
        [
            fact("vive_en", &["juan", "casa1"]),
            fact("vive_en", &["maria", "casa2"]),
            fact("casa", &["color", "casa1", "rojo"]),
            fact("casa", &["color", "casa2", "azul"]),
        ],
        [
            Rule::when(fact("vive_en", &["X", "H"]))
                .and(fact("casa", &["color", "H", "C"]))
                .infer(fact("prefiere", &["X", "C"])),
            Rule::single(fact("prefiere", &["X", "rojo"]), fact("es", &["X", "ingles"])),
        ],
    );

    let mut engine = InferenceEngine::new(kb);
    let solution = engine.solve().expect("deduction alone solves this puzzle");

    assert_eq!(solution.len(), 7);
    assert_eq!(solution.inference_steps(), 2);
    assert!(solution.contains(&fact("prefiere", &["juan", "rojo"])));
    assert!(solution.contains(&fact("prefiere", &["maria", "azul"])));
    assert!(solution.contains(&fact("es", &["juan", "ingles"])));
    assert!(!solution.contains(&fact("es", &["maria", "ingles"])));

    let stats = engine.stats();
    assert!(!stats.searched);
    assert_eq!(stats.search_branches, 0);
    assert_eq!(stats.derived_facts, 3);
}

#[test]
fn test_solution_is_superset_of_input() {
    let kb = KnowledgeBase::with_contents(
        [fact("vive_en", &["juan", "casa_roja"])],
        [Rule::single(
            fact("vive_en", &["X", "casa_roja"]),
            fact("es", &["X", "ingles"]),
        )],
    );
    let input = kb.clone();

    let mut engine = InferenceEngine::new(kb);
    let solution = engine.solve().unwrap();
    assert!(input.facts().iter().all(|f| solution.contains(f)));
    assert_eq!(
        solution.derived_from(&input),
        vec![&fact("es", &["juan", "ingles"])]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_contradictory_facts_have_no_solution() {
    let kb = KnowledgeBase::with_contents(
        [
            fact("casa", &["color", "casa1", "rojo"]),
            fact("casa", &["color", "casa1", "azul"]),
        ],
        [],
    );

    let mut engine = InferenceEngine::new(kb);
    assert!(engine.solve().is_none());
    assert!(engine.stats().contradictions > 0);
    assert!(!engine.stats().searched);
}

#[test]
fn test_derived_contradiction_has_no_solution() {
    let kb = KnowledgeBase::with_contents(
        [
            fact("vive_en", &["juan", "casa1"]),
            fact("es", &["juan", "frances"]),
        ],
        [Rule::single(
            fact("vive_en", &["X", "casa1"]),
            fact("es", &["X", "ingles"]),
        )],
    );

    let mut engine = InferenceEngine::new(kb);
    assert!(engine.solve().is_none());
}

#[test]
fn test_oversized_puzzle_exceeds_fact_ceiling() {
    let facts: Vec<Fact> = (0..12)
        .map(|i| fact("n", &[format!("a{}", i).as_str()]))
        .collect();
    let kb = KnowledgeBase::with_contents(
        facts,
        [Rule::when(fact("n", &["X"]))
            .and(fact("n", &["Y"]))
            .infer(fact("par", &["X", "Y"]))],
    );

    let mut engine = InferenceEngine::new(kb);
    assert!(engine.solve().is_none());
    assert!(engine.stats().fact_limit_hit);

    // The same puzzle fits under a relaxed ceiling.
    let kb = engine.knowledge_base().clone();
    let mut relaxed = InferenceEngine::with_config(kb, SolverConfig::relaxed());
    let solution = relaxed.solve().unwrap();
    assert_eq!(solution.len(), 12 + 144);
}

#[test]
fn test_search_leaf_exceeding_fact_ceiling_is_rejected() {
    // Deduction adds nothing while C is free; every assignment of C then
    // derives a full grid of pairs at the leaf.
    let mut facts = vec![fact("elegido", &["C"])];
    facts.extend((0..4).map(|i| fact("n", &[format!("a{}", i).as_str()])));
    let kb = KnowledgeBase::with_contents(
        facts,
        [Rule::when(fact("elegido", &["C"]))
            .and(fact("n", &["X"]))
            .and(fact("n", &["Y"]))
            .infer(fact("par", &["C", "X", "Y"]))],
    );

    let mut config = SolverConfig::default();
    config.max_facts = 20;
    let mut engine = InferenceEngine::with_config(kb.clone(), config);
    assert!(engine.solve().is_none());

    let stats = engine.stats();
    assert!(stats.searched);
    assert!(stats.fact_limit_hit);
    assert!(stats.leaves_evaluated >= 1);
    assert_eq!(stats.contradictions, 0);

    // Under the default ceiling the first leaf fits.
    let mut engine = InferenceEngine::new(kb);
    let solution = engine.solve().unwrap();
    assert_eq!(solution.len(), 5 + 16);
    assert!(solution.contains(&fact("par", &["a0", "a3", "a1"])));
    assert_eq!(solution.inference_steps(), 1);
    assert!(!engine.stats().fact_limit_hit);
}

// ============================================================================
// Backtracking
// ============================================================================

#[test]
fn test_backtracking_picks_consistent_value() {
    let kb = KnowledgeBase::with_contents(
        [
            fact("casa", &["color", "casa1", "rojo"]),
            fact("casa", &["color", "casa2", "C"]),
            fact("disponible", &["azul"]),
        ],
        [],
    );

    let mut engine = InferenceEngine::new(kb);
    let solution = engine.solve().expect("azul is a consistent choice");

    assert!(solution.contains(&fact("casa", &["color", "casa2", "azul"])));
    assert!(!solution.contains(&fact("casa", &["color", "casa2", "rojo"])));
    assert!(!solution.contains(&fact("casa", &["color", "casa2", "C"])));
    assert_eq!(solution.len(), 3);

    let stats = engine.stats();
    assert!(stats.searched);
    assert!(stats.search_branches >= 2);
    assert!(!stats.search_truncated);
}

#[test]
fn test_backtracking_without_candidates_fails() {
    // The only colour mentioned is already taken.
    let kb = KnowledgeBase::with_contents(
        [
            fact("casa", &["color", "casa1", "rojo"]),
            fact("casa", &["color", "casa2", "C"]),
        ],
        [],
    );

    let mut engine = InferenceEngine::new(kb);
    assert!(engine.solve().is_none());
    assert!(engine.stats().searched);
}

#[test]
fn test_deduction_then_search_counts_steps() {
    let kb = KnowledgeBase::with_contents(
        [
            fact("vive_en", &["juan", "casa2"]),
            fact("casa", &["color", "casa1", "rojo"]),
            fact("casa", &["color", "casa2", "C"]),
            fact("disponible", &["azul"]),
        ],
        [Rule::when(fact("vive_en", &["X", "H"]))
            .and(fact("casa", &["color", "H", "azul"]))
            .infer(fact("es", &["X", "ingles"]))],
    );

    let mut engine = InferenceEngine::new(kb);
    let solution = engine.solve().unwrap();

    assert!(solution.contains(&fact("casa", &["color", "casa2", "azul"])));
    assert!(solution.contains(&fact("es", &["juan", "ingles"])));
    assert_eq!(solution.inference_steps(), 1);
    assert!(solution.facts().iter().all(Fact::is_ground));
}
