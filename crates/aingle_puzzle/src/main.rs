//! AIngle Puzzle - Logic Grid Puzzle Solver
//!
//! Loads a puzzle file, solves it and prints the solution.

use std::path::PathBuf;
use std::process::ExitCode;

use aingle_puzzle::{
    load_puzzle, ConstraintTable, InferenceEngine, Result, SolveReport, SolverConfig,
};
use clap::Parser;

/// AIngle logic grid puzzle solver
#[derive(Parser, Debug)]
#[command(name = "aingle-puzzle")]
#[command(author = "AIngle Core Dev Team")]
#[command(version)]
#[command(about = "Solve logic grid puzzles by deduction and backtracking", long_about = None)]
struct Args {
    /// Puzzle file to solve
    #[arg(default_value = "puzzle.txt")]
    puzzle: PathBuf,

    /// Maximum number of facts before giving up
    #[arg(long)]
    max_facts: Option<usize>,

    /// Maximum forward-chaining passes per fixpoint
    #[arg(long)]
    max_steps: Option<usize>,

    /// JSON constraint table replacing the built-in one
    #[arg(long, value_name = "JSON")]
    constraints: Option<PathBuf>,

    /// Print the loaded facts and rules before solving
    #[arg(long)]
    show_input: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Environment first, flags override
    let mut config = SolverConfig::from_env();
    if let Some(max_facts) = args.max_facts {
        config.max_facts = max_facts;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    config.validate()?;

    let kb = load_puzzle(&args.puzzle)?;
    log::info!(
        "Loaded {}: {} facts, {} rules",
        args.puzzle.display(),
        kb.len(),
        kb.rules().len()
    );

    if args.show_input {
        println!("Facts:");
        for fact in kb.facts() {
            println!("  - {}", fact);
        }
        println!("Rules:");
        for rule in kb.rules() {
            println!("  - {}", rule);
        }
        println!();
    }

    let mut engine = InferenceEngine::with_config(kb, config);
    if let Some(path) = &args.constraints {
        let json = std::fs::read_to_string(path)?;
        let table = ConstraintTable::from_json(&json)?;
        log::info!(
            "Using constraint table '{}' ({} constraints)",
            table.name,
            table.len()
        );
        engine = engine.with_constraints(table);
    }

    let solution = engine.solve();

    if args.json {
        let report = SolveReport::new(
            args.puzzle.display().to_string(),
            engine.knowledge_base(),
            solution.as_ref(),
            engine.stats(),
        );
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &solution {
            Some(solution) => {
                println!("Solution found:");
                println!();
                for fact in solution.sorted_facts() {
                    println!("  {}", fact);
                }
                println!();
                println!("Total facts: {}", solution.len());
                println!("Inference steps: {}", solution.inference_steps());

                let derived = solution.derived_from(engine.knowledge_base());
                if !derived.is_empty() {
                    println!();
                    println!("Derived facts:");
                    for fact in derived {
                        println!("  + {}", fact);
                    }
                }
                if engine.stats().approximated() {
                    log::warn!("Limits were hit during solving; the result may be incomplete");
                }
            }
            None => {
                let stats = engine.stats();
                if stats.fact_limit_hit {
                    println!(
                        "No solution: the puzzle exceeded {} facts.",
                        engine.config().max_facts
                    );
                } else {
                    println!("No solution satisfies all constraints.");
                }
            }
        }
    }

    Ok(if solution.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
