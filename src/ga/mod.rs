//! GA-based roster optimization (heuristic engine).
//!
//! Evolves a population of full-horizon worker × day matrices toward
//! low penalty. Never fails: it always returns a roster, which callers
//! should pass through [`crate::report`] before trusting.
//!
//! # Encoding
//!
//! - **Cell gene**: rest, or the index of a (shift, area) combination.
//! - **Variation**: per-cell uniform crossover, per-cell re-draw mutation.
//! - **Repair**: locks, rest interval, run length, capacity.
//!
//! # Submodules
//!
//! - [`runner`]: generic elitist GA runner and its parameters
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod chromosome;
mod problem;
pub mod runner;

pub use chromosome::{
    apply_locks, cell_mutation, legalize, repair_capacity, repair_rest, repair_run_length,
    uniform_crossover, RosterChromosome, REST,
};
pub use problem::{
    DecodedRoster, PenaltyBreakdown, RosterGaProblem, COVERAGE_FACTOR, LEGALITY_FACTOR,
};
pub use runner::{GaConfig, GaProblem, GaResult, GaRunner, GenerationStats, Individual};

use crate::error::RosterError;
use crate::models::RosterSchedule;
use crate::problem::RosterProblem;

/// Result of a heuristic roster run.
#[derive(Debug, Clone)]
pub struct HeuristicOutcome {
    /// Decoded roster of the best individual.
    pub schedule: RosterSchedule,
    /// Best fitness (negated penalty).
    pub fitness: f64,
    /// Violation counts of the best individual.
    pub breakdown: PenaltyBreakdown,
    /// Best fitness after initialization and after each generation.
    pub history: Vec<f64>,
}

/// Runs the heuristic engine.
///
/// # Errors
/// [`RosterError::InvalidConfiguration`] if GA parameters are out of range.
pub fn solve(problem: &RosterProblem, config: &GaConfig) -> Result<HeuristicOutcome, RosterError> {
    solve_with_observer(problem, config, |_| {})
}

/// Runs the heuristic engine, reporting each generation to `observer`.
pub fn solve_with_observer<F>(
    problem: &RosterProblem,
    config: &GaConfig,
    observer: F,
) -> Result<HeuristicOutcome, RosterError>
where
    F: FnMut(GenerationStats),
{
    config.validate()?;
    let ga_problem = RosterGaProblem::new(problem, config);
    let result = GaRunner::run_with_observer(&ga_problem, config, observer);

    Ok(HeuristicOutcome {
        schedule: problem.decode_cells(&result.best.to_cells()),
        fitness: result.best_fitness,
        breakdown: ga_problem.breakdown(&result.best),
        history: result.history,
    })
}
