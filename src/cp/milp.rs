//! Mixed-integer backend over `good_lp`.
//!
//! Hands a [`CpModel`] to an external MIP solver. With the `highs`
//! feature the model goes to HiGHS with the configured time limit, thread
//! count, and seed; a run stopped by the time limit still returns its
//! incumbent. Without it the pure-Rust `microlp` solver runs to completion
//! and the time limit only decides whether it starts.
//!
//! Returned values are rounded and re-checked against the model, so a
//! solver answer that does not satisfy every row is reported as
//! [`SolveStatus::Unsolved`].

use std::time::{Duration, Instant};

#[cfg(feature = "highs")]
use good_lp::solvers::SolutionStatus;
use good_lp::{
    variable, variables, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{debug, info, warn};

use super::model::{CpModel, VarId, NEG_INF, POS_INF};
use super::solver::{CpSolution, CpSolver, SolveStatus, SolverConfig};

/// `good_lp`-backed solver.
///
/// # Example
/// ```
/// use u_roster::cp::{CpModel, CpSolver, MilpSolver, SolveStatus, SolverConfig};
///
/// let mut model = CpModel::new("pick-two");
/// let xs: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{i}"))).collect();
/// model.add_ge(xs.iter().map(|&x| (x, 1)).collect(), 2);
/// model.minimize(xs.iter().map(|&x| (x, 1)).collect());
///
/// let solution = MilpSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert_eq!(solution.objective, Some(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for MilpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let start = Instant::now();
        if config.time_limit.is_zero() {
            warn!(model = %model.name, "time limit reached before any solution");
            return unsolved(start.elapsed());
        }

        let mut vars = variables!();
        let xs: Vec<Variable> = model
            .vars()
            .iter()
            .map(|v| {
                let mut def = variable().integer().name(v.name.clone());
                if v.lb > NEG_INF {
                    def = def.min(v.lb as f64);
                }
                if v.ub < POS_INF {
                    def = def.max(v.ub as f64);
                }
                vars.add(def)
            })
            .collect();

        let objective = linear(&xs, model.objective());
        let mut rows = Vec::with_capacity(model.constraint_count());
        for c in model.constraints() {
            if c.lb > NEG_INF {
                rows.push(linear(&xs, &c.terms).geq(c.lb as f64));
            }
            if c.ub < POS_INF {
                rows.push(linear(&xs, &c.terms).leq(c.ub as f64));
            }
        }

        debug!(
            model = %model.name,
            vars = xs.len(),
            rows = rows.len(),
            "starting MIP solver"
        );

        let (status, values) = match run(vars, objective, rows, &xs, config) {
            Ok((raw, proven)) => {
                let values: Vec<i64> = raw.iter().map(|v| v.round() as i64).collect();
                if !model.is_feasible(&values) {
                    warn!(model = %model.name, "MIP solver returned an infeasible point");
                    (SolveStatus::Unsolved, Vec::new())
                } else if proven {
                    (SolveStatus::Optimal, values)
                } else {
                    warn!(
                        model = %model.name,
                        "time limit reached before optimality was proven"
                    );
                    (SolveStatus::Feasible, values)
                }
            }
            Err(ResolutionError::Infeasible) => {
                warn!(model = %model.name, "model is infeasible");
                (SolveStatus::Unsolved, Vec::new())
            }
            Err(e) => {
                warn!(model = %model.name, error = %e, "MIP solver returned no solution");
                (SolveStatus::Unsolved, Vec::new())
            }
        };

        let objective = status
            .is_solution_found()
            .then(|| model.objective_value(&values));
        let elapsed = start.elapsed();
        info!(
            model = %model.name,
            ?status,
            objective,
            elapsed_ms = elapsed.as_millis() as u64,
            "MIP solver finished"
        );

        CpSolution {
            status,
            values,
            objective,
            nodes: 0,
            elapsed,
        }
    }
}

fn unsolved(elapsed: Duration) -> CpSolution {
    CpSolution {
        status: SolveStatus::Unsolved,
        values: Vec::new(),
        objective: None,
        nodes: 0,
        elapsed,
    }
}

fn linear(xs: &[Variable], terms: &[(VarId, i64)]) -> Expression {
    terms
        .iter()
        .fold(Expression::from(0.0), |acc, &(v, c)| acc + (c as f64) * xs[v.0])
}

/// Solves with HiGHS. Returns raw values and whether optimality was proven.
#[cfg(feature = "highs")]
fn run(
    vars: ProblemVariables,
    objective: Expression,
    rows: Vec<Constraint>,
    xs: &[Variable],
    config: &SolverConfig,
) -> Result<(Vec<f64>, bool), ResolutionError> {
    let threads = i32::try_from(config.workers.max(1)).unwrap_or(i32::MAX);
    let seed = (config.seed % i32::MAX as u64) as i32;
    let mut problem = vars
        .minimise(objective)
        .using(good_lp::highs)
        .set_verbose(false)
        .set_option("time_limit", config.time_limit.as_secs_f64())
        .set_option("threads", threads)
        .set_option("random_seed", seed);
    for row in rows {
        problem = problem.with(row);
    }
    let solution = problem.solve()?;
    let proven = matches!(solution.status(), SolutionStatus::Optimal);
    Ok((xs.iter().map(|&x| solution.value(x)).collect(), proven))
}

/// Solves with the bundled pure-Rust solver. It runs to completion, so
/// every returned point is proven optimal.
#[cfg(not(feature = "highs"))]
fn run(
    vars: ProblemVariables,
    objective: Expression,
    rows: Vec<Constraint>,
    xs: &[Variable],
    _config: &SolverConfig,
) -> Result<(Vec<f64>, bool), ResolutionError> {
    let mut problem = vars.minimise(objective).using(good_lp::default_solver);
    for row in rows {
        problem = problem.with(row);
    }
    let solution = problem.solve()?;
    Ok((xs.iter().map(|&x| solution.value(x)).collect(), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::BranchAndBoundSolver;

    fn quick() -> SolverConfig {
        SolverConfig::default().with_time_limit(Duration::from_secs(10))
    }

    #[test]
    fn test_knapsack_optimum() {
        // maximize 6a + 5b + 4c subject to 5a + 4b + 3c <= 7
        let mut m = CpModel::new("knapsack");
        let a = m.new_bool_var("a");
        let b = m.new_bool_var("b");
        let c = m.new_bool_var("c");
        m.add_le(vec![(a, 5), (b, 4), (c, 3)], 7);
        m.minimize(vec![(a, -6), (b, -5), (c, -4)]);

        let sol = MilpSolver::new().solve(&m, &quick());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(-9));
        assert_eq!(sol.values, vec![0, 1, 1]);
    }

    #[test]
    fn test_integer_bounds_and_equality() {
        // x + y = 7, x, y in [0, 5], minimize x
        let mut m = CpModel::new("sum");
        let x = m.new_int_var("x", 0, 5);
        let y = m.new_int_var("y", 0, 5);
        m.add_eq(vec![(x, 1), (y, 1)], 7);
        m.minimize(vec![(x, 1)]);

        let sol = MilpSolver::new().solve(&m, &quick());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!((sol.value(x), sol.value(y)), (Some(2), Some(5)));
    }

    #[test]
    fn test_infeasible_is_unsolved() {
        let mut m = CpModel::new("contradiction");
        let x = m.new_bool_var("x");
        let y = m.new_bool_var("y");
        m.add_ge(vec![(x, 1), (y, 1)], 2);
        m.add_le(vec![(x, 1), (y, 1)], 1);

        let sol = MilpSolver::new().solve(&m, &quick());
        assert_eq!(sol.status, SolveStatus::Unsolved);
        assert!(sol.values.is_empty());
        assert!(sol.objective.is_none());
    }

    #[test]
    fn test_zero_time_limit_is_unsolved() {
        let mut m = CpModel::new("trivial");
        m.new_bool_var("x");
        let sol = MilpSolver::new().solve(&m, &quick().with_time_limit(Duration::ZERO));
        assert_eq!(sol.status, SolveStatus::Unsolved);
    }

    #[test]
    fn test_agrees_with_branch_and_bound() {
        let mut m = CpModel::new("cover");
        let xs: Vec<_> = (0..8).map(|i| m.new_bool_var(format!("x{i}"))).collect();
        for w in xs.windows(2) {
            m.add_ge(vec![(w[0], 1), (w[1], 1)], 1);
        }
        m.minimize(xs.iter().map(|&x| (x, 1)).collect());

        let milp = MilpSolver::new().solve(&m, &quick());
        let bnb = BranchAndBoundSolver::new().solve(&m, &quick());
        assert_eq!(milp.status, SolveStatus::Optimal);
        assert_eq!(milp.objective, bnb.objective);
        assert!(m.is_feasible(&milp.values));
    }
}
