//! CP-based roster formulation (exact engine).
//!
//! Translates a [`RosterProblem`] into a linear [`CpModel`] and solves it
//! with any [`CpSolver`] under a time budget.
//!
//! # Model
//!
//! - `x[w][d][k]`: worker `w` works combination `k` on day `d`. Only
//!   created where the worker is eligible and the cell is not locked to
//!   rest; a working lock creates just its own combination, fixed to 1.
//! - `worked[w][d] = Σₖ x[w][d][k]` (boolean, so at most one per day).
//! - Coverage: `Σ_w x + slack ≥ required` per slot, `slack ∈ [0, required]`.
//! - Band: under/over slack on the per-(day, shift) total.
//! - Capacity: `Σ_d worked ≤ capacityOf(w)`.
//! - Rest: each too-short (shift, next-day shift) pair is mutually exclusive.
//! - Run length: every `maxConsecutive + 1` window has at most
//!   `maxConsecutive` worked days, or the number of locked working days in
//!   it if that is larger.
//! - Balance: `Σ_d worked − over + under = ⌊demand / workers⌋`.
//!
//! Objective: `coverage_weight·Σslack + band_weight·Σband + balance_weight·Σ(over + under)`.
//!
//! A greedy assignment respecting every hard rule is attached as a hint,
//! so the search has an incumbent after its first dive.
//!
//! # Submodules
//!
//! - [`model`]: backend-neutral linear model
//! - [`solver`]: solver trait and the branch-and-bound backend
//! - [`milp`]: mixed-integer backend over `good_lp`
//!
//! # Reference
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"

pub mod milp;
pub mod model;
pub mod solver;

pub use milp::MilpSolver;
pub use model::{CpModel, IntVar, LinearConstraint, VarId, NEG_INF, POS_INF};
pub use solver::{BranchAndBoundSolver, CpSolution, CpSolver, SolveStatus, SolverConfig};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RosterError;
use crate::models::RosterSchedule;
use crate::problem::{Lock, RosterProblem};
use crate::validation::{ConfigurationError, ConfigurationErrorKind};

/// Solver behind the exact engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExactBackend {
    /// Bundled propagating branch-and-bound ([`BranchAndBoundSolver`]).
    #[default]
    BranchAndBound,
    /// Mixed-integer programming through `good_lp` ([`MilpSolver`]).
    Milp,
}

/// Exact engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExactConfig {
    /// Wall-clock budget in seconds.
    pub time_limit_secs: f64,
    /// Parallel search threads.
    pub search_workers: usize,
    /// Add the workload balance terms to the objective.
    pub balance_objective: bool,
    /// Objective weight per unit of coverage slack.
    pub coverage_weight: i64,
    /// Objective weight per unit of band violation.
    pub band_weight: i64,
    /// Objective weight per day of deviation from the target load.
    pub balance_weight: i64,
    /// Seed for the diversified search threads.
    pub seed: u64,
    /// Solver backend.
    pub backend: ExactBackend,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 90.0,
            search_workers: 8,
            balance_objective: true,
            coverage_weight: 1000,
            band_weight: 100,
            balance_weight: 1,
            seed: 0,
            backend: ExactBackend::BranchAndBound,
        }
    }
}

impl ExactConfig {
    /// Sets the time limit in seconds.
    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the number of search threads.
    pub fn with_search_workers(mut self, workers: usize) -> Self {
        self.search_workers = workers;
        self
    }

    /// Enables or disables the balance objective.
    pub fn with_balance_objective(mut self, enabled: bool) -> Self {
        self.balance_objective = enabled;
        self
    }

    /// Sets the coverage slack weight.
    pub fn with_coverage_weight(mut self, weight: i64) -> Self {
        self.coverage_weight = weight;
        self
    }

    /// Sets the band violation weight.
    pub fn with_band_weight(mut self, weight: i64) -> Self {
        self.band_weight = weight;
        self
    }

    /// Sets the balance deviation weight.
    pub fn with_balance_weight(mut self, weight: i64) -> Self {
        self.balance_weight = weight;
        self
    }

    /// Sets the diversification seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects the solver backend.
    pub fn with_backend(mut self, backend: ExactBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Solver limits derived from these parameters.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_time_limit(
                Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::MAX),
            )
            .with_workers(self.search_workers.max(1))
            .with_seed(self.seed)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), Vec<ConfigurationError>> {
        let mut errors = Vec::new();
        if !(self.time_limit_secs.is_finite() && self.time_limit_secs >= 0.0) {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidParameter,
                format!(
                    "timeLimitSecs must be a non-negative number (got {})",
                    self.time_limit_secs
                ),
            ));
        }
        if self.search_workers == 0 {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidParameter,
                "searchWorkers must be at least 1",
            ));
        }
        if self.coverage_weight < 0 || self.band_weight < 0 || self.balance_weight < 0 {
            errors.push(ConfigurationError::new(
                ConfigurationErrorKind::InvalidParameter,
                "objective weights must be non-negative",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Result of an exact roster run.
#[derive(Debug, Clone)]
pub struct ExactOutcome {
    /// Solve status.
    pub status: SolveStatus,
    /// The roster; `None` when unsolved.
    pub schedule: Option<RosterSchedule>,
    /// Objective value of the roster.
    pub objective: Option<i64>,
    /// Total coverage slack (unmet headcount) of the roster.
    pub total_slack: Option<u64>,
    /// Search nodes explored.
    pub nodes: u64,
}

/// A built roster model with handles to its variables.
#[derive(Debug, Clone)]
pub struct RosterCpModel {
    /// The linear model.
    pub model: CpModel,
    /// `x[(w * days + d) * combos + k]`, `None` where forced to 0.
    pub assign: Vec<Option<VarId>>,
    /// `worked[w * days + d]`.
    pub worked: Vec<VarId>,
    /// Coverage slack per (slot index, variable).
    pub slack: Vec<(usize, VarId)>,
    days: usize,
    combos: usize,
}

impl RosterCpModel {
    /// Decodes a solution into a roster (worker-major).
    pub fn decode(&self, problem: &RosterProblem, solution: &CpSolution) -> RosterSchedule {
        let mut cells = vec![None; problem.worker_count() * self.days];
        for (i, var) in self.assign.iter().enumerate() {
            if let Some(v) = var {
                if solution.value(*v) == Some(1) {
                    cells[i / self.combos] = Some(i % self.combos);
                }
            }
        }
        problem.decode_cells(&cells)
    }

    /// Sum of coverage slack in a solution.
    pub fn total_slack(&self, solution: &CpSolution) -> u64 {
        self.slack
            .iter()
            .map(|&(_, v)| solution.value(v).unwrap_or(0).max(0) as u64)
            .sum()
    }
}

/// Builds and solves the roster CP model.
///
/// # Example
/// ```
/// use u_roster::cp::{BranchAndBoundSolver, ExactConfig, RosterCpBuilder};
/// use u_roster::problem::RosterProblem;
///
/// let config = u_roster::demo::emergency_department(6, 3);
/// let problem = RosterProblem::new(&config).unwrap();
/// let exact = ExactConfig::default().with_time_limit_secs(1.0).with_search_workers(1);
/// let outcome = RosterCpBuilder::new(&problem, &exact).solve(&BranchAndBoundSolver::new());
/// assert!(outcome.status.is_solution_found());
/// ```
pub struct RosterCpBuilder<'a> {
    problem: &'a RosterProblem,
    config: &'a ExactConfig,
}

impl<'a> RosterCpBuilder<'a> {
    /// Creates a builder.
    pub fn new(problem: &'a RosterProblem, config: &'a ExactConfig) -> Self {
        Self { problem, config }
    }

    /// Builds the model, with the greedy assignment attached as hints.
    pub fn build(&self) -> RosterCpModel {
        let p = self.problem;
        let cfg = self.config;
        let rules = p.rules();
        let (nw, nd, ns, na, nk) = (
            p.worker_count(),
            p.days(),
            p.shift_count(),
            p.area_count(),
            p.combo_count(),
        );
        let hint = self.greedy_cells();
        let mut model = CpModel::new("roster");
        let mut objective = Vec::new();

        // Assignment and worked-day variables.
        let mut assign = vec![None; nw * nd * nk];
        let mut worked = Vec::with_capacity(nw * nd);
        for w in 0..nw {
            for d in 0..nd {
                let lock = p.lock_of(w, d);
                let cell = hint[w * nd + d];
                let mut terms = Vec::new();
                for k in 0..nk {
                    let allowed = match lock {
                        Some(Lock::Rest) => false,
                        Some(Lock::Work { combo }) => combo == k,
                        None => p.worker(w).eligible[k],
                    };
                    if !allowed {
                        continue;
                    }
                    let x = model.new_bool_var(format!("x_{w}_{d}_{k}"));
                    if lock.is_some() {
                        model.fix(x, 1);
                    }
                    model.add_hint(x, i64::from(cell == Some(k)));
                    assign[(w * nd + d) * nk + k] = Some(x);
                    terms.push((x, 1));
                }
                let day = model.new_bool_var(format!("worked_{w}_{d}"));
                model.add_hint(day, i64::from(cell.is_some()));
                terms.push((day, -1));
                model.add_eq(terms, 0);
                worked.push(day);
            }
        }
        let x_at = |w: usize, d: usize, k: usize| assign[(w * nd + d) * nk + k];

        // Coverage with slack.
        let mut slack = Vec::new();
        for d in 0..nd {
            for s in 0..ns {
                for a in 0..na {
                    let required = p.required(d, s, a) as i64;
                    if required == 0 {
                        continue;
                    }
                    let k = p.combo(s, a);
                    let mut terms: Vec<_> =
                        (0..nw).filter_map(|w| x_at(w, d, k)).map(|x| (x, 1)).collect();
                    let covered = (0..nw).filter(|&w| hint[w * nd + d] == Some(k)).count() as i64;
                    let sl = model.new_int_var(format!("slack_{d}_{s}_{a}"), 0, required);
                    model.add_hint(sl, (required - covered).max(0));
                    terms.push((sl, 1));
                    model.add_ge(terms, required);
                    objective.push((sl, cfg.coverage_weight));
                    slack.push((p.slot(d, s, a), sl));
                }
            }
        }

        // Per-shift headcount band.
        let band_min = rules.min_headcount_per_shift as i64;
        let band_max = rules.max_headcount_per_shift as i64;
        for d in 0..nd {
            for s in 0..ns {
                let terms: Vec<_> = (0..na)
                    .flat_map(|a| (0..nw).map(move |w| (w, a)))
                    .filter_map(|(w, a)| x_at(w, d, p.combo(s, a)))
                    .map(|x| (x, 1))
                    .collect();
                let total = (0..nw)
                    .filter(|&w| hint[w * nd + d].is_some_and(|k| p.split_combo(k).0 == s))
                    .count() as i64;
                if band_min > 0 {
                    let under = model.new_int_var(format!("band_under_{d}_{s}"), 0, band_min);
                    model.add_hint(under, (band_min - total).max(0));
                    let mut row = terms.clone();
                    row.push((under, 1));
                    model.add_ge(row, band_min);
                    objective.push((under, cfg.band_weight));
                }
                let reachable = terms.len() as i64;
                if band_max < reachable {
                    let over = model.new_int_var(format!("band_over_{d}_{s}"), 0, reachable - band_max);
                    model.add_hint(over, (total - band_max).max(0));
                    let mut row = terms;
                    row.push((over, -1));
                    model.add_le(row, band_max);
                    objective.push((over, cfg.band_weight));
                }
            }
        }

        // Capacity (already limited by the off-days floor).
        for w in 0..nw {
            let cap = p.capacity_of(w) as usize;
            if cap < nd {
                let terms = worked[w * nd..(w + 1) * nd].iter().map(|&v| (v, 1)).collect();
                model.add_le(terms, cap as i64);
            }
        }

        // Minimum rest between consecutive days.
        for w in 0..nw {
            for d in 0..nd.saturating_sub(1) {
                if p.locks().is_locked(w, d) && p.locks().is_locked(w, d + 1) {
                    continue;
                }
                for s1 in 0..ns {
                    for s2 in 0..ns {
                        if p.rest_allows(s1, s2) {
                            continue;
                        }
                        let first: Vec<_> = (0..na)
                            .filter_map(|a| x_at(w, d, p.combo(s1, a)))
                            .collect();
                        let second: Vec<_> = (0..na)
                            .filter_map(|a| x_at(w, d + 1, p.combo(s2, a)))
                            .collect();
                        if first.is_empty() || second.is_empty() {
                            continue;
                        }
                        let terms = first.into_iter().chain(second).map(|x| (x, 1)).collect();
                        model.add_le(terms, 1);
                    }
                }
            }
        }

        // Run length.
        let max_consecutive = rules.max_consecutive_days as usize;
        let window = max_consecutive + 1;
        if nd >= window {
            for w in 0..nw {
                for start in 0..=nd - window {
                    let limit = max_consecutive.max(p.locks().locked_work_in_window(w, start, window));
                    let terms = worked[w * nd + start..w * nd + start + window]
                        .iter()
                        .map(|&v| (v, 1))
                        .collect();
                    model.add_le(terms, limit as i64);
                }
            }
        }

        // Workload balance.
        if cfg.balance_objective && nw > 0 {
            let target = (p.total_demand() / nw as u64) as i64;
            for w in 0..nw {
                let load = (0..nd).filter(|&d| hint[w * nd + d].is_some()).count() as i64;
                let over = model.new_int_var(format!("over_{w}"), 0, nd as i64);
                let under = model.new_int_var(format!("under_{w}"), 0, target);
                model.add_hint(over, (load - target).max(0));
                model.add_hint(under, (target - load).max(0));
                let mut terms: Vec<_> = worked[w * nd..(w + 1) * nd].iter().map(|&v| (v, 1)).collect();
                terms.push((over, -1));
                terms.push((under, 1));
                model.add_eq(terms, target);
                objective.push((over, cfg.balance_weight));
                objective.push((under, cfg.balance_weight));
            }
        }

        model.minimize(objective);
        RosterCpModel {
            model,
            assign,
            worked,
            slack,
            days: nd,
            combos: nk,
        }
    }

    /// Builds, solves, and decodes.
    pub fn solve<S: CpSolver>(&self, solver: &S) -> ExactOutcome {
        let built = self.build();
        info!(
            vars = built.model.var_count(),
            constraints = built.model.constraint_count(),
            time_limit_secs = self.config.time_limit_secs,
            workers = self.config.search_workers,
            "exact engine started"
        );
        let solution = solver.solve(&built.model, &self.config.solver_config());
        if !solution.status.is_solution_found() {
            return ExactOutcome {
                status: solution.status,
                schedule: None,
                objective: None,
                total_slack: None,
                nodes: solution.nodes,
            };
        }

        let schedule = built.decode(self.problem, &solution);
        let total_slack = built.total_slack(&solution);
        info!(
            status = ?solution.status,
            objective = solution.objective,
            total_slack,
            assignments = schedule.assignment_count(),
            "exact engine finished"
        );
        ExactOutcome {
            status: solution.status,
            schedule: Some(schedule),
            objective: solution.objective,
            total_slack: Some(total_slack),
            nodes: solution.nodes,
        }
    }

    /// Greedy assignment that respects locks, eligibility, capacity, rest,
    /// run length, and the band maximum.
    ///
    /// Returns `cells[w * days + d]`: worked combination or `None`.
    pub fn greedy_cells(&self) -> Vec<Option<usize>> {
        let p = self.problem;
        let rules = p.rules();
        let (nw, nd, ns, na) = (p.worker_count(), p.days(), p.shift_count(), p.area_count());
        let band_min = rules.min_headcount_per_shift as usize;
        let band_max = rules.max_headcount_per_shift as usize;

        let mut cells = vec![None; nw * nd];
        let mut load = vec![0u32; nw];
        for w in 0..nw {
            for d in 0..nd {
                if let Some(Lock::Work { combo }) = p.lock_of(w, d) {
                    cells[w * nd + d] = Some(combo);
                    load[w] += 1;
                }
            }
        }

        for d in 0..nd {
            let mut shift_total = vec![0usize; ns];
            let mut combo_total = vec![0u32; ns * na];
            for w in 0..nw {
                if let Some(k) = cells[w * nd + d] {
                    shift_total[p.split_combo(k).0] += 1;
                    combo_total[k] += 1;
                }
            }

            for s in 0..ns {
                for a in 0..na {
                    let k = p.combo(s, a);
                    while combo_total[k] < p.required(d, s, a) && shift_total[s] < band_max {
                        let Some(w) = self.pick(&cells, &load, d, k) else {
                            break;
                        };
                        cells[w * nd + d] = Some(k);
                        load[w] += 1;
                        combo_total[k] += 1;
                        shift_total[s] += 1;
                    }
                }
            }

            for s in 0..ns {
                while shift_total[s] < band_min.min(band_max) {
                    let best = (0..na)
                        .filter_map(|a| {
                            let k = p.combo(s, a);
                            self.pick(&cells, &load, d, k).map(|w| (load[w], w, k))
                        })
                        .min();
                    let Some((_, w, k)) = best else {
                        break;
                    };
                    cells[w * nd + d] = Some(k);
                    load[w] += 1;
                    shift_total[s] += 1;
                }
            }
        }
        cells
    }

    /// Least-loaded worker that can take combination `k` on day `d`.
    fn pick(&self, cells: &[Option<usize>], load: &[u32], d: usize, k: usize) -> Option<usize> {
        (0..self.problem.worker_count())
            .filter(|&w| self.can_take(cells, load, w, d, k))
            .min_by_key(|&w| (load[w], w))
    }

    fn can_take(&self, cells: &[Option<usize>], load: &[u32], w: usize, d: usize, k: usize) -> bool {
        let p = self.problem;
        let nd = p.days();
        if p.lock_of(w, d).is_some()
            || cells[w * nd + d].is_some()
            || !p.worker(w).eligible[k]
            || load[w] >= p.capacity_of(w)
        {
            return false;
        }

        let shift = p.split_combo(k).0;
        if d > 0 {
            if let Some(prev) = cells[w * nd + d - 1] {
                if !p.rest_allows(p.split_combo(prev).0, shift) {
                    return false;
                }
            }
        }
        if d + 1 < nd {
            if let Some(next) = cells[w * nd + d + 1] {
                if !p.rest_allows(shift, p.split_combo(next).0) {
                    return false;
                }
            }
        }

        let max_consecutive = p.rules().max_consecutive_days as usize;
        let window = max_consecutive + 1;
        if nd >= window {
            let first = (d + 1).saturating_sub(window);
            let last = d.min(nd - window);
            for start in first..=last {
                let worked = (start..start + window)
                    .filter(|&t| cells[w * nd + t].is_some())
                    .count()
                    + 1;
                let limit = max_consecutive.max(p.locks().locked_work_in_window(w, start, window));
                if worked > limit {
                    return false;
                }
            }
        }
        true
    }
}

/// Runs the exact engine with the configured backend.
///
/// # Errors
/// [`RosterError::InvalidConfiguration`] if parameters are out of range.
/// An expired budget is not an error: it is reported as
/// [`SolveStatus::Unsolved`] with no schedule.
pub fn solve(problem: &RosterProblem, config: &ExactConfig) -> Result<ExactOutcome, RosterError> {
    config.validate()?;
    let builder = RosterCpBuilder::new(problem, config);
    Ok(match config.backend {
        ExactBackend::BranchAndBound => builder.solve(&BranchAndBoundSolver::new()),
        ExactBackend::Milp => builder.solve(&MilpSolver::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CoverageRequirement, GlobalRules, QualificationGroup, RosterConfig, ShiftPeriod, Worker,
    };

    fn single_slot(workers: usize, required: u32) -> RosterProblem {
        let mut cfg = RosterConfig::new(1)
            .with_shift(ShiftPeriod::new("day", 480, 1200))
            .with_area("ward")
            .with_group(QualificationGroup::new("staff").with_areas(["ward"]))
            .with_coverage(CoverageRequirement::new().with(0, "day", "ward", required));
        for i in 0..workers {
            cfg = cfg.with_worker(Worker::new(format!("W{i}"), "staff", 30));
        }
        RosterProblem::new(&cfg).unwrap()
    }

    fn week_config() -> RosterConfig {
        let mut cfg = RosterConfig::new(7)
            .with_shift(ShiftPeriod::new("morning", 420, 900))
            .with_shift(ShiftPeriod::new("night", 1380, 420))
            .with_area("triage")
            .with_area("resus")
            .with_group(QualificationGroup::new("senior").with_areas(["triage", "resus"]))
            .with_group(QualificationGroup::new("junior").with_areas(["triage"]))
            .with_rules(
                GlobalRules::default()
                    .with_max_consecutive_days(3)
                    .with_min_rest_hours(11),
            )
            .with_coverage(CoverageRequirement::uniform(
                7,
                &["morning", "night"],
                &[("triage", 1), ("resus", 1)],
            ));
        for i in 0..6 {
            cfg = cfg.with_worker(Worker::new(format!("S{i}"), "senior", 5));
        }
        for i in 0..3 {
            cfg = cfg.with_worker(Worker::new(format!("J{i}"), "junior", 5));
        }
        cfg
    }

    fn quick() -> ExactConfig {
        ExactConfig::default()
            .with_time_limit_secs(10.0)
            .with_search_workers(1)
    }

    fn hint_values(model: &CpModel) -> Vec<i64> {
        (0..model.var_count())
            .map(|i| model.hint(VarId(i)).unwrap_or(0))
            .collect()
    }

    #[test]
    fn test_three_workers_two_required_is_optimal() {
        let problem = single_slot(3, 2);
        let outcome = solve(&problem, &quick()).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        let schedule = outcome.schedule.unwrap();
        assert_eq!(schedule.assignment_count(), 2);
        assert_eq!(outcome.total_slack, Some(0));
    }

    #[test]
    fn test_over_demand_reports_slack() {
        let problem = single_slot(2, 3);
        let outcome = solve(&problem, &quick()).unwrap();
        assert!(outcome.status.is_solution_found());
        assert_eq!(outcome.total_slack, Some(1));
        assert_eq!(outcome.schedule.unwrap().assignment_count(), 2);
    }

    #[test]
    fn test_zero_time_limit_is_unsolved() {
        let problem = RosterProblem::new(&week_config()).unwrap();
        let outcome = solve(&problem, &quick().with_time_limit_secs(0.0)).unwrap();
        assert_eq!(outcome.status, SolveStatus::Unsolved);
        assert!(outcome.schedule.is_none());
        assert!(outcome.total_slack.is_none());
    }

    #[test]
    fn test_greedy_hint_is_feasible() {
        let mut cfg = week_config();
        cfg.workers[0] = Worker::new("S0", "senior", 5).with_fixed_work(2, "night", "resus");
        cfg.workers[1] = Worker::new("S1", "senior", 5).with_off_day(3);
        let problem = RosterProblem::new(&cfg).unwrap();
        let exact = quick();
        let built = RosterCpBuilder::new(&problem, &exact).build();
        assert!(built.model.is_feasible(&hint_values(&built.model)));
    }

    #[test]
    fn test_locked_rest_and_work_honored() {
        let mut cfg = week_config();
        cfg.workers[0] = Worker::new("S0", "senior", 5).with_fixed_rest(5);
        cfg.workers[1] = Worker::new("S1", "senior", 5)
            .with_off_day(5)
            .with_fixed_work(4, "night", "triage");
        let problem = RosterProblem::new(&cfg).unwrap();
        let outcome = solve(&problem, &quick().with_time_limit_secs(2.0)).unwrap();
        let schedule = outcome.schedule.unwrap();
        assert!(schedule.assignment_of("S0", 5).is_none());
        assert!(schedule.assignment_of("S1", 5).is_none());
        let locked = schedule.assignment_of("S1", 4).unwrap();
        assert_eq!((locked.shift.as_str(), locked.area.as_str()), ("night", "triage"));
    }

    #[test]
    fn test_solution_respects_hard_rules() {
        let problem = RosterProblem::new(&week_config()).unwrap();
        let outcome = solve(&problem, &quick().with_time_limit_secs(2.0).with_search_workers(2))
            .unwrap();
        let schedule = outcome.schedule.unwrap();
        assert!(crate::report::audit(&schedule, &problem).is_empty());
        for a in schedule.assignments_for_worker("J0") {
            assert_eq!(a.area, "triage");
        }
    }

    #[test]
    fn test_balance_disabled_still_covers() {
        let problem = single_slot(4, 3);
        let outcome = solve(&problem, &quick().with_balance_objective(false)).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.total_slack, Some(0));
        assert_eq!(outcome.objective, Some(0));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let problem = single_slot(1, 1);
        let err = solve(
            &problem,
            &ExactConfig::default()
                .with_time_limit_secs(-1.0)
                .with_search_workers(0),
        )
        .unwrap_err();
        assert_eq!(err.configuration_errors().len(), 2);
    }

    #[test]
    fn test_config_json_defaults() {
        let cfg: ExactConfig = serde_json::from_str(r#"{"timeLimitSecs": 5}"#).unwrap();
        assert_eq!(cfg.time_limit_secs, 5.0);
        assert_eq!(cfg.search_workers, 8);
        assert!(cfg.balance_objective);
    }

    #[test]
    fn test_huge_time_limit_is_unbounded() {
        let cfg = quick().with_time_limit_secs(1e20);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.solver_config().time_limit, Duration::MAX);
        let outcome = solve(&single_slot(3, 2), &cfg).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.schedule.unwrap().assignment_count(), 2);
    }

    #[test]
    fn test_milp_backend_matches_branch_and_bound() {
        let milp = quick().with_backend(ExactBackend::Milp);
        let outcome = solve(&single_slot(3, 2), &milp).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.total_slack, Some(0));
        assert_eq!(outcome.schedule.unwrap().assignment_count(), 2);

        let short = solve(&single_slot(2, 3), &milp).unwrap();
        let exact = solve(&single_slot(2, 3), &quick()).unwrap();
        assert_eq!(short.total_slack, Some(1));
        assert_eq!(short.objective, exact.objective);
    }

    #[test]
    fn test_backend_from_json() {
        let cfg: ExactConfig = serde_json::from_str(r#"{"backend": "milp"}"#).unwrap();
        assert_eq!(cfg.backend, ExactBackend::Milp);
        assert_eq!(ExactConfig::default().backend, ExactBackend::BranchAndBound);
    }
}
