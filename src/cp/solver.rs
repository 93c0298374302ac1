//! Branch-and-bound search over a [`CpModel`].
//!
//! Depth-first search with bounds propagation on every linear row,
//! including the objective row, which is capped at one below the best
//! known solution. Variables are branched in index order, trying the
//! hinted value first. Several search threads may share one incumbent:
//! the first thread is deterministic, the others randomly ignore hints
//! to diversify.
//!
//! # Reference
//! - Apt (2003), "Principles of Constraint Programming", ch. 6 (bounds consistency)
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{CpModel, VarId, NEG_INF, POS_INF};

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Best solution found and proven optimal.
    Optimal,
    /// A solution was found but optimality was not proven in time.
    Feasible,
    /// No solution: infeasible, or the time budget ran out first.
    Unsolved,
}

impl SolveStatus {
    /// Whether a solution is available.
    pub fn is_solution_found(self) -> bool {
        !matches!(self, SolveStatus::Unsolved)
    }
}

/// Search limits.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock budget.
    pub time_limit: Duration,
    /// Number of parallel search threads (at least 1).
    pub workers: usize,
    /// Seed for the diversified threads.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(90),
            workers: 1,
            seed: 0,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the number of search threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the diversification seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Outcome class.
    pub status: SolveStatus,
    /// Value per variable; empty when unsolved.
    pub values: Vec<i64>,
    /// Objective value of `values`.
    pub objective: Option<i64>,
    /// Search nodes explored across all threads.
    pub nodes: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl CpSolution {
    /// Value of a variable, if solved.
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.0).copied()
    }
}

/// A solver for linear integer models.
pub trait CpSolver {
    /// Solves `model` within the limits of `config`.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Propagating branch-and-bound solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }

    fn work(model: &CpModel, shared: &Incumbent, deadline: Instant, seed: Option<u64>) {
        let mut search = Search::new(model, seed);
        let exhausted = search.run(shared, deadline);
        shared.nodes.fetch_add(search.nodes, Ordering::Relaxed);
        if exhausted {
            shared.proven.store(true, Ordering::SeqCst);
            shared.stop.store(true, Ordering::SeqCst);
        }
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let start = Instant::now();
        let deadline = start
            .checked_add(config.time_limit)
            .unwrap_or_else(|| start + Duration::from_secs(365 * 86_400));
        let workers = config.workers.max(1);
        let shared = Incumbent::new();

        debug!(
            model = %model.name,
            vars = model.var_count(),
            constraints = model.constraint_count(),
            workers,
            "starting branch-and-bound"
        );

        std::thread::scope(|scope| {
            for k in 1..workers {
                let shared = &shared;
                let seed = config.seed.wrapping_add(k as u64);
                scope.spawn(move || Self::work(model, shared, deadline, Some(seed)));
            }
            Self::work(model, &shared, deadline, None);
        });

        let elapsed = start.elapsed();
        let nodes = shared.nodes.load(Ordering::Relaxed);
        let proven = shared.proven.load(Ordering::SeqCst);
        let incumbent = shared
            .values
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (status, values, objective) = match (incumbent, proven) {
            (Some((obj, values)), true) => (SolveStatus::Optimal, values, Some(obj)),
            (Some((obj, values)), false) => {
                warn!(
                    model = %model.name,
                    objective = obj,
                    "time limit reached before optimality was proven"
                );
                (SolveStatus::Feasible, values, Some(obj))
            }
            (None, true) => {
                warn!(model = %model.name, "model is infeasible");
                (SolveStatus::Unsolved, Vec::new(), None)
            }
            (None, false) => {
                warn!(model = %model.name, "time limit reached before any solution");
                (SolveStatus::Unsolved, Vec::new(), None)
            }
        };

        info!(
            model = %model.name,
            ?status,
            objective,
            nodes,
            elapsed_ms = elapsed.as_millis() as u64,
            "branch-and-bound finished"
        );

        CpSolution {
            status,
            values,
            objective,
            nodes,
            elapsed,
        }
    }
}

/// Best solution shared by all search threads.
struct Incumbent {
    best: AtomicI64,
    values: Mutex<Option<(i64, Vec<i64>)>>,
    stop: AtomicBool,
    proven: AtomicBool,
    nodes: AtomicU64,
}

impl Incumbent {
    fn new() -> Self {
        Self {
            best: AtomicI64::new(POS_INF),
            values: Mutex::new(None),
            stop: AtomicBool::new(false),
            proven: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
        }
    }

    fn offer(&self, objective: i64, values: &[i64]) -> bool {
        let mut slot = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let better = slot.as_ref().map_or(true, |(best, _)| objective < *best);
        if better {
            *slot = Some((objective, values.to_vec()));
            self.best.store(objective, Ordering::SeqCst);
        }
        better
    }
}

struct Row {
    terms: Vec<(usize, i64)>,
    lb: i64,
    ub: i64,
}

struct Choice {
    var: usize,
    mark: usize,
    hint: Option<i64>,
    low: i64,
    high: i64,
    descending: bool,
    hint_tried: bool,
}

impl Choice {
    fn next_value(&mut self) -> Option<i64> {
        if !self.hint_tried {
            self.hint_tried = true;
            match self.hint {
                Some(h) if h >= self.low && h <= self.high => return Some(h),
                _ => self.hint = None,
            }
        }
        while self.low <= self.high {
            let v = if self.descending {
                self.high -= 1;
                self.high + 1
            } else {
                self.low += 1;
                self.low - 1
            };
            if Some(v) != self.hint {
                return Some(v);
            }
        }
        None
    }
}

/// State of one search thread.
struct Search<'a> {
    model: &'a CpModel,
    rows: Vec<Row>,
    var_rows: Vec<Vec<usize>>,
    objective_row: Option<usize>,
    lo: Vec<i64>,
    hi: Vec<i64>,
    trail: Vec<(usize, i64, i64)>,
    queue: Vec<usize>,
    queued: Vec<bool>,
    rng: Option<SmallRng>,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, seed: Option<u64>) -> Self {
        let mut rows: Vec<Row> = model
            .constraints()
            .iter()
            .map(|c| Row {
                terms: c.terms.iter().map(|&(v, coef)| (v.0, coef)).collect(),
                lb: c.lb,
                ub: c.ub,
            })
            .collect();
        let objective_row = if model.objective().is_empty() {
            None
        } else {
            rows.push(Row {
                terms: model.objective().iter().map(|&(v, c)| (v.0, c)).collect(),
                lb: NEG_INF,
                ub: POS_INF,
            });
            Some(rows.len() - 1)
        };

        let mut var_rows = vec![Vec::new(); model.var_count()];
        for (r, row) in rows.iter().enumerate() {
            for &(v, _) in &row.terms {
                if var_rows[v].last() != Some(&r) {
                    var_rows[v].push(r);
                }
            }
        }

        let row_count = rows.len();
        Self {
            model,
            rows,
            var_rows,
            objective_row,
            lo: model.vars().iter().map(|v| v.lb).collect(),
            hi: model.vars().iter().map(|v| v.ub).collect(),
            trail: Vec::new(),
            queue: Vec::new(),
            queued: vec![false; row_count],
            rng: seed.map(SmallRng::seed_from_u64),
            nodes: 0,
        }
    }

    /// Returns `true` if the tree was exhausted, `false` if stopped early.
    fn run(&mut self, shared: &Incumbent, deadline: Instant) -> bool {
        if self.lo.iter().zip(&self.hi).any(|(l, h)| l > h) {
            return true;
        }
        for r in 0..self.rows.len() {
            self.enqueue(r);
        }
        if !self.propagate() {
            return true;
        }

        let n = self.lo.len();
        let mut stack: Vec<Choice> = Vec::new();
        let mut descend = true;
        loop {
            if shared.stop.load(Ordering::Relaxed) || Instant::now() >= deadline {
                return false;
            }
            if descend && self.tighten_objective(shared) {
                let start = stack.last().map_or(0, |c| c.var + 1);
                match (start..n).find(|&v| self.lo[v] < self.hi[v]) {
                    None => self.record(shared),
                    Some(v) => {
                        let choice = self.choice(v);
                        stack.push(choice);
                    }
                }
            }

            descend = false;
            while let Some(top) = stack.last_mut() {
                self.undo(top.mark);
                match top.next_value() {
                    Some(value) => {
                        self.nodes += 1;
                        if self.assign(top.var, value) {
                            descend = true;
                            break;
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
            if !descend {
                return true;
            }
        }
    }

    fn choice(&mut self, var: usize) -> Choice {
        let mut hint = self.model.hint(VarId(var));
        let mut descending = false;
        if let Some(rng) = self.rng.as_mut() {
            if rng.random_bool(0.1) {
                hint = None;
                descending = rng.random_bool(0.5);
            }
        }
        Choice {
            var,
            mark: self.trail.len(),
            hint,
            low: self.lo[var],
            high: self.hi[var],
            descending,
            hint_tried: false,
        }
    }

    fn record(&mut self, shared: &Incumbent) {
        let values = self.lo.clone();
        debug_assert!(self.model.is_feasible(&values));
        let objective = self.model.objective_value(&values);
        if shared.offer(objective, &values) {
            debug!(objective, nodes = self.nodes, "new incumbent");
        }
    }

    /// Caps the objective row below the shared incumbent and propagates.
    fn tighten_objective(&mut self, shared: &Incumbent) -> bool {
        let Some(r) = self.objective_row else {
            return true;
        };
        let best = shared.best.load(Ordering::SeqCst);
        if best >= POS_INF {
            return true;
        }
        self.rows[r].ub = self.rows[r].ub.min(best - 1);
        self.enqueue(r);
        self.propagate()
    }

    fn assign(&mut self, var: usize, value: i64) -> bool {
        self.set_bounds(var, value, value);
        self.propagate()
    }

    fn set_bounds(&mut self, var: usize, lo: i64, hi: i64) {
        self.trail.push((var, self.lo[var], self.hi[var]));
        self.lo[var] = lo;
        self.hi[var] = hi;
        for &r in &self.var_rows[var] {
            if !self.queued[r] {
                self.queued[r] = true;
                self.queue.push(r);
            }
        }
    }

    fn enqueue(&mut self, r: usize) {
        if !self.queued[r] {
            self.queued[r] = true;
            self.queue.push(r);
        }
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((v, lo, hi)) = self.trail.pop() {
                self.lo[v] = lo;
                self.hi[v] = hi;
            }
        }
    }

    fn propagate(&mut self) -> bool {
        while let Some(r) = self.queue.pop() {
            self.queued[r] = false;
            if !self.propagate_row(r) {
                for r in self.queue.drain(..) {
                    self.queued[r] = false;
                }
                return false;
            }
        }
        true
    }

    /// Bounds consistency on `lb ≤ Σ c·x ≤ ub`.
    fn propagate_row(&mut self, r: usize) -> bool {
        let lb = self.rows[r].lb as i128;
        let ub = self.rows[r].ub as i128;

        let mut min_act: i128 = 0;
        let mut max_act: i128 = 0;
        for &(v, c) in &self.rows[r].terms {
            let (lo, hi) = term_range(c, self.lo[v], self.hi[v]);
            min_act += lo;
            max_act += hi;
        }
        if min_act > ub || max_act < lb {
            return false;
        }

        for i in 0..self.rows[r].terms.len() {
            let (v, c) = self.rows[r].terms[i];
            if c == 0 {
                continue;
            }
            let (l, h) = (self.lo[v] as i128, self.hi[v] as i128);
            let (term_min, term_max) = term_range(c, self.lo[v], self.hi[v]);
            let upper = ub - (min_act - term_min);
            let lower = lb - (max_act - term_max);
            let c = c as i128;
            let (new_lo, new_hi) = if c > 0 {
                (l.max(div_ceil(lower, c)), h.min(div_floor(upper, c)))
            } else {
                (l.max(div_ceil(upper, c)), h.min(div_floor(lower, c)))
            };
            if new_lo > new_hi {
                return false;
            }
            if new_lo != l || new_hi != h {
                self.set_bounds(v, new_lo as i64, new_hi as i64);
                let (tmin, tmax) = term_range(c as i64, self.lo[v], self.hi[v]);
                min_act += tmin - term_min;
                max_act += tmax - term_max;
            }
        }
        true
    }
}

fn term_range(c: i64, lo: i64, hi: i64) -> (i128, i128) {
    let (c, lo, hi) = (c as i128, lo as i128, hi as i128);
    if c >= 0 {
        (c * lo, c * hi)
    } else {
        (c * hi, c * lo)
    }
}

fn div_floor(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}
