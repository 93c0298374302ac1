//! Worker × day matrix chromosome for rostering.
//!
//! # Encoding
//!
//! One gene per (worker, day) cell, stored row-major
//! (`genes[worker * days + day]`). A gene is either [`REST`] or the index
//! of a (shift, area) combination, see
//! [`RosterProblem::combo`](crate::problem::RosterProblem::combo).
//! Validation caps the catalog at
//! [`MAX_COMBINATIONS`](crate::validation::MAX_COMBINATIONS), so every
//! index fits in an `i16`.
//!
//! Random genes are drawn only from the worker's eligible combinations,
//! so every chromosome is eligibility-feasible by construction.
//!
//! # Repair
//!
//! After variation a chromosome is repaired in order: locks, rest
//! interval, run length, capacity. Each repair step only turns unlocked
//! working cells into rest, so later steps never undo earlier ones.

use rand::Rng;

use crate::ga::runner::Individual;
use crate::problem::RosterProblem;

/// Gene value for a resting cell.
pub const REST: i16 = -1;

/// Worker × day roster chromosome.
///
/// Fitness is a negated penalty: higher = better, 0 = no violations.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterChromosome {
    /// Cell genes, row-major by worker.
    pub genes: Vec<i16>,
    /// Number of workers (rows).
    pub workers: usize,
    /// Number of days (columns).
    pub days: usize,
    /// Fitness value (higher = better).
    pub fitness: f64,
}

impl Individual for RosterChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl RosterChromosome {
    /// Creates an all-rest chromosome.
    pub fn rest(workers: usize, days: usize) -> Self {
        Self {
            genes: vec![REST; workers * days],
            workers,
            days,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Creates a random chromosome.
    ///
    /// Each cell works a uniformly random eligible combination with
    /// probability `1 - rest_bias`, and rests otherwise. Locks are applied;
    /// no other repair is done.
    pub fn random<R: Rng>(problem: &RosterProblem, rest_bias: f64, rng: &mut R) -> Self {
        let mut ch = Self::rest(problem.worker_count(), problem.days());
        let work_prob = (1.0 - rest_bias).clamp(0.0, 1.0);
        for w in 0..ch.workers {
            let eligible = &problem.worker(w).eligible_combos;
            if eligible.is_empty() {
                continue;
            }
            for d in 0..ch.days {
                if rng.random::<f64>() < work_prob {
                    let k = eligible[rng.random_range(0..eligible.len())];
                    ch.genes[w * ch.days + d] = k as i16;
                }
            }
        }
        apply_locks(&mut ch, problem);
        ch
    }

    /// Gene of a cell.
    #[inline]
    pub fn gene(&self, worker: usize, day: usize) -> i16 {
        self.genes[worker * self.days + day]
    }

    /// Whether a cell is worked.
    #[inline]
    pub fn is_worked(&self, worker: usize, day: usize) -> bool {
        self.gene(worker, day) != REST
    }

    /// Worked days of a worker.
    pub fn worked_days(&self, worker: usize) -> usize {
        (0..self.days).filter(|&d| self.is_worked(worker, d)).count()
    }

    /// Cells as optional combination indices.
    pub fn to_cells(&self) -> Vec<Option<usize>> {
        self.genes
            .iter()
            .map(|&g| if g == REST { None } else { Some(g as usize) })
            .collect()
    }
}

/// Uniform crossover: each cell is taken from either parent with equal odds.
pub fn uniform_crossover<R: Rng>(
    p1: &RosterChromosome,
    p2: &RosterChromosome,
    rng: &mut R,
) -> RosterChromosome {
    let genes = p1
        .genes
        .iter()
        .zip(&p2.genes)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect();
    RosterChromosome {
        genes,
        workers: p1.workers,
        days: p1.days,
        fitness: f64::NEG_INFINITY,
    }
}

/// Cell mutation: each cell is re-drawn with probability `rate`.
///
/// A re-drawn cell becomes rest or one of the worker's eligible
/// combinations, uniformly.
pub fn cell_mutation<R: Rng>(
    ch: &mut RosterChromosome,
    problem: &RosterProblem,
    rate: f64,
    rng: &mut R,
) {
    if rate <= 0.0 {
        return;
    }
    for w in 0..ch.workers {
        let eligible = &problem.worker(w).eligible_combos;
        for d in 0..ch.days {
            if rng.random::<f64>() < rate {
                let pick = rng.random_range(0..=eligible.len());
                ch.genes[w * ch.days + d] = if pick == eligible.len() {
                    REST
                } else {
                    eligible[pick] as i16
                };
            }
        }
    }
}

/// Forces every locked cell to its locked value.
pub fn apply_locks(ch: &mut RosterChromosome, problem: &RosterProblem) {
    for w in 0..ch.workers {
        for d in 0..ch.days {
            if let Some(lock) = problem.lock_of(w, d) {
                ch.genes[w * ch.days + d] = lock.combo().map_or(REST, |k| k as i16);
            }
        }
    }
}

/// Rests cells that leave too little rest after the previous day's shift.
///
/// The later cell is rested unless locked; then the earlier one, unless
/// locked too.
pub fn repair_rest(ch: &mut RosterChromosome, problem: &RosterProblem) {
    let days = ch.days;
    for w in 0..ch.workers {
        for d in 1..days {
            let prev = ch.genes[w * days + d - 1];
            let cur = ch.genes[w * days + d];
            if prev == REST || cur == REST {
                continue;
            }
            let (s_prev, _) = problem.split_combo(prev as usize);
            let (s_cur, _) = problem.split_combo(cur as usize);
            if problem.rest_allows(s_prev, s_cur) {
                continue;
            }
            if problem.lock_of(w, d).is_none() {
                ch.genes[w * days + d] = REST;
            } else if problem.lock_of(w, d - 1).is_none() {
                ch.genes[w * days + d - 1] = REST;
            }
        }
    }
}

/// Breaks runs longer than `maxConsecutiveDays`.
///
/// The offending cell is rested; if it is locked, the latest unlocked
/// cell of the run is rested instead. Runs made entirely of locked cells
/// are kept.
pub fn repair_run_length(ch: &mut RosterChromosome, problem: &RosterProblem) {
    let days = ch.days;
    let max = problem.rules().max_consecutive_days as usize;
    for w in 0..ch.workers {
        let mut run = 0usize;
        for d in 0..days {
            if ch.genes[w * days + d] == REST {
                run = 0;
                continue;
            }
            run += 1;
            if run <= max {
                continue;
            }
            if problem.lock_of(w, d).is_none() {
                ch.genes[w * days + d] = REST;
                run = 0;
            } else if let Some(j) = (d + 1 - run..d)
                .rev()
                .find(|&j| problem.lock_of(w, j).is_none())
            {
                ch.genes[w * days + j] = REST;
                run = d - j;
            }
        }
    }
}

/// Rests random unlocked working cells until each worker is within capacity.
pub fn repair_capacity<R: Rng>(ch: &mut RosterChromosome, problem: &RosterProblem, rng: &mut R) {
    let days = ch.days;
    for w in 0..ch.workers {
        let cap = problem.capacity_of(w) as usize;
        let mut worked = ch.worked_days(w);
        if worked <= cap {
            continue;
        }
        let mut free: Vec<usize> = (0..days)
            .filter(|&d| ch.genes[w * days + d] != REST && problem.lock_of(w, d).is_none())
            .collect();
        while worked > cap && !free.is_empty() {
            let d = free.swap_remove(rng.random_range(0..free.len()));
            ch.genes[w * days + d] = REST;
            worked -= 1;
        }
    }
}

/// Applies locks and all legality repairs.
pub fn legalize<R: Rng>(ch: &mut RosterChromosome, problem: &RosterProblem, rng: &mut R) {
    apply_locks(ch, problem);
    repair_rest(ch, problem);
    repair_run_length(ch, problem);
    repair_capacity(ch, problem, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        GlobalRules, QualificationGroup, RosterConfig, ShiftPeriod, Worker,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn make_problem(rules: GlobalRules, workers: Vec<Worker>, days: u32) -> RosterProblem {
        let mut cfg = RosterConfig::new(days)
            .with_shift(ShiftPeriod::new("morning", 420, 900))
            .with_shift(ShiftPeriod::new("night", 1380, 420))
            .with_area("triage")
            .with_area("resus")
            .with_group(QualificationGroup::new("senior").with_areas(["triage", "resus"]))
            .with_group(QualificationGroup::new("junior").with_areas(["triage"]))
            .with_rules(rules);
        for w in workers {
            cfg = cfg.with_worker(w);
        }
        RosterProblem::new(&cfg).unwrap()
    }

    fn all_morning(problem: &RosterProblem) -> RosterChromosome {
        let mut ch = RosterChromosome::rest(problem.worker_count(), problem.days());
        ch.genes.fill(problem.combo(0, 0) as i16);
        ch
    }

    #[test]
    fn test_random_respects_eligibility() {
        let p = make_problem(
            GlobalRules::default(),
            vec![
                Worker::new("W1", "junior", 30).with_allowed_shifts(["morning"]),
                Worker::new("W2", "senior", 30),
            ],
            20,
        );
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = RosterChromosome::random(&p, 0.0, &mut rng);
        for d in 0..20 {
            assert_eq!(ch.gene(0, d), p.combo(0, 0) as i16);
            assert!(ch.is_worked(1, d));
        }
    }

    #[test]
    fn test_full_rest_bias_gives_all_rest() {
        let p = make_problem(GlobalRules::default(), vec![Worker::new("W1", "senior", 9)], 9);
        let mut rng = SmallRng::seed_from_u64(1);
        let ch = RosterChromosome::random(&p, 1.0, &mut rng);
        assert!(ch.genes.iter().all(|&g| g == REST));
    }

    #[test]
    fn test_random_applies_locks() {
        let p = make_problem(
            GlobalRules::default(),
            vec![Worker::new("W1", "senior", 9)
                .with_fixed_rest(2)
                .with_fixed_work(4, "night", "resus")],
            6,
        );
        let mut rng = SmallRng::seed_from_u64(7);
        let ch = RosterChromosome::random(&p, 0.0, &mut rng);
        assert_eq!(ch.gene(0, 2), REST);
        assert_eq!(ch.gene(0, 4), p.combo(1, 1) as i16);
    }

    #[test]
    fn test_uniform_crossover_takes_parent_genes() {
        let p = make_problem(GlobalRules::default(), vec![Worker::new("W1", "senior", 9)], 9);
        let a = RosterChromosome::rest(1, 9);
        let b = all_morning(&p);
        let mut rng = SmallRng::seed_from_u64(3);
        let child = uniform_crossover(&a, &b, &mut rng);
        assert_eq!(child.genes.len(), 9);
        assert!(child
            .genes
            .iter()
            .all(|&g| g == REST || g == p.combo(0, 0) as i16));
    }

    #[test]
    fn test_zero_mutation_rate_is_identity() {
        let p = make_problem(GlobalRules::default(), vec![Worker::new("W1", "senior", 9)], 9);
        let mut ch = all_morning(&p);
        let before = ch.clone();
        let mut rng = SmallRng::seed_from_u64(3);
        cell_mutation(&mut ch, &p, 0.0, &mut rng);
        assert_eq!(ch, before);
    }

    #[test]
    fn test_mutation_stays_eligible() {
        let p = make_problem(
            GlobalRules::default(),
            vec![Worker::new("W1", "junior", 30).with_allowed_shifts(["night"])],
            30,
        );
        let mut ch = RosterChromosome::rest(1, 30);
        let mut rng = SmallRng::seed_from_u64(11);
        cell_mutation(&mut ch, &p, 1.0, &mut rng);
        let night_triage = p.combo(1, 0) as i16;
        assert!(ch.genes.iter().all(|&g| g == REST || g == night_triage));
        assert!(ch.genes.iter().any(|&g| g == night_triage));
    }

    #[test]
    fn test_repair_run_length() {
        let p = make_problem(
            GlobalRules::default().with_max_consecutive_days(3),
            vec![Worker::new("W1", "senior", 30)],
            10,
        );
        let mut ch = all_morning(&p);
        repair_run_length(&mut ch, &p);
        let mut run = 0;
        for d in 0..10 {
            run = if ch.is_worked(0, d) { run + 1 } else { 0 };
            assert!(run <= 3);
        }
        // W W W R W W W R W W
        assert_eq!(ch.worked_days(0), 8);
    }

    #[test]
    fn test_repair_run_length_spares_locked_cell() {
        let p = make_problem(
            GlobalRules::default().with_max_consecutive_days(2),
            vec![Worker::new("W1", "senior", 30).with_fixed_work(2, "morning", "triage")],
            4,
        );
        let mut ch = all_morning(&p);
        ch.genes[3] = REST;
        repair_run_length(&mut ch, &p);
        assert!(ch.is_worked(0, 2));
        assert!(!ch.is_worked(0, 1));
        assert!(ch.is_worked(0, 0));
    }

    #[test]
    fn test_repair_rest() {
        let p = make_problem(
            GlobalRules::default().with_min_rest_hours(11),
            vec![Worker::new("W1", "senior", 30)],
            2,
        );
        let mut ch = RosterChromosome::rest(1, 2);
        ch.genes[0] = p.combo(1, 0) as i16; // night
        ch.genes[1] = p.combo(0, 0) as i16; // morning next day: 0h rest
        repair_rest(&mut ch, &p);
        assert!(ch.is_worked(0, 0));
        assert!(!ch.is_worked(0, 1));
    }

    #[test]
    fn test_repair_rest_keeps_locked_later_cell() {
        let p = make_problem(
            GlobalRules::default().with_min_rest_hours(11),
            vec![Worker::new("W1", "senior", 30).with_fixed_work(1, "morning", "triage")],
            2,
        );
        let mut ch = RosterChromosome::rest(1, 2);
        ch.genes[0] = p.combo(1, 0) as i16;
        ch.genes[1] = p.combo(0, 0) as i16;
        repair_rest(&mut ch, &p);
        assert!(!ch.is_worked(0, 0));
        assert!(ch.is_worked(0, 1));
    }

    #[test]
    fn test_repair_capacity() {
        let p = make_problem(
            GlobalRules::default(),
            vec![Worker::new("W1", "senior", 4).with_fixed_work(0, "morning", "triage")],
            10,
        );
        let mut ch = all_morning(&p);
        let mut rng = SmallRng::seed_from_u64(5);
        repair_capacity(&mut ch, &p, &mut rng);
        assert_eq!(ch.worked_days(0), 4);
        assert!(ch.is_worked(0, 0));
    }

    #[test]
    fn test_to_cells() {
        let p = make_problem(GlobalRules::default(), vec![Worker::new("W1", "senior", 9)], 2);
        let mut ch = RosterChromosome::rest(1, 2);
        ch.genes[1] = p.combo(1, 1) as i16;
        assert_eq!(ch.to_cells(), vec![None, Some(p.combo(1, 1))]);
    }
}
