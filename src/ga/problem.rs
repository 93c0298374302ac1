//! Roster GA problem definition.
//!
//! Implements [`GaProblem`] for the worker × day chromosome.
//! Bridges the resolved [`RosterProblem`] to the generic runner.
//!
//! # Fitness
//!
//! Fitness is the negated sum of weighted penalties (`s` = penalty scale):
//!
//! | Term | Weight |
//! |------|--------|
//! | Capacity overflow (days) | `s` |
//! | Shift-total band violation (heads) | `s` |
//! | Duty-area shortfall (heads) | `2s` |
//! | Run-length windows fully worked | `4s` |
//! | Rest-interval violations | `4s` |
//! | Variance of per-worker assigned days | balance weight |

use rand::Rng;

use super::chromosome::{
    cell_mutation, legalize, uniform_crossover, RosterChromosome, REST,
};
use super::runner::{GaConfig, GaProblem};
use crate::problem::RosterProblem;

/// Duty-area shortfall weight relative to the penalty scale.
pub const COVERAGE_FACTOR: f64 = 2.0;
/// Run-length and rest weight relative to the penalty scale.
pub const LEGALITY_FACTOR: f64 = 4.0;

/// Aggregates of a decoded chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRoster {
    /// Assigned days per worker.
    pub per_worker: Vec<u32>,
    /// Headcount per (day, shift): `day * shifts + shift`.
    pub per_shift: Vec<u32>,
    /// Headcount per slot, indexed like [`RosterProblem::slot`].
    pub per_slot: Vec<u32>,
}

/// Unweighted violation counts of a chromosome.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PenaltyBreakdown {
    /// Σ max(0, assigned − capacity).
    pub capacity_overflow: u64,
    /// Σ band under- and over-staffing per (day, shift).
    pub band_violation: u64,
    /// Σ max(0, required − assigned) per slot.
    pub coverage_shortfall: u64,
    /// Windows of `maxConsecutive + 1` days fully worked.
    pub run_length_windows: u64,
    /// Adjacent worked days with too little rest.
    pub rest_violations: u64,
    /// Population variance of per-worker assigned days.
    pub load_variance: f64,
}

/// GA problem definition for roster optimization.
///
/// # Example
/// ```
/// use u_roster::demo;
/// use u_roster::ga::{GaConfig, GaRunner, RosterGaProblem};
/// use u_roster::problem::RosterProblem;
///
/// let config = demo::emergency_department(12, 7);
/// let problem = RosterProblem::new(&config).unwrap();
/// let ga = GaConfig::default()
///     .with_population_size(10)
///     .with_generations(5)
///     .with_parallel(false);
/// let ga_problem = RosterGaProblem::new(&problem, &ga);
/// let result = GaRunner::run(&ga_problem, &ga);
/// assert!(result.best_fitness <= 0.0);
/// ```
pub struct RosterGaProblem<'a> {
    problem: &'a RosterProblem,
    rest_bias: f64,
    mutation_rate: f64,
    penalty_scale: f64,
    balance_weight: f64,
}

impl<'a> RosterGaProblem<'a> {
    /// Creates a GA problem over a resolved roster problem.
    pub fn new(problem: &'a RosterProblem, config: &GaConfig) -> Self {
        Self {
            problem,
            rest_bias: config.rest_bias,
            mutation_rate: config.mutation_rate,
            penalty_scale: config.penalty_scale,
            balance_weight: config.balance_weight,
        }
    }

    /// The underlying roster problem.
    pub fn problem(&self) -> &RosterProblem {
        self.problem
    }

    /// Computes headcounts and per-worker totals.
    pub fn decode(&self, ch: &RosterChromosome) -> DecodedRoster {
        let p = self.problem;
        let (shifts, areas) = (p.shift_count(), p.area_count());
        let mut per_worker = vec![0u32; ch.workers];
        let mut per_shift = vec![0u32; p.days() * shifts];
        let mut per_slot = vec![0u32; p.days() * shifts * areas];

        for w in 0..ch.workers {
            for d in 0..ch.days {
                let g = ch.gene(w, d);
                if g == REST {
                    continue;
                }
                let (s, a) = p.split_combo(g as usize);
                per_worker[w] += 1;
                per_shift[d * shifts + s] += 1;
                per_slot[p.slot(d, s, a)] += 1;
            }
        }

        DecodedRoster {
            per_worker,
            per_shift,
            per_slot,
        }
    }

    /// Counts every penalized violation.
    pub fn breakdown(&self, ch: &RosterChromosome) -> PenaltyBreakdown {
        let p = self.problem;
        let rules = p.rules();
        let decoded = self.decode(ch);

        let capacity_overflow = decoded
            .per_worker
            .iter()
            .enumerate()
            .map(|(w, &n)| n.saturating_sub(p.capacity_of(w)) as u64)
            .sum();

        let min_total = rules.min_headcount_per_shift as u64;
        let max_total = rules.max_headcount_per_shift as u64;
        let band_violation = decoded
            .per_shift
            .iter()
            .map(|&t| {
                let t = t as u64;
                min_total.saturating_sub(t) + t.saturating_sub(max_total)
            })
            .sum();

        let mut coverage_shortfall = 0u64;
        for d in 0..p.days() {
            for s in 0..p.shift_count() {
                for a in 0..p.area_count() {
                    let slot = p.slot(d, s, a);
                    coverage_shortfall +=
                        p.required(d, s, a).saturating_sub(decoded.per_slot[slot]) as u64;
                }
            }
        }

        let window = rules.max_consecutive_days as usize + 1;
        let mut run_length_windows = 0u64;
        let mut rest_violations = 0u64;
        for w in 0..ch.workers {
            let mut run = 0usize;
            for d in 0..ch.days {
                if ch.is_worked(w, d) {
                    run += 1;
                    if run >= window {
                        run_length_windows += 1;
                    }
                } else {
                    run = 0;
                }
                if d > 0 && ch.is_worked(w, d) && ch.is_worked(w, d - 1) {
                    let (s_prev, _) = p.split_combo(ch.gene(w, d - 1) as usize);
                    let (s_cur, _) = p.split_combo(ch.gene(w, d) as usize);
                    if !p.rest_allows(s_prev, s_cur) {
                        rest_violations += 1;
                    }
                }
            }
        }

        PenaltyBreakdown {
            capacity_overflow,
            band_violation,
            coverage_shortfall,
            run_length_windows,
            rest_violations,
            load_variance: variance(&decoded.per_worker),
        }
    }

    /// Weighted penalty (≥ 0).
    pub fn penalty(&self, ch: &RosterChromosome) -> f64 {
        let b = self.breakdown(ch);
        let s = self.penalty_scale;
        b.capacity_overflow as f64 * s
            + b.band_violation as f64 * s
            + b.coverage_shortfall as f64 * s * COVERAGE_FACTOR
            + (b.run_length_windows + b.rest_violations) as f64 * s * LEGALITY_FACTOR
            + b.load_variance * self.balance_weight
    }
}

impl GaProblem for RosterGaProblem<'_> {
    type Individual = RosterChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> RosterChromosome {
        let mut ch = RosterChromosome::random(self.problem, self.rest_bias, rng);
        legalize(&mut ch, self.problem, rng);
        ch
    }

    fn evaluate(&self, individual: &RosterChromosome) -> f64 {
        -self.penalty(individual)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &RosterChromosome,
        parent2: &RosterChromosome,
        rng: &mut R,
    ) -> RosterChromosome {
        uniform_crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut RosterChromosome, rng: &mut R) {
        cell_mutation(individual, self.problem, self.mutation_rate, rng);
    }

    fn repair<R: Rng>(&self, individual: &mut RosterChromosome, rng: &mut R) {
        legalize(individual, self.problem, rng);
    }
}

/// Population variance (ddof = 0).
fn variance(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CoverageRequirement, GlobalRules, QualificationGroup, RosterConfig, ShiftPeriod, Worker,
    };
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn make_problem(rules: GlobalRules, coverage: CoverageRequirement) -> RosterProblem {
        let cfg = RosterConfig::new(4)
            .with_shift(ShiftPeriod::new("morning", 420, 900))
            .with_shift(ShiftPeriod::new("night", 1380, 420))
            .with_area("triage")
            .with_area("resus")
            .with_group(QualificationGroup::new("senior").with_areas(["triage", "resus"]))
            .with_worker(Worker::new("W1", "senior", 2))
            .with_worker(Worker::new("W2", "senior", 4))
            .with_coverage(coverage)
            .with_rules(rules);
        RosterProblem::new(&cfg).unwrap()
    }

    #[test]
    fn test_variance() {
        assert!((variance(&[2, 4]) - 1.0).abs() < 1e-10);
        assert!((variance(&[3, 3, 3]) - 0.0).abs() < 1e-10);
        assert!((variance(&[]) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_all_rest_is_free_without_demand() {
        let p = make_problem(GlobalRules::default(), CoverageRequirement::new());
        let ga = RosterGaProblem::new(&p, &GaConfig::default());
        let ch = RosterChromosome::rest(2, 4);
        assert_eq!(ga.breakdown(&ch), PenaltyBreakdown::default());
        assert_eq!(ga.evaluate(&ch), 0.0);
    }

    #[test]
    fn test_decode_counts() {
        let p = make_problem(GlobalRules::default(), CoverageRequirement::new());
        let ga = RosterGaProblem::new(&p, &GaConfig::default());
        let mut ch = RosterChromosome::rest(2, 4);
        ch.genes[0] = p.combo(0, 1) as i16; // W1 day 0 morning resus
        ch.genes[4] = p.combo(0, 0) as i16; // W2 day 0 morning triage
        ch.genes[5] = p.combo(1, 0) as i16; // W2 day 1 night triage
        let dec = ga.decode(&ch);
        assert_eq!(dec.per_worker, vec![1, 2]);
        assert_eq!(dec.per_shift[0], 2);
        assert_eq!(dec.per_shift[3], 1);
        assert_eq!(dec.per_slot[p.slot(0, 0, 1)], 1);
        assert_eq!(dec.per_slot[p.slot(1, 1, 0)], 1);
    }

    #[test]
    fn test_penalty_terms() {
        let p = make_problem(
            GlobalRules::default()
                .with_max_consecutive_days(2)
                .with_min_rest_hours(11)
                .with_headcount_band(1, 1),
            CoverageRequirement::new().with(0, "morning", "triage", 2),
        );
        let config = GaConfig::default().with_penalty_scale(10.0).with_balance_weight(0.0);
        let ga = RosterGaProblem::new(&p, &config);

        // W1 works night every day: 4 days > cap 2, 2 full windows of 3,
        // night → night leaves 16h rest (ok).
        let mut ch = RosterChromosome::rest(2, 4);
        for d in 0..4 {
            ch.genes[d] = p.combo(1, 0) as i16;
        }
        let b = ga.breakdown(&ch);
        assert_eq!(b.capacity_overflow, 2);
        assert_eq!(b.run_length_windows, 2);
        assert_eq!(b.rest_violations, 0);
        // morning totals 0 on 4 days → 4 under; night totals 1 → in band
        assert_eq!(b.band_violation, 4);
        assert_eq!(b.coverage_shortfall, 2);

        let expected = 2.0 * 10.0 + 4.0 * 10.0 + 2.0 * 10.0 * COVERAGE_FACTOR
            + 2.0 * 10.0 * LEGALITY_FACTOR;
        assert!((ga.penalty(&ch) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_rest_violation_counted() {
        let p = make_problem(
            GlobalRules::default().with_min_rest_hours(11),
            CoverageRequirement::new(),
        );
        let ga = RosterGaProblem::new(&p, &GaConfig::default());
        let mut ch = RosterChromosome::rest(2, 4);
        ch.genes[4] = p.combo(1, 0) as i16; // W2 night day 0
        ch.genes[5] = p.combo(0, 0) as i16; // W2 morning day 1
        assert_eq!(ga.breakdown(&ch).rest_violations, 1);
    }

    #[test]
    fn test_created_individuals_are_legal() {
        let p = make_problem(
            GlobalRules::default()
                .with_max_consecutive_days(2)
                .with_min_rest_hours(11),
            CoverageRequirement::new(),
        );
        let config = GaConfig::default().with_rest_bias(0.0);
        let ga = RosterGaProblem::new(&p, &config);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let ch = ga.create_individual(&mut rng);
            let b = ga.breakdown(&ch);
            assert_eq!(b.capacity_overflow, 0);
            assert_eq!(b.run_length_windows, 0);
            assert_eq!(b.rest_violations, 0);
        }
    }
}
