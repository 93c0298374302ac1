//! Generational GA runner with elitism.
//!
//! # Algorithm
//!
//! 1. Create `population_size` individuals.
//! 2. For each generation:
//!    - rank the population by fitness (descending),
//!    - copy the top `elite_fraction` unchanged,
//!    - fill the rest with children: two parents drawn uniformly from the
//!      ranked population, crossover, mutation, repair,
//!    - evaluate the new individuals (in parallel if enabled).
//! 3. Return the best individual of the final population.
//!
//! Elites survive unchanged and fitness is deterministic, so the final
//! best is also the best individual seen during the run.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//! Machine Learning", Ch. 3 (elitist generational replacement)

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::validation::{ConfigurationError, ConfigurationErrorKind};

/// A GA individual with a cached fitness (higher = better).
pub trait Individual: Clone + Send {
    /// Cached fitness.
    fn fitness(&self) -> f64;

    /// Stores the fitness.
    fn set_fitness(&mut self, fitness: f64);
}

/// Problem definition consumed by [`GaRunner`].
pub trait GaProblem: Sync {
    /// Individual type.
    type Individual: Individual;

    /// Creates a random, repaired individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Fitness of an individual (higher = better).
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces one child from two parents.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> Self::Individual;

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);

    /// Restores hard rules (locks, legality) after variation.
    fn repair<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}

/// GA parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GaConfig {
    /// Number of generations.
    pub generations: usize,
    /// Population size.
    pub population_size: usize,
    /// Per-cell re-draw probability.
    pub mutation_rate: f64,
    /// Probability that a random cell rests.
    pub rest_bias: f64,
    /// Fraction of the population copied unchanged (at least one).
    pub elite_fraction: f64,
    /// RNG seed.
    pub seed: u64,
    /// Evaluate fitness on the rayon thread pool.
    pub parallel: bool,
    /// Penalty per unit of rule violation.
    pub penalty_scale: f64,
    /// Weight of the workload variance term.
    pub balance_weight: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            generations: 120,
            population_size: 40,
            mutation_rate: 0.03,
            rest_bias: 0.6,
            elite_fraction: 0.15,
            seed: 42,
            parallel: true,
            penalty_scale: 50.0,
            balance_weight: 1.0,
        }
    }
}

impl GaConfig {
    /// Sets the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the rest bias.
    pub fn with_rest_bias(mut self, bias: f64) -> Self {
        self.rest_bias = bias;
        self
    }

    /// Sets the elite fraction.
    pub fn with_elite_fraction(mut self, fraction: f64) -> Self {
        self.elite_fraction = fraction;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the penalty scale.
    pub fn with_penalty_scale(mut self, scale: f64) -> Self {
        self.penalty_scale = scale;
        self
    }

    /// Sets the balance weight.
    pub fn with_balance_weight(mut self, weight: f64) -> Self {
        self.balance_weight = weight;
        self
    }

    /// Number of elites kept per generation.
    pub fn elite_count(&self) -> usize {
        ((self.elite_fraction * self.population_size as f64) as usize)
            .max(1)
            .min(self.population_size)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), Vec<ConfigurationError>> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, message: String| {
            if !ok {
                errors.push(ConfigurationError::new(
                    ConfigurationErrorKind::InvalidParameter,
                    message,
                ));
            }
        };
        check(
            self.population_size >= 2,
            format!("populationSize must be at least 2 (got {})", self.population_size),
        );
        check(
            (0.0..=1.0).contains(&self.mutation_rate),
            format!("mutationRate must be in [0, 1] (got {})", self.mutation_rate),
        );
        check(
            (0.0..=1.0).contains(&self.rest_bias),
            format!("restBias must be in [0, 1] (got {})", self.rest_bias),
        );
        check(
            (0.0..=1.0).contains(&self.elite_fraction),
            format!("eliteFraction must be in [0, 1] (got {})", self.elite_fraction),
        );
        check(
            self.penalty_scale >= 0.0 && self.balance_weight >= 0.0,
            "penalty weights must be non-negative".to_string(),
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Per-generation statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Generation number (1-based).
    pub generation: usize,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub mean_fitness: f64,
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual of the final population.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations completed.
    pub generations: usize,
    /// Best fitness after initialization and after each generation.
    pub history: Vec<f64>,
}

/// Runs a [`GaProblem`] under a [`GaConfig`].
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> GaResult<P::Individual> {
        Self::run_with_observer(problem, config, |_| {})
    }

    /// Runs the GA, calling `observer` after every generation.
    pub fn run_with_observer<P, F>(
        problem: &P,
        config: &GaConfig,
        mut observer: F,
    ) -> GaResult<P::Individual>
    where
        P: GaProblem,
        F: FnMut(GenerationStats),
    {
        let pop_size = config.population_size.max(1);
        let elite_k = config.elite_count().max(1).min(pop_size);
        let mut rng = SmallRng::seed_from_u64(config.seed);

        info!(
            population = pop_size,
            generations = config.generations,
            elites = elite_k,
            seed = config.seed,
            "starting GA"
        );

        let mut population: Vec<P::Individual> = (0..pop_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect();
        evaluate(problem, &mut population, config.parallel);

        let mut history = Vec::with_capacity(config.generations + 1);
        history.push(best_of(&population).1);

        for generation in 1..=config.generations {
            population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

            let mut next: Vec<P::Individual> = population[..elite_k].to_vec();
            while next.len() < pop_size {
                let i = rng.random_range(0..pop_size);
                let j = rng.random_range(0..pop_size);
                let mut child = problem.crossover(&population[i], &population[j], &mut rng);
                problem.mutate(&mut child, &mut rng);
                problem.repair(&mut child, &mut rng);
                next.push(child);
            }
            evaluate(problem, &mut next[elite_k..], config.parallel);
            population = next;

            let (_, best) = best_of(&population);
            let mean =
                population.iter().map(|x| x.fitness()).sum::<f64>() / population.len() as f64;
            history.push(best);
            debug!(generation, best, mean, "GA generation");
            observer(GenerationStats {
                generation,
                best_fitness: best,
                mean_fitness: mean,
            });
        }

        let (idx, best_fitness) = best_of(&population);
        let best = population.swap_remove(idx);
        info!(best_fitness, "GA finished");

        GaResult {
            best,
            best_fitness,
            generations: config.generations,
            history,
        }
    }
}

fn evaluate<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], parallel: bool) {
    if parallel {
        individuals.par_iter_mut().for_each(|ind| {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        });
    } else {
        for ind in individuals.iter_mut() {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        }
    }
}

/// Index and fitness of the best individual (first on ties).
fn best_of<I: Individual>(population: &[I]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, ind) in population.iter().enumerate() {
        if ind.fitness() > best.1 {
            best = (i, ind.fitness());
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maximize the number of ones in a bit string.
    struct OneMax {
        len: usize,
    }

    #[derive(Clone)]
    struct Bits {
        bits: Vec<bool>,
        fitness: f64,
    }

    impl Individual for Bits {
        fn fitness(&self) -> f64 {
            self.fitness
        }
        fn set_fitness(&mut self, fitness: f64) {
            self.fitness = fitness;
        }
    }

    impl GaProblem for OneMax {
        type Individual = Bits;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> Bits {
            Bits {
                bits: (0..self.len).map(|_| rng.random_bool(0.5)).collect(),
                fitness: f64::NEG_INFINITY,
            }
        }

        fn evaluate(&self, ind: &Bits) -> f64 {
            ind.bits.iter().filter(|&&b| b).count() as f64
        }

        fn crossover<R: Rng>(&self, a: &Bits, b: &Bits, rng: &mut R) -> Bits {
            Bits {
                bits: a
                    .bits
                    .iter()
                    .zip(&b.bits)
                    .map(|(&x, &y)| if rng.random_bool(0.5) { x } else { y })
                    .collect(),
                fitness: f64::NEG_INFINITY,
            }
        }

        fn mutate<R: Rng>(&self, ind: &mut Bits, rng: &mut R) {
            for b in ind.bits.iter_mut() {
                if rng.random_bool(0.05) {
                    *b = !*b;
                }
            }
        }

        fn repair<R: Rng>(&self, _ind: &mut Bits, _rng: &mut R) {}
    }

    #[test]
    fn test_default_config() {
        let c = GaConfig::default();
        assert_eq!(c.generations, 120);
        assert_eq!(c.population_size, 40);
        assert!((c.mutation_rate - 0.03).abs() < 1e-10);
        assert!((c.rest_bias - 0.6).abs() < 1e-10);
        assert_eq!(c.elite_count(), 6);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_elite_count_at_least_one() {
        let c = GaConfig::default()
            .with_population_size(4)
            .with_elite_fraction(0.0);
        assert_eq!(c.elite_count(), 1);
    }

    #[test]
    fn test_invalid_params() {
        let c = GaConfig::default()
            .with_population_size(1)
            .with_mutation_rate(1.5)
            .with_rest_bias(-0.1);
        assert_eq!(c.validate().unwrap_err().len(), 3);
    }

    #[test]
    fn test_history_is_monotone_with_elitism() {
        let problem = OneMax { len: 32 };
        let config = GaConfig::default()
            .with_population_size(20)
            .with_generations(30)
            .with_seed(7)
            .with_parallel(false);
        let result = GaRunner::run(&problem, &config);
        assert_eq!(result.history.len(), 31);
        for w in result.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert_eq!(result.best_fitness, *result.history.last().unwrap());
        assert!(result.best_fitness > result.history[0] || result.history[0] == 32.0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let problem = OneMax { len: 24 };
        let config = GaConfig::default()
            .with_population_size(10)
            .with_generations(10)
            .with_seed(99);
        let a = GaRunner::run(&problem, &config.clone().with_parallel(false));
        let b = GaRunner::run(&problem, &config.with_parallel(true));
        assert_eq!(a.best.bits, b.best.bits);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_observer_called_each_generation() {
        let problem = OneMax { len: 8 };
        let config = GaConfig::default()
            .with_population_size(6)
            .with_generations(5)
            .with_parallel(false);
        let mut seen = Vec::new();
        GaRunner::run_with_observer(&problem, &config, |s| seen.push(s.generation));
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }
}
