//! Generational driver.
//!
//! [`GenerationalRunner`] replaces the whole population every cycle:
//! elites are carried over, then parents are drawn by the configured
//! selection strategy, recombined, mutated and appended until the new
//! population reaches `population_size`.

use super::config::GenerationalConfig;
use super::population;
use super::result::{OptimizationResult, Snapshot, StopReason};
use super::types::{GaProblem, Individual};
use crate::error::Result;
use crate::random::{create_rng, resolve_seed};
use rand::rngs::StdRng;
use rand::Rng;

/// Executes the generational evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_beamga::ga::{GenerationalConfig, GenerationalRunner};
/// use u_beamga::problem::{BeamProblem, Scenario};
///
/// let problem = BeamProblem::new(Scenario::default().with_antenna_count(4)).unwrap();
/// let config = GenerationalConfig::default()
///     .with_population_size(10)
///     .with_max_generations(5)
///     .with_seed(42);
/// let result = GenerationalRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.cycles, 5);
/// ```
pub struct GenerationalRunner<'a, P: GaProblem> {
    problem: &'a P,
    config: GenerationalConfig,
    rng: StdRng,
    population: Vec<P::Individual>,
    best: P::Individual,
    best_fitness: f64,
    cycle: usize,
    evaluations: usize,
    stagnation_counter: usize,
    history: Vec<Snapshot>,
    stop_reason: Option<StopReason>,
}

impl<'a, P: GaProblem> GenerationalRunner<'a, P> {
    /// Validates `config`, then creates and evaluates a random population.
    pub fn new(problem: &'a P, config: GenerationalConfig) -> Result<Self> {
        config.validate()?;
        let seed = resolve_seed(config.ga.seed);
        let mut rng = create_rng(seed);
        let population = population::initialize(problem, config.ga.population_size, &mut rng);
        let evaluations = population.len();
        Ok(Self::start(problem, config, rng, seed, population, evaluations))
    }

    /// Validates `config` and starts from a caller-supplied population.
    ///
    /// The population must match `population_size`; every individual is
    /// re-evaluated against `problem`.
    pub fn with_population(
        problem: &'a P,
        config: GenerationalConfig,
        population: Vec<P::Individual>,
    ) -> Result<Self> {
        config.validate()?;
        let seed = resolve_seed(config.ga.seed);
        let rng = create_rng(seed);
        let (population, evaluations) =
            population::adopt(problem, population, config.ga.population_size)?;
        Ok(Self::start(problem, config, rng, seed, population, evaluations))
    }

    fn start(
        problem: &'a P,
        config: GenerationalConfig,
        rng: StdRng,
        seed: u64,
        population: Vec<P::Individual>,
        evaluations: usize,
    ) -> Self {
        let best = population[population::best_index(&population)].clone();
        let best_fitness = best.fitness_or_worst();

        tracing::info!(
            seed,
            population_size = config.ga.population_size,
            max_generations = config.max_generations,
            elite_count = config.elite_count(),
            initial_best = best_fitness,
            "generational run started"
        );

        let mut runner = Self {
            problem,
            config,
            rng,
            population,
            best,
            best_fitness,
            cycle: 0,
            evaluations,
            stagnation_counter: 0,
            history: Vec::new(),
            stop_reason: None,
        };
        runner.record_snapshot();
        runner
    }

    /// Runs one full generation.
    ///
    /// Returns the stop reason once the run is over. Further calls after
    /// that leave the population untouched.
    pub fn step(&mut self) -> Option<StopReason> {
        if self.stop_reason.is_some() {
            return self.stop_reason;
        }

        let n = self.config.ga.population_size;
        let elite_count = self.config.elite_count();

        // Elites survive one more cycle
        let mut next_gen: Vec<P::Individual> = Vec::with_capacity(n + 1);
        for &idx in population::indices_best_first(&self.population)
            .iter()
            .take(elite_count)
        {
            let mut elite = self.population[idx].clone();
            elite.grow_older();
            next_gen.push(elite);
        }

        while next_gen.len() < n {
            let p1 = self.config.ga.selection.select(&self.population, &mut self.rng);
            let p2 = self.config.ga.selection.select(&self.population, &mut self.rng);

            let (c1, c2) = if self.rng.random::<f64>() < self.config.ga.crossover_rate {
                self.problem
                    .crossover(&self.population[p1], &self.population[p2], &mut self.rng)
            } else {
                (self.population[p1].clone(), self.population[p2].clone())
            };

            for mut child in [c1, c2] {
                self.problem
                    .mutate(&mut child, self.config.ga.mutation_rate, &mut self.rng);
                child.invalidate_fitness();
                child.reset_age();
                next_gen.push(child);
            }
        }
        // An odd number of open slots leaves one surplus child
        next_gen.truncate(n);

        self.evaluations += population::evaluate_missing(self.problem, &mut next_gen);
        self.population = next_gen;
        self.cycle += 1;

        if self.update_best() {
            self.stagnation_counter = 0;
        } else {
            self.stagnation_counter += 1;
        }

        if self.config.stagnation_limit > 0
            && self.stagnation_counter >= self.config.stagnation_limit
        {
            tracing::info!(
                cycle = self.cycle,
                best_fitness = self.best_fitness,
                "stopping on stagnation"
            );
            self.stop_reason = Some(StopReason::Stagnation);
        } else if self.cycle >= self.config.max_generations {
            self.stop_reason = Some(StopReason::MaxGenerations);
        }

        if self.stop_reason.is_some() || self.cycle % self.config.ga.snapshot_interval == 0 {
            self.record_snapshot();
        }
        self.stop_reason
    }

    /// Steps until a stopping criterion fires and returns the result.
    pub fn run_to_completion(mut self) -> OptimizationResult<P::Individual> {
        let stop_reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };

        tracing::info!(
            cycles = self.cycle,
            evaluations = self.evaluations,
            best_fitness = self.best_fitness,
            ?stop_reason,
            "generational run finished"
        );

        OptimizationResult {
            best: self.best,
            best_fitness: self.best_fitness,
            cycles: self.cycle,
            evaluations: self.evaluations,
            restarts: 0,
            stop_reason,
            history: self.history,
            final_population: self.population,
        }
    }

    /// Runs a complete generational optimization.
    ///
    /// Fails only if `config` does not validate; no cycle runs in that case.
    pub fn run(
        problem: &'a P,
        config: &GenerationalConfig,
    ) -> Result<OptimizationResult<P::Individual>> {
        Ok(Self::new(problem, config.clone())?.run_to_completion())
    }

    /// Current population.
    pub fn population(&self) -> &[P::Individual] {
        &self.population
    }

    /// Best individual seen so far.
    pub fn best(&self) -> &P::Individual {
        &self.best
    }

    /// Fitness of [`best`](Self::best).
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Generations completed.
    pub fn cycles(&self) -> usize {
        self.cycle
    }

    /// Fitness evaluations performed, initial population included.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Snapshots recorded so far.
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    fn update_best(&mut self) -> bool {
        let idx = population::best_index(&self.population);
        let fitness = self.population[idx].fitness_or_worst();
        if fitness > self.best_fitness {
            self.best = self.population[idx].clone();
            self.best_fitness = fitness;
            true
        } else {
            false
        }
    }

    fn record_snapshot(&mut self) {
        let snapshot = population::snapshot(
            self.problem,
            &self.population,
            self.cycle,
            self.evaluations,
            self.best_fitness,
        );
        tracing::debug!(
            cycle = snapshot.cycle,
            best = snapshot.best_fitness,
            average = snapshot.average_fitness,
            diversity = snapshot.diversity,
            "generation snapshot"
        );
        self.problem.on_snapshot(&snapshot);
        self.history.push(snapshot);
    }
}

// ============================================================================
// Tests
// ============================================================================
