//! Steady-state driver.
//!
//! [`SteadyStateRunner`] breeds a handful of children per cycle and writes
//! them over existing slots, so most of the population survives each cycle
//! untouched. The run is bounded by an evaluation budget. Two safeguards
//! sit on top of the basic loop:
//!
//! - a stagnation counter that ends the run once the running best has not
//!   improved for `stagnation_limit` cycles;
//! - a periodic diversity check that re-randomizes the worst slots when the
//!   population has collapsed.

use super::config::{Replacement, SteadyStateConfig};
use super::population;
use super::result::{OptimizationResult, Snapshot, StopReason};
use super::selection::reverse_tournament;
use super::types::{GaProblem, Individual};
use crate::error::Result;
use crate::random::{create_rng, resolve_seed};
use rand::rngs::StdRng;
use rand::Rng;

/// Executes the steady-state evolutionary loop.
///
/// The initial population is evaluated for free; every child and every
/// restart individual is charged against `max_evaluations`.
///
/// ```
/// use u_beamga::ga::{SteadyStateConfig, SteadyStateRunner};
/// use u_beamga::problem::{BeamProblem, Scenario};
///
/// let problem = BeamProblem::new(Scenario::default().with_antenna_count(4)).unwrap();
/// let config = SteadyStateConfig::default()
///     .with_population_size(10)
///     .with_max_evaluations(40)
///     .with_stagnation_limit(0)
///     .with_seed(42);
/// let result = SteadyStateRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.cycles, 20);
/// ```
pub struct SteadyStateRunner<'a, P: GaProblem> {
    problem: &'a P,
    config: SteadyStateConfig,
    rng: StdRng,
    population: Vec<P::Individual>,
    best: P::Individual,
    best_fitness: f64,
    cycle: usize,
    evaluations: usize,
    charged: usize,
    stagnation_counter: usize,
    restarts: usize,
    history: Vec<Snapshot>,
    stop_reason: Option<StopReason>,
}

impl<'a, P: GaProblem> SteadyStateRunner<'a, P> {
    /// Validates `config`, then creates and evaluates a random population.
    pub fn new(problem: &'a P, config: SteadyStateConfig) -> Result<Self> {
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
        config: SteadyStateConfig,
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
        config: SteadyStateConfig,
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
            max_evaluations = config.max_evaluations,
            offspring_size = config.offspring_size,
            replacement = config.replacement.name(),
            initial_best = best_fitness,
            "steady-state run started"
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
            charged: 0,
            stagnation_counter: 0,
            restarts: 0,
            history: Vec::new(),
            stop_reason: None,
        };
        runner.record_snapshot();
        runner
    }

    /// Runs one cycle: breed, evaluate, replace, then the periodic
    /// diversity check.
    ///
    /// Returns the stop reason once the run is over. Further calls after
    /// that leave the population untouched.
    pub fn step(&mut self) -> Option<StopReason> {
        if self.stop_reason.is_some() {
            return self.stop_reason;
        }

        let wanted = self.config.offspring_size.min(self.remaining_budget());
        let mut children = self.breed(wanted);
        self.charge(population::evaluate_missing(self.problem, &mut children));
        self.replace(children);
        self.cycle += 1;

        if self.update_best() {
            self.stagnation_counter = 0;
        } else {
            self.stagnation_counter += 1;
        }

        let interval = self.config.diversity_check_interval;
        if interval > 0 && self.cycle % interval == 0 && self.inject_diversity_if_needed() > 0 {
            // Fresh individuals may beat the running best
            if self.update_best() {
                self.stagnation_counter = 0;
            }
        }

        if self.remaining_budget() == 0 {
            self.stop_reason = Some(StopReason::BudgetExhausted);
        } else if self.config.stagnation_limit > 0
            && self.stagnation_counter >= self.config.stagnation_limit
        {
            tracing::info!(
                cycle = self.cycle,
                evaluations = self.evaluations,
                best_fitness = self.best_fitness,
                "stopping on stagnation"
            );
            self.stop_reason = Some(StopReason::Stagnation);
        }

        if self.stop_reason.is_some() || self.cycle % self.config.ga.snapshot_interval == 0 {
            self.record_snapshot();
        }
        self.stop_reason
    }

    /// Re-randomizes the worst slots if population diversity is below
    /// `diversity_threshold`.
    ///
    /// Replaces `round(population_size · restart_fraction)` slots, capped by
    /// the remaining budget, with freshly created and evaluated
    /// individuals. Returns how many slots were replaced.
    pub fn inject_diversity_if_needed(&mut self) -> usize {
        let diversity = population::diversity(self.problem, &self.population);
        if diversity >= self.config.diversity_threshold {
            return 0;
        }

        let count = self.config.restart_count().min(self.remaining_budget());
        if count == 0 {
            return 0;
        }

        let worst = population::indices_worst_first(&self.population);
        for &slot in worst.iter().take(count) {
            let mut fresh = self.problem.create_individual(&mut self.rng);
            let fitness = self.problem.evaluate(&fresh);
            fresh.set_fitness(fitness);
            self.population[slot] = fresh;
        }
        self.charge(count);
        self.restarts += 1;

        tracing::info!(
            cycle = self.cycle,
            diversity,
            replaced = count,
            restarts = self.restarts,
            "diversity below threshold, injected fresh individuals"
        );
        count
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
            restarts = self.restarts,
            best_fitness = self.best_fitness,
            ?stop_reason,
            "steady-state run finished"
        );

        OptimizationResult {
            best: self.best,
            best_fitness: self.best_fitness,
            cycles: self.cycle,
            evaluations: self.evaluations,
            restarts: self.restarts,
            stop_reason,
            history: self.history,
            final_population: self.population,
        }
    }

    /// Runs a complete steady-state optimization.
    ///
    /// Fails only if `config` does not validate; no cycle runs in that case.
    pub fn run(
        problem: &'a P,
        config: &SteadyStateConfig,
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

    /// Cycles completed.
    pub fn cycles(&self) -> usize {
        self.cycle
    }

    /// Fitness evaluations performed, initial population included.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Evaluations still available under `max_evaluations`.
    pub fn remaining_budget(&self) -> usize {
        self.config.max_evaluations.saturating_sub(self.charged)
    }

    /// Diversity-injection restarts performed so far.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Cycles since the running best last improved.
    pub fn stagnation_counter(&self) -> usize {
        self.stagnation_counter
    }

    /// Snapshots recorded so far.
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    /// Produces exactly `count` unevaluated children.
    fn breed(&mut self, count: usize) -> Vec<P::Individual> {
        let mut children = Vec::with_capacity(count + 1);
        while children.len() < count {
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
                children.push(child);
            }
        }
        children.truncate(count);
        children
    }

    /// Writes evaluated children over existing slots.
    fn replace(&mut self, children: Vec<P::Individual>) {
        match self.config.replacement {
            Replacement::Worst => {
                let worst = population::indices_worst_first(&self.population);
                for (&slot, child) in worst.iter().zip(children) {
                    self.population[slot] = child;
                }
            }
            Replacement::Tournament(k) => {
                for child in children {
                    let slot = reverse_tournament(&self.population, k, &mut self.rng);
                    self.population[slot] = child;
                }
            }
        }
    }

    fn charge(&mut self, evaluated: usize) {
        self.evaluations += evaluated;
        self.charged += evaluated;
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
            evaluations = snapshot.evaluations,
            best = snapshot.best_fitness,
            average = snapshot.average_fitness,
            diversity = snapshot.diversity,
            "steady-state snapshot"
        );
        self.problem.on_snapshot(&snapshot);
        self.history.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::GaConfig;
    use crate::problem::{BeamIndividual, BeamLayout, BeamProblem, Scenario};
    use crate::weights::WeightVector;

    fn beam_problem(m: usize) -> BeamProblem {
        BeamProblem::new(Scenario::default().with_antenna_count(m)).unwrap()
    }

    fn base_config() -> SteadyStateConfig {
        SteadyStateConfig::default()
            .with_population_size(20)
            .with_diversity_check_interval(0)
            .with_seed(42)
    }

    #[test]
    fn test_budget_drives_cycle_count() {
        let problem = beam_problem(8);
        let config = base_config()
            .with_max_evaluations(200)
            .with_offspring_size(2)
            .with_replacement(Replacement::Worst)
            .with_stagnation_limit(0);
        let result = SteadyStateRunner::run(&problem, &config).unwrap();
        assert_eq!(result.cycles, 100);
        assert_eq!(result.evaluations, 20 + 200);
        assert_eq!(result.stop_reason, StopReason::BudgetExhausted);
    }

    #[test]
    fn test_last_cycle_respects_budget() {
        let problem = beam_problem(4);
        let config = base_config()
            .with_max_evaluations(7)
            .with_offspring_size(3)
            .with_stagnation_limit(0);
        let result = SteadyStateRunner::run(&problem, &config).unwrap();
        // 3 + 3 + 1
        assert_eq!(result.cycles, 3);
        assert_eq!(result.evaluations, 20 + 7);
    }

    #[test]
    fn test_replacement_bound() {
        let problem = beam_problem(6);
        for replacement in [Replacement::Worst, Replacement::Tournament(3)] {
            let config = base_config()
                .with_offspring_size(3)
                .with_replacement(replacement);
            let mut runner = SteadyStateRunner::new(&problem, config).unwrap();
            for _ in 0..25 {
                let before = runner.population().to_vec();
                runner.step();
                let after = runner.population();
                assert_eq!(after.len(), before.len());
                let changed = before.iter().zip(after).filter(|(a, b)| a != b).count();
                assert!(changed <= 3, "{replacement:?} changed {changed} slots");
            }
        }
    }

    #[test]
    fn test_replace_worst_overwrites_least_fit() {
        let problem = beam_problem(6);
        let config = base_config().with_offspring_size(2);
        let mut runner = SteadyStateRunner::new(&problem, config).unwrap();
        let worst: Vec<usize> = population::indices_worst_first(runner.population())[..2].to_vec();
        let before = runner.population().to_vec();
        runner.step();
        for (i, (a, b)) in before.iter().zip(runner.population()).enumerate() {
            if a != b {
                assert!(worst.contains(&i), "slot {i} was not among the worst");
            }
        }
    }

    #[test]
    fn test_running_best_never_decreases() {
        let problem = beam_problem(8);
        let config = base_config()
            .with_ga(GaConfig::default().with_population_size(20).with_snapshot_interval(1))
            .with_max_evaluations(300)
            .with_seed(7);
        let mut runner = SteadyStateRunner::new(&problem, config).unwrap();
        let mut last = runner.best_fitness();
        while runner.step().is_none() {
            assert!(runner.best_fitness() >= last);
            last = runner.best_fitness();
        }
        for w in runner.history().windows(2) {
            assert!(w[1].best_fitness >= w[0].best_fitness);
        }
    }

    #[test]
    fn test_stagnation_stops_early() {
        let problem = beam_problem(4);
        let config = base_config()
            .with_max_evaluations(100_000)
            .with_stagnation_limit(15)
            .with_ga(
                GaConfig::default()
                    .with_population_size(20)
                    .with_mutation_rate(0.0)
                    .with_crossover_rate(0.0)
                    .with_seed(1),
            );
        // Clones of existing parents can never beat the running best
        let result = SteadyStateRunner::run(&problem, &config).unwrap();
        assert!(result.stagnated());
        assert_eq!(result.cycles, 15);
    }

    #[test]
    fn test_collapsed_population_triggers_injection() {
        let problem = beam_problem(8);
        let mut rng = create_rng(3);
        let template: BeamIndividual = problem.create_individual(&mut rng);
        let collapsed = vec![template.clone(); 20];

        let config = base_config()
            .with_diversity_check_interval(1)
            .with_diversity_threshold(0.01)
            .with_restart_fraction(0.2)
            .with_ga(
                GaConfig::default()
                    .with_population_size(20)
                    .with_mutation_rate(0.0)
                    .with_seed(11),
            );
        let mut runner = SteadyStateRunner::with_population(&problem, config, collapsed).unwrap();
        runner.step();

        assert_eq!(runner.restarts(), 1);
        let fresh = runner
            .population()
            .iter()
            .filter(|ind| ind.magnitude_distance(&template) > 1e-6)
            .count();
        assert_eq!(fresh, 4);
        // 20 initial + 2 children + 4 restarts
        assert_eq!(runner.evaluations(), 26);
    }

    #[test]
    fn test_diverse_population_is_left_alone() {
        let problem = beam_problem(8);
        let mut runner = SteadyStateRunner::new(&problem, base_config()).unwrap();
        let before = runner.population().to_vec();
        assert_eq!(runner.inject_diversity_if_needed(), 0);
        assert_eq!(runner.population(), &before[..]);
        assert_eq!(runner.restarts(), 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let problem = beam_problem(6);
        let config = base_config()
            .with_max_evaluations(150)
            .with_replacement(Replacement::Tournament(2))
            .with_diversity_check_interval(10);
        let a = SteadyStateRunner::run(&problem, &config).unwrap();
        let b = SteadyStateRunner::run(&problem, &config).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
        assert_eq!(a.cycles, b.cycles);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let problem = beam_problem(4);
        let config = base_config().with_offspring_size(0);
        assert!(SteadyStateRunner::run(&problem, &config).is_err());
    }

    #[test]
    fn test_with_population_rejects_mismatched_individuals() {
        let scenario = Scenario::default()
            .with_antenna_count(4)
            .with_layout(BeamLayout::Dual { rho: 0.5 });
        let problem = BeamProblem::new(scenario).unwrap();
        let config = base_config().with_population_size(10);

        let wrong: Vec<BeamIndividual> = (0..10)
            .map(|_| BeamIndividual::single(WeightVector::uniform(9)))
            .collect();
        assert!(SteadyStateRunner::with_population(&problem, config.clone(), wrong).is_err());

        let mut rng = create_rng(2);
        let mut mixed: Vec<BeamIndividual> =
            (0..10).map(|_| problem.create_individual(&mut rng)).collect();
        mixed[7] = BeamIndividual::single(WeightVector::uniform(4));
        assert!(SteadyStateRunner::with_population(&problem, config.clone(), mixed).is_err());

        let good: Vec<BeamIndividual> =
            (0..10).map(|_| problem.create_individual(&mut rng)).collect();
        assert!(SteadyStateRunner::with_population(&problem, config, good).is_ok());
    }

    #[test]
    fn test_cloned_children_start_at_age_zero() {
        let problem = beam_problem(6);
        let mut rng = create_rng(8);
        let population: Vec<BeamIndividual> = (0..20)
            .map(|_| {
                let mut ind = problem.create_individual(&mut rng);
                for _ in 0..3 {
                    ind.grow_older();
                }
                ind
            })
            .collect();
        let config = base_config().with_offspring_size(2).with_ga(
            GaConfig::default()
                .with_population_size(20)
                .with_crossover_rate(0.0)
                .with_mutation_rate(0.0)
                .with_seed(8),
        );
        let mut runner = SteadyStateRunner::with_population(&problem, config, population).unwrap();
        runner.step();

        let newborn = runner.population().iter().filter(|ind| ind.age() == 0).count();
        assert_eq!(newborn, 2);
        assert!(runner
            .population()
            .iter()
            .all(|ind| ind.age() == 0 || ind.age() == 3));
    }
}
