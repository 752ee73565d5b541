//! Population bookkeeping shared by both drivers.
//!
//! A population is a plain `Vec<I>` owned by one driver. Slots are indexed
//! by stable position so steady-state replacement can overwrite in place;
//! individuals are moved or cloned into slots, never shared.

use super::result::Snapshot;
use super::types::{GaProblem, Individual};
use crate::error::{ConfigError, Result};
use rand::Rng;
use std::cmp::Ordering;

/// Creates `size` random individuals and evaluates them.
pub fn initialize<P: GaProblem, R: Rng>(
    problem: &P,
    size: usize,
    rng: &mut R,
) -> Vec<P::Individual> {
    let mut population: Vec<P::Individual> =
        (0..size).map(|_| problem.create_individual(rng)).collect();
    evaluate_missing(problem, &mut population);
    population
}

/// Evaluates every individual without a cached fitness.
///
/// Returns the number of evaluations performed.
pub fn evaluate_missing<P: GaProblem>(problem: &P, population: &mut [P::Individual]) -> usize {
    let mut evaluated = 0;
    for ind in population.iter_mut().filter(|ind| ind.fitness().is_none()) {
        let f = problem.evaluate(ind);
        ind.set_fitness(f);
        evaluated += 1;
    }
    evaluated
}

/// Takes ownership of a caller-supplied population.
///
/// The population must hold exactly `expected` individuals, each accepted by
/// [`GaProblem::check_individual`]. Cached fitness is discarded and
/// recomputed, so values from another problem cannot leak in. Returns the
/// population with the number of evaluations spent.
pub fn adopt<P: GaProblem>(
    problem: &P,
    mut population: Vec<P::Individual>,
    expected: usize,
) -> Result<(Vec<P::Individual>, usize)> {
    if population.len() != expected {
        return Err(ConfigError::Invalid(format!(
            "supplied population has {} individuals, expected {expected}",
            population.len()
        )));
    }
    for (i, ind) in population.iter().enumerate() {
        problem.check_individual(ind).map_err(|e| {
            ConfigError::Invalid(format!("supplied individual {i} rejected: {e}"))
        })?;
    }
    for ind in population.iter_mut() {
        ind.invalidate_fitness();
    }
    let evaluated = evaluate_missing(problem, &mut population);
    Ok((population, evaluated))
}

/// Builds a history record for the current population.
pub fn snapshot<P: GaProblem>(
    problem: &P,
    population: &[P::Individual],
    cycle: usize,
    evaluations: usize,
    best_fitness: f64,
) -> Snapshot {
    Snapshot {
        cycle,
        evaluations,
        best_fitness,
        average_fitness: average_fitness(population),
        diversity: diversity(problem, population),
    }
}

fn by_fitness<I: Individual>(a: &I, b: &I) -> Ordering {
    a.fitness_or_worst()
        .partial_cmp(&b.fitness_or_worst())
        .unwrap_or(Ordering::Equal)
}

/// Index of the fittest individual; the first one wins ties.
///
/// # Panics
/// Panics if the population is empty.
pub fn best_index<I: Individual>(population: &[I]) -> usize {
    assert!(!population.is_empty(), "population must not be empty");
    let mut best = 0;
    for (i, ind) in population.iter().enumerate().skip(1) {
        if by_fitness(ind, &population[best]) == Ordering::Greater {
            best = i;
        }
    }
    best
}

/// Slot indices ordered from least to most fit.
///
/// The sort is stable, so equally fit slots keep positional order.
pub fn indices_worst_first<I: Individual>(population: &[I]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| by_fitness(&population[a], &population[b]));
    order
}

/// Slot indices ordered from most to least fit.
pub fn indices_best_first<I: Individual>(population: &[I]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| by_fitness(&population[b], &population[a]));
    order
}

/// Mean cached fitness, ignoring unevaluated individuals.
pub fn average_fitness<I: Individual>(population: &[I]) -> f64 {
    let (sum, count) = population
        .iter()
        .filter_map(|ind| ind.fitness())
        .fold((0.0, 0usize), |(s, c), f| (s + f, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Mean pairwise distance under [`GaProblem::distance`].
///
/// Zero for populations with fewer than two individuals.
pub fn diversity<P: GaProblem>(problem: &P, population: &[P::Individual]) -> f64 {
    let n = population.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            total += problem.distance(&population[i], &population[j]);
        }
    }
    total / (n * (n - 1) / 2) as f64
}
