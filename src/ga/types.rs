//! Core trait definitions for the GA drivers.
//!
//! The two central traits, [`Individual`] and [`GaProblem`], define the
//! contract between the drivers and the problem being optimized. The
//! beamforming problem in [`crate::problem`] is the production implementor;
//! tests also plug in small synthetic problems.

use super::result::Snapshot;
use crate::error::Result;
use rand::Rng;

/// A candidate solution in the GA population.
///
/// Individuals carry a cached fitness. `None` means the individual must be
/// evaluated before selection or replacement can rank it. Higher fitness is
/// better: the drivers always maximize.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone)]
/// struct MySolution {
///     genes: Vec<f64>,
///     fitness: Option<f64>,
/// }
///
/// impl Individual for MySolution {
///     fn fitness(&self) -> Option<f64> { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = Some(f); }
///     fn invalidate_fitness(&mut self) { self.fitness = None; }
/// }
/// ```
pub trait Individual: Clone {
    /// Returns the cached fitness, if evaluated.
    fn fitness(&self) -> Option<f64>;

    /// Stores a freshly computed fitness.
    fn set_fitness(&mut self, fitness: f64);

    /// Marks the cached fitness as stale.
    fn invalidate_fitness(&mut self);

    /// Cached fitness, with unevaluated individuals ranked below everything.
    fn fitness_or_worst(&self) -> f64 {
        self.fitness().unwrap_or(f64::NEG_INFINITY)
    }

    /// Number of cycles this individual has survived.
    fn age(&self) -> usize {
        0
    }

    /// Called once per cycle for every individual that survives it.
    fn grow_older(&mut self) {}

    /// Called on every freshly bred offspring, cloned or recombined.
    fn reset_age(&mut self) {}
}

/// Defines a GA optimization problem.
///
/// Covers:
///
/// 1. **Initialization**: how to create random individuals
/// 2. **Evaluation**: how to compute fitness (maximized)
/// 3. **Crossover**: how to recombine two parents into two children
/// 4. **Mutation**: how to perturb an individual at a per-element rate
/// 5. **Distance**: how far apart two individuals are, for diversity checks
///
/// `evaluate` must be pure: identical individuals under an identical problem
/// yield identical fitness. The drivers rely on this to cache fitness.
pub trait GaProblem {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Creates a random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Evaluates an individual. Higher is better.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces two offspring by recombining two parents.
    ///
    /// The default implementation clones both parents (no crossover).
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        _rng: &mut R,
    ) -> (Self::Individual, Self::Individual) {
        (parent1.clone(), parent2.clone())
    }

    /// Mutates an individual in place, touching each element with
    /// probability `rate`.
    ///
    /// The default implementation is a no-op.
    fn mutate<R: Rng>(&self, _individual: &mut Self::Individual, _rate: f64, _rng: &mut R) {}

    /// Checks that a caller-supplied individual fits this problem.
    ///
    /// Drivers call this on every individual of an adopted population before
    /// evaluating it. The default accepts everything.
    fn check_individual(&self, _individual: &Self::Individual) -> Result<()> {
        Ok(())
    }

    /// Distance between two individuals for diversity measurement.
    ///
    /// The default treats every pair as identical, which disables
    /// diversity-triggered restarts.
    fn distance(&self, _a: &Self::Individual, _b: &Self::Individual) -> f64 {
        0.0
    }

    /// Called whenever a driver records a history snapshot.
    ///
    /// Useful for progress reporting. The default implementation is a no-op.
    fn on_snapshot(&self, _snapshot: &Snapshot) {}
}
