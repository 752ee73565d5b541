//! Seeded random number generation.
//!
//! All stochastic operators draw from a single [`StdRng`] stream owned by the
//! running driver, so a seed plus a configuration fully determines a run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Creates the deterministic generator used by the drivers.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Returns `seed`, or a fresh seed from the thread RNG when `None`.
///
/// Drivers log the resolved seed so an unseeded run can be replayed.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Draws a zero-mean normal sample with standard deviation `sigma`.
///
/// Box–Muller transform on two uniform draws. `u1` is taken from `(0, 1]`
/// so the logarithm is always finite.
pub fn gaussian<R: Rng>(rng: &mut R, sigma: f64) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z * sigma
}
