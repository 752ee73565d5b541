//! Variation operators for complex weight sequences.
//!
//! These act on plain `&[Complex]` slices and know nothing about power
//! normalization; callers wrap the outputs back into a
//! [`WeightVector`](crate::weights::WeightVector), which restores unit power.
//!
//! # Crossover Operators
//!
//! - [`Crossover::SinglePoint`]: swap tails after a random cut, O(n)
//! - [`Crossover::Uniform`]: per-element coin flip, O(n)
//! - [`Crossover::Blend`]: BLX-α on magnitude and phase, O(n)
//!
//! # Mutation Operators
//!
//! - [`GaussianMutation`]: Box–Muller noise on magnitude and phase, O(n)
//!
//! # References
//!
//! - Eshelman & Schaffer (1993), "Real-Coded Genetic Algorithms and
//!   Interval-Schemata" (BLX-α)
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

use crate::antenna::complex::{from_polar, wrap_phase, Complex};
use crate::error::{ensure_in_range, ensure_non_negative, Result};
use crate::random::gaussian;
use rand::Rng;
use std::f64::consts::PI;

// ============================================================================
// Crossover operators
// ============================================================================

/// Recombination strategy for two weight sequences.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Cut both parents at one uniformly random index and swap the tails.
    SinglePoint,

    /// Take each element from either parent with probability 0.5.
    #[default]
    Uniform,

    /// BLX-α: sample each child's magnitude and phase from the parents'
    /// interval widened by `alpha` times its length on each side.
    Blend {
        /// Interval extension factor, typically 0.5.
        alpha: f64,
    },
}

impl Crossover {
    /// Checks operator parameters.
    pub fn validate(&self) -> Result<()> {
        if let Crossover::Blend { alpha } = self {
            ensure_non_negative("crossover.alpha", *alpha)?;
        }
        Ok(())
    }

    /// Produces two children from two parents of equal length.
    ///
    /// # Panics
    /// Panics if parents have different lengths.
    pub fn apply<R: Rng>(
        &self,
        parent1: &[Complex],
        parent2: &[Complex],
        rng: &mut R,
    ) -> (Vec<Complex>, Vec<Complex>) {
        assert_eq!(
            parent1.len(),
            parent2.len(),
            "parents must have equal length"
        );
        match *self {
            Crossover::SinglePoint => single_point_crossover(parent1, parent2, rng),
            Crossover::Uniform => uniform_crossover(parent1, parent2, rng),
            Crossover::Blend { alpha } => (
                blend_child(parent1, parent2, alpha, rng),
                blend_child(parent1, parent2, alpha, rng),
            ),
        }
    }
}

/// Single-point crossover: children are `p1[..cut] ++ p2[cut..]` and
/// `p2[..cut] ++ p1[cut..]` for a cut drawn from `0..n`.
pub fn single_point_crossover<R: Rng>(
    parent1: &[Complex],
    parent2: &[Complex],
    rng: &mut R,
) -> (Vec<Complex>, Vec<Complex>) {
    let n = parent1.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }
    let cut = rng.random_range(0..n);

    let mut child1 = Vec::with_capacity(n);
    child1.extend_from_slice(&parent1[..cut]);
    child1.extend_from_slice(&parent2[cut..]);

    let mut child2 = Vec::with_capacity(n);
    child2.extend_from_slice(&parent2[..cut]);
    child2.extend_from_slice(&parent1[cut..]);

    (child1, child2)
}

/// Uniform crossover: each position independently comes from parent 1 or
/// parent 2; the second child receives the complementary choice.
pub fn uniform_crossover<R: Rng>(
    parent1: &[Complex],
    parent2: &[Complex],
    rng: &mut R,
) -> (Vec<Complex>, Vec<Complex>) {
    parent1
        .iter()
        .zip(parent2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { (a, b) } else { (b, a) })
        .unzip()
}

/// One BLX-α child.
fn blend_child<R: Rng>(
    parent1: &[Complex],
    parent2: &[Complex],
    alpha: f64,
    rng: &mut R,
) -> Vec<Complex> {
    parent1
        .iter()
        .zip(parent2)
        .map(|(a, b)| {
            let magnitude = blend_value(a.norm(), b.norm(), alpha, rng).max(0.0);
            let phase = wrap_phase(blend_value(a.arg(), b.arg(), alpha, rng));
            from_polar(magnitude, phase)
        })
        .collect()
}

/// Samples uniformly from `[lo - α·d, hi + α·d]` where `d = hi - lo`.
fn blend_value<R: Rng>(x: f64, y: f64, alpha: f64, rng: &mut R) -> f64 {
    let lo = x.min(y);
    let hi = x.max(y);
    let range = hi - lo;
    let u: f64 = rng.random();
    lo - alpha * range + u * range * (1.0 + 2.0 * alpha)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Gaussian perturbation of magnitude and phase.
///
/// Each element is selected independently with the per-element rate passed
/// to [`apply`](Self::apply). A selected element gets `N(0, σ_mag)` added to
/// its magnitude and `N(0, σ_phase)` added to its phase; the magnitude is
/// then clamped to `[0, max_magnitude]` and the phase wrapped into `[-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianMutation {
    /// Standard deviation of the magnitude noise.
    pub magnitude_sigma: f64,
    /// Standard deviation of the phase noise, radians.
    pub phase_sigma: f64,
    /// Upper clamp for magnitudes before renormalization.
    pub max_magnitude: f64,
}

impl Default for GaussianMutation {
    fn default() -> Self {
        Self {
            magnitude_sigma: 0.1,
            phase_sigma: PI / 6.0,
            max_magnitude: 2.0,
        }
    }
}

impl GaussianMutation {
    /// Checks operator parameters.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("mutation.magnitude_sigma", self.magnitude_sigma)?;
        ensure_non_negative("mutation.phase_sigma", self.phase_sigma)?;
        ensure_in_range(
            "mutation.max_magnitude",
            self.max_magnitude,
            f64::MIN_POSITIVE,
            f64::MAX,
        )
    }

    /// Mutates `weights` in place and returns how many elements changed.
    pub fn apply<R: Rng>(&self, weights: &mut [Complex], rate: f64, rng: &mut R) -> usize {
        let mut mutated = 0;
        for w in weights.iter_mut() {
            if rng.random::<f64>() >= rate {
                continue;
            }
            let magnitude = (w.norm() + gaussian(rng, self.magnitude_sigma))
                .clamp(0.0, self.max_magnitude);
            let phase = wrap_phase(w.arg() + gaussian(rng, self.phase_sigma));
            *w = from_polar(magnitude, phase);
            mutated += 1;
        }
        mutated
    }
}

// ============================================================================
// Tests
// ============================================================================
