//! Unit-power beamforming weight vectors.
//!
//! A [`WeightVector`] holds one complex weight per antenna element and keeps
//! `Σ |w|² = 1` at all times: every constructor normalizes, and the only
//! mutable access goes through [`WeightVector::modify`], which normalizes
//! again before returning.

use crate::antenna::complex::{from_polar, Complex};
use crate::antenna::{beam_gain, beam_response};
use rand::Rng;
use std::f64::consts::PI;

/// Magnitude every element is lifted to when a vector has no power left.
pub const MAGNITUDE_FLOOR: f64 = 1e-3;

/// Total power below which a vector is considered degenerate.
const DEGENERATE_POWER: f64 = 1e-300;

/// Complex weights with unit total radiated power.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightVector {
    weights: Vec<Complex>,
}

impl WeightVector {
    /// Wraps `weights`, scaling them to unit total power.
    pub fn new(weights: Vec<Complex>) -> Self {
        let mut v = Self { weights };
        v.normalize();
        v
    }

    /// Builds a vector from parallel magnitude and phase slices.
    ///
    /// # Panics
    /// Panics if the slices differ in length.
    pub fn from_polar_parts(magnitudes: &[f64], phases: &[f64]) -> Self {
        assert_eq!(
            magnitudes.len(),
            phases.len(),
            "magnitude and phase slices must have equal length"
        );
        Self::new(
            magnitudes
                .iter()
                .zip(phases)
                .map(|(&m, &p)| from_polar(m, p))
                .collect(),
        )
    }

    /// Equal magnitudes, zero phase: the broadside beam.
    pub fn uniform(len: usize) -> Self {
        Self::new(vec![Complex::new(1.0, 0.0); len])
    }

    /// Random vector: magnitudes uniform in `[0, 1)`, phases uniform in `[-π, π)`.
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        let weights = (0..len)
            .map(|_| {
                let magnitude = rng.random_range(0.0..1.0);
                let phase = rng.random_range(-PI..PI);
                from_polar(magnitude, phase)
            })
            .collect();
        Self::new(weights)
    }

    /// Number of antenna elements.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector has no elements.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The weights as a slice.
    pub fn as_slice(&self) -> &[Complex] {
        &self.weights
    }

    /// Σ |w|². Equals 1 up to rounding for any non-empty vector.
    pub fn total_power(&self) -> f64 {
        total_power(&self.weights)
    }

    /// Per-element magnitudes.
    pub fn magnitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().map(|w| w.norm())
    }

    /// Per-element phases in `[-π, π]`.
    pub fn phases(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().map(|w| w.arg())
    }

    /// Complex response toward `angle_deg`.
    pub fn response(&self, angle_deg: f64) -> Complex {
        beam_response(&self.weights, angle_deg)
    }

    /// Response magnitude toward `angle_deg`.
    pub fn gain(&self, angle_deg: f64) -> f64 {
        beam_gain(&self.weights, angle_deg)
    }

    /// Applies `f` to the raw weights, then restores unit power.
    pub fn modify<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut [Complex]) -> T,
    {
        let out = f(&mut self.weights);
        self.normalize();
        out
    }

    /// Σ (|a_m| - |b_m|)² over elements.
    pub fn magnitude_distance_sq(&self, other: &Self) -> f64 {
        self.magnitudes()
            .zip(other.magnitudes())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Scales every element by `1 / sqrt(Σ |w|²)`.
    ///
    /// A vector whose power is zero (or not finite) has its magnitudes
    /// floored to [`MAGNITUDE_FLOOR`] first, keeping each element's phase,
    /// so the division is always defined.
    fn normalize(&mut self) {
        if self.weights.is_empty() {
            return;
        }
        let power = total_power(&self.weights);
        if !power.is_finite() || power < DEGENERATE_POWER {
            tracing::warn!(
                elements = self.weights.len(),
                power,
                "degenerate weight vector; flooring magnitudes before normalization"
            );
            for w in self.weights.iter_mut() {
                let phase = if w.re.is_finite() && w.im.is_finite() {
                    w.arg()
                } else {
                    0.0
                };
                *w = from_polar(MAGNITUDE_FLOOR, phase);
            }
        }
        let scale = 1.0 / total_power(&self.weights).sqrt();
        for w in self.weights.iter_mut() {
            *w *= scale;
        }
    }
}

fn total_power(weights: &[Complex]) -> f64 {
    weights.iter().map(|w| w.norm_sqr()).sum()
}
