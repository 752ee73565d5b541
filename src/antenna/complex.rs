//! Complex weight primitive.
//!
//! Beamforming weights are [`num_complex::Complex64`] values. The polar view
//! (magnitude, phase) is what the genetic operators perturb; the Cartesian
//! view is what the array sums use. `Complex64` already provides `+`, `*`,
//! `conj`, `norm` (magnitude) and `arg` (phase via `atan2`), so this module
//! only adds the conventions the optimizer relies on.

use num_complex::Complex64;
use std::f64::consts::PI;

/// A complex beamforming weight.
pub type Complex = Complex64;

/// Builds a weight from magnitude and phase (radians).
#[inline]
pub fn from_polar(magnitude: f64, phase: f64) -> Complex {
    Complex::from_polar(magnitude, phase)
}

/// Unit phasor `exp(j·phase)`.
#[inline]
pub fn unit_phasor(phase: f64) -> Complex {
    Complex::new(phase.cos(), phase.sin())
}

/// Wraps an angle in radians into `[-π, π]`.
pub fn wrap_phase(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = (phase + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}
