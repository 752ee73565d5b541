//! Radiation pattern sweeps.

use super::array::beam_response;
use super::complex::Complex;
use crate::error::{ensure_in_range, ConfigError, Result};

/// Offset added before taking the logarithm so a null maps to -200 dB.
pub const DB_FLOOR_EPSILON: f64 = 1e-10;

/// Smallest accepted sweep step, degrees. Caps a full sweep at 180 001 samples.
pub const MIN_STEP_DEG: f64 = 1e-3;

/// Converts a linear magnitude to decibels: `20·log10(magnitude + ε)`.
#[inline]
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * (magnitude + DB_FLOOR_EPSILON).log10()
}

/// Evenly spaced angles from `start_deg` to `end_deg` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngularSweep {
    /// First angle, degrees.
    pub start_deg: f64,
    /// Last angle, degrees.
    pub end_deg: f64,
    /// Spacing between consecutive angles, degrees.
    pub step_deg: f64,
}

impl Default for AngularSweep {
    fn default() -> Self {
        Self {
            start_deg: -90.0,
            end_deg: 90.0,
            step_deg: 1.0,
        }
    }
}

impl AngularSweep {
    /// Full half-plane sweep with the given step.
    pub fn with_step(step_deg: f64) -> Self {
        Self {
            step_deg,
            ..Self::default()
        }
    }

    /// Checks that the sweep is finite, ordered and has a positive step.
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("sweep.start_deg", self.start_deg, -90.0, 90.0)?;
        ensure_in_range("sweep.end_deg", self.end_deg, -90.0, 90.0)?;
        if self.end_deg < self.start_deg {
            return Err(ConfigError::Invalid(format!(
                "sweep end {} precedes start {}",
                self.end_deg, self.start_deg
            )));
        }
        ensure_in_range("sweep.step_deg", self.step_deg, MIN_STEP_DEG, 180.0)
    }

    /// Number of sample angles.
    ///
    /// Saturates instead of overflowing on a sweep that fails [`validate`](Self::validate).
    pub fn len(&self) -> usize {
        let intervals = ((self.end_deg - self.start_deg) / self.step_deg + 1e-9).floor();
        if !intervals.is_finite() || intervals < 0.0 {
            return 0;
        }
        (intervals as usize).saturating_add(1)
    }

    /// Whether the sweep has no samples. Never true for a valid sweep.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the sample angles.
    ///
    /// Angles are computed as `start + i·step` rather than accumulated, so
    /// long sweeps do not drift.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.start_deg + i as f64 * self.step_deg)
    }
}

/// One sample of a radiation pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternPoint {
    /// Direction, degrees.
    pub angle_deg: f64,
    /// Linear response magnitude.
    pub magnitude: f64,
    /// Response magnitude in dB.
    pub magnitude_db: f64,
}

impl PatternPoint {
    fn from_response(angle_deg: f64, response: Complex) -> Self {
        let magnitude = response.norm();
        Self {
            angle_deg,
            magnitude,
            magnitude_db: magnitude_to_db(magnitude),
        }
    }
}

/// Samples an arbitrary response function over `sweep`.
pub fn pattern_with<F>(sweep: &AngularSweep, response: F) -> Vec<PatternPoint>
where
    F: Fn(f64) -> Complex,
{
    sweep
        .angles()
        .map(|angle| PatternPoint::from_response(angle, response(angle)))
        .collect()
}

/// Radiation pattern of a single weight vector over `sweep`.
///
/// # Example
///
/// ```
/// use u_beamga::antenna::{radiation_pattern, AngularSweep, Complex};
///
/// let w = vec![Complex::new(0.5, 0.0); 4];
/// let pattern = radiation_pattern(&w, &AngularSweep::default());
/// assert_eq!(pattern.len(), 181);
/// let broadside = pattern.iter().find(|p| p.angle_deg == 0.0).unwrap();
/// assert!((broadside.magnitude - 2.0).abs() < 1e-9);
/// ```
pub fn radiation_pattern(weights: &[Complex], sweep: &AngularSweep) -> Vec<PatternPoint> {
    pattern_with(sweep, |angle| beam_response(weights, angle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep() {
        let sweep = AngularSweep::default();
        assert_eq!(sweep.len(), 181);
        let angles: Vec<f64> = sweep.angles().collect();
        assert_eq!(angles[0], -90.0);
        assert_eq!(*angles.last().unwrap(), 90.0);
        assert!(sweep.validate().is_ok());
    }

    #[test]
    fn test_coarse_sweep_includes_end() {
        let sweep = AngularSweep::with_step(2.0);
        assert_eq!(sweep.len(), 91);
        assert_eq!(sweep.angles().last(), Some(90.0));
    }

    #[test]
    fn test_sweep_validation() {
        assert!(AngularSweep::with_step(0.0).validate().is_err());
        assert!(AngularSweep::with_step(-1.0).validate().is_err());
        assert!(AngularSweep::with_step(f64::NAN).validate().is_err());
        let reversed = AngularSweep {
            start_deg: 10.0,
            end_deg: -10.0,
            step_deg: 1.0,
        };
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_tiny_step_is_rejected() {
        let sweep = AngularSweep::with_step(1e-300);
        assert!(sweep.validate().is_err());
        assert_eq!(sweep.len(), usize::MAX);
        assert!(AngularSweep::with_step(1e-7).validate().is_err());

        let finest = AngularSweep::with_step(MIN_STEP_DEG);
        assert!(finest.validate().is_ok());
        assert_eq!(finest.len(), 180_001);
    }

    #[test]
    fn test_db_conversion() {
        assert!((magnitude_to_db(1.0)).abs() < 1e-6);
        assert!((magnitude_to_db(10.0) - 20.0).abs() < 1e-6);
        assert!((magnitude_to_db(0.0) + 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_pattern_triples_are_consistent() {
        let w = vec![Complex::new(0.5, 0.0), Complex::new(0.0, 0.5), Complex::new(-0.5, 0.0)];
        for p in radiation_pattern(&w, &AngularSweep::with_step(5.0)) {
            assert!(p.magnitude >= 0.0);
            assert!((p.magnitude_db - magnitude_to_db(p.magnitude)).abs() < 1e-12);
        }
    }
}
