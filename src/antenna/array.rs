//! Uniform linear array response and beam gain.
//!
//! Elements sit on a line with half-wavelength spacing. For element `m`
//! (0-based) and a far-field direction θ measured from broadside, the
//! steering phase is `π·m·sin θ`.
//!
//! The beam response of a weight vector `w` toward θ is
//! `Σ_m w[m] · conj(a[m](θ))`. Every gain computed in this crate goes through
//! [`beam_response`], so the conjugation convention is applied in one place.

use super::complex::{unit_phasor, Complex};
use std::f64::consts::PI;

/// Steering phase of element `m` toward `angle_deg`.
#[inline]
fn element_phase(m: usize, angle_deg: f64) -> f64 {
    PI * m as f64 * angle_deg.to_radians().sin()
}

/// Steering vector of an `element_count`-element ULA toward `angle_deg`.
///
/// Every entry has unit magnitude.
///
/// # Example
///
/// ```
/// use u_beamga::antenna::array_response;
///
/// let a = array_response(4, 30.0);
/// assert_eq!(a.len(), 4);
/// assert!(a.iter().all(|c| (c.norm() - 1.0).abs() < 1e-12));
/// ```
pub fn array_response(element_count: usize, angle_deg: f64) -> Vec<Complex> {
    (0..element_count)
        .map(|m| unit_phasor(element_phase(m, angle_deg)))
        .collect()
}

/// Complex response of `weights` toward `angle_deg`.
pub fn beam_response(weights: &[Complex], angle_deg: f64) -> Complex {
    weights
        .iter()
        .enumerate()
        .fold(Complex::new(0.0, 0.0), |acc, (m, w)| {
            acc + w * unit_phasor(element_phase(m, angle_deg)).conj()
        })
}

/// Beam gain (response magnitude) of `weights` toward `angle_deg`.
pub fn beam_gain(weights: &[Complex], angle_deg: f64) -> f64 {
    beam_response(weights, angle_deg).norm()
}

/// Response of a dual-beam transmission toward `angle_deg`.
///
/// The communication and sensing beams are radiated together with power
/// split `rho` / `1 - rho`:
/// `sqrt(rho)·comm(θ) + sqrt(1 - rho)·sensing(θ)`.
pub fn combined_response(
    comm: &[Complex],
    sensing: &[Complex],
    rho: f64,
    angle_deg: f64,
) -> Complex {
    beam_response(comm, angle_deg) * rho.sqrt()
        + beam_response(sensing, angle_deg) * (1.0 - rho).sqrt()
}
