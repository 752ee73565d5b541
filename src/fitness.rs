//! Fitness functions for beamforming individuals.
//!
//! Two objectives are available, both maximized:
//!
//! - [`PenaltyObjective`]: reward gain toward the communication direction,
//!   penalize sensing directions that fall short of a minimum gain, and
//!   penalize sidelobes above a ceiling.
//! - [`MaskObjective`]: negative mean-squared error between the achieved
//!   magnitude pattern and a rectangular mask with one mainlobe per
//!   direction.
//!
//! Every objective is a pure function of the scenario and the weights.

use crate::antenna::AngularSweep;
use crate::error::{ensure_in_range, ensure_non_negative, ensure_positive, Result};
use crate::problem::{BeamIndividual, BeamLayout, Scenario};

/// How a response magnitude is turned into a gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GainScale {
    /// `|r|²`, the radiated power toward the direction.
    #[default]
    Power,
    /// `|r|`.
    Magnitude,
}

impl GainScale {
    /// Applies the scale to a response magnitude.
    #[inline]
    pub fn apply(self, magnitude: f64) -> f64 {
        match self {
            GainScale::Power => magnitude * magnitude,
            GainScale::Magnitude => magnitude,
        }
    }
}

/// Contribution of the sensing directions to the penalty objective.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensingTerm {
    /// Subtract `weight · Σ (min_gain - g)²` over directions with
    /// `g < min_gain`.
    Penalty {
        /// Gain every sensing direction should reach (Gmin).
        min_gain: f64,
        /// Penalty weight (α2).
        weight: f64,
    },
    /// Add `weight · mean(g)` over sensing directions.
    Average {
        /// Reward weight.
        weight: f64,
    },
}

impl Default for SensingTerm {
    fn default() -> Self {
        SensingTerm::Penalty {
            min_gain: 0.5,
            weight: 0.5,
        }
    }
}

/// Weighted sum of communication gain, sensing penalty and sidelobe penalty.
///
/// ```text
/// fitness = α1·g(θc) - α2·Σ_s max(0, Gmin - g(θs))² - α3·Σ_θ max(0, g(θ) - SLmax)²
/// ```
///
/// The sidelobe sum runs over `sidelobe_sweep`, skipping every angle closer
/// than `exclusion_deg` to the communication or a sensing direction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenaltyObjective {
    /// Communication gain weight (α1).
    pub comm_weight: f64,
    /// Gain definition used by every term.
    pub gain_scale: GainScale,
    /// Sensing term.
    pub sensing: SensingTerm,
    /// Sidelobe penalty weight (α3).
    pub sidelobe_weight: f64,
    /// Sidelobe ceiling (SLmax).
    pub max_sidelobe: f64,
    /// Half-width of the window around each steered direction that is not
    /// counted as sidelobe, degrees. Angles exactly at the edge count.
    pub exclusion_deg: f64,
    /// Angles probed for sidelobes.
    pub sidelobe_sweep: AngularSweep,
}

impl Default for PenaltyObjective {
    fn default() -> Self {
        Self {
            comm_weight: 1.0,
            gain_scale: GainScale::Power,
            sensing: SensingTerm::default(),
            sidelobe_weight: 0.3,
            max_sidelobe: 0.1,
            exclusion_deg: 10.0,
            sidelobe_sweep: AngularSweep::with_step(2.0),
        }
    }
}

impl PenaltyObjective {
    /// Sets the communication gain weight.
    pub fn with_comm_weight(mut self, weight: f64) -> Self {
        self.comm_weight = weight;
        self
    }

    /// Sets the gain scale.
    pub fn with_gain_scale(mut self, scale: GainScale) -> Self {
        self.gain_scale = scale;
        self
    }

    /// Sets the sensing term.
    pub fn with_sensing(mut self, sensing: SensingTerm) -> Self {
        self.sensing = sensing;
        self
    }

    /// Sets the sidelobe penalty weight.
    pub fn with_sidelobe_weight(mut self, weight: f64) -> Self {
        self.sidelobe_weight = weight;
        self
    }

    /// Sets the sidelobe ceiling.
    pub fn with_max_sidelobe(mut self, level: f64) -> Self {
        self.max_sidelobe = level;
        self
    }

    /// Sets the exclusion half-width in degrees.
    pub fn with_exclusion_deg(mut self, deg: f64) -> Self {
        self.exclusion_deg = deg;
        self
    }

    /// Sets the sidelobe sweep.
    pub fn with_sidelobe_sweep(mut self, sweep: AngularSweep) -> Self {
        self.sidelobe_sweep = sweep;
        self
    }

    /// Validates weights, thresholds and the sweep.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("objective.comm_weight", self.comm_weight)?;
        match self.sensing {
            SensingTerm::Penalty { min_gain, weight } => {
                ensure_non_negative("objective.sensing.min_gain", min_gain)?;
                ensure_non_negative("objective.sensing.weight", weight)?;
            }
            SensingTerm::Average { weight } => {
                ensure_non_negative("objective.sensing.weight", weight)?;
            }
        }
        ensure_non_negative("objective.sidelobe_weight", self.sidelobe_weight)?;
        ensure_non_negative("objective.max_sidelobe", self.max_sidelobe)?;
        ensure_in_range("objective.exclusion_deg", self.exclusion_deg, 0.0, 180.0)?;
        self.sidelobe_sweep.validate()
    }

    fn breakdown(&self, scenario: &Scenario, individual: &BeamIndividual) -> FitnessBreakdown {
        let gain = |angle: f64| {
            self.gain_scale
                .apply(individual.response(&scenario.layout, angle).norm())
        };

        let comm_gain = gain(scenario.comm_direction_deg);
        let sensing_gains: Vec<f64> = scenario
            .sensing_directions_deg
            .iter()
            .map(|&angle| gain(angle))
            .collect();
        let mean_sensing_gain = mean(&sensing_gains);

        let (sensing_term, sensing_penalty) = match self.sensing {
            SensingTerm::Penalty { min_gain, weight } => {
                let penalty: f64 = sensing_gains
                    .iter()
                    .filter(|&&g| g < min_gain)
                    .map(|&g| (min_gain - g) * (min_gain - g))
                    .sum();
                (-weight * penalty, penalty)
            }
            SensingTerm::Average { weight } => (weight * mean_sensing_gain, 0.0),
        };

        let sidelobe_penalty: f64 = self
            .sidelobe_sweep
            .angles()
            .filter(|&angle| !self.is_excluded(scenario, angle))
            .map(gain)
            .filter(|&g| g > self.max_sidelobe)
            .map(|g| (g - self.max_sidelobe) * (g - self.max_sidelobe))
            .sum();

        FitnessBreakdown {
            fitness: self.comm_weight * comm_gain + sensing_term
                - self.sidelobe_weight * sidelobe_penalty,
            comm_gain,
            mean_sensing_gain,
            sensing_penalty,
            sidelobe_penalty,
            mask_error: None,
        }
    }

    /// Whether `angle` lies strictly inside a steered direction's window.
    fn is_excluded(&self, scenario: &Scenario, angle: f64) -> bool {
        scenario
            .steered_directions()
            .any(|dir| (angle - dir).abs() < self.exclusion_deg)
    }
}

/// Rectangular-mask matching.
///
/// The mask is sampled at `samples` angles `-90 + 180·i/samples`. A sample
/// is inside the communication mainlobe when it lies within
/// `asin(comm_lobe_factor / M)` of the communication direction, and inside a
/// sensing mainlobe when it lies within
/// `asin(comm_lobe_factor / (sensing_aperture · M))` of a sensing direction.
/// For a dual layout with power split ρ the desired magnitude is
/// `max(√ρ·comm_mask, √(1-ρ)·sensing_mask)` and the achieved magnitude is
/// `√ρ·|comm| + √(1-ρ)·|sensing|`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskObjective {
    /// Number of mask samples (K).
    pub samples: usize,
    /// Mainlobe width factor; the half-width is `asin(factor / M)`.
    pub comm_lobe_factor: f64,
    /// Fraction of the aperture the sensing beam is designed for.
    pub sensing_aperture: f64,
    /// Gain definition used for the reported communication and sensing gains.
    pub gain_scale: GainScale,
}

impl Default for MaskObjective {
    fn default() -> Self {
        Self {
            samples: 160,
            comm_lobe_factor: 1.2,
            sensing_aperture: 0.75,
            gain_scale: GainScale::Power,
        }
    }
}

impl MaskObjective {
    /// Sets the number of mask samples.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Validates the mask parameters.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("objective.samples", self.samples)?;
        ensure_in_range(
            "objective.comm_lobe_factor",
            self.comm_lobe_factor,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;
        ensure_in_range(
            "objective.sensing_aperture",
            self.sensing_aperture,
            f64::MIN_POSITIVE,
            1.0,
        )
    }

    /// Sample angles in degrees.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        let step = 180.0 / self.samples as f64;
        (0..self.samples).map(move |i| -90.0 + step * i as f64)
    }

    /// Mainlobe half-widths `(comm, sensing)` in degrees for `m` elements.
    pub fn half_widths_deg(&self, m: usize) -> (f64, f64) {
        let m = m as f64;
        let comm = (self.comm_lobe_factor / m).min(1.0).asin().to_degrees();
        let sensing = (self.comm_lobe_factor / (self.sensing_aperture * m))
            .min(1.0)
            .asin()
            .to_degrees();
        (comm, sensing)
    }

    fn breakdown(&self, scenario: &Scenario, individual: &BeamIndividual) -> FitnessBreakdown {
        let (comm_half, sensing_half) = self.half_widths_deg(scenario.antenna_count);
        let (comm_share, sensing_share) = match scenario.layout {
            BeamLayout::Single => (1.0, 1.0),
            BeamLayout::Dual { rho } => (rho.sqrt(), (1.0 - rho).sqrt()),
        };

        let squared_error: f64 = self
            .angles()
            .map(|angle| {
                let in_comm = (angle - scenario.comm_direction_deg).abs() <= comm_half;
                let in_sensing = scenario
                    .sensing_directions_deg
                    .iter()
                    .any(|&dir| (angle - dir).abs() <= sensing_half);
                let desired = f64::max(
                    if in_comm { comm_share } else { 0.0 },
                    if in_sensing { sensing_share } else { 0.0 },
                );

                let achieved = match individual.sensing() {
                    Some(sensing) if matches!(scenario.layout, BeamLayout::Dual { .. }) => {
                        comm_share * individual.comm().response(angle).norm()
                            + sensing_share * sensing.response(angle).norm()
                    }
                    _ => individual.comm().response(angle).norm(),
                };

                (achieved - desired) * (achieved - desired)
            })
            .sum();
        let mask_error = squared_error / self.samples as f64;

        let gain = |angle: f64| {
            self.gain_scale
                .apply(individual.response(&scenario.layout, angle).norm())
        };
        let sensing_gains: Vec<f64> = scenario
            .sensing_directions_deg
            .iter()
            .map(|&angle| gain(angle))
            .collect();

        FitnessBreakdown {
            fitness: -mask_error,
            comm_gain: gain(scenario.comm_direction_deg),
            mean_sensing_gain: mean(&sensing_gains),
            sensing_penalty: 0.0,
            sidelobe_penalty: 0.0,
            mask_error: Some(mask_error),
        }
    }
}

/// Objective selected for a [`BeamProblem`](crate::problem::BeamProblem).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// Weighted gain and penalty terms.
    Penalty(PenaltyObjective),
    /// Rectangular-mask matching.
    MaskMatching(MaskObjective),
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Penalty(PenaltyObjective::default())
    }
}

impl Objective {
    /// Validates the selected objective.
    pub fn validate(&self) -> Result<()> {
        match self {
            Objective::Penalty(p) => p.validate(),
            Objective::MaskMatching(m) => m.validate(),
        }
    }

    /// Fitness of `individual` under `scenario`. Higher is better.
    pub fn evaluate(&self, scenario: &Scenario, individual: &BeamIndividual) -> f64 {
        self.evaluate_breakdown(scenario, individual).fitness
    }

    /// Fitness together with its component terms.
    pub fn evaluate_breakdown(
        &self,
        scenario: &Scenario,
        individual: &BeamIndividual,
    ) -> FitnessBreakdown {
        match self {
            Objective::Penalty(p) => p.breakdown(scenario, individual),
            Objective::MaskMatching(m) => m.breakdown(scenario, individual),
        }
    }
}

/// Fitness and the terms it was assembled from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessBreakdown {
    /// The scalar fitness.
    pub fitness: f64,
    /// Gain toward the communication direction.
    pub comm_gain: f64,
    /// Mean gain over the sensing directions; 0 when there are none.
    pub mean_sensing_gain: f64,
    /// Unweighted sensing shortfall penalty.
    pub sensing_penalty: f64,
    /// Unweighted sidelobe excess penalty.
    pub sidelobe_penalty: f64,
    /// Mean squared mask error, for the mask-matching objective.
    pub mask_error: Option<f64>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
