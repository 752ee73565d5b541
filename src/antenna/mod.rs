//! Antenna array model.
//!
//! - [`complex`]: the complex weight type and phase conventions
//! - [`array_response`] / [`beam_gain`]: half-wavelength ULA steering and gain
//! - [`radiation_pattern`]: gain sampled over an [`AngularSweep`]

mod array;
pub mod complex;
mod pattern;

pub use array::{array_response, beam_gain, beam_response, combined_response};
pub use complex::Complex;
pub use pattern::{
    magnitude_to_db, pattern_with, radiation_pattern, AngularSweep, PatternPoint,
    DB_FLOOR_EPSILON, MIN_STEP_DEG,
};
