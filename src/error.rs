//! Configuration errors.
//!
//! Every configuration struct in this crate exposes a `validate` method
//! returning [`ConfigError`]. Runners validate before the first cycle, so a
//! malformed configuration aborts the run without touching the population.

/// Result alias used by constructors and validators.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A configuration value violated its documented range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A count or budget that must be at least one was zero.
    #[error("{field} must be a positive integer")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A real-valued parameter fell outside its closed interval.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// Any other inconsistency between fields.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fails with [`ConfigError::NonPositive`] when `value` is zero.
pub(crate) fn ensure_positive(field: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

/// Fails with [`ConfigError::OutOfRange`] unless `min <= value <= max`.
///
/// NaN is always rejected.
pub(crate) fn ensure_in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Fails unless `value` is finite and non-negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    ensure_in_range(field, value, 0.0, f64::MAX)
}
