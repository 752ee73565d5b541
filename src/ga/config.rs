//! Driver configuration.
//!
//! [`GaConfig`] holds the parameters both drivers share. [`GenerationalConfig`]
//! and [`SteadyStateConfig`] wrap it with the stopping criteria and
//! replacement policy of each strategy.
//!
//! Builders store values as given. Out-of-range values are reported by
//! `validate`, which every driver calls before its first cycle.

use super::selection::Selection;
use crate::error::{ensure_in_range, ensure_non_negative, ensure_positive, ConfigError, Result};

/// Parameters shared by the generational and steady-state drivers.
///
/// # Defaults
///
/// ```
/// use u_beamga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.tournament_size(), Some(3));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_beamga::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_selection(Selection::Tournament(5))
///     .with_mutation_rate(0.05)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population. Constant for the whole run.
    pub population_size: usize,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Probability of applying crossover to a pair of parents (0.0–1.0).
    ///
    /// When crossover is not applied, the children are copies of the parents.
    pub crossover_rate: f64,

    /// Per-element mutation probability (0.0–1.0).
    pub mutation_rate: f64,

    /// Record a history snapshot every this many cycles.
    pub snapshot_interval: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a seed from the thread RNG; the drawn seed is logged.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            selection: Selection::default(),
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            snapshot_interval: 1,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for tournament selection of size `k`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the per-element mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the snapshot cadence in cycles.
    pub fn with_snapshot_interval(mut self, cycles: usize) -> Self {
        self.snapshot_interval = cycles;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Tournament size, when tournament selection is configured.
    pub fn tournament_size(&self) -> Option<usize> {
        match self.selection {
            Selection::Tournament(k) => Some(k),
            _ => None,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("population_size", self.population_size)?;
        self.selection.validate()?;
        ensure_in_range("crossover_rate", self.crossover_rate, 0.0, 1.0)?;
        ensure_in_range("mutation_rate", self.mutation_rate, 0.0, 1.0)?;
        ensure_positive("snapshot_interval", self.snapshot_interval)
    }
}

// ============================================================================
// Generational
// ============================================================================

/// Configuration for the generational driver.
///
/// Every cycle replaces the whole population, keeping the top
/// `elite_ratio` fraction unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationalConfig {
    /// Shared parameters.
    pub ga: GaConfig,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Fraction of the population carried over unchanged (0.0–1.0).
    ///
    /// The elite count is `floor(population_size · elite_ratio)` and must
    /// leave room for at least one child.
    pub elite_ratio: f64,

    /// Generations without improvement of the running best before stopping.
    ///
    /// The run stops as soon as the counter reaches this value, so a limit
    /// of 1 ends the run on the first generation that fails to improve.
    /// Set to 0 to disable stagnation-based termination (the default).
    pub stagnation_limit: usize,
}

impl Default for GenerationalConfig {
    fn default() -> Self {
        Self {
            ga: GaConfig::default(),
            max_generations: 200,
            elite_ratio: 0.1,
            stagnation_limit: 0,
        }
    }
}

impl GenerationalConfig {
    /// Replaces the shared parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.ga.population_size = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ga.seed = Some(seed);
        self
    }

    /// Number of elites carried into each new generation.
    pub fn elite_count(&self) -> usize {
        (self.ga.population_size as f64 * self.elite_ratio) as usize
    }

    /// Preset for quick runs: 50 individuals, 100 generations.
    pub fn fast() -> Self {
        Self {
            ga: GaConfig::default().with_population_size(50),
            max_generations: 100,
            elite_ratio: 0.1,
            stagnation_limit: 30,
        }
    }

    /// Preset matching the reference experiment: 100 individuals,
    /// 200 generations, 10% elitism.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.ga.validate()?;
        ensure_positive("max_generations", self.max_generations)?;
        ensure_in_range("elite_ratio", self.elite_ratio, 0.0, 1.0)?;
        if self.elite_count() >= self.ga.population_size {
            return Err(ConfigError::Invalid(
                "elite_ratio too high: elites fill entire population".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Steady-state
// ============================================================================

/// Which population slots steady-state offspring overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// Overwrite the least fit slots, one per child.
    #[default]
    Worst,

    /// For each child, draw `k` slots at random and overwrite the least fit.
    Tournament(usize),
}

impl Replacement {
    /// Parses the external strategy names `"worst"` and `"tournament"`.
    ///
    /// `"tournament"` uses `tournament_size` as the sample size.
    pub fn from_name(name: &str, tournament_size: usize) -> Result<Self> {
        match name {
            "worst" => Ok(Replacement::Worst),
            "tournament" => Ok(Replacement::Tournament(tournament_size)),
            other => Err(ConfigError::Invalid(format!(
                "unknown replacement strategy {other:?}, expected \"worst\" or \"tournament\""
            ))),
        }
    }

    /// External name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Replacement::Worst => "worst",
            Replacement::Tournament(_) => "tournament",
        }
    }
}

/// Configuration for the steady-state driver.
///
/// Each cycle breeds `offspring_size` children and overwrites that many
/// slots. The run is bounded by an evaluation budget rather than a cycle
/// count, and can stop early on stagnation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SteadyStateConfig {
    /// Shared parameters.
    pub ga: GaConfig,

    /// Offspring evaluations allowed. The initial population is not charged.
    pub max_evaluations: usize,

    /// Children bred and slots replaced per cycle.
    pub offspring_size: usize,

    /// Replacement policy.
    pub replacement: Replacement,

    /// Cycles without improvement of the running best before stopping.
    ///
    /// The run stops as soon as the counter reaches this value, so a limit
    /// of 1 ends the run on the first cycle that fails to improve.
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Measure diversity every this many cycles. 0 disables restarts.
    pub diversity_check_interval: usize,

    /// Diversity below which the worst slots are re-randomized.
    pub diversity_threshold: f64,

    /// Fraction of the population re-randomized on a restart (0.0–1.0).
    pub restart_fraction: f64,
}

impl Default for SteadyStateConfig {
    fn default() -> Self {
        Self {
            ga: GaConfig::default().with_snapshot_interval(50),
            max_evaluations: 20_000,
            offspring_size: 2,
            replacement: Replacement::Worst,
            stagnation_limit: 1000,
            diversity_check_interval: 500,
            diversity_threshold: 0.01,
            restart_fraction: 0.2,
        }
    }
}

impl SteadyStateConfig {
    /// Replaces the shared parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    /// Sets the number of children per cycle.
    pub fn with_offspring_size(mut self, n: usize) -> Self {
        self.offspring_size = n;
        self
    }

    /// Sets the replacement policy.
    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the diversity check cadence (0 to disable restarts).
    pub fn with_diversity_check_interval(mut self, cycles: usize) -> Self {
        self.diversity_check_interval = cycles;
        self
    }

    /// Sets the low-diversity threshold.
    pub fn with_diversity_threshold(mut self, threshold: f64) -> Self {
        self.diversity_threshold = threshold;
        self
    }

    /// Sets the fraction of the population replaced on a restart.
    pub fn with_restart_fraction(mut self, fraction: f64) -> Self {
        self.restart_fraction = fraction;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.ga.population_size = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ga.seed = Some(seed);
        self
    }

    /// Number of slots re-randomized by one restart.
    pub fn restart_count(&self) -> usize {
        ((self.ga.population_size as f64 * self.restart_fraction).round() as usize)
            .min(self.ga.population_size)
    }

    /// Preset for quick runs: 50 individuals, 5 000 evaluations.
    pub fn fast() -> Self {
        Self {
            ga: GaConfig::default()
                .with_population_size(50)
                .with_snapshot_interval(25),
            max_evaluations: 5_000,
            stagnation_limit: 300,
            diversity_check_interval: 200,
            ..Self::default()
        }
    }

    /// Preset with the reference defaults: 100 individuals, 20 000
    /// evaluations, binary offspring, replace-worst.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.ga.validate()?;
        ensure_positive("max_evaluations", self.max_evaluations)?;
        ensure_positive("offspring_size", self.offspring_size)?;
        if self.offspring_size > self.ga.population_size {
            return Err(ConfigError::Invalid(format!(
                "offspring_size {} exceeds population_size {}",
                self.offspring_size, self.ga.population_size
            )));
        }
        if let Replacement::Tournament(k) = self.replacement {
            ensure_positive("replacement.tournament_size", k)?;
        }
        ensure_non_negative("diversity_threshold", self.diversity_threshold)?;
        ensure_in_range("restart_fraction", self.restart_fraction, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.selection, Selection::Tournament(3));
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert_eq!(config.snapshot_interval, 1);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(200)
            .with_selection(Selection::Rank)
            .with_crossover_rate(0.9)
            .with_mutation_rate(0.05)
            .with_snapshot_interval(10)
            .with_seed(42);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.selection, Selection::Rank);
        assert!((config.crossover_rate - 0.9).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.snapshot_interval, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tournament_size(), None);
    }

    #[test]
    fn test_rates_are_rejected_not_clamped() {
        let config = GaConfig::default().with_crossover_rate(1.5);
        assert!((config.crossover_rate - 1.5).abs() < 1e-10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "crossover_rate",
                ..
            })
        ));
        assert!(GaConfig::default()
            .with_mutation_rate(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_zero_population() {
        let config = GaConfig::default().with_population_size(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "population_size"
            })
        );
    }

    #[test]
    fn test_validate_zero_tournament() {
        assert!(GaConfig::default()
            .with_tournament_size(0)
            .validate()
            .is_err());
    }

    // ---- Generational ----

    #[test]
    fn test_generational_defaults() {
        let config = GenerationalConfig::default();
        assert_eq!(config.max_generations, 200);
        assert_eq!(config.elite_count(), 10);
        assert_eq!(config.stagnation_limit, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generational_zero_generations() {
        let config = GenerationalConfig::default().with_max_generations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generational_elite_too_high() {
        let config = GenerationalConfig::default()
            .with_population_size(10)
            .with_elite_ratio(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generational_presets_validate() {
        assert!(GenerationalConfig::fast().validate().is_ok());
        assert!(GenerationalConfig::balanced().validate().is_ok());
        assert_eq!(GenerationalConfig::fast().ga.population_size, 50);
    }

    // ---- Steady-state ----

    #[test]
    fn test_steady_state_defaults() {
        let config = SteadyStateConfig::default();
        assert_eq!(config.max_evaluations, 20_000);
        assert_eq!(config.offspring_size, 2);
        assert_eq!(config.replacement, Replacement::Worst);
        assert_eq!(config.stagnation_limit, 1000);
        assert_eq!(config.diversity_check_interval, 500);
        assert_eq!(config.restart_count(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_steady_state_offspring_bounds() {
        assert!(SteadyStateConfig::default()
            .with_offspring_size(0)
            .validate()
            .is_err());
        assert!(SteadyStateConfig::default()
            .with_population_size(4)
            .with_offspring_size(5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_steady_state_budget_and_fraction() {
        assert!(SteadyStateConfig::default()
            .with_max_evaluations(0)
            .validate()
            .is_err());
        assert!(SteadyStateConfig::default()
            .with_restart_fraction(1.2)
            .validate()
            .is_err());
        assert!(SteadyStateConfig::default()
            .with_replacement(Replacement::Tournament(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_replacement_names() {
        assert_eq!(Replacement::from_name("worst", 3), Ok(Replacement::Worst));
        assert_eq!(
            Replacement::from_name("tournament", 4),
            Ok(Replacement::Tournament(4))
        );
        assert!(Replacement::from_name("random", 3).is_err());
        assert_eq!(Replacement::Tournament(2).name(), "tournament");
    }

    #[test]
    fn test_steady_state_presets_validate() {
        assert!(SteadyStateConfig::fast().validate().is_ok());
        assert!(SteadyStateConfig::balanced().validate().is_ok());
    }
}
