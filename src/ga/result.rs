//! Run results and fitness history.

/// Progress record appended by a driver at a fixed cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Cycles completed when the snapshot was taken (0 = initial population).
    pub cycle: usize,
    /// Fitness evaluations performed so far, initial population included.
    pub evaluations: usize,
    /// Running best fitness across the whole run.
    pub best_fitness: f64,
    /// Mean fitness of the current population.
    pub average_fitness: f64,
    /// Mean pairwise distance of the current population.
    pub diversity: f64,
}

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The generational driver completed `max_generations` cycles.
    MaxGenerations,
    /// The steady-state driver spent its whole evaluation budget.
    BudgetExhausted,
    /// The running best did not improve for `stagnation_limit` cycles.
    Stagnation,
}

/// Result of an optimization run.
///
/// Contains the best solution found, along with statistics about the
/// evolutionary process.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationResult<I> {
    /// The best individual seen during the entire run.
    pub best: I,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Cycles executed (generations, or steady-state iterations).
    pub cycles: usize,

    /// Fitness evaluations performed, including the initial population.
    pub evaluations: usize,

    /// Number of diversity-injection restarts performed.
    pub restarts: usize,

    /// Why the run ended.
    pub stop_reason: StopReason,

    /// Snapshots in cycle order.
    pub history: Vec<Snapshot>,

    /// The population as it stood when the run ended.
    pub final_population: Vec<I>,
}

impl<I> OptimizationResult<I> {
    /// Whether the run ended on the stagnation criterion.
    pub fn stagnated(&self) -> bool {
        self.stop_reason == StopReason::Stagnation
    }

    /// Best fitness per snapshot, in order.
    pub fn fitness_history(&self) -> Vec<f64> {
        self.history.iter().map(|s| s.best_fitness).collect()
    }
}
