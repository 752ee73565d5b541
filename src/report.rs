//! Run summaries for external reporting.
//!
//! A [`RunReport`] bundles everything a plotting or persistence layer needs
//! from one run: the best beamformer, its fitness terms, the snapshot
//! history and its radiation pattern. [`compare`] runs both drivers on the
//! same problem and reports them side by side.

use crate::antenna::PatternPoint;
use crate::error::Result;
use crate::fitness::FitnessBreakdown;
use crate::ga::{
    GenerationalConfig, GenerationalRunner, OptimizationResult, Snapshot, SteadyStateConfig,
    SteadyStateRunner, StopReason,
};
use crate::problem::{BeamIndividual, BeamProblem};
use std::fmt;

/// Which driver produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Whole-population replacement.
    Generational,
    /// Few replacements per cycle under an evaluation budget.
    SteadyState,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Generational => write!(f, "generational"),
            Strategy::SteadyState => write!(f, "steady-state"),
        }
    }
}

/// Summary of one optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Driver that produced the run.
    pub strategy: Strategy,
    /// Best individual seen.
    pub best: BeamIndividual,
    /// Fitness terms of `best`.
    pub breakdown: FitnessBreakdown,
    /// Cycles executed.
    pub cycles: usize,
    /// Fitness evaluations, initial population included.
    pub evaluations: usize,
    /// Diversity-injection restarts.
    pub restarts: usize,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Snapshots in cycle order.
    pub history: Vec<Snapshot>,
    /// Radiation pattern of `best` over the scenario's pattern sweep.
    pub pattern: Vec<PatternPoint>,
}

impl RunReport {
    /// Builds a report from a finished run.
    pub fn new(
        problem: &BeamProblem,
        strategy: Strategy,
        result: OptimizationResult<BeamIndividual>,
    ) -> Self {
        let breakdown = problem.breakdown(&result.best);
        let pattern = problem.radiation_pattern(&result.best);
        Self {
            strategy,
            best: result.best,
            breakdown,
            cycles: result.cycles,
            evaluations: result.evaluations,
            restarts: result.restarts,
            stop_reason: result.stop_reason,
            history: result.history,
            pattern,
        }
    }

    /// Best fitness of the run.
    pub fn best_fitness(&self) -> f64 {
        self.breakdown.fitness
    }

    /// Pattern sample with the largest magnitude.
    pub fn peak(&self) -> Option<&PatternPoint> {
        self.pattern
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} GA", self.strategy)?;
        writeln!(f, "  best fitness:       {:.4}", self.breakdown.fitness)?;
        writeln!(f, "  comm gain:          {:.4}", self.breakdown.comm_gain)?;
        writeln!(f, "  mean sensing gain:  {:.4}", self.breakdown.mean_sensing_gain)?;
        writeln!(f, "  sensing penalty:    {:.4}", self.breakdown.sensing_penalty)?;
        writeln!(f, "  sidelobe penalty:   {:.4}", self.breakdown.sidelobe_penalty)?;
        if let Some(err) = self.breakdown.mask_error {
            writeln!(f, "  mask error:         {err:.6}")?;
        }
        write!(
            f,
            "  {} cycles, {} evaluations, {} restarts, stopped on {:?}",
            self.cycles, self.evaluations, self.restarts, self.stop_reason
        )
    }
}

/// Reports of both drivers on one problem.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    /// Generational run.
    pub generational: RunReport,
    /// Steady-state run.
    pub steady_state: RunReport,
}

impl Comparison {
    /// Driver with the higher best fitness; generational wins ties.
    pub fn winner(&self) -> Strategy {
        if self.steady_state.best_fitness() > self.generational.best_fitness() {
            Strategy::SteadyState
        } else {
            Strategy::Generational
        }
    }

    /// Steady-state best fitness minus generational best fitness.
    pub fn fitness_gap(&self) -> f64 {
        self.steady_state.best_fitness() - self.generational.best_fitness()
    }
}

/// Runs the generational driver, then the steady-state driver, on `problem`.
///
/// Both configurations are validated before either run starts.
pub fn compare(
    problem: &BeamProblem,
    generational: &GenerationalConfig,
    steady_state: &SteadyStateConfig,
) -> Result<Comparison> {
    generational.validate()?;
    steady_state.validate()?;

    let g = GenerationalRunner::run(problem, generational)?;
    let s = SteadyStateRunner::run(problem, steady_state)?;

    let comparison = Comparison {
        generational: RunReport::new(problem, Strategy::Generational, g),
        steady_state: RunReport::new(problem, Strategy::SteadyState, s),
    };
    tracing::info!(
        generational = comparison.generational.best_fitness(),
        steady_state = comparison.steady_state.best_fitness(),
        winner = %comparison.winner(),
        "driver comparison finished"
    );
    Ok(comparison)
}
