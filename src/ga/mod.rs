//! Genetic algorithm drivers.
//!
//! Problems plug in by implementing [`GaProblem`], which says how to create,
//! evaluate, recombine and mutate individuals. Two drivers run them:
//!
//! - [`GenerationalRunner`]: replaces the whole population every cycle,
//!   keeping a fraction of elites.
//! - [`SteadyStateRunner`]: replaces a few slots per cycle under an
//!   evaluation budget, with stagnation stopping and diversity-injection
//!   restarts.
//!
//! Both maximize fitness, track a running best across the whole run and
//! record [`Snapshot`]s at a configurable cadence.
//!
//! # Submodules
//!
//! - [`operators`]: crossover and mutation on complex weight sequences
//! - [`population`]: evaluation, ordering and diversity helpers
//! - [`multi_objective`]: Pareto ranking and crowding distance
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Syswerda (1991), "A Study of Reproduction in Generational and Steady-State
//!   Genetic Algorithms"

mod config;
mod generational;
pub mod multi_objective;
pub mod operators;
pub mod population;
mod result;
mod selection;
mod steady_state;
mod types;

pub use config::{GaConfig, GenerationalConfig, Replacement, SteadyStateConfig};
pub use generational::GenerationalRunner;
pub use result::{OptimizationResult, Snapshot, StopReason};
pub use selection::Selection;
pub use steady_state::SteadyStateRunner;
pub use types::{GaProblem, Individual};
