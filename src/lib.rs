//! Genetic-algorithm beamforming for joint communication and sensing.
//!
//! Optimizes the complex weights of a uniform linear array so one
//! transmission serves a communication user and illuminates a set of
//! sensing directions while keeping sidelobes low.
//!
//! - [`antenna`]: array response, beam gain and radiation patterns
//! - [`weights`]: unit-power weight vectors
//! - [`fitness`]: penalty and mask-matching objectives
//! - [`problem`]: scenario, individuals and the [`ga::GaProblem`]
//!   implementation tying them together
//! - [`ga`]: generational and steady-state drivers with their operators
//! - [`report`]: run summaries and driver comparison
//!
//! # Example
//!
//! ```
//! use u_beamga::ga::{SteadyStateConfig, SteadyStateRunner};
//! use u_beamga::problem::{BeamProblem, Scenario};
//!
//! let problem = BeamProblem::new(Scenario::default()).unwrap();
//! let config = SteadyStateConfig::fast()
//!     .with_max_evaluations(500)
//!     .with_seed(42);
//! let result = SteadyStateRunner::run(&problem, &config).unwrap();
//! println!("best fitness {:.3}", result.best_fitness);
//! ```
//!
//! # Architecture
//!
//! Everything is single-threaded and deterministic for a given seed. The
//! crate logs through `tracing` and never installs a subscriber; rendering
//! and persistence of results are left to the caller.

pub mod antenna;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod problem;
pub mod random;
pub mod report;
pub mod weights;

pub use error::{ConfigError, Result};
