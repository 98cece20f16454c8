//! AC-3 arc-consistency propagation and MRV/LCV backtracking search over a crossword's
//! constraint graph, with an oracle-backed fallback when the dictionary runs dry.
//!
//! [`Solver`] is the entry point: build one from a validated [`crossgen_grid::GridModel`],
//! a [`crossgen_dictionary::Dictionary`], an [`crossgen_oracle::OracleAdapter`], and a
//! [`Config`], then call [`Solver::solve`].

mod ac3;
pub mod config;
mod domain;
pub mod error;
mod solver;
pub mod stats;

pub use ac3::PropagateFailure;
pub use config::{Config, GridConfig, OnLimitReached, OracleConfig, SolverConfig};
pub use error::SolverError;
pub use solver::{SolveOutcome, Solution, Solver};
pub use stats::Stats;
