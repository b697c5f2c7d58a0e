//! Monoalphabetic substitution: the mapping type and the automatic solver

mod mapping;
mod solver;

pub use mapping::SubstitutionMapping;
pub use solver::{
    Algorithm, RestartOutcome, SolveOutcome, SolverConfig, SubstitutionSolver, MAX_ITERATIONS, MAX_RESTARTS,
};
