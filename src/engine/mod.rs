//! The solver core: reversible memory, domains, the propagation engine, and the search loop.

pub(crate) mod conflict_analysis;
mod constraint_satisfaction_solver;
pub mod domains;
pub mod notifications;
pub mod predicates;
pub mod propagation;
pub(crate) mod propagator_queue;
pub(crate) mod reason;
mod restart_strategy;
mod solver_statistics;
pub(crate) mod state;
pub mod termination;
pub mod test_solver;
pub mod trailed;
pub(crate) mod variable_names;
pub mod variables;

pub use constraint_satisfaction_solver::ConflictResolution;
pub use constraint_satisfaction_solver::ConstraintSatisfactionSolver;
pub use constraint_satisfaction_solver::SatisfactionSolverOptions;
pub use restart_strategy::RestartOptions;
pub use solver_statistics::SolverStatistics;
