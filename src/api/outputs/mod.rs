pub mod solution_iterator;

pub use crate::basic_types::Solution;
pub use crate::basic_types::SolutionReference;

/// The result of a call to [`crate::Solver::satisfy`].
#[derive(Debug)]
pub enum SatisfactionResult {
    /// A solution was found; the solver is restored to the root afterwards, so further
    /// constraints can be posted before solving again.
    Satisfiable(Solution),
    /// There is no solution to the satisfaction problem.
    Unsatisfiable,
    /// It is not known whether a solution exists; a
    /// [`crate::termination::TerminationCondition`] triggered before the search concluded.
    Unknown,
}

/// The result of a call to [`crate::Solver::minimise`] or [`crate::Solver::maximise`].
#[derive(Debug)]
pub enum OptimisationResult {
    /// An optimal solution was found and proven optimal.
    Optimal(Solution),
    /// A solution was found, but the search was stopped before it could be proven optimal.
    Satisfiable(Solution),
    /// There is no solution to the problem.
    Unsatisfiable,
    /// No solution was found before the search was stopped.
    Unknown,
}
