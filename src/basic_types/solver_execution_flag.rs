/// The result of a call to [`crate::engine::ConstraintSatisfactionSolver::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CSPSolverExecutionFlag {
    /// A solution was found; the domains describe the satisfying assignment.
    Feasible,
    /// The search space was exhausted without finding a solution.
    Infeasible,
    /// A termination condition triggered before the search could conclude.
    Timeout,
}
