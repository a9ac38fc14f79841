//! Contains the structures corresponding to solution iteration.

use crate::basic_types::CSPSolverExecutionFlag;
use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::engine::termination::TerminationCondition;
use crate::engine::ConstraintSatisfactionSolver;
use crate::predicate;
use crate::predicates::Predicate;

/// A struct which allows the retrieval of multiple solutions to a satisfaction problem.
///
/// Each solution is blocked by a nogood over the full assignment before the search resumes, so
/// every total assignment is produced exactly once.
#[derive(Debug)]
pub struct SolutionIterator<'solver, 'brancher, 'termination, B, T> {
    solver: &'solver mut ConstraintSatisfactionSolver,
    brancher: &'brancher mut B,
    termination: &'termination mut T,
    next_blocking_nogood: Option<Vec<Predicate>>,
    has_solution: bool,
}

impl<'solver, 'brancher, 'termination, B: Brancher, T: TerminationCondition>
    SolutionIterator<'solver, 'brancher, 'termination, B, T>
{
    pub(crate) fn new(
        solver: &'solver mut ConstraintSatisfactionSolver,
        brancher: &'brancher mut B,
        termination: &'termination mut T,
    ) -> Self {
        SolutionIterator {
            solver,
            brancher,
            termination,
            next_blocking_nogood: None,
            has_solution: false,
        }
    }

    /// Find a new solution by blocking the previous one from being found.
    pub fn next_solution(&mut self) -> IteratedSolution {
        if let Some(blocking_nogood) = self.next_blocking_nogood.take() {
            self.solver.restore_state_at_root(self.brancher);
            if self.solver.add_nogood(blocking_nogood).is_err() {
                return IteratedSolution::Finished;
            }
        }

        match self.solver.solve(self.termination, self.brancher) {
            CSPSolverExecutionFlag::Feasible => {
                self.has_solution = true;
                let reference = self.solver.get_solution_reference();
                self.brancher.on_solution(reference);
                let solution: Solution = reference.into();
                self.next_blocking_nogood = Some(blocking_nogood(&solution));
                IteratedSolution::Solution(solution)
            }
            CSPSolverExecutionFlag::Infeasible if !self.has_solution => {
                IteratedSolution::Unsatisfiable
            }
            CSPSolverExecutionFlag::Infeasible => IteratedSolution::Finished,
            CSPSolverExecutionFlag::Timeout => IteratedSolution::Unknown,
        }
    }
}

/// Creates a nogood which prevents the given total assignment from occurring again.
fn blocking_nogood(solution: &Solution) -> Vec<Predicate> {
    solution
        .domains()
        .map(|domain| predicate!(domain == solution.value(domain)))
        .collect()
}

/// The status of a call to [`SolutionIterator::next_solution`].
#[derive(Debug)]
pub enum IteratedSolution {
    /// A new solution was identified.
    Solution(Solution),
    /// No more solutions exist.
    Finished,
    /// The solver was terminated during the search.
    Unknown,
    /// There exists no solution.
    Unsatisfiable,
}
