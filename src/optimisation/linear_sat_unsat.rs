use log::debug;

use super::OptimisationDirection;
use crate::api::outputs::OptimisationResult;
use crate::basic_types::CSPSolverExecutionFlag;
use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::engine::termination::TerminationCondition;
use crate::engine::ConstraintSatisfactionSolver;
use crate::predicates::PredicateConstructor;
use crate::variables::IntegerVariable;
use crate::variables::TransformableVariable;

/// The linear SAT-UNSAT optimisation procedure: find a solution, install a cut demanding a
/// strictly better objective, and resume from the root; the last solution found is optimal once
/// the cut makes the model infeasible.
pub(crate) fn optimise<Var, B, T>(
    solver: &mut ConstraintSatisfactionSolver,
    brancher: &mut B,
    termination: &mut T,
    direction: OptimisationDirection,
    objective: Var,
) -> OptimisationResult
where
    Var: IntegerVariable,
    B: Brancher,
    T: TerminationCondition,
{
    // Normalise to minimisation.
    let objective = match direction {
        OptimisationDirection::Minimise => objective.scaled(1),
        OptimisationDirection::Maximise => objective.scaled(-1),
    };

    let mut best: Option<Solution> = None;

    loop {
        match solver.solve(termination, brancher) {
            CSPSolverExecutionFlag::Feasible => {
                let reference = solver.get_solution_reference();
                brancher.on_solution(reference);
                let objective_value = reference.value(&objective);
                best = Some(reference.into());
                debug!(
                    "{}: solution with objective {objective_value}",
                    solver.model_name()
                );

                // Demand a strictly better solution from here on.
                solver.restore_state_at_root(brancher);
                let cut = objective.upper_bound_predicate(objective_value - 1);
                if solver.add_root_predicate(cut).is_err() {
                    return OptimisationResult::Optimal(
                        best.expect("a solution was just recorded"),
                    );
                }
            }
            CSPSolverExecutionFlag::Infeasible => {
                return match best {
                    Some(solution) => OptimisationResult::Optimal(solution),
                    None => OptimisationResult::Unsatisfiable,
                };
            }
            CSPSolverExecutionFlag::Timeout => {
                return match best {
                    Some(solution) => OptimisationResult::Satisfiable(solution),
                    None => OptimisationResult::Unknown,
                };
            }
        }
    }
}
