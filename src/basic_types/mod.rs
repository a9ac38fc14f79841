mod constraint_operation_error;
mod propagation_status_cp;
mod propositional_conjunction;
mod random;
pub(crate) mod sequence_generators;
mod solution;
mod solver_execution_flag;
mod stored_conflict_info;

pub use constraint_operation_error::ConstraintOperationError;
pub use propagation_status_cp::*;
pub use propositional_conjunction::PropositionalConjunction;
pub use random::Random;
#[cfg(test)]
pub(crate) use random::tests;
pub use solution::*;
pub use solver_execution_flag::CSPSolverExecutionFlag;
pub use stored_conflict_info::StoredConflictInfo;
