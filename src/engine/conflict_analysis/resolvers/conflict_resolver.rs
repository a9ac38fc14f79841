use std::fmt::Debug;

use super::super::ConflictAnalysisContext;

/// The interface to the conflict-resolution sub-solver. Implementations restore the solver to a
/// state from which the search can continue; how they do so (chronological refutation, clause
/// learning) is up to them.
pub(crate) trait ConflictResolver: Debug {
    /// Resolve the conflict in `context`. The solver is guaranteed not to be at the root.
    ///
    /// Returns `false` when resolution proved the model infeasible.
    fn resolve_conflict(&mut self, context: &mut ConflictAnalysisContext<'_>) -> bool;
}
