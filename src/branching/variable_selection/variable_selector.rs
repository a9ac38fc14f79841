use crate::branching::SelectionContext;

/// A trait containing the interface for [`VariableSelector`]s, specifying the appropriate hooks
/// into the solver and the methods required for selecting variables.
pub trait VariableSelector<Var> {
    /// Determines which variable to select next if there are any left to branch on. Returns
    /// [`None`] when all variables which have been passed to the selector are assigned.
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var>;

    /// A function which is called after a conflict has been found and processed.
    fn on_conflict(&mut self) {}

    /// A function which is called after a variable is unassigned during backtracking, providing
    /// the value it was fixed to.
    fn on_unassign_integer(&mut self, _variable: Var, _value: i32) {}
}
