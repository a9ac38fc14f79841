use crate::branching::SelectionContext;
use crate::engine::predicates::predicate::Predicate;

/// A trait containing the interface for [`ValueSelector`]s, specifying the appropriate hooks into
/// the solver and the methods required for selecting a value for a given variable.
pub trait ValueSelector<Var> {
    /// Determines which predicate to post as the left branch of the decision on
    /// `decision_variable` (e.g. `[x == 5]` or `[x <= 5]`). The decision variable is guaranteed
    /// to be unfixed.
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: Var,
    ) -> Predicate;

    /// A function which is called after a variable is unassigned during backtracking, providing
    /// the value it was fixed to.
    fn on_unassign_integer(&mut self, _variable: Var, _value: i32) {}
}
