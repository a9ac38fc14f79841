use crate::basic_types::SolutionReference;
use crate::branching::SelectionContext;
use crate::engine::domains::DomainStore;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::variables::DomainId;

/// A trait for defining a branching strategy, oftentimes a combination of a
/// [`crate::branching::VariableSelector`] and a [`crate::branching::ValueSelector`].
///
/// Implementations define how the search proceeds by proposing the next decision. It is required
/// that the resulting decision shrinks the domain of at least one variable.
pub trait Brancher {
    /// Returns the next decision as a [`Predicate`], or [`None`] if all variables under
    /// consideration are assigned.
    ///
    /// This method **cannot** perform the assignment of the decision; it only returns a
    /// suggestion. The [`SelectionContext`] is mutable to account for the usage of random
    /// generators.
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Predicate>;

    /// A function which is called after a conflict has been found and processed.
    fn on_conflict(&mut self) {}

    /// This method is called when a solution is found.
    fn on_solution(&mut self, _solution: SolutionReference) {}

    /// A function which is called whenever a backtrack occurs, before the domains are rewound.
    fn on_backtrack(&mut self) {}

    /// A function which is called after a [`DomainId`] is unassigned during backtracking (i.e.
    /// when it was fixed but is no longer), providing the value it was fixed to. This method can
    /// be called multiple times per backtracking operation.
    fn on_unassign_integer(&mut self, _variable: DomainId, _value: i32) {}

    /// A function which is called when a [`Predicate`] appears in a conflict during conflict
    /// analysis.
    fn on_appearance_in_conflict_predicate(&mut self, _predicate: Predicate) {}

    /// This method is called whenever a restart is performed.
    fn on_restart(&mut self) {}

    /// Called after backtracking, once the domains have been rewound, to reset internal data
    /// structures.
    fn synchronise(&mut self, _store: &DomainStore) {}

    /// Whether a restart would make this brancher take the exact same decisions again. The solver
    /// skips restarts for such branchers unless learning changes the propagation.
    fn is_restart_pointless(&self) -> bool {
        true
    }
}
