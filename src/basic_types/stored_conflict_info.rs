use super::PropagatorConflict;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::reason::ReasonRef;

/// A conflict as caught by the propagation engine, with enough information for conflict analysis
/// to reconstruct a conflicting conjunction of predicates.
#[derive(Clone, Debug)]
pub enum StoredConflictInfo {
    /// A propagator reported an inconsistency without performing a domain operation.
    Propagator(PropagatorConflict),
    /// Posting `predicate` wiped out its domain. The reason for the posting is recorded so that
    /// conflict analysis can resolve it; refutations posted by the search have no reason.
    EmptyDomain {
        predicate: Predicate,
        reason: Option<ReasonRef>,
    },
    /// A conflict was derived while no decision was on the trail; the model is infeasible.
    RootLevelConflict,
}
