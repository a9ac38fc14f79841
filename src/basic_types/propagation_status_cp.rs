use super::PropositionalConjunction;
use crate::engine::domains::EmptyDomain;
use crate::engine::propagation::PropagatorId;

/// The result of invoking a constraint programming propagator. The propagation can either succeed
/// or identify a conflict. The necessary conditions for the conflict must be captured in the error
/// variant, i.e. a propositional conjunction.
pub type PropagationStatusCP = Result<(), Inconsistency>;

#[derive(Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A domain operation wiped out a domain. The details of the triggering change are recorded on
    /// the domain trail by the context that performed the operation.
    EmptyDomain,
    /// The propagator detected that its relation cannot be satisfied without performing a domain
    /// operation.
    Conflict(PropagatorConflict),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl From<PropagatorConflict> for Inconsistency {
    fn from(conflict: PropagatorConflict) -> Self {
        Inconsistency::Conflict(conflict)
    }
}

/// A conflict stated by a propagator. A propagator that identifies a conflict that is _not_ an
/// empty domain describes that conflict with this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropagatorConflict {
    /// The conjunction that describes the infeasible partial assignment.
    pub(crate) conjunction: PropositionalConjunction,
    /// The propagator which identified the conflict.
    pub(crate) propagator: PropagatorId,
}
