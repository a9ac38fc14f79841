use crate::basic_types::StoredConflictInfo;
use crate::branching::Brancher;
use crate::engine::propagation::store::PropagatorHandle;
use crate::engine::state::State;
use crate::propagators::nogoods::NogoodPropagator;

/// The view of the solver handed to a
/// [`crate::engine::conflict_analysis::resolvers::ConflictResolver`].
pub(crate) struct ConflictAnalysisContext<'a> {
    pub(crate) state: &'a mut State,
    pub(crate) conflict: StoredConflictInfo,
    pub(crate) brancher: &'a mut dyn Brancher,
    pub(crate) nogood_propagator: PropagatorHandle<NogoodPropagator>,
}

impl ConflictAnalysisContext<'_> {
    /// Backtrack to `world`, keeping the brancher informed of the variables that become unfixed.
    pub(crate) fn backtrack(&mut self, world: u32) {
        self.brancher.on_backtrack();
        for (domain, value) in self.state.restore_to(world) {
            self.brancher.on_unassign_integer(domain, value);
        }
        self.brancher.synchronise(&self.state.domains);
    }
}
