use super::super::ConflictAnalysisContext;
use super::ConflictResolver;

/// Resolve conflicts by backtracking one world and posting the negation of the last decision.
#[derive(Default, Debug, Clone, Copy)]
pub(crate) struct NoLearningResolver;

impl ConflictResolver for NoLearningResolver {
    fn resolve_conflict(&mut self, context: &mut ConflictAnalysisContext<'_>) -> bool {
        let last_decision = context
            .state
            .find_last_decision()
            .expect("the solver is not at the root, so there exists a last decision");

        let parent = context.state.current_world() - 1;
        context.backtrack(parent);

        let posted = context
            .state
            .post(!last_decision)
            .expect("refuting a decision cannot empty the domain");
        debug_assert!(posted, "the decision was unassigned after backtracking");

        true
    }
}
