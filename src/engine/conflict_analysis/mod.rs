//! Turning a caught contradiction back into search progress.
//!
//! The [`resolvers::ConflictResolver`] is the boundary behind which clause learning lives: the
//! engine hands it the conflict and the resolver either refutes the last decision
//! ([`resolvers::NoLearningResolver`]) or derives a first-UIP nogood over the trail and installs
//! it in the nogood propagator ([`resolvers::ResolutionResolver`]).

mod conflict_analysis_context;
mod learned_nogood;
pub(crate) mod resolvers;

pub(crate) use conflict_analysis_context::ConflictAnalysisContext;
pub(crate) use learned_nogood::LearnedNogood;
pub(crate) use resolvers::ConflictResolver;
pub(crate) use resolvers::NoLearningResolver;
pub(crate) use resolvers::ResolutionResolver;
