use crate::engine::domains::DomainStore;

/// The context handed to a propagator when it is asked to turn a lazy reason into a conjunction
/// of predicates.
///
/// Explanations are requested during conflict analysis, before any backtracking has happened, so
/// the domains are at least as tight as at the moment of the propagation being explained.
#[derive(Debug)]
pub struct ExplanationContext<'a> {
    store: &'a DomainStore,
}

impl<'a> ExplanationContext<'a> {
    pub(crate) fn new(store: &'a DomainStore) -> Self {
        ExplanationContext { store }
    }
}

impl super::propagation_context::HasDomainStore for ExplanationContext<'_> {
    fn domain_store(&self) -> &DomainStore {
        self.store
    }
}
