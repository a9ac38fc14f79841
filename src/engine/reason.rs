use crate::basic_types::PropositionalConjunction;
use crate::calabash_assert_simple;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::store::PropagatorStore;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::PropagatorId;

/// The reason store holds a reason for each change made by a propagator.
///
/// A [`ReasonRef`] is an index into a log that is truncated on backtracking, in lockstep with the
/// domain trail: a reference recorded on a trail entry stays valid exactly as long as the entry
/// itself.
#[derive(Default, Debug)]
pub(crate) struct ReasonStore {
    reasons: Vec<(PropagatorId, StoredReason)>,
    /// `world_start[w]` is the number of reasons recorded before world `w + 1` was opened.
    world_start: Vec<usize>,
}

impl ReasonStore {
    pub(crate) fn push(&mut self, propagator: PropagatorId, reason: StoredReason) -> ReasonRef {
        let index = self.reasons.len();
        self.reasons.push((propagator, reason));
        ReasonRef(index as u32)
    }

    /// Similar to [`crate::containers::KeyedVec::new_slot`]: reserve the reference for a reason
    /// before knowing whether the change it justifies takes place.
    pub(crate) fn new_slot(&mut self) -> Slot<'_> {
        Slot { store: self }
    }

    /// Evaluate the reason with the given reference, and write the predicates to
    /// `destination_buffer`.
    pub(crate) fn get_or_compute(
        &self,
        reference: ReasonRef,
        context: ExplanationContext<'_>,
        propagators: &mut PropagatorStore,
        destination_buffer: &mut impl Extend<Predicate>,
    ) -> bool {
        let Some(reason) = self.reasons.get(reference.0 as usize) else {
            return false;
        };

        reason
            .1
            .compute(context, reason.0, propagators, destination_buffer);

        true
    }

    pub(crate) fn push_world(&mut self) {
        self.world_start.push(self.reasons.len());
    }

    pub(crate) fn pop_to(&mut self, world: usize) {
        calabash_assert_simple!(world < self.world_start.len());
        self.reasons.truncate(self.world_start[world]);
        self.world_start.truncate(world);
    }

    pub(crate) fn commit_world(&mut self) {
        calabash_assert_simple!(!self.world_start.is_empty(), "cannot commit the root world");
        let _ = self.world_start.pop();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.reasons.len()
    }
}

/// A reference to a reason in the [`ReasonStore`].
#[derive(Default, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ReasonRef(pub(crate) u32);

/// A reason for a propagator to make a change.
#[derive(Debug)]
pub enum Reason {
    /// An eager reason contains the propositional conjunction justifying the change, without the
    /// propagated predicate itself.
    Eager(PropositionalConjunction),
    /// A lazy reason, which is computed on demand rather than up front.
    ///
    /// The payload lets the propagator identify which propagation the reason is for; it should be
    /// enough for the propagator to construct an explanation based on its internal state.
    DynamicLazy(u64),
}

/// The stored form of a [`Reason`].
#[derive(Debug)]
pub(crate) enum StoredReason {
    Eager(PropositionalConjunction),
    DynamicLazy(u64),
}

impl StoredReason {
    /// Evaluate the reason, and write the predicates to the `destination_buffer`.
    pub(crate) fn compute(
        &self,
        context: ExplanationContext<'_>,
        propagator_id: PropagatorId,
        propagators: &mut PropagatorStore,
        destination_buffer: &mut impl Extend<Predicate>,
    ) {
        match self {
            StoredReason::DynamicLazy(code) => destination_buffer.extend(
                propagators[propagator_id]
                    .lazy_explanation(*code, context)
                    .iter()
                    .copied(),
            ),
            StoredReason::Eager(conjunction) => {
                destination_buffer.extend(conjunction.iter().copied())
            }
        }
    }
}

impl From<PropositionalConjunction> for Reason {
    fn from(value: PropositionalConjunction) -> Self {
        Reason::Eager(value)
    }
}

impl From<Predicate> for Reason {
    fn from(value: Predicate) -> Self {
        Reason::Eager(value.into())
    }
}

impl From<u64> for Reason {
    fn from(value: u64) -> Self {
        Reason::DynamicLazy(value)
    }
}

/// A reserved slot for a new reason in the [`ReasonStore`].
#[derive(Debug)]
pub(crate) struct Slot<'a> {
    store: &'a mut ReasonStore,
}

impl Slot<'_> {
    /// The reference this slot will have.
    pub(crate) fn reason_ref(&self) -> ReasonRef {
        ReasonRef(self.store.reasons.len() as u32)
    }

    /// Populate the slot with a [`StoredReason`].
    pub(crate) fn populate(self, propagator: PropagatorId, reason: StoredReason) -> ReasonRef {
        self.store.push(propagator, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conjunction;
    use crate::engine::domains::DomainStore;
    use crate::engine::variables::DomainId;

    #[test]
    fn pushing_a_reason_gives_a_reason_ref_that_can_be_computed() {
        let mut reason_store = ReasonStore::default();
        let domains = DomainStore::default();

        let x = DomainId::new(0);
        let y = DomainId::new(1);

        let conjunction = conjunction!([x == 1] & [y == 2]);
        let reason_ref =
            reason_store.push(PropagatorId(0), StoredReason::Eager(conjunction.clone()));

        assert_eq!(ReasonRef(0), reason_ref);

        let mut out_reason = vec![];
        let _ = reason_store.get_or_compute(
            reason_ref,
            ExplanationContext::new(&domains),
            &mut PropagatorStore::default(),
            &mut out_reason,
        );

        assert_eq!(conjunction.as_slice(), &out_reason);
    }

    #[test]
    fn the_reason_log_follows_backtracking() {
        let mut reason_store = ReasonStore::default();
        let x = DomainId::new(0);

        reason_store.push(PropagatorId(0), StoredReason::Eager(conjunction!([x >= 1])));
        reason_store.push_world();
        let _ = reason_store.push(
            PropagatorId(0),
            StoredReason::Eager(conjunction!([x >= 2])),
        );
        assert_eq!(2, reason_store.len());

        reason_store.pop_to(0);
        // The root-level reason survives; the popped world's reason is gone.
        assert_eq!(1, reason_store.len());
    }

    #[test]
    fn a_reference_past_the_log_does_not_resolve() {
        let reason_store = ReasonStore::default();
        let domains = DomainStore::default();

        let mut out_reason: Vec<Predicate> = vec![];
        let found = reason_store.get_or_compute(
            ReasonRef(3),
            ExplanationContext::new(&domains),
            &mut PropagatorStore::default(),
            &mut out_reason,
        );

        assert!(!found);
        assert!(out_reason.is_empty());
    }
}
