use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

use super::Propagator;
use super::PropagatorId;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// A central store for propagators.
///
/// Slots of unposted propagators are kept vacant and reused, so a [`PropagatorId`] is only valid
/// while its propagator is posted.
#[derive(Default)]
pub(crate) struct PropagatorStore {
    propagators: KeyedVec<PropagatorId, Option<Box<dyn Propagator>>>,
    vacant_slots: Vec<PropagatorId>,
}

/// A typed wrapper around a propagator id that allows retrieving concrete propagators instead of
/// type-erased `Box<dyn Propagator>` instances.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PropagatorHandle<P> {
    id: PropagatorId,
    propagator: PhantomData<P>,
}

impl<P> PropagatorHandle<P> {
    pub(crate) fn new(id: PropagatorId) -> Self {
        PropagatorHandle {
            id,
            propagator: PhantomData,
        }
    }

    /// Get a type-erased handle to the propagator.
    pub fn untyped(self) -> PropagatorId {
        self.id
    }
}

impl<P> Clone for PropagatorHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PropagatorHandle<P> {}

impl PropagatorStore {
    /// Claim the id the next posted propagator will get.
    pub(crate) fn reserve(&mut self) -> PropagatorId {
        match self.vacant_slots.pop() {
            Some(id) => id,
            None => self.propagators.push(None),
        }
    }

    /// Put a propagator into a slot claimed with [`PropagatorStore::reserve`].
    pub(crate) fn populate(&mut self, id: PropagatorId, propagator: Box<dyn Propagator>) {
        debug_assert!(self.propagators[id].is_none());
        self.propagators[id] = Some(propagator);
    }

    /// Remove the propagator, freeing its slot for reuse.
    pub(crate) fn remove(&mut self, id: PropagatorId) -> Box<dyn Propagator> {
        let propagator = self.propagators[id]
            .take()
            .expect("cannot remove a propagator that is not posted");
        self.vacant_slots.push(id);
        propagator
    }

    pub(crate) fn is_posted(&self, id: PropagatorId) -> bool {
        self.propagators
            .get(id)
            .is_some_and(|slot| slot.is_some())
    }

    /// Take the propagator out of its slot temporarily, so that it can be borrowed alongside the
    /// rest of the engine state. Must be paired with [`PropagatorStore::untake`].
    pub(crate) fn take(&mut self, id: PropagatorId) -> Box<dyn Propagator> {
        self.propagators[id]
            .take()
            .expect("cannot take a propagator that is not posted")
    }

    pub(crate) fn untake(&mut self, id: PropagatorId, propagator: Box<dyn Propagator>) {
        debug_assert!(self.propagators[id].is_none());
        self.propagators[id] = Some(propagator);
    }

    /// The ids of all posted propagators.
    pub(crate) fn ids(&self) -> impl Iterator<Item = PropagatorId> + '_ {
        self.propagators
            .keys()
            .filter(|id| self.propagators[*id].is_some())
    }

    pub(crate) fn iter_propagators_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Box<dyn Propagator>> + '_ {
        self.propagators.iter_mut().flatten()
    }

    /// Get an exclusive reference to the propagator behind the handle, if it is posted and of the
    /// handle's type.
    pub(crate) fn get_propagator_mut<P: Propagator + 'static>(
        &mut self,
        handle: PropagatorHandle<P>,
    ) -> Option<&mut P> {
        self.propagators[handle.id]
            .as_deref_mut()
            .and_then(|propagator| propagator.downcast_mut())
    }
}

impl Index<PropagatorId> for PropagatorStore {
    type Output = dyn Propagator;

    fn index(&self, index: PropagatorId) -> &Self::Output {
        self.propagators[index]
            .as_deref()
            .expect("indexed an unposted propagator")
    }
}

impl IndexMut<PropagatorId> for PropagatorStore {
    fn index_mut(&mut self, index: PropagatorId) -> &mut Self::Output {
        self.propagators[index]
            .as_deref_mut()
            .expect("indexed an unposted propagator")
    }
}

impl Debug for PropagatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self
            .propagators
            .iter()
            .map(|slot| match slot {
                Some(propagator) => propagator.name(),
                None => "<vacant>",
            })
            .collect();
        f.debug_struct("PropagatorStore")
            .field("propagators", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropagationStatusCP;
    use crate::engine::propagation::PropagationContextMut;
    use crate::engine::propagation::Priority;

    #[derive(Debug)]
    struct Dummy;

    impl Propagator for Dummy {
        fn name(&self) -> &str {
            "Dummy"
        }

        fn priority(&self) -> Priority {
            Priority::Unary
        }

        fn propagate(&mut self, _context: PropagationContextMut) -> PropagationStatusCP {
            Ok(())
        }
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut store = PropagatorStore::default();

        let first = store.reserve();
        store.populate(first, Box::new(Dummy));
        let second = store.reserve();
        store.populate(second, Box::new(Dummy));

        let _ = store.remove(first);
        assert!(!store.is_posted(first));
        assert!(store.is_posted(second));

        let reused = store.reserve();
        assert_eq!(first, reused);
        store.populate(reused, Box::new(Dummy));
        assert_eq!(2, store.ids().count());
    }

    #[test]
    fn typed_handles_downcast() {
        let mut store = PropagatorStore::default();
        let id = store.reserve();
        store.populate(id, Box::new(Dummy));

        let handle: PropagatorHandle<Dummy> = PropagatorHandle::new(id);
        assert!(store.get_propagator_mut(handle).is_some());
    }
}
