use enumset::EnumSet;

use super::AffineView;
use super::IntegerVariable;
use super::TransformableVariable;
use crate::calabash_assert_simple;
use crate::containers::StorageKey;
use crate::engine::domains::DomainStore;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;

/// A structure which represents the most basic [`IntegerVariable`]; it is simply the id which
/// links to a domain (hence the name).
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct DomainId {
    id: u32,
}

impl DomainId {
    pub fn new(id: u32) -> Self {
        calabash_assert_simple!(id >> 30 == 0, "The first two bits are used as flags");
        DomainId { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl IntegerVariable for DomainId {
    type AffineView = AffineView<Self>;

    fn lower_bound(&self, store: &DomainStore) -> i32 {
        store.lower_bound(*self)
    }

    fn upper_bound(&self, store: &DomainStore) -> i32 {
        store.upper_bound(*self)
    }

    fn contains(&self, store: &DomainStore, value: i32) -> bool {
        store.contains(*self, value)
    }

    fn next_value(&self, store: &DomainStore, value: i32) -> Option<i32> {
        store.next_value(*self, value)
    }

    fn previous_value(&self, store: &DomainStore, value: i32) -> Option<i32> {
        store.previous_value(*self, value)
    }

    fn size(&self, store: &DomainStore) -> i64 {
        store.size(*self)
    }

    fn iterate_domain(&self, store: &DomainStore) -> impl Iterator<Item = i32> {
        store.iterate_domain(*self)
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        watchers.watch_all(*self, events);
    }

    fn unpack_event(&self, event: DomainEvent) -> DomainEvent {
        event
    }
}

impl TransformableVariable<AffineView<DomainId>> for DomainId {
    fn scaled(&self, scale: i32) -> AffineView<DomainId> {
        AffineView::new(*self, scale, 0)
    }

    fn offset(&self, offset: i32) -> AffineView<DomainId> {
        AffineView::new(*self, 1, offset)
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId::new(index as u32)
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
