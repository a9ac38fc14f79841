use enumset::EnumSet;

use super::IntegerVariable;
use super::TransformableVariable;
use crate::calabash_assert_moderate;
use crate::calabash_assert_simple;
use crate::engine::domains::DomainStore;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::predicates::predicate_constructor::PredicateConstructor;
use crate::math::num_ext::div_ceil;
use crate::math::num_ext::div_floor;

/// A view over `inner` with domain `{scale * v + offset | v ∈ dom(inner)}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AffineView<Inner> {
    inner: Inner,
    scale: i32,
    offset: i32,
}

impl<Inner> AffineView<Inner> {
    pub fn new(inner: Inner, scale: i32, offset: i32) -> Self {
        calabash_assert_simple!(scale != 0, "an affine view cannot have scale 0");
        AffineView {
            inner,
            scale,
            offset,
        }
    }

    /// Apply the transformation to a value of the underlying variable.
    fn map(&self, value: i32) -> i32 {
        self.scale * value + self.offset
    }

    /// Invert the transformation, rounding in the given direction when the value is not an exact
    /// image.
    fn invert_floor(&self, value: i32) -> i64 {
        div_floor((value - self.offset) as i64, self.scale as i64)
    }

    fn invert_ceil(&self, value: i32) -> i64 {
        div_ceil((value - self.offset) as i64, self.scale as i64)
    }

    /// Invert an exact image of the transformation.
    fn invert_exact(&self, value: i32) -> Option<i32> {
        let shifted = value - self.offset;
        (shifted % self.scale == 0).then(|| shifted / self.scale)
    }
}

impl<Inner: IntegerVariable + 'static> IntegerVariable for AffineView<Inner> {
    type AffineView = AffineView<Inner>;

    fn lower_bound(&self, store: &DomainStore) -> i32 {
        if self.scale >= 0 {
            self.map(self.inner.lower_bound(store))
        } else {
            self.map(self.inner.upper_bound(store))
        }
    }

    fn upper_bound(&self, store: &DomainStore) -> i32 {
        if self.scale >= 0 {
            self.map(self.inner.upper_bound(store))
        } else {
            self.map(self.inner.lower_bound(store))
        }
    }

    fn contains(&self, store: &DomainStore, value: i32) -> bool {
        match self.invert_exact(value) {
            Some(inner_value) => self.inner.contains(store, inner_value),
            None => false,
        }
    }

    fn next_value(&self, store: &DomainStore, value: i32) -> Option<i32> {
        if self.scale > 0 {
            self.inner
                .next_value(store, self.invert_floor(value) as i32)
                .map(|inner_value| self.map(inner_value))
        } else {
            self.inner
                .previous_value(store, self.invert_ceil(value) as i32)
                .map(|inner_value| self.map(inner_value))
        }
    }

    fn previous_value(&self, store: &DomainStore, value: i32) -> Option<i32> {
        if self.scale > 0 {
            self.inner
                .previous_value(store, self.invert_ceil(value) as i32)
                .map(|inner_value| self.map(inner_value))
        } else {
            self.inner
                .next_value(store, self.invert_floor(value) as i32)
                .map(|inner_value| self.map(inner_value))
        }
    }

    fn size(&self, store: &DomainStore) -> i64 {
        self.inner.size(store)
    }

    fn iterate_domain(&self, store: &DomainStore) -> impl Iterator<Item = i32> {
        self.inner
            .iterate_domain(store)
            .map(|value| self.map(value))
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        let events = if self.scale < 0 {
            swap_bound_events(events)
        } else {
            events
        };
        self.inner.watch_all(watchers, events);
    }

    fn unpack_event(&self, event: DomainEvent) -> DomainEvent {
        if self.scale < 0 {
            match self.inner.unpack_event(event) {
                DomainEvent::LowerBound => DomainEvent::UpperBound,
                DomainEvent::UpperBound => DomainEvent::LowerBound,
                other => other,
            }
        } else {
            self.inner.unpack_event(event)
        }
    }
}

fn swap_bound_events(events: EnumSet<DomainEvent>) -> EnumSet<DomainEvent> {
    let mut swapped = events;
    swapped.remove_all(DomainEvent::LowerBound | DomainEvent::UpperBound);
    if events.contains(DomainEvent::LowerBound) {
        swapped.insert(DomainEvent::UpperBound);
    }
    if events.contains(DomainEvent::UpperBound) {
        swapped.insert(DomainEvent::LowerBound);
    }
    swapped
}

impl<Inner: IntegerVariable> TransformableVariable<AffineView<Inner>> for AffineView<Inner> {
    fn scaled(&self, scale: i32) -> AffineView<Inner> {
        AffineView::new(
            self.inner.clone(),
            self.scale * scale,
            self.offset * scale,
        )
    }

    fn offset(&self, offset: i32) -> AffineView<Inner> {
        AffineView::new(self.inner.clone(), self.scale, self.offset + offset)
    }
}

impl<Inner: PredicateConstructor<Value = i32>> PredicateConstructor for AffineView<Inner> {
    type Value = i32;

    fn lower_bound_predicate(&self, bound: Self::Value) -> Predicate {
        // scale * v + offset >= bound
        if self.scale > 0 {
            let inner_bound = div_ceil((bound - self.offset) as i64, self.scale as i64);
            self.inner.lower_bound_predicate(inner_bound as i32)
        } else {
            let inner_bound = div_floor((bound - self.offset) as i64, self.scale as i64);
            self.inner.upper_bound_predicate(inner_bound as i32)
        }
    }

    fn upper_bound_predicate(&self, bound: Self::Value) -> Predicate {
        // scale * v + offset <= bound
        if self.scale > 0 {
            let inner_bound = div_floor((bound - self.offset) as i64, self.scale as i64);
            self.inner.upper_bound_predicate(inner_bound as i32)
        } else {
            let inner_bound = div_ceil((bound - self.offset) as i64, self.scale as i64);
            self.inner.lower_bound_predicate(inner_bound as i32)
        }
    }

    fn equality_predicate(&self, bound: Self::Value) -> Predicate {
        let shifted = bound - self.offset;
        calabash_assert_moderate!(
            shifted % self.scale == 0,
            "equality predicate on an affine view requires an exact image"
        );
        self.inner.equality_predicate(shifted / self.scale)
    }

    fn disequality_predicate(&self, bound: Self::Value) -> Predicate {
        let shifted = bound - self.offset;
        calabash_assert_moderate!(
            shifted % self.scale == 0,
            "disequality predicate on an affine view requires an exact image"
        );
        self.inner.disequality_predicate(shifted / self.scale)
    }
}

impl<Inner: std::fmt::Debug> std::fmt::Debug for AffineView<Inner> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale != 1 {
            write!(f, "{} * ", self.scale)?;
        }
        write!(f, "({:?})", self.inner)?;
        if self.offset != 0 {
            write!(f, " + {}", self.offset)?;
        }
        Ok(())
    }
}
