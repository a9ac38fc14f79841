use enumset::EnumSet;

use crate::engine::domains::DomainStore;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::predicates::predicate_constructor::PredicateConstructor;

/// A trait specifying the required behaviour of an integer variable such as retrieving a
/// lower-bound ([`IntegerVariable::lower_bound`]).
pub trait IntegerVariable:
    Clone + PredicateConstructor<Value = i32> + TransformableVariable<Self::AffineView>
{
    type AffineView: IntegerVariable + 'static;

    /// Get the lower bound of the variable.
    fn lower_bound(&self, store: &DomainStore) -> i32;

    /// Get the upper bound of the variable.
    fn upper_bound(&self, store: &DomainStore) -> i32;

    /// Determine whether the value is in the domain of this variable.
    fn contains(&self, store: &DomainStore, value: i32) -> bool;

    /// The least domain value strictly greater than `value`, if any.
    fn next_value(&self, store: &DomainStore, value: i32) -> Option<i32>;

    /// The greatest domain value strictly smaller than `value`, if any.
    fn previous_value(&self, store: &DomainStore, value: i32) -> Option<i32>;

    /// The number of values in the domain.
    fn size(&self, store: &DomainStore) -> i64;

    /// Iterate over the values of the domain in increasing order of the underlying domain.
    fn iterate_domain(&self, store: &DomainStore) -> impl Iterator<Item = i32>;

    /// Register a watch for this variable on the given domain events.
    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>);

    /// Decode a domain event of the underlying domain into an event for this view.
    fn unpack_event(&self, event: DomainEvent) -> DomainEvent;
}

/// Trait for transforming a variable into an [`super::AffineView`] of itself.
pub trait TransformableVariable<View> {
    /// Get a variable which domain is scaled by `scale`.
    ///
    /// The scaled domain will have holes in it. E.g. if we have `dom(x) = {1, 2}`, then
    /// `dom(x.scaled(2)) = {2, 4}` and *not* `dom(x.scaled(2)) = {1, 2, 3, 4}`.
    fn scaled(&self, scale: i32) -> View;

    /// Get a variable which domain has a constant offset to it.
    fn offset(&self, offset: i32) -> View;
}
