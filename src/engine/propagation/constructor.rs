use super::contexts::HasDomainStore;
use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
use crate::engine::domains::DomainStore;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::NotificationEngine;
use crate::engine::notifications::Watchers;
use crate::engine::trailed::Environment;
use crate::engine::trailed::RevInt;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;

/// A value which can be turned into a [`Propagator`]: it carries the arguments of the constraint
/// and, when the propagator is posted, registers the watched variables and allocates reversible
/// state through the [`PropagatorConstructorContext`].
pub trait PropagatorConstructor {
    /// The propagator being constructed.
    type PropagatorImpl: Propagator;

    /// Create the propagator, registering its variable subscriptions through `context`.
    fn create(self, context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl;
}

/// The context handed to a [`PropagatorConstructor`]; registers event subscriptions and hands out
/// reversible cells, next to read access to the current domains.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    store: &'a mut DomainStore,
    notifications: &'a mut NotificationEngine,
    watched_domains: &'a mut Vec<DomainId>,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        store: &'a mut DomainStore,
        notifications: &'a mut NotificationEngine,
        watched_domains: &'a mut Vec<DomainId>,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            store,
            notifications,
            watched_domains,
            propagator_id,
        }
    }

    /// Reborrow the context, e.g. to hand it to the constructor of a wrapped propagator.
    pub fn reborrow(&mut self) -> PropagatorConstructorContext<'_> {
        PropagatorConstructorContext {
            store: self.store,
            notifications: self.notifications,
            watched_domains: self.watched_domains,
            propagator_id: self.propagator_id,
        }
    }

    /// Subscribe the position `local_id` to the given events on `var`; the propagator is woken
    /// whenever an event in the condition mask fires on the variable.
    pub fn register<Var: IntegerVariable>(
        &mut self,
        var: Var,
        events: DomainEvents,
        local_id: LocalId,
    ) {
        let mut watchers = Watchers::new(
            PropagatorVarId {
                propagator: self.propagator_id,
                variable: local_id,
            },
            self.notifications,
            self.watched_domains,
        );
        var.watch_all(&mut watchers, events.get_events());
    }

    /// Allocate a reversible integer for incremental state.
    pub fn new_trailed_integer(&mut self, initial_value: i64) -> RevInt {
        self.environment_mut().make_int(initial_value)
    }

    pub(crate) fn environment_mut(&mut self) -> &mut Environment {
        self.store.env_mut()
    }
}

impl HasDomainStore for PropagatorConstructorContext<'_> {
    fn domain_store(&self) -> &DomainStore {
        self.store
    }
}
