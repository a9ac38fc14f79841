use enumset::EnumSet;

use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::PropagatorVarId;
use crate::engine::variables::DomainId;

/// One subscription of a propagator position to events on a domain.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Watcher {
    pub(crate) propagator_var: PropagatorVarId,
    pub(crate) events: EnumSet<DomainEvent>,
}

/// Holds the watchers of every domain plus the buffer of events that occurred since the engine
/// last drained it.
#[derive(Debug, Default)]
pub(crate) struct NotificationEngine {
    watch_lists: KeyedVec<DomainId, Vec<Watcher>>,
    pending_events: Vec<(DomainId, EnumSet<DomainEvent>)>,
}

impl NotificationEngine {
    /// Allocate the watch list of a freshly created domain.
    pub(crate) fn grow(&mut self) {
        let _ = self.watch_lists.push(Vec::new());
    }

    pub(crate) fn attach(
        &mut self,
        propagator_var: PropagatorVarId,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
    ) {
        self.watch_lists[domain].push(Watcher {
            propagator_var,
            events,
        });
    }

    /// Remove every subscription of `propagator` on `domain`.
    pub(crate) fn detach(&mut self, propagator: PropagatorId, domain: DomainId) {
        self.watch_lists[domain]
            .retain(|watcher| watcher.propagator_var.propagator != propagator);
    }

    pub(crate) fn watchers(&self, domain: DomainId) -> &[Watcher] {
        &self.watch_lists[domain]
    }

    /// Record that `events` fired on `domain`. Buffered until the engine drains it.
    pub(crate) fn event_occurred(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        self.pending_events.push((domain, events));
    }

    pub(crate) fn take_events(&mut self) -> Vec<(DomainId, EnumSet<DomainEvent>)> {
        std::mem::take(&mut self.pending_events)
    }

    /// Discard buffered events; used on backtracking since rolled-back mutations do not fire.
    pub(crate) fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

/// Used to register a propagator position for notifications about events on a particular variable.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator_var: PropagatorVarId,
    engine: &'a mut NotificationEngine,
    /// Domains this propagator watches, maintained so the subscriptions can be dropped when the
    /// propagator is unposted.
    watched_domains: &'a mut Vec<DomainId>,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(
        propagator_var: PropagatorVarId,
        engine: &'a mut NotificationEngine,
        watched_domains: &'a mut Vec<DomainId>,
    ) -> Self {
        Watchers {
            propagator_var,
            engine,
            watched_domains,
        }
    }

    pub(crate) fn watch_all(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        if !self.watched_domains.contains(&domain) {
            self.watched_domains.push(domain);
        }
        self.engine.attach(self.propagator_var, domain, events);
    }
}

#[cfg(test)]
mod tests {
    use super::super::DomainEvents;
    use super::*;
    use crate::engine::propagation::LocalId;

    fn propagator_var(propagator: u32, variable: u32) -> PropagatorVarId {
        PropagatorVarId {
            propagator: PropagatorId(propagator),
            variable: LocalId::from(variable),
        }
    }

    #[test]
    fn attach_and_detach_round_trip() {
        let mut engine = NotificationEngine::default();
        engine.grow();
        let domain = DomainId::new(0);

        engine.attach(propagator_var(0, 0), domain, DomainEvents::ANY.get_events());
        engine.attach(propagator_var(1, 2), domain, DomainEvents::BOUNDS.get_events());
        assert_eq!(2, engine.watchers(domain).len());

        engine.detach(PropagatorId(0), domain);
        assert_eq!(1, engine.watchers(domain).len());
        assert_eq!(
            PropagatorId(1),
            engine.watchers(domain)[0].propagator_var.propagator
        );
    }

    #[test]
    fn events_are_buffered_until_taken() {
        let mut engine = NotificationEngine::default();
        engine.grow();
        let domain = DomainId::new(0);

        engine.event_occurred(domain, DomainEvent::LowerBound.into());
        engine.event_occurred(domain, DomainEvent::Assign | DomainEvent::UpperBound);

        let events = engine.take_events();
        assert_eq!(2, events.len());
        assert!(engine.take_events().is_empty());
    }
}
