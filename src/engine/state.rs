use enumset::EnumSet;

use crate::basic_types::Inconsistency;
use crate::basic_types::SolutionReference;
use crate::basic_types::StoredConflictInfo;
use crate::calabash_assert_simple;
use crate::containers::KeyedVec;
use crate::engine::domains::DomainStore;
use crate::engine::domains::EmptyDomain;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::NotificationEngine;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::store::PropagatorHandle;
use crate::engine::propagation::store::PropagatorStore;
use crate::engine::propagation::Domains;
use crate::engine::propagation::EnqueueDecision;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::NotificationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagator_queue::PropagatorQueue;
use crate::engine::reason::ReasonRef;
use crate::engine::reason::ReasonStore;
use crate::engine::termination::TerminationCondition;
use crate::engine::trailed::RevBool;
use crate::engine::variable_names::VariableNames;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;

/// Which watched positions of a propagator fired since its last execution. Used to decide between
/// incremental (single position) and full dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum FiredPositions {
    #[default]
    None,
    Single(LocalId),
    Multiple,
}

/// The complete propagation state of one model: the domains with their reversible memory, the
/// posted propagators, the watch lists, the reason store, and the scheduler.
///
/// The [`State`] implements the engine protocol of waking propagators on events and running them
/// to a fixed point; the search loop drives it through decisions and world transitions.
#[derive(Debug)]
pub struct State {
    pub(crate) domains: DomainStore,
    pub(crate) notifications: NotificationEngine,
    pub(crate) propagators: PropagatorStore,
    pub(crate) reason_store: ReasonStore,
    queue: PropagatorQueue,
    pending_events: KeyedVec<PropagatorId, EnumSet<DomainEvent>>,
    pending_positions: KeyedVec<PropagatorId, FiredPositions>,
    priorities: KeyedVec<PropagatorId, Priority>,
    /// Reversible "active" flags; a passive propagator is skipped until backtracking reactivates
    /// it by restoring the flag.
    active_flags: KeyedVec<PropagatorId, RevBool>,
    /// Per propagator, the domains it watches; used to drop subscriptions on unposting.
    watched_domains: KeyedVec<PropagatorId, Vec<DomainId>>,
    /// Temporarily posted propagators with the world they were posted in; unposted when that
    /// world is popped.
    temporary_propagators: Vec<(u32, PropagatorId)>,
    /// The details of the latest wipeout, recorded by the context that performed the operation.
    conflict: Option<StoredConflictInfo>,
    pub(crate) variable_names: VariableNames,
    /// The number of propagator executions so far.
    pub(crate) num_propagations: u64,
}

impl Default for State {
    fn default() -> Self {
        let mut state = State {
            domains: DomainStore::default(),
            notifications: NotificationEngine::default(),
            propagators: PropagatorStore::default(),
            reason_store: ReasonStore::default(),
            queue: PropagatorQueue::default(),
            pending_events: KeyedVec::default(),
            pending_positions: KeyedVec::default(),
            priorities: KeyedVec::default(),
            active_flags: KeyedVec::default(),
            watched_domains: KeyedVec::default(),
            temporary_propagators: Vec::default(),
            conflict: None,
            variable_names: VariableNames::default(),
            num_propagations: 0,
        };
        // The watch list of the reserved trivially-true domain.
        state.notifications.grow();
        state
    }
}

// variable creation
impl State {
    pub(crate) fn new_interval_variable(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: Option<String>,
    ) -> DomainId {
        let domain = self.domains.grow_interval(lower_bound, upper_bound);
        self.notifications.grow();
        if let Some(name) = name {
            self.variable_names.add(domain, name);
        }
        domain
    }

    pub(crate) fn new_sparse_variable(
        &mut self,
        values: &[i32],
        name: Option<String>,
    ) -> DomainId {
        let domain = self.domains.grow_sparse(values);
        self.notifications.grow();
        if let Some(name) = name {
            self.variable_names.add(domain, name);
        }
        domain
    }

    pub(crate) fn new_constant(&mut self, value: i32) -> DomainId {
        let domain = self.domains.grow_constant(value);
        self.notifications.grow();
        domain
    }

    pub(crate) fn new_literal(&mut self, name: Option<String>) -> Literal {
        Literal::new(self.new_interval_variable(0, 1, name))
    }
}

// queries
impl State {
    pub(crate) fn truth_value(&self, predicate: Predicate) -> Option<bool> {
        self.domains.evaluate_predicate(predicate)
    }

    pub(crate) fn get_solution_reference(&self) -> SolutionReference<'_> {
        SolutionReference::new(&self.domains)
    }

    pub(crate) fn is_propagator_entailed(&self, propagator_id: PropagatorId) -> Entailment {
        self.propagators[propagator_id].is_entailed(Domains::new(&self.domains))
    }

    pub(crate) fn find_last_decision(&self) -> Option<Predicate> {
        self.domains.find_last_decision()
    }
}

// posting propagators
impl State {
    /// Post a propagator permanently. The propagator is scheduled for an initial full
    /// propagation; it runs at the next [`State::propagate_to_fixed_point`].
    pub(crate) fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let id = self.propagators.reserve();

        let flag = self.domains.env_mut().make_bool(true);
        self.active_flags.accomodate(id, flag);
        self.active_flags[id] = flag;
        self.pending_events.accomodate(id, EnumSet::empty());
        self.pending_events[id] = EnumSet::empty();
        self.pending_positions.accomodate(id, FiredPositions::None);
        self.pending_positions[id] = FiredPositions::None;
        self.watched_domains.accomodate(id, Vec::new());

        let mut watched = Vec::new();
        let propagator = constructor.create(PropagatorConstructorContext::new(
            &mut self.domains,
            &mut self.notifications,
            &mut watched,
            id,
        ));
        self.watched_domains[id] = watched;

        let priority = propagator.priority();
        self.priorities.accomodate(id, priority);
        self.priorities[id] = priority;
        self.propagators.populate(id, Box::new(propagator));

        self.enqueue_propagator(id);

        PropagatorHandle::new(id)
    }

    /// Post a propagator which is automatically unposted when the current world is popped.
    pub(crate) fn add_temporary_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let world = self.current_world();
        let handle = self.add_propagator(constructor);
        if world > 0 {
            self.temporary_propagators.push((world, handle.untyped()));
        }
        handle
    }

    /// Drop a propagator: its subscriptions are cleared and its slot is reused.
    pub(crate) fn unpost_propagator(&mut self, id: PropagatorId) {
        for domain in std::mem::take(&mut self.watched_domains[id]) {
            self.notifications.detach(id, domain);
        }
        let _ = self.propagators.remove(id);
        self.pending_events[id] = EnumSet::empty();
        self.pending_positions[id] = FiredPositions::None;
    }

    /// Schedule a propagator for a full propagation.
    pub(crate) fn enqueue_propagator(&mut self, id: PropagatorId) {
        self.pending_positions[id] = FiredPositions::Multiple;
        self.queue.schedule(id, self.priorities[id]);
    }

    /// Run `f` with exclusive access to the propagator behind `handle` together with a mutable
    /// propagation context; used to feed learned nogoods into the nogood propagator.
    pub(crate) fn with_propagator_mut<P: Propagator + 'static, R>(
        &mut self,
        handle: PropagatorHandle<P>,
        f: impl FnOnce(&mut P, PropagationContextMut<'_>) -> R,
    ) -> R {
        let id = handle.untyped();
        let mut boxed = self.propagators.take(id);
        let result = {
            let context = PropagationContextMut::new(
                &mut self.domains,
                &mut self.reason_store,
                &mut self.notifications,
                &mut self.watched_domains[id],
                id,
                self.active_flags[id],
                &mut self.conflict,
            );
            f(
                boxed
                    .downcast_mut::<P>()
                    .expect("the typed handle matches the stored propagator"),
                context,
            )
        };
        self.propagators.untake(id, boxed);
        result
    }

    /// Take the recorded details of the latest wipeout; called after a context returned
    /// [`Inconsistency::EmptyDomain`].
    pub(crate) fn take_conflict(&mut self) -> Option<StoredConflictInfo> {
        self.conflict.take()
    }
}

// posting predicates
impl State {
    /// Post a predicate without a reason: a decision, a refutation, or an external fact. Events
    /// are buffered; they fire at the next propagation.
    pub(crate) fn post(&mut self, predicate: Predicate) -> Result<bool, EmptyDomain> {
        let result =
            self.domains
                .post_predicate(predicate, None, None, &mut self.notifications);
        if result.is_err() {
            self.conflict = Some(StoredConflictInfo::EmptyDomain {
                predicate,
                reason: None,
            });
        }
        result
    }
}

// worlds
impl State {
    pub(crate) fn current_world(&self) -> u32 {
        self.domains.current_world()
    }

    pub(crate) fn push_world(&mut self) {
        self.domains.push_world();
        self.reason_store.push_world();
    }

    /// Backtrack to `world`: discard the schedule, unpost temporary propagators, rewind the
    /// domains and reasons, and let every propagator resynchronise. Returns the variables which
    /// became unfixed, with the value they were fixed to.
    pub(crate) fn restore_to(&mut self, world: u32) -> Vec<(DomainId, i32)> {
        calabash_assert_simple!(world < self.current_world());

        self.queue.clear();
        for events in self.pending_events.iter_mut() {
            *events = EnumSet::empty();
        }
        for positions in self.pending_positions.iter_mut() {
            *positions = FiredPositions::None;
        }

        while let Some(&(posted_in, id)) = self.temporary_propagators.last() {
            if posted_in <= world {
                break;
            }
            let _ = self.temporary_propagators.pop();
            self.unpost_propagator(id);
        }

        let unfixed = self.domains.synchronise(world, &mut self.notifications);
        self.reason_store.pop_to(world as usize);
        self.conflict = None;

        let State {
            propagators,
            domains,
            ..
        } = self;
        for propagator in propagators.iter_propagators_mut() {
            propagator.synchronise(Domains::new(domains));
        }

        unfixed
    }

    /// Merge the current world into its parent; used by the search to mark a decision that was
    /// forced rather than a branching point.
    pub(crate) fn commit_world(&mut self) {
        calabash_assert_simple!(
            self.queue.is_empty(),
            "cannot commit a world while propagators are scheduled"
        );
        let committed = self.current_world();
        self.domains.commit_world();
        self.reason_store.commit_world();
        for (world, _) in self.temporary_propagators.iter_mut() {
            if *world == committed {
                *world -= 1;
            }
        }
    }
}

// the propagation loop
impl State {
    /// Run the scheduled propagators to a fixed point, highest priority first.
    ///
    /// On a contradiction the schedule is discarded and the conflict is returned; rolled-back
    /// mutations will not fire events. The termination condition is polled before each dispatch;
    /// when it triggers, the loop returns cleanly without having reached the fixed point.
    pub(crate) fn propagate_to_fixed_point(
        &mut self,
        termination: &mut impl TerminationCondition,
    ) -> Result<(), StoredConflictInfo> {
        loop {
            self.notify_propagators();

            if termination.should_stop() {
                return Ok(());
            }

            let Some(id) = self.queue.pop() else {
                break;
            };
            debug_assert!(!self.queue.is_scheduled(id));
            if !self.propagators.is_posted(id) {
                continue;
            }
            if !self.domains.env().bool_value(self.active_flags[id]) {
                self.pending_events[id] = EnumSet::empty();
                self.pending_positions[id] = FiredPositions::None;
                continue;
            }

            let events = std::mem::replace(&mut self.pending_events[id], EnumSet::empty());
            let positions =
                std::mem::replace(&mut self.pending_positions[id], FiredPositions::None);
            self.num_propagations += 1;

            let mut propagator = self.propagators.take(id);
            let status = {
                let context = PropagationContextMut::new(
                    &mut self.domains,
                    &mut self.reason_store,
                    &mut self.notifications,
                    &mut self.watched_domains[id],
                    id,
                    self.active_flags[id],
                    &mut self.conflict,
                );
                match positions {
                    FiredPositions::Single(local_id)
                        if propagator.prefers_incremental_propagation() =>
                    {
                        propagator.propagate_incremental(context, local_id, events)
                    }
                    _ => propagator.propagate(context),
                }
            };
            self.propagators.untake(id, propagator);

            if let Err(inconsistency) = status {
                self.queue.clear();
                for events in self.pending_events.iter_mut() {
                    *events = EnumSet::empty();
                }
                for positions in self.pending_positions.iter_mut() {
                    *positions = FiredPositions::None;
                }
                self.notifications.clear_events();

                let info = match inconsistency {
                    Inconsistency::EmptyDomain => self
                        .conflict
                        .take()
                        .expect("wipeouts record their trigger predicate"),
                    Inconsistency::Conflict(conflict) => StoredConflictInfo::Propagator(conflict),
                };
                return Err(info);
            }
        }
        Ok(())
    }

    /// Drain the buffered domain events and wake the propagators whose condition masks intersect
    /// them.
    fn notify_propagators(&mut self) {
        let events = self.notifications.take_events();
        if events.is_empty() {
            return;
        }

        let State {
            domains,
            notifications,
            propagators,
            queue,
            pending_events,
            pending_positions,
            priorities,
            active_flags,
            ..
        } = self;

        for (domain, fired) in events {
            for index in 0..notifications.watchers(domain).len() {
                let watcher = notifications.watchers(domain)[index];
                let relevant = watcher.events.intersection(fired);
                if relevant.is_empty() {
                    continue;
                }

                let id = watcher.propagator_var.propagator;
                if !propagators.is_posted(id) {
                    continue;
                }
                if !domains.env().bool_value(active_flags[id]) {
                    continue;
                }

                let decision = propagators[id].notify(
                    NotificationContext::new(domains),
                    watcher.propagator_var.variable,
                    relevant,
                );
                if decision == EnqueueDecision::Skip {
                    continue;
                }

                pending_events[id] |= relevant;
                pending_positions[id] = match pending_positions[id] {
                    FiredPositions::None => FiredPositions::Single(watcher.propagator_var.variable),
                    FiredPositions::Single(existing)
                        if existing == watcher.propagator_var.variable =>
                    {
                        FiredPositions::Single(existing)
                    }
                    _ => FiredPositions::Multiple,
                };
                queue.schedule(id, priorities[id]);
            }
        }
    }
}

// explanation support
impl State {
    /// Materialise the reason behind `reason_ref` into `buffer`.
    pub(crate) fn compute_reason(&mut self, reason_ref: ReasonRef, buffer: &mut Vec<Predicate>) {
        let State {
            reason_store,
            domains,
            propagators,
            ..
        } = self;
        let found = reason_store.get_or_compute(
            reason_ref,
            ExplanationContext::new(domains),
            propagators,
            buffer,
        );
        calabash_assert_simple!(found, "a recorded reason reference must resolve");
    }

    /// Turn a caught conflict into the conjunction of currently-true predicates that caused it.
    pub(crate) fn conflict_conjunction(
        &mut self,
        conflict: &StoredConflictInfo,
    ) -> Vec<Predicate> {
        match conflict {
            StoredConflictInfo::Propagator(conflict) => {
                conflict.conjunction.iter().copied().collect()
            }
            StoredConflictInfo::EmptyDomain { predicate, reason } => {
                let mut predicates = vec![self.domains.falsifying_predicate(*predicate)];
                if let Some(reason_ref) = reason {
                    self.compute_reason(*reason_ref, &mut predicates);
                } else {
                    // A reasonless post (decision, refutation) cannot wipe out a domain above the
                    // root; at the root the conflict is terminal and never analysed.
                    unreachable!("wipeouts analysed for learning carry a reason");
                }
                predicates
            }
            StoredConflictInfo::RootLevelConflict => {
                unreachable!("root-level conflicts are terminal and never analysed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::basic_types::PropagationStatusCP;
    use crate::engine::notifications::DomainEvents;
    use crate::engine::propagation::PropagationContextMut;
    use crate::engine::termination::Indefinite;
    use crate::predicate;
    use crate::propagators::LinearLessOrEqualPropagatorArgs;

    /// A propagator that records its executions and optionally declares itself passive.
    #[derive(Debug)]
    struct Recorder {
        label: &'static str,
        priority: Priority,
        watched: DomainId,
        log: Rc<RefCell<Vec<&'static str>>>,
        becomes_passive: bool,
    }

    struct RecorderArgs {
        label: &'static str,
        priority: Priority,
        watched: DomainId,
        log: Rc<RefCell<Vec<&'static str>>>,
        becomes_passive: bool,
    }

    impl PropagatorConstructor for RecorderArgs {
        type PropagatorImpl = Recorder;

        fn create(self, mut context: PropagatorConstructorContext<'_>) -> Recorder {
            context.register(self.watched, DomainEvents::ANY, LocalId::from(0));
            Recorder {
                label: self.label,
                priority: self.priority,
                watched: self.watched,
                log: self.log,
                becomes_passive: self.becomes_passive,
            }
        }
    }

    impl Propagator for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn priority(&self) -> Priority {
            self.priority
        }

        fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
            use crate::engine::propagation::ReadDomains;

            self.log.borrow_mut().push(self.label);
            // Passivate once the watched domain is tightened, so the passivation happens in the
            // world performing the tightening rather than at the root.
            if self.becomes_passive && context.lower_bound(&self.watched) >= 2 {
                context.set_passive();
            }
            Ok(())
        }
    }

    fn recorder(
        state: &mut State,
        label: &'static str,
        priority: Priority,
        watched: DomainId,
        log: &Rc<RefCell<Vec<&'static str>>>,
        becomes_passive: bool,
    ) -> PropagatorId {
        state
            .add_propagator(RecorderArgs {
                label,
                priority,
                watched,
                log: Rc::clone(log),
                becomes_passive,
            })
            .untyped()
    }

    #[test]
    fn higher_priority_propagators_run_first_even_if_scheduled_later() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let log = Rc::new(RefCell::new(Vec::new()));

        let _slow = recorder(&mut state, "slow", Priority::VerySlow, x, &log, false);
        let _cheap = recorder(&mut state, "cheap", Priority::Unary, x, &log, false);

        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(vec!["cheap", "slow"], *log.borrow());

        // An event schedules both again; the cheap one still goes first.
        log.borrow_mut().clear();
        let _ = state.post(predicate!(x >= 3)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(vec!["cheap", "slow"], *log.borrow());
    }

    #[test]
    fn passivation_below_the_root_is_undone_by_backtracking() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let log = Rc::new(RefCell::new(Vec::new()));

        let id = recorder(&mut state, "passive", Priority::Unary, x, &log, true);
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        log.borrow_mut().clear();

        state.push_world();
        let _ = state.post(predicate!(x >= 2)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        // Runs once and passivates inside world 1.
        assert_eq!(1, log.borrow().len());

        // Passive now: further events in this world do not wake it.
        let _ = state.post(predicate!(x >= 4)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(1, log.borrow().len());

        // Backtracking above the passivation point reactivates it.
        let _ = state.restore_to(0);
        state.enqueue_propagator(id);
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(2, log.borrow().len());
    }

    #[test]
    fn temporary_propagators_are_unposted_when_their_world_is_popped() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let y = state.new_interval_variable(0, 10, None);

        state.push_world();
        let handle = state.add_temporary_propagator(LinearLessOrEqualPropagatorArgs {
            x: [x, y].into(),
            c: 4,
        });
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(4, state.domains.upper_bound(x));

        let _ = state.restore_to(0);
        assert!(!state.propagators.is_posted(handle.untyped()));
        assert_eq!(10, state.domains.upper_bound(x));

        // Events on the previously watched variables no longer reach the unposted propagator.
        let _ = state.post(predicate!(x >= 8)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(10, state.domains.upper_bound(y));
    }

    #[test]
    fn the_fixed_point_is_stable_under_re_execution() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let y = state.new_interval_variable(0, 10, None);

        let handle = state.add_propagator(LinearLessOrEqualPropagatorArgs {
            x: [x, y].into(),
            c: 7,
        });
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();

        let trail_len = state.domains.trail_len();
        state.enqueue_propagator(handle.untyped());
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();

        assert_eq!(trail_len, state.domains.trail_len());
    }

    /// Records whether it was dispatched incrementally or fully.
    #[derive(Debug)]
    struct DispatchProbe {
        watched: [DomainId; 2],
        log: Rc<RefCell<Vec<String>>>,
    }

    struct DispatchProbeArgs {
        watched: [DomainId; 2],
        log: Rc<RefCell<Vec<String>>>,
    }

    impl PropagatorConstructor for DispatchProbeArgs {
        type PropagatorImpl = DispatchProbe;

        fn create(self, mut context: PropagatorConstructorContext<'_>) -> DispatchProbe {
            for (position, domain) in self.watched.iter().enumerate() {
                context.register(*domain, DomainEvents::ANY, LocalId::from(position as u32));
            }
            DispatchProbe {
                watched: self.watched,
                log: self.log,
            }
        }
    }

    impl Propagator for DispatchProbe {
        fn name(&self) -> &str {
            "DispatchProbe"
        }

        fn priority(&self) -> Priority {
            Priority::Binary
        }

        fn prefers_incremental_propagation(&self) -> bool {
            true
        }

        fn propagate(&mut self, _context: PropagationContextMut) -> PropagationStatusCP {
            self.log.borrow_mut().push("full".to_owned());
            Ok(())
        }

        fn propagate_incremental(
            &mut self,
            _context: PropagationContextMut,
            local_id: LocalId,
            _events: enumset::EnumSet<DomainEvent>,
        ) -> PropagationStatusCP {
            let _ = self.watched;
            self.log.borrow_mut().push(format!("incremental:{local_id}"));
            Ok(())
        }
    }

    #[test]
    fn a_single_fired_position_is_dispatched_incrementally() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let y = state.new_interval_variable(0, 10, None);
        let log = Rc::new(RefCell::new(Vec::new()));

        let _ = state.add_propagator(DispatchProbeArgs {
            watched: [x, y],
            log: Rc::clone(&log),
        });
        // The initial propagation is always a full call.
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(vec!["full".to_owned()], *log.borrow());

        log.borrow_mut().clear();
        let _ = state.post(predicate!(y >= 3)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(vec!["incremental:1".to_owned()], *log.borrow());

        log.borrow_mut().clear();
        let _ = state.post(predicate!(x >= 1)).unwrap();
        let _ = state.post(predicate!(y >= 5)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(vec!["full".to_owned()], *log.borrow());
    }

    #[test]
    fn committing_merges_a_forced_world_into_its_parent() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);

        state.push_world();
        let _ = state.post(predicate!(x >= 2)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();

        state.push_world();
        let _ = state.post(predicate!(x <= 6)).unwrap();
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();

        state.commit_world();
        assert_eq!(1, state.current_world());
        assert_eq!((2, 6), (state.domains.lower_bound(x), state.domains.upper_bound(x)));

        let _ = state.restore_to(0);
        assert_eq!((0, 10), (state.domains.lower_bound(x), state.domains.upper_bound(x)));
    }

    #[test]
    fn conflicts_discard_the_schedule() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 10, None);
        let y = state.new_interval_variable(0, 10, None);

        let _ = state.add_propagator(LinearLessOrEqualPropagatorArgs {
            x: [x, y].into(),
            c: 7,
        });
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(7, state.domains.upper_bound(x));

        state.push_world();
        let _ = state.post(predicate!(x >= 5)).unwrap();
        let _ = state.post(predicate!(y >= 4)).unwrap();
        let conflict = state.propagate_to_fixed_point(&mut Indefinite);
        assert!(conflict.is_err());

        let _ = state.restore_to(0);
        // Quiescent again after backtracking; the schedule was discarded and the root state is
        // intact.
        state.propagate_to_fixed_point(&mut Indefinite).unwrap();
        assert_eq!(7, state.domains.upper_bound(x));
        assert_eq!(0, state.domains.lower_bound(x));
    }
}
