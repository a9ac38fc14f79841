use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropagatorConflict;
use crate::basic_types::PropositionalConjunction;
use crate::basic_types::StoredConflictInfo;
use crate::calabash_assert_simple;
use crate::engine::domains::DeltaChange;
use crate::engine::domains::DeltaMonitor;
use crate::engine::domains::DomainStore;
use crate::engine::domains::EmptyDomain;
use crate::engine::notifications::DomainEvents;
use crate::engine::notifications::NotificationEngine;
use crate::engine::notifications::Watchers;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::PropagatorVarId;
use crate::engine::reason::Reason;
use crate::engine::reason::ReasonStore;
use crate::engine::reason::StoredReason;
use crate::engine::trailed::Environment;
use crate::engine::trailed::RevBool;
use crate::engine::trailed::RevInt;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;

/// A read-only view of the current domains.
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    store: &'a DomainStore,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(store: &'a DomainStore) -> Self {
        Domains { store }
    }
}

/// The context handed to [`crate::engine::propagation::Propagator::notify`]. It allows reading
/// the domains and updating reversible cells, but no domain operations.
#[derive(Debug)]
pub struct NotificationContext<'a> {
    store: &'a mut DomainStore,
}

impl<'a> NotificationContext<'a> {
    pub(crate) fn new(store: &'a mut DomainStore) -> Self {
        NotificationContext { store }
    }
}

/// The context handed to [`crate::engine::propagation::Propagator::propagate`]. Next to reading
/// the domains it allows performing domain operations through
/// [`PropagationContextMut::post`].
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    pub(crate) store: &'a mut DomainStore,
    pub(crate) reason_store: &'a mut ReasonStore,
    pub(crate) notifications: &'a mut NotificationEngine,
    pub(crate) watched_domains: &'a mut Vec<DomainId>,
    pub(crate) propagator_id: PropagatorId,
    pub(crate) active_flag: RevBool,
    pub(crate) conflict: &'a mut Option<StoredConflictInfo>,
    reification_literal: Option<Literal>,
}

impl<'a> PropagationContextMut<'a> {
    #[allow(clippy::too_many_arguments, reason = "assembled in one place by the engine")]
    pub(crate) fn new(
        store: &'a mut DomainStore,
        reason_store: &'a mut ReasonStore,
        notifications: &'a mut NotificationEngine,
        watched_domains: &'a mut Vec<DomainId>,
        propagator_id: PropagatorId,
        active_flag: RevBool,
        conflict: &'a mut Option<StoredConflictInfo>,
    ) -> Self {
        PropagationContextMut {
            store,
            reason_store,
            notifications,
            watched_domains,
            propagator_id,
            active_flag,
            conflict,
            reification_literal: None,
        }
    }

    /// Apply a reification literal to all the explanations that are passed to the context.
    pub(crate) fn with_reification(&mut self, reification_literal: Literal) {
        calabash_assert_simple!(
            self.reification_literal.is_none(),
            "cannot reify an already reified propagation context"
        );
        self.reification_literal = Some(reification_literal);
    }

    /// Get a read-only view of the current domains.
    pub fn as_readonly(&self) -> Domains<'_> {
        Domains { store: self.store }
    }

    /// Assign the truth-value of the given [`Predicate`] to `true` in the current partial
    /// assignment.
    ///
    /// If the truth-value is already `true`, then this is a no-op. If instead applying the
    /// predicate would empty a domain, a contradiction is returned and no change is performed; at
    /// that point no more propagation should happen.
    pub fn post(&mut self, predicate: Predicate, reason: impl Into<Reason>) -> PropagationStatusCP {
        let stored = build_reason(reason.into(), self.reification_literal);
        let slot = self.reason_store.new_slot();
        let reason_ref = slot.reason_ref();

        let result = self.store.post_predicate(
            predicate,
            Some(self.propagator_id),
            Some(reason_ref),
            self.notifications,
        );

        match result {
            Ok(false) => Ok(()),
            Ok(true) => {
                let _ = slot.populate(self.propagator_id, stored);
                Ok(())
            }
            Err(EmptyDomain) => {
                let reason_ref = slot.populate(self.propagator_id, stored);
                *self.conflict = Some(StoredConflictInfo::EmptyDomain {
                    predicate,
                    reason: Some(reason_ref),
                });
                Err(Inconsistency::EmptyDomain)
            }
        }
    }

    /// Construct a conflict stating that the conjunction cannot hold. If the context is reified,
    /// the reification literal is added to the conjunction.
    pub fn conflict(&self, conjunction: impl Into<PropositionalConjunction>) -> Inconsistency {
        let mut conjunction = conjunction.into();
        if let Some(literal) = self.reification_literal {
            conjunction.push(literal.get_true_predicate());
        }
        Inconsistency::Conflict(PropagatorConflict {
            conjunction,
            propagator: self.propagator_id,
        })
    }

    /// Declare this propagator passive: it can never filter again on the current branch. The
    /// propagator is reactivated automatically when the search backtracks above this point.
    pub fn set_passive(&mut self) {
        let flag = self.active_flag;
        self.store.env_mut().assign_bool(flag, false);
    }

    /// Subscribe this propagator to further events; used by propagators whose watched set grows
    /// after construction.
    pub fn watch<Var: IntegerVariable>(
        &mut self,
        var: &Var,
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

    /// Create a cursor over the delta stream of `domain`.
    pub fn new_delta_monitor(&mut self, domain: DomainId) -> DeltaMonitor {
        self.store.new_delta_monitor(domain)
    }

    /// Visit the removals recorded since the monitor's last drain.
    pub fn drain_delta(
        &mut self,
        monitor: &DeltaMonitor,
        f: impl FnMut(DeltaChange, Option<PropagatorId>),
    ) {
        self.store.drain_delta(monitor, f);
    }
}

fn build_reason(reason: Reason, reification_literal: Option<Literal>) -> StoredReason {
    match reason {
        Reason::Eager(mut conjunction) => {
            conjunction.extend(
                reification_literal
                    .iter()
                    .map(|literal| literal.get_true_predicate()),
            );
            StoredReason::Eager(conjunction)
        }
        Reason::DynamicLazy(code) => StoredReason::DynamicLazy(code),
    }
}

/// A helper trait exposing the domain store of a context; do not implement outside the engine.
pub trait HasDomainStore {
    #[doc(hidden)]
    fn domain_store(&self) -> &DomainStore;
}

impl HasDomainStore for Domains<'_> {
    fn domain_store(&self) -> &DomainStore {
        self.store
    }
}

impl HasDomainStore for NotificationContext<'_> {
    fn domain_store(&self) -> &DomainStore {
        self.store
    }
}

impl HasDomainStore for PropagationContextMut<'_> {
    fn domain_store(&self) -> &DomainStore {
        self.store
    }
}

/// Read access to the domains, implemented by every context handed to a propagator.
pub trait ReadDomains: HasDomainStore {
    fn is_predicate_satisfied(&self, predicate: Predicate) -> bool {
        self.domain_store().is_predicate_satisfied(predicate)
    }

    fn is_predicate_falsified(&self, predicate: Predicate) -> bool {
        self.domain_store().is_predicate_falsified(predicate)
    }

    fn evaluate_predicate(&self, predicate: Predicate) -> Option<bool> {
        self.domain_store().evaluate_predicate(predicate)
    }

    fn is_literal_true(&self, literal: &Literal) -> bool {
        self.is_predicate_satisfied(literal.get_true_predicate())
    }

    fn is_literal_false(&self, literal: &Literal) -> bool {
        self.is_predicate_satisfied(literal.get_false_predicate())
    }

    fn is_literal_fixed(&self, literal: &Literal) -> bool {
        self.is_literal_true(literal) || self.is_literal_false(literal)
    }

    /// Returns `true` if the domain of the given variable is a singleton.
    fn is_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }

    fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.domain_store())
    }

    fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.domain_store())
    }

    fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.domain_store(), value)
    }

    fn next_value<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Option<i32> {
        var.next_value(self.domain_store(), value)
    }

    fn previous_value<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Option<i32> {
        var.previous_value(self.domain_store(), value)
    }

    fn size<Var: IntegerVariable>(&self, var: &Var) -> i64 {
        var.size(self.domain_store())
    }

    fn iterate_domain<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.domain_store())
    }
}

impl<T: HasDomainStore> ReadDomains for T {}

/// Reversible-cell operations available to propagators; incremental state must live in these
/// cells so that backtracking restores it.
pub trait ManipulateTrailedValues {
    #[doc(hidden)]
    fn environment(&self) -> &Environment;
    #[doc(hidden)]
    fn environment_mut(&mut self) -> &mut Environment;

    fn new_trailed_integer(&mut self, initial_value: i64) -> RevInt {
        self.environment_mut().make_int(initial_value)
    }

    fn trailed_value(&self, cell: RevInt) -> i64 {
        self.environment().int_value(cell)
    }

    fn assign_trailed(&mut self, cell: RevInt, value: i64) {
        self.environment_mut().assign_int(cell, value);
    }

    fn add_assign_trailed(&mut self, cell: RevInt, addition: i64) {
        self.environment_mut().add_assign_int(cell, addition);
    }
}

impl ManipulateTrailedValues for PropagationContextMut<'_> {
    fn environment(&self) -> &Environment {
        self.store.env()
    }

    fn environment_mut(&mut self) -> &mut Environment {
        self.store.env_mut()
    }
}

impl ManipulateTrailedValues for NotificationContext<'_> {
    fn environment(&self) -> &Environment {
        self.store.env()
    }

    fn environment_mut(&mut self) -> &mut Environment {
        self.store.env_mut()
    }
}
