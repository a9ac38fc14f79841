use enumset::EnumSet;

use super::integer_domain::IntervalDomain;
use super::integer_domain::SparseDomain;
use super::Delta;
use super::DeltaChange;
use super::DeltaMonitor;
use super::DomainTrail;
use super::DomainTrailEntry;
use super::IntegerDomain;
use crate::calabash_assert_eq_moderate;
use crate::calabash_assert_moderate;
use crate::calabash_assert_simple;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::NotificationEngine;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::predicates::predicate::PredicateType;
use crate::engine::propagation::PropagatorId;
use crate::engine::reason::ReasonRef;
use crate::engine::trailed::Environment;
use crate::engine::variables::DomainId;
use crate::math::num_ext::clamp_bound;
use crate::predicate;

/// Error raised by a mutator whose effect would empty a domain. The mutation is *not* performed;
/// callers never observe an empty domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The store of all integer domains of one model, together with the reversible memory they live
/// in, the trail of domain operations, and the per-variable delta streams.
#[derive(Debug)]
pub struct DomainStore {
    env: Environment,
    domains: KeyedVec<DomainId, IntegerDomain>,
    pub(crate) trail: DomainTrail,
    deltas: KeyedVec<DomainId, Delta>,
    active_monitors: usize,
}

impl Default for DomainStore {
    fn default() -> Self {
        let mut store = DomainStore {
            env: Environment::default(),
            domains: KeyedVec::default(),
            trail: DomainTrail::default(),
            deltas: KeyedVec::default(),
            active_monitors: 0,
        };

        // As a convention, we allocate a reserved domain_id=0, a 0-1 variable assigned to one,
        // used to represent predicates that are trivially true or false.
        let reserved = store.grow_interval(1, 1);
        assert_eq!(reserved.id(), 0);

        store
    }
}

// creation
impl DomainStore {
    pub(crate) fn grow_interval(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        calabash_assert_simple!(
            self.env.current_world() == 0,
            "variables can only be created at the root"
        );
        let lower_bound = clamp_bound(lower_bound);
        let upper_bound = clamp_bound(upper_bound);
        assert!(lower_bound <= upper_bound, "cannot create an empty domain");

        let domain = IntegerDomain::Interval(IntervalDomain {
            lower_bound: self.env.make_int(lower_bound as i64),
            upper_bound: self.env.make_int(upper_bound as i64),
        });
        let id = self.domains.push(domain);
        let _ = self.deltas.push(Delta::new(&mut self.env));
        id
    }

    pub(crate) fn grow_sparse(&mut self, values: &[i32]) -> DomainId {
        calabash_assert_simple!(
            self.env.current_world() == 0,
            "variables can only be created at the root"
        );
        assert!(!values.is_empty(), "cannot create a variable with an empty domain");

        let mut values: Vec<i32> = values.iter().copied().map(clamp_bound).collect();
        values.sort_unstable();
        values.dedup();

        let lower_bound = values[0];
        let upper_bound = values[values.len() - 1];
        let capacity = (upper_bound - lower_bound + 1) as u32;

        let bits = self.env.make_bitset(capacity);
        for value in &values {
            let _ = bits.insert(&mut self.env, (value - lower_bound) as u32);
        }

        let domain = IntegerDomain::Sparse(SparseDomain {
            bits,
            offset: lower_bound,
            lower_bound: self.env.make_int(lower_bound as i64),
            upper_bound: self.env.make_int(upper_bound as i64),
            size: self.env.make_int(values.len() as i64),
        });
        let id = self.domains.push(domain);
        let _ = self.deltas.push(Delta::new(&mut self.env));
        id
    }

    pub(crate) fn grow_constant(&mut self, value: i32) -> DomainId {
        calabash_assert_simple!(
            self.env.current_world() == 0,
            "variables can only be created at the root"
        );
        let id = self.domains.push(IntegerDomain::Constant(clamp_bound(value)));
        let _ = self.deltas.push(Delta::new(&mut self.env));
        id
    }
}

// queries
impl DomainStore {
    pub(crate) fn env(&self) -> &Environment {
        &self.env
    }

    pub(crate) fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn num_domains(&self) -> u32 {
        self.domains.len() as u32
    }

    /// The user-created domains, skipping the reserved trivially-true variable.
    pub fn domains(&self) -> impl Iterator<Item = DomainId> {
        (1..self.num_domains()).map(DomainId::new)
    }

    pub fn lower_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].lower_bound(&self.env)
    }

    pub fn upper_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].upper_bound(&self.env)
    }

    pub fn size(&self, domain: DomainId) -> i64 {
        self.domains[domain].size(&self.env)
    }

    pub fn contains(&self, domain: DomainId, value: i32) -> bool {
        self.domains[domain].contains(&self.env, value)
    }

    pub fn is_fixed(&self, domain: DomainId) -> bool {
        self.domains[domain].is_fixed(&self.env)
    }

    pub fn assigned_value(&self, domain: DomainId) -> Option<i32> {
        self.is_fixed(domain).then(|| self.lower_bound(domain))
    }

    pub fn next_value(&self, domain: DomainId, value: i32) -> Option<i32> {
        self.domains[domain].next_value(&self.env, value)
    }

    pub fn previous_value(&self, domain: DomainId, value: i32) -> Option<i32> {
        self.domains[domain].previous_value(&self.env, value)
    }

    /// Whether removing interior values of this domain leaves a hole (enumerated representation)
    /// rather than being a no-op (bounded interval).
    pub fn has_enumerated_domain(&self, domain: DomainId) -> bool {
        self.domains[domain].has_enumerated_representation()
    }

    pub fn iterate_domain(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        std::iter::successors(Some(self.lower_bound(domain)), move |&value| {
            self.next_value(domain, value)
        })
    }

    /// Determines whether the provided [`Predicate`] holds in the current state of the domains.
    /// In case the predicate is not assigned yet (neither true nor false), returns [`None`].
    pub fn evaluate_predicate(&self, predicate: Predicate) -> Option<bool> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => {
                if self.lower_bound(domain) >= value {
                    Some(true)
                } else if self.upper_bound(domain) < value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::UpperBound => {
                if self.upper_bound(domain) <= value {
                    Some(true)
                } else if self.lower_bound(domain) > value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::NotEqual => {
                if !self.contains(domain, value) {
                    Some(true)
                } else if let Some(assigned_value) = self.assigned_value(domain) {
                    calabash_assert_moderate!(assigned_value == value);
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::Equal => {
                if !self.contains(domain, value) {
                    Some(false)
                } else if let Some(assigned_value) = self.assigned_value(domain) {
                    calabash_assert_moderate!(assigned_value == value);
                    Some(true)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_predicate_satisfied(&self, predicate: Predicate) -> bool {
        self.evaluate_predicate(predicate)
            .is_some_and(|truth_value| truth_value)
    }

    pub fn is_predicate_falsified(&self, predicate: Predicate) -> bool {
        self.evaluate_predicate(predicate)
            .is_some_and(|truth_value| !truth_value)
    }

    /// Whether `value` is missing from the domain for a reason other than the current bounds: an
    /// explicit removal, an initial hole of an enumerated domain, or not being the constant.
    pub(crate) fn is_explicit_hole(&self, domain: DomainId, value: i32) -> bool {
        match self.domains[domain] {
            IntegerDomain::Interval(_) => false,
            IntegerDomain::Sparse(sparse) => !sparse.bit_is_set(&self.env, value),
            IntegerDomain::Constant(constant) => value != constant,
        }
    }

    /// A currently-true predicate on the same domain which contradicts `predicate`. Only valid
    /// when `predicate` is falsified; used to seed conflict analysis after a wipeout.
    pub(crate) fn falsifying_predicate(&self, predicate: Predicate) -> Predicate {
        calabash_assert_moderate!(self.is_predicate_falsified(predicate));

        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => predicate!(domain <= value - 1),
            PredicateType::UpperBound => predicate!(domain >= value + 1),
            PredicateType::NotEqual => predicate!(domain == value),
            PredicateType::Equal => {
                if value < self.lower_bound(domain) {
                    predicate!(domain >= self.lower_bound(domain))
                } else if value > self.upper_bound(domain) {
                    predicate!(domain <= self.upper_bound(domain))
                } else {
                    predicate!(domain != value)
                }
            }
        }
    }
}

// mutation
impl DomainStore {
    /// Apply the given [`Predicate`] to the integer domains.
    ///
    /// In case the [`Predicate`] is already true, this does nothing and returns `false`. If the
    /// predicate was unassigned and became true, `true` is returned. If applying the predicate
    /// would empty the domain, [`EmptyDomain`] is returned and *no* change is performed.
    pub(crate) fn post_predicate(
        &mut self,
        predicate: Predicate,
        cause: Option<PropagatorId>,
        reason: Option<ReasonRef>,
        notifications: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => {
                self.tighten_lower_bound(domain, value, cause, reason, notifications)
            }
            PredicateType::UpperBound => {
                self.tighten_upper_bound(domain, value, cause, reason, notifications)
            }
            PredicateType::NotEqual => {
                self.remove_value(domain, value, cause, reason, notifications)
            }
            PredicateType::Equal => {
                self.make_assignment(domain, value, cause, reason, notifications)
            }
        }
    }

    fn tighten_lower_bound(
        &mut self,
        domain_id: DomainId,
        new_lower_bound: i32,
        cause: Option<PropagatorId>,
        reason: Option<ReasonRef>,
        notifications: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain = self.domains[domain_id];

        if let IntegerDomain::Constant(value) = domain {
            return if new_lower_bound <= value {
                Ok(false)
            } else {
                Err(EmptyDomain)
            };
        }

        let old_lower_bound = domain.lower_bound(&self.env);
        let old_upper_bound = domain.upper_bound(&self.env);

        if new_lower_bound <= old_lower_bound {
            return Ok(false);
        }
        if new_lower_bound > old_upper_bound {
            return Err(EmptyDomain);
        }

        let new_lower_bound = match domain {
            IntegerDomain::Interval(_) => new_lower_bound,
            IntegerDomain::Sparse(sparse) => sparse
                .next_member_from(&self.env, new_lower_bound)
                .expect("the upper bound is a member at least as large as the new lower bound"),
            IntegerDomain::Constant(_) => unreachable!(),
        };

        self.record_removed_below(domain_id, old_lower_bound, new_lower_bound, cause);

        self.trail.record(DomainTrailEntry {
            predicate: predicate!(domain_id >= new_lower_bound),
            old_lower_bound,
            old_upper_bound,
            new_lower_bound,
            new_upper_bound: old_upper_bound,
            reason,
        });

        match domain {
            IntegerDomain::Interval(interval) => {
                self.env.assign_int(interval.lower_bound, new_lower_bound as i64);
            }
            IntegerDomain::Sparse(sparse) => {
                let removed =
                    sparse.count_members_in(&self.env, old_lower_bound, new_lower_bound - 1);
                self.env.assign_int(sparse.lower_bound, new_lower_bound as i64);
                self.env.add_assign_int(sparse.size, -(removed as i64));
            }
            IntegerDomain::Constant(_) => unreachable!(),
        }

        let mut events: EnumSet<DomainEvent> = DomainEvent::LowerBound.into();
        if new_lower_bound == old_upper_bound {
            events |= DomainEvent::Assign;
        }
        notifications.event_occurred(domain_id, events);

        Ok(true)
    }

    fn tighten_upper_bound(
        &mut self,
        domain_id: DomainId,
        new_upper_bound: i32,
        cause: Option<PropagatorId>,
        reason: Option<ReasonRef>,
        notifications: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain = self.domains[domain_id];

        if let IntegerDomain::Constant(value) = domain {
            return if new_upper_bound >= value {
                Ok(false)
            } else {
                Err(EmptyDomain)
            };
        }

        let old_lower_bound = domain.lower_bound(&self.env);
        let old_upper_bound = domain.upper_bound(&self.env);

        if new_upper_bound >= old_upper_bound {
            return Ok(false);
        }
        if new_upper_bound < old_lower_bound {
            return Err(EmptyDomain);
        }

        let new_upper_bound = match domain {
            IntegerDomain::Interval(_) => new_upper_bound,
            IntegerDomain::Sparse(sparse) => sparse
                .previous_member_from(&self.env, new_upper_bound)
                .expect("the lower bound is a member at most as large as the new upper bound"),
            IntegerDomain::Constant(_) => unreachable!(),
        };

        self.record_removed_above(domain_id, new_upper_bound, old_upper_bound, cause);

        self.trail.record(DomainTrailEntry {
            predicate: predicate!(domain_id <= new_upper_bound),
            old_lower_bound,
            old_upper_bound,
            new_lower_bound: old_lower_bound,
            new_upper_bound,
            reason,
        });

        match domain {
            IntegerDomain::Interval(interval) => {
                self.env.assign_int(interval.upper_bound, new_upper_bound as i64);
            }
            IntegerDomain::Sparse(sparse) => {
                let removed =
                    sparse.count_members_in(&self.env, new_upper_bound + 1, old_upper_bound);
                self.env.assign_int(sparse.upper_bound, new_upper_bound as i64);
                self.env.add_assign_int(sparse.size, -(removed as i64));
            }
            IntegerDomain::Constant(_) => unreachable!(),
        }

        let mut events: EnumSet<DomainEvent> = DomainEvent::UpperBound.into();
        if new_upper_bound == old_lower_bound {
            events |= DomainEvent::Assign;
        }
        notifications.event_occurred(domain_id, events);

        Ok(true)
    }

    fn remove_value(
        &mut self,
        domain_id: DomainId,
        value: i32,
        cause: Option<PropagatorId>,
        reason: Option<ReasonRef>,
        notifications: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain = self.domains[domain_id];

        if let IntegerDomain::Constant(constant) = domain {
            return if value != constant {
                Ok(false)
            } else {
                Err(EmptyDomain)
            };
        }

        if !domain.contains(&self.env, value) {
            return Ok(false);
        }

        let old_lower_bound = domain.lower_bound(&self.env);
        let old_upper_bound = domain.upper_bound(&self.env);

        if old_lower_bound == old_upper_bound {
            // Removing the last value.
            return Err(EmptyDomain);
        }

        let (new_lower_bound, new_upper_bound, events) = match domain {
            IntegerDomain::Interval(interval) => {
                if old_lower_bound < value && value < old_upper_bound {
                    // A bounded interval does not keep holes.
                    return Ok(false);
                }
                let mut events: EnumSet<DomainEvent> = DomainEvent::Removal.into();
                if value == old_lower_bound {
                    self.env.assign_int(interval.lower_bound, (value + 1) as i64);
                    events |= DomainEvent::LowerBound;
                } else {
                    self.env.assign_int(interval.upper_bound, (value - 1) as i64);
                    events |= DomainEvent::UpperBound;
                }
                let new_lower_bound = self.env.int_value(interval.lower_bound) as i32;
                let new_upper_bound = self.env.int_value(interval.upper_bound) as i32;
                if new_lower_bound == new_upper_bound {
                    events |= DomainEvent::Assign;
                }
                (new_lower_bound, new_upper_bound, events)
            }
            IntegerDomain::Sparse(sparse) => {
                let _ = sparse.bits.remove(&mut self.env, (value - sparse.offset) as u32);
                self.env.add_assign_int(sparse.size, -1);

                let mut events: EnumSet<DomainEvent> = DomainEvent::Removal.into();
                let mut new_lower_bound = old_lower_bound;
                let mut new_upper_bound = old_upper_bound;
                if value == old_lower_bound {
                    new_lower_bound = sparse
                        .next_member_from(&self.env, value + 1)
                        .expect("the domain has at least two values");
                    self.env.assign_int(sparse.lower_bound, new_lower_bound as i64);
                    events |= DomainEvent::LowerBound;
                }
                if value == old_upper_bound {
                    new_upper_bound = sparse
                        .previous_member_from(&self.env, value - 1)
                        .expect("the domain has at least two values");
                    self.env.assign_int(sparse.upper_bound, new_upper_bound as i64);
                    events |= DomainEvent::UpperBound;
                }
                if new_lower_bound == new_upper_bound {
                    events |= DomainEvent::Assign;
                }
                (new_lower_bound, new_upper_bound, events)
            }
            IntegerDomain::Constant(_) => unreachable!(),
        };

        self.deltas[domain_id].push(&mut self.env, DeltaChange::Removed(value), cause);

        self.trail.record(DomainTrailEntry {
            predicate: predicate!(domain_id != value),
            old_lower_bound,
            old_upper_bound,
            new_lower_bound,
            new_upper_bound,
            reason,
        });

        notifications.event_occurred(domain_id, events);

        Ok(true)
    }

    fn make_assignment(
        &mut self,
        domain_id: DomainId,
        value: i32,
        cause: Option<PropagatorId>,
        reason: Option<ReasonRef>,
        notifications: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain = self.domains[domain_id];

        if let IntegerDomain::Constant(constant) = domain {
            return if value == constant {
                Ok(false)
            } else {
                Err(EmptyDomain)
            };
        }

        if !domain.contains(&self.env, value) {
            return Err(EmptyDomain);
        }

        let old_lower_bound = domain.lower_bound(&self.env);
        let old_upper_bound = domain.upper_bound(&self.env);

        if old_lower_bound == value && old_upper_bound == value {
            return Ok(false);
        }

        self.record_removed_below(domain_id, old_lower_bound, value, cause);
        self.record_removed_above(domain_id, value, old_upper_bound, cause);

        self.trail.record(DomainTrailEntry {
            predicate: predicate!(domain_id == value),
            old_lower_bound,
            old_upper_bound,
            new_lower_bound: value,
            new_upper_bound: value,
            reason,
        });

        let mut events: EnumSet<DomainEvent> = DomainEvent::Assign.into();
        match domain {
            IntegerDomain::Interval(interval) => {
                self.env.assign_int(interval.lower_bound, value as i64);
                self.env.assign_int(interval.upper_bound, value as i64);
            }
            IntegerDomain::Sparse(sparse) => {
                self.env.assign_int(sparse.lower_bound, value as i64);
                self.env.assign_int(sparse.upper_bound, value as i64);
                self.env.assign_int(sparse.size, 1);
            }
            IntegerDomain::Constant(_) => unreachable!(),
        }
        if old_lower_bound < value {
            events |= DomainEvent::LowerBound;
        }
        if old_upper_bound > value {
            events |= DomainEvent::UpperBound;
        }

        notifications.event_occurred(domain_id, events);

        Ok(true)
    }

    /// Append the members of `[from, to)` to the delta stream of `domain_id`.
    fn record_removed_below(
        &mut self,
        domain_id: DomainId,
        from: i32,
        to: i32,
        cause: Option<PropagatorId>,
    ) {
        if from >= to {
            return;
        }
        match self.domains[domain_id] {
            IntegerDomain::Interval(_) => {
                self.deltas[domain_id].push(
                    &mut self.env,
                    DeltaChange::RemovedRange(from, to - 1),
                    cause,
                );
            }
            IntegerDomain::Sparse(sparse) => {
                let mut member = Some(from);
                while let Some(value) = member {
                    if value >= to {
                        break;
                    }
                    self.deltas[domain_id].push(&mut self.env, DeltaChange::Removed(value), cause);
                    member = sparse.next_member_from(&self.env, value + 1);
                }
            }
            IntegerDomain::Constant(_) => unreachable!(),
        }
    }

    /// Append the members of `(from, to]` to the delta stream of `domain_id`.
    fn record_removed_above(
        &mut self,
        domain_id: DomainId,
        from: i32,
        to: i32,
        cause: Option<PropagatorId>,
    ) {
        if from >= to {
            return;
        }
        match self.domains[domain_id] {
            IntegerDomain::Interval(_) => {
                self.deltas[domain_id].push(
                    &mut self.env,
                    DeltaChange::RemovedRange(from + 1, to),
                    cause,
                );
            }
            IntegerDomain::Sparse(sparse) => {
                let mut member = sparse.next_member_from(&self.env, from + 1);
                while let Some(value) = member {
                    if value > to {
                        break;
                    }
                    self.deltas[domain_id].push(&mut self.env, DeltaChange::Removed(value), cause);
                    member = sparse.next_member_from(&self.env, value + 1);
                }
            }
            IntegerDomain::Constant(_) => unreachable!(),
        }
    }
}

// worlds
impl DomainStore {
    pub(crate) fn current_world(&self) -> u32 {
        calabash_assert_eq_moderate!(self.env.current_world(), self.trail.world());
        self.env.current_world()
    }

    pub(crate) fn push_world(&mut self) {
        self.env.push_world();
        self.trail.push_world();
    }

    /// Rewind the domains to `new_world`. Returns the variables which were fixed before
    /// backtracking and are unfixed afterwards, with the value they were fixed to.
    pub(crate) fn synchronise(
        &mut self,
        new_world: u32,
        notifications: &mut NotificationEngine,
    ) -> Vec<(DomainId, i32)> {
        let popped = self.trail.rewind_to(new_world);

        while self.env.current_world() > new_world {
            self.env.pop_world();
        }

        // The entries are in reverse push order, so the first occurrence of a domain carries its
        // pre-backtrack state in `new_lower_bound`/`new_upper_bound`.
        let mut unfixed_variables = Vec::new();
        let mut seen: HashSet<DomainId> = HashSet::default();
        for entry in &popped {
            let domain = entry.predicate.get_domain();
            if !seen.insert(domain) {
                continue;
            }
            let was_fixed = entry.new_lower_bound == entry.new_upper_bound;
            if was_fixed && !self.is_fixed(domain) {
                unfixed_variables.push((domain, entry.new_lower_bound));
            }
        }

        // Rolled-back mutations do not fire events.
        notifications.clear_events();

        unfixed_variables
    }

    /// Merge the current world into its parent.
    ///
    /// Committing while a delta monitor is active is a programming error; the interaction of a
    /// merge with partially drained streams is not defined.
    pub(crate) fn commit_world(&mut self) {
        calabash_assert_simple!(
            self.active_monitors == 0,
            "cannot commit a world while delta monitors are active"
        );
        self.env.commit_world();
        self.trail.merge_current_world_into_parent();
    }

    /// The decision which opened the current world, i.e. the head of its trail segment.
    pub(crate) fn find_last_decision(&self) -> Option<Predicate> {
        let entry = self.trail.current_decision()?;
        calabash_assert_moderate!(entry.reason.is_none());
        Some(entry.predicate)
    }
}

// delta monitors
impl DomainStore {
    /// Create a cursor over the delta stream of `domain`, starting at the current position.
    pub fn new_delta_monitor(&mut self, domain: DomainId) -> DeltaMonitor {
        let position = self.deltas[domain].len(&self.env);
        let cursor = self.env.make_int(position as i64);
        self.active_monitors += 1;
        DeltaMonitor { domain, cursor }
    }

    pub fn drop_delta_monitor(&mut self, _monitor: DeltaMonitor) {
        calabash_assert_simple!(self.active_monitors > 0);
        self.active_monitors -= 1;
    }

    /// Visit the removals recorded since the monitor's last drain and advance the cursor.
    pub fn drain_delta(
        &mut self,
        monitor: &DeltaMonitor,
        mut f: impl FnMut(DeltaChange, Option<PropagatorId>),
    ) {
        let len = self.deltas[monitor.domain].len(&self.env);
        let mut position = self.env.int_value(monitor.cursor) as usize;
        // The cursor may be ahead of the stream after backtracking past entries which were
        // drained in a deeper world.
        position = position.min(len);

        for index in position..len {
            let entry = self.deltas[monitor.domain].entry(index);
            f(entry.change, entry.cause);
        }
        self.env.assign_int(monitor.cursor, len as i64);
    }
}

// trail access for search and conflict analysis
impl DomainStore {
    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn trail_entry(&self, index: usize) -> DomainTrailEntry {
        self.trail.entry(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    fn post(
        store: &mut DomainStore,
        notifications: &mut NotificationEngine,
        predicate: Predicate,
    ) -> Result<bool, EmptyDomain> {
        store.post_predicate(predicate, None, None, notifications)
    }

    fn setup_interval(lower_bound: i32, upper_bound: i32) -> (DomainStore, NotificationEngine, DomainId) {
        let mut store = DomainStore::default();
        let mut notifications = NotificationEngine::default();
        notifications.grow();
        let domain = store.grow_interval(lower_bound, upper_bound);
        notifications.grow();
        (store, notifications, domain)
    }

    fn setup_sparse(values: &[i32]) -> (DomainStore, NotificationEngine, DomainId) {
        let mut store = DomainStore::default();
        let mut notifications = NotificationEngine::default();
        notifications.grow();
        let domain = store.grow_sparse(values);
        notifications.grow();
        (store, notifications, domain)
    }

    #[test]
    fn bounds_are_restored_by_popping_worlds() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);

        store.push_world();
        let _ = post(&mut store, &mut notifications, predicate!(x >= 5)).unwrap();
        store.push_world();
        let _ = post(&mut store, &mut notifications, predicate!(x == 9)).unwrap();

        assert_eq!((9, 9), (store.lower_bound(x), store.upper_bound(x)));

        let _ = store.synchronise(1, &mut notifications);
        assert_eq!((5, 10), (store.lower_bound(x), store.upper_bound(x)));

        let _ = store.synchronise(0, &mut notifications);
        assert_eq!((0, 10), (store.lower_bound(x), store.upper_bound(x)));
    }

    #[test]
    fn mutators_are_idempotent_and_silent_when_nothing_changes() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);
        let _ = notifications.take_events();
        let trail_len = store.trail_len();

        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x >= 0)));
        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x <= 10)));
        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x != 20)));

        assert!(notifications.take_events().is_empty());
        assert_eq!(trail_len, store.trail_len());
    }

    #[test]
    fn a_bound_update_emits_exactly_one_event_with_the_bound_mask() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);
        let _ = notifications.take_events();

        let changed = post(&mut store, &mut notifications, predicate!(x >= 3)).unwrap();
        assert!(changed);

        let events = notifications.take_events();
        assert_eq!(
            vec![(x, DomainEvent::LowerBound.into())],
            events
        );
    }

    #[test]
    fn a_bound_update_that_fixes_the_domain_promotes_to_assign() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);
        let _ = notifications.take_events();

        let _ = post(&mut store, &mut notifications, predicate!(x <= 0)).unwrap();

        let events = notifications.take_events();
        assert_eq!(
            vec![(x, DomainEvent::UpperBound | DomainEvent::Assign)],
            events
        );
    }

    #[test]
    fn removing_the_lower_bound_promotes_to_a_lower_bound_event() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 3, 7]);
        let _ = notifications.take_events();

        let _ = post(&mut store, &mut notifications, predicate!(x != 1)).unwrap();

        assert_eq!(3, store.lower_bound(x));
        let events = notifications.take_events();
        assert_eq!(
            vec![(x, DomainEvent::Removal | DomainEvent::LowerBound)],
            events
        );
    }

    #[test]
    fn removing_an_interior_value_of_an_interval_is_a_no_op() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);
        let _ = notifications.take_events();

        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x != 5)));
        assert!(store.contains(x, 5));
        assert!(!store.has_enumerated_domain(x));
    }

    #[test]
    fn an_enumerated_domain_keeps_holes() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 2, 3, 4, 5]);

        let _ = post(&mut store, &mut notifications, predicate!(x != 3)).unwrap();

        assert!(store.has_enumerated_domain(x));
        assert!(!store.contains(x, 3));
        assert_eq!(4, store.size(x));
        assert_eq!(Some(4), store.next_value(x, 3));
        assert_eq!(Some(2), store.previous_value(x, 3));
        assert_eq!(vec![1, 2, 4, 5], store.iterate_domain(x).collect::<Vec<_>>());
    }

    #[test]
    fn bounds_of_an_enumerated_domain_land_on_members() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 4, 9]);

        let _ = post(&mut store, &mut notifications, predicate!(x >= 2)).unwrap();
        assert_eq!(4, store.lower_bound(x));
        assert_eq!(2, store.size(x));

        let _ = post(&mut store, &mut notifications, predicate!(x <= 8)).unwrap();
        assert_eq!(4, store.upper_bound(x));
        assert_eq!(1, store.size(x));
        assert!(store.is_fixed(x));
    }

    #[test]
    fn wipeouts_are_signalled_before_any_change() {
        let (mut store, mut notifications, x) = setup_interval(3, 5);
        let _ = notifications.take_events();
        let trail_len = store.trail_len();

        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x >= 6)));
        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x <= 2)));
        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x == 9)));

        // The domain is untouched and nothing fired.
        assert_eq!((3, 5), (store.lower_bound(x), store.upper_bound(x)));
        assert_eq!(trail_len, store.trail_len());
        assert!(notifications.take_events().is_empty());
    }

    #[test]
    fn removing_the_last_value_is_a_wipeout() {
        let (mut store, mut notifications, x) = setup_interval(4, 4);

        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x != 4)));
        assert!(store.contains(x, 4));
    }

    #[test]
    fn bounds_are_monotone_within_a_world() {
        let (mut store, mut notifications, x) = setup_sparse(&[0, 2, 4, 6, 8, 10]);

        store.push_world();
        let mut previous_lower = store.lower_bound(x);
        let mut previous_upper = store.upper_bound(x);
        let mut previous_size = store.size(x);

        for predicate in [
            predicate!(x >= 1),
            predicate!(x != 4),
            predicate!(x <= 9),
            predicate!(x != 8),
        ] {
            let _ = post(&mut store, &mut notifications, predicate).unwrap();

            assert!(store.lower_bound(x) >= previous_lower);
            assert!(store.upper_bound(x) <= previous_upper);
            assert!(store.size(x) <= previous_size);
            previous_lower = store.lower_bound(x);
            previous_upper = store.upper_bound(x);
            previous_size = store.size(x);
        }
    }

    #[test]
    fn constants_never_touch_the_trail() {
        let mut store = DomainStore::default();
        let mut notifications = NotificationEngine::default();
        let x = store.grow_constant(7);
        let trail_len = store.trail_len();

        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x == 7)));
        assert_eq!(Ok(false), post(&mut store, &mut notifications, predicate!(x != 9)));
        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x != 7)));
        assert_eq!(Err(EmptyDomain), post(&mut store, &mut notifications, predicate!(x >= 8)));

        assert_eq!(trail_len, store.trail_len());
        assert_eq!(1, store.size(x));
    }

    #[test]
    fn the_delta_stream_records_removals_with_their_cause() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 2, 3, 4, 5]);
        let monitor = store.new_delta_monitor(x);

        let _ = post(&mut store, &mut notifications, predicate!(x != 3)).unwrap();
        let _ = post(&mut store, &mut notifications, predicate!(x >= 4)).unwrap();

        let mut seen = Vec::new();
        store.drain_delta(&monitor, |change, cause| seen.push((change, cause)));
        assert_eq!(
            vec![
                (DeltaChange::Removed(3), None),
                (DeltaChange::Removed(1), None),
                (DeltaChange::Removed(2), None),
            ],
            seen
        );

        // The monitor advanced past everything it has seen.
        let mut second = Vec::new();
        store.drain_delta(&monitor, |change, cause| second.push((change, cause)));
        assert!(second.is_empty());

        store.drop_delta_monitor(monitor);
    }

    #[test]
    fn bound_updates_of_intervals_record_range_removals() {
        let (mut store, mut notifications, x) = setup_interval(0, 10);
        let monitor = store.new_delta_monitor(x);

        let _ = post(&mut store, &mut notifications, predicate!(x == 4)).unwrap();

        let mut seen = Vec::new();
        store.drain_delta(&monitor, |change, _| seen.push(change));
        assert_eq!(
            vec![
                DeltaChange::RemovedRange(0, 3),
                DeltaChange::RemovedRange(5, 10),
            ],
            seen
        );
        store.drop_delta_monitor(monitor);
    }

    #[test]
    fn backtracking_restores_each_monitors_view() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 2, 3, 4, 5]);
        let monitor = store.new_delta_monitor(x);

        let _ = post(&mut store, &mut notifications, predicate!(x != 2)).unwrap();
        store.drain_delta(&monitor, |_, _| {});

        store.push_world();
        let _ = post(&mut store, &mut notifications, predicate!(x != 4)).unwrap();
        store.drain_delta(&monitor, |_, _| {});

        let _ = store.synchronise(0, &mut notifications);

        // The removal of 4 was rolled back together with the cursor; a new removal in the parent
        // world is observed exactly once.
        let _ = post(&mut store, &mut notifications, predicate!(x != 5)).unwrap();
        let mut seen = Vec::new();
        store.drain_delta(&monitor, |change, _| seen.push(change));
        assert_eq!(vec![DeltaChange::Removed(5)], seen);

        store.drop_delta_monitor(monitor);
    }

    #[test]
    #[should_panic = "cannot commit a world while delta monitors are active"]
    fn committing_with_an_active_monitor_is_a_programming_error() {
        let (mut store, _notifications, x) = setup_interval(0, 5);
        let _monitor = store.new_delta_monitor(x);

        store.push_world();
        store.commit_world();
    }

    #[test]
    fn the_first_entry_of_a_world_is_its_decision() {
        let (mut store, mut notifications, x) = setup_interval(0, 5);

        assert_eq!(None, store.find_last_decision());

        store.push_world();
        let _ = post(&mut store, &mut notifications, predicate!(x == 2)).unwrap();
        assert_eq!(Some(predicate!(x == 2)), store.find_last_decision());
    }

    #[test]
    fn evaluating_predicates() {
        let (mut store, mut notifications, x) = setup_sparse(&[1, 2, 3]);

        assert_eq!(Some(true), store.evaluate_predicate(predicate!(x >= 1)));
        assert_eq!(Some(false), store.evaluate_predicate(predicate!(x >= 4)));
        assert_eq!(None, store.evaluate_predicate(predicate!(x >= 2)));
        assert_eq!(None, store.evaluate_predicate(predicate!(x == 2)));

        let _ = post(&mut store, &mut notifications, predicate!(x != 2)).unwrap();
        assert_eq!(Some(true), store.evaluate_predicate(predicate!(x != 2)));

        let _ = post(&mut store, &mut notifications, predicate!(x == 1)).unwrap();
        assert_eq!(Some(true), store.evaluate_predicate(predicate!(x == 1)));
        assert_eq!(Some(false), store.evaluate_predicate(predicate!(x == 3)));
    }
}
