//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows
//! setting up specific scenarios under which to test the various operations of a propagator.

use crate::basic_types::Inconsistency;
use crate::basic_types::StoredConflictInfo;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::store::PropagatorHandle;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorId;
use crate::engine::state::State;
use crate::engine::termination::Indefinite;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;
use crate::propagators::nogoods::NogoodPropagator;
use crate::propagators::nogoods::NogoodPropagatorArgs;

/// A container for variables and propagators which can be used to test propagators in isolation
/// from the search.
#[derive(Debug)]
pub struct TestSolver {
    pub state: State,
    nogood_propagator: PropagatorHandle<NogoodPropagator>,
}

impl Default for TestSolver {
    fn default() -> Self {
        let mut state = State::default();
        let nogood_propagator = state.add_propagator(NogoodPropagatorArgs);
        TestSolver {
            state,
            nogood_propagator,
        }
    }
}

impl TestSolver {
    pub fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.state
            .new_interval_variable(lower_bound, upper_bound, None)
    }

    pub fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        self.state.new_sparse_variable(values, None)
    }

    pub fn new_literal(&mut self) -> Literal {
        self.state.new_literal(None)
    }

    /// Post a propagator and run the engine to a fixed point.
    pub fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, StoredConflictInfo>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let handle = self.state.add_propagator(constructor);
        self.state
            .propagate_to_fixed_point(&mut Indefinite)
            .map(|_| handle.untyped())
    }

    /// Post a predicate (as an external fact) and run the engine to a fixed point.
    pub fn post_and_propagate(
        &mut self,
        predicate: Predicate,
    ) -> Result<(), StoredConflictInfo> {
        if self.state.post(predicate).is_err() {
            return Err(self
                .state
                .take_conflict()
                .expect("the failed post records its conflict"));
        }
        self.state.propagate_to_fixed_point(&mut Indefinite)
    }

    /// Add a nogood to the nogood propagator and run the engine to a fixed point.
    pub fn add_nogood(
        &mut self,
        predicates: Vec<Predicate>,
    ) -> Result<(), StoredConflictInfo> {
        let handle = self.nogood_propagator;
        let result = self
            .state
            .with_propagator_mut(handle, |propagator, mut context| {
                propagator.add_nogood(&mut context, predicates)
            });
        match result {
            Ok(()) => self.state.propagate_to_fixed_point(&mut Indefinite),
            Err(Inconsistency::EmptyDomain) => Err(self
                .state
                .take_conflict()
                .expect("the failed post records its conflict")),
            Err(Inconsistency::Conflict(conflict)) => {
                Err(StoredConflictInfo::Propagator(conflict))
            }
        }
    }

    pub fn contains<Var: IntegerVariable>(&self, var: Var, value: i32) -> bool {
        var.contains(&self.state.domains, value)
    }

    pub fn lower_bound(&self, domain: DomainId) -> i32 {
        self.state.domains.lower_bound(domain)
    }

    pub fn upper_bound(&self, domain: DomainId) -> i32 {
        self.state.domains.upper_bound(domain)
    }

    pub fn assert_bounds(&self, domain: DomainId, lower_bound: i32, upper_bound: i32) {
        let actual_lower_bound = self.lower_bound(domain);
        let actual_upper_bound = self.upper_bound(domain);

        assert_eq!(
            (lower_bound, upper_bound),
            (actual_lower_bound, actual_upper_bound),
            "The expected bounds [{lower_bound}..{upper_bound}] did not match the actual bounds [{actual_lower_bound}..{actual_upper_bound}]"
        );
    }

    pub fn is_entailed(&self, propagator: PropagatorId) -> Entailment {
        self.state.is_propagator_entailed(propagator)
    }

    /// The reason recorded for the given (propagated) predicate.
    pub fn get_reason_for(&mut self, predicate: Predicate) -> Vec<Predicate> {
        let reason_ref = (0..self.state.domains.trail_len())
            .find_map(|index| {
                let entry = self.state.domains.trail_entry(index);
                (entry.predicate == predicate).then_some(entry.reason)
            })
            .flatten()
            .unwrap_or_else(|| panic!("no reason was recorded for {predicate}"));

        let mut reason = Vec::new();
        self.state.compute_reason(reason_ref, &mut reason);
        reason
    }
}
