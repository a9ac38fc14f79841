use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropositionalConjunction;
use crate::containers::HashSet;
use crate::engine::conflict_analysis::LearnedNogood;
use crate::engine::notifications::DomainEvents;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::store::PropagatorHandle;
use crate::engine::propagation::Domains;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::state::State;
use crate::engine::variables::DomainId;

/// The [`PropagatorConstructor`] for the [`NogoodPropagator`]. The propagator starts without any
/// nogoods; they arrive from conflict analysis and from solution blocking.
#[derive(Clone, Copy, Debug, Default)]
pub struct NogoodPropagatorArgs;

impl PropagatorConstructor for NogoodPropagatorArgs {
    type PropagatorImpl = NogoodPropagator;

    fn create(self, _context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        NogoodPropagator::default()
    }
}

/// A propagator over a database of nogoods: conjunctions of predicates that cannot all hold.
///
/// Each nogood acts as the clause of the negated predicates. When all predicates but one hold,
/// the negation of the remaining one is propagated with the others as its reason; when all hold,
/// a conflict is reported. Learned nogoods from conflict analysis and blocking nogoods from
/// solution enumeration both land here.
#[derive(Debug, Default)]
pub struct NogoodPropagator {
    nogoods: Vec<Vec<Predicate>>,
    /// Domains this propagator already watches; watches are registered lazily as nogoods mention
    /// new domains.
    watched: HashSet<DomainId>,
}

impl NogoodPropagator {
    /// Add a nogood to the database and immediately propagate it. Returns an inconsistency when
    /// the nogood is already violated.
    pub(crate) fn add_nogood(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        predicates: Vec<Predicate>,
    ) -> PropagationStatusCP {
        for predicate in &predicates {
            let domain = predicate.get_domain();
            if self.watched.insert(domain) {
                context.watch(&domain, DomainEvents::ANY, LocalId::from(0));
            }
        }
        let status = Self::propagate_nogood(&predicates, context);
        self.nogoods.push(predicates);
        status
    }

    /// Install a nogood derived by conflict analysis; the caller has already backjumped, so the
    /// asserting predicate propagates. Returns `false` when this proves the model infeasible.
    pub(crate) fn install_learned_nogood(
        state: &mut State,
        handle: PropagatorHandle<NogoodPropagator>,
        nogood: LearnedNogood,
    ) -> bool {
        state.with_propagator_mut(handle, |propagator, mut context| {
            if nogood.predicates.len() == 1 {
                // The nogood is a single current-world predicate; its negation is a root fact.
                context
                    .post(!nogood.predicates[0], PropositionalConjunction::default())
                    .is_ok()
            } else {
                propagator.add_nogood(&mut context, nogood.predicates).is_ok()
            }
        })
    }

    fn propagate_nogood(
        predicates: &[Predicate],
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatusCP {
        let mut unassigned: Option<usize> = None;
        for (index, &predicate) in predicates.iter().enumerate() {
            match context.evaluate_predicate(predicate) {
                Some(true) => {}
                Some(false) => return Ok(()),
                None => {
                    if unassigned.is_some() {
                        // Two or more undecided predicates; nothing propagates.
                        return Ok(());
                    }
                    unassigned = Some(index);
                }
            }
        }

        match unassigned {
            None => {
                let conjunction: PropositionalConjunction =
                    predicates.iter().copied().collect();
                Err(context.conflict(conjunction))
            }
            Some(index) => {
                let reason: PropositionalConjunction = predicates
                    .iter()
                    .enumerate()
                    .filter(|&(other, _)| other != index)
                    .map(|(_, &predicate)| predicate)
                    .collect();
                context.post(!predicates[index], reason)
            }
        }
    }
}

impl Propagator for NogoodPropagator {
    fn name(&self) -> &str {
        "NogoodPropagator"
    }

    fn priority(&self) -> Priority {
        Priority::Linear
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
        for nogood in &self.nogoods {
            Self::propagate_nogood(nogood, &mut context)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: Domains) -> Entailment {
        let mut entailment = Entailment::True;
        for nogood in &self.nogoods {
            let mut any_false = false;
            let mut any_unassigned = false;
            for &predicate in nogood {
                match context.evaluate_predicate(predicate) {
                    Some(false) => {
                        any_false = true;
                        break;
                    }
                    Some(true) => {}
                    None => any_unassigned = true,
                }
            }
            if any_false {
                continue;
            }
            if any_unassigned {
                entailment = Entailment::Undefined;
            } else {
                // Every predicate of the nogood holds.
                return Entailment::False;
            }
        }
        entailment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conjunction;
    use crate::engine::test_solver::TestSolver;
    use crate::predicate;

    #[test]
    fn a_unit_nogood_propagates_its_negation() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        solver
            .add_nogood(vec![predicate!(x >= 5)])
            .expect("no conflict");

        solver.assert_bounds(x, 0, 4);
    }

    #[test]
    fn the_last_open_predicate_is_asserted() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);

        solver
            .add_nogood(vec![predicate!(x >= 5), predicate!(y == 3)])
            .expect("no conflict");

        // Not yet propagating: x >= 5 is undecided.
        assert!(solver.contains(y, 3));

        solver.post_and_propagate(predicate!(x >= 5)).expect("no conflict");
        assert!(!solver.contains(y, 3));

        let reason = solver.get_reason_for(predicate!(y != 3));
        assert_eq!(conjunction!([x >= 5]), reason.into());
    }

    #[test]
    fn a_violated_nogood_is_a_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(7, 10);

        let result = solver.add_nogood(vec![predicate!(x >= 5)]);
        assert!(result.is_err());
    }
}
