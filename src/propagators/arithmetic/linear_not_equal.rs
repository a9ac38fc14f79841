use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropositionalConjunction;
use crate::engine::notifications::DomainEvents;
use crate::engine::propagation::Domains;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::variables::IntegerVariable;
use crate::predicate;

/// The [`PropagatorConstructor`] for the [`LinearNotEqualPropagator`].
#[derive(Clone, Debug)]
pub struct LinearNotEqualPropagatorArgs<Var> {
    pub x: Box<[Var]>,
    pub c: i32,
}

impl<Var> PropagatorConstructor for LinearNotEqualPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = LinearNotEqualPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let LinearNotEqualPropagatorArgs { x, c } = self;

        for (i, x_i) in x.iter().enumerate() {
            context.register(x_i.clone(), DomainEvents::ASSIGN, LocalId::from(i as u32));
        }

        LinearNotEqualPropagator {
            x,
            c,
            reason_buffer: Vec::default(),
        }
    }
}

/// Propagator for the constraint `\sum x_i != c`: once all but one variable are fixed, the
/// remaining one cannot take the completing value.
#[derive(Clone, Debug)]
pub struct LinearNotEqualPropagator<Var> {
    x: Box<[Var]>,
    c: i32,
    /// Scratch space for materialising lazy explanations.
    reason_buffer: Vec<Predicate>,
}

impl<Var> Propagator for LinearNotEqualPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LinearNe"
    }

    fn priority(&self) -> Priority {
        Priority::Linear
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
        let mut sum_of_fixed = 0_i64;
        let mut unfixed: Option<usize> = None;

        for (i, x_i) in self.x.iter().enumerate() {
            if context.is_fixed(x_i) {
                sum_of_fixed += context.lower_bound(x_i) as i64;
            } else if unfixed.is_some() {
                // With two or more unfixed terms nothing can be deduced.
                return Ok(());
            } else {
                unfixed = Some(i);
            }
        }

        match unfixed {
            None => {
                if sum_of_fixed == self.c as i64 {
                    let conjunction: PropositionalConjunction = self
                        .x
                        .iter()
                        .map(|x_i| predicate![x_i == context.lower_bound(x_i)])
                        .collect();
                    Err(context.conflict(conjunction))
                } else {
                    // All terms are fixed and the sum misses the constant; the relation holds in
                    // the remainder of this branch.
                    context.set_passive();
                    Ok(())
                }
            }
            Some(i) => {
                let forbidden = self.c as i64 - sum_of_fixed;
                let Ok(forbidden) = i32::try_from(forbidden) else {
                    return Ok(());
                };
                let x_i = &self.x[i];
                if context.contains(x_i, forbidden) {
                    context.post(predicate![x_i != forbidden], i as u64)?;
                }
                Ok(())
            }
        }
    }

    fn lazy_explanation(&mut self, code: u64, context: ExplanationContext) -> &[Predicate] {
        // The removal on position `code` is explained by the fixed values of all other terms.
        let skip = code as usize;
        self.reason_buffer.clear();
        self.reason_buffer.extend(
            self.x
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != skip)
                .map(|(_, x_j)| predicate![x_j == context.lower_bound(x_j)]),
        );
        &self.reason_buffer
    }

    fn is_entailed(&self, context: Domains) -> Entailment {
        let lower_bound: i64 = self
            .x
            .iter()
            .map(|x_i| context.lower_bound(x_i) as i64)
            .sum();
        let upper_bound: i64 = self
            .x
            .iter()
            .map(|x_i| context.upper_bound(x_i) as i64)
            .sum();

        if lower_bound == upper_bound {
            // All terms fixed.
            return if lower_bound == self.c as i64 {
                Entailment::False
            } else {
                Entailment::True
            };
        }
        if lower_bound > self.c as i64 || upper_bound < self.c as i64 {
            Entailment::True
        } else {
            Entailment::Undefined
        }
    }

    fn detect_inconsistency(&self, context: Domains) -> Option<PropositionalConjunction> {
        let all_fixed = self.x.iter().all(|x_i| context.is_fixed(x_i));
        if !all_fixed {
            return None;
        }
        let sum: i64 = self
            .x
            .iter()
            .map(|x_i| context.lower_bound(x_i) as i64)
            .sum();
        (sum == self.c as i64).then(|| {
            self.x
                .iter()
                .map(|x_i| predicate![x_i == context.lower_bound(x_i)])
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn the_completing_value_is_removed() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 3);
        let y = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(LinearNotEqualPropagatorArgs {
                x: [x, y].into(),
                c: 5,
            })
            .expect("no conflict");

        assert!(!solver.contains(y, 2));
        assert!(solver.contains(y, 1));
        assert!(solver.contains(y, 3));
    }

    #[test]
    fn conflict_when_the_fixed_sum_hits_the_constant() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 3);
        let y = solver.new_variable(2, 2);

        let result = solver.new_propagator(LinearNotEqualPropagatorArgs {
            x: [x, y].into(),
            c: 5,
        });

        assert!(result.is_err());
    }

    #[test]
    fn the_lazy_reason_names_the_fixed_values() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 3);
        let y = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(LinearNotEqualPropagatorArgs {
                x: [x, y].into(),
                c: 5,
            })
            .expect("no conflict");

        let reason = solver.get_reason_for(predicate!(y != 2));
        assert_eq!(vec![predicate!(x == 3)], reason);
    }

    #[test]
    fn entailed_once_the_sum_cannot_reach_the_constant() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);
        let y = solver.new_variable(0, 1);

        let propagator = solver
            .new_propagator(LinearNotEqualPropagatorArgs {
                x: [x, y].into(),
                c: 5,
            })
            .expect("no conflict");

        assert_eq!(Entailment::True, solver.is_entailed(propagator));
    }
}
