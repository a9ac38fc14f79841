use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropositionalConjunction;
use crate::engine::notifications::DomainEvents;
use crate::engine::propagation::Domains;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::ManipulateTrailedValues;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::trailed::RevInt;
use crate::engine::variables::IntegerVariable;
use crate::predicate;

/// The [`PropagatorConstructor`] for the [`LinearLessOrEqualPropagator`].
#[derive(Clone, Debug)]
pub struct LinearLessOrEqualPropagatorArgs<Var> {
    pub x: Box<[Var]>,
    pub c: i32,
}

impl<Var> PropagatorConstructor for LinearLessOrEqualPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = LinearLessOrEqualPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let LinearLessOrEqualPropagatorArgs { x, c } = self;

        let mut lower_bound_left_hand_side = 0_i64;
        let mut current_bounds = Vec::with_capacity(x.len());

        for (i, x_i) in x.iter().enumerate() {
            context.register(
                x_i.clone(),
                DomainEvents::LOWER_BOUND,
                LocalId::from(i as u32),
            );
            lower_bound_left_hand_side += context.lower_bound(x_i) as i64;
            current_bounds.push(context.new_trailed_integer(context.lower_bound(x_i) as i64));
        }

        let lower_bound_left_hand_side =
            context.new_trailed_integer(lower_bound_left_hand_side);

        LinearLessOrEqualPropagator {
            x,
            c,
            lower_bound_left_hand_side,
            current_bounds: current_bounds.into(),
        }
    }
}

/// Propagator for the constraint `\sum x_i <= c`.
#[derive(Clone, Debug)]
pub struct LinearLessOrEqualPropagator<Var> {
    x: Box<[Var]>,
    c: i32,

    /// The lower bound of the sum of the left-hand side, maintained incrementally in a reversible
    /// cell.
    lower_bound_left_hand_side: RevInt,
    /// The value at index `i` is the known lower bound for `x[i]`.
    current_bounds: Box<[RevInt]>,
}

impl<Var: IntegerVariable> LinearLessOrEqualPropagator<Var> {
    /// Fold the bound changes since the last call into the incremental sum.
    fn refresh_incremental_sum(&self, context: &mut PropagationContextMut) {
        for (i, x_i) in self.x.iter().enumerate() {
            let lower_bound = context.lower_bound(x_i) as i64;
            let stored = context.trailed_value(self.current_bounds[i]);
            if lower_bound != stored {
                context.add_assign_trailed(self.lower_bound_left_hand_side, lower_bound - stored);
                context.assign_trailed(self.current_bounds[i], lower_bound);
            }
        }
    }

    fn conflict_conjunction(&self, context: &impl ReadDomains) -> PropositionalConjunction {
        self.x
            .iter()
            .map(|x_i| predicate![x_i >= context.lower_bound(x_i)])
            .collect()
    }
}

impl<Var> Propagator for LinearLessOrEqualPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LinearLeq"
    }

    fn priority(&self) -> Priority {
        Priority::Linear
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
        self.refresh_incremental_sum(&mut context);

        let lower_bound_left_hand_side = context.trailed_value(self.lower_bound_left_hand_side);
        if lower_bound_left_hand_side > self.c as i64 {
            let conjunction = self.conflict_conjunction(&context);
            return Err(context.conflict(conjunction));
        }

        for (i, x_i) in self.x.iter().enumerate() {
            let lower_bound_x_i = context.lower_bound(x_i) as i64;
            let bound = self.c as i64 - (lower_bound_left_hand_side - lower_bound_x_i);
            if (context.upper_bound(x_i) as i64) > bound {
                let reason: PropositionalConjunction = self
                    .x
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, x_j)| predicate![x_j >= context.lower_bound(x_j)])
                    .collect();
                let bound = bound.max(i32::MIN as i64 + 1) as i32;
                context.post(predicate![x_i <= bound], reason)?;
            }
        }

        Ok(())
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

        if upper_bound <= self.c as i64 {
            Entailment::True
        } else if lower_bound > self.c as i64 {
            Entailment::False
        } else {
            Entailment::Undefined
        }
    }

    fn detect_inconsistency(&self, context: Domains) -> Option<PropositionalConjunction> {
        let lower_bound: i64 = self
            .x
            .iter()
            .map(|x_i| context.lower_bound(x_i) as i64)
            .sum();
        (lower_bound > self.c as i64).then(|| self.conflict_conjunction(&context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conjunction;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn bounds_are_filtered_from_the_sum() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 5);
        let y = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(LinearLessOrEqualPropagatorArgs {
                x: [x, y].into(),
                c: 7,
            })
            .expect("no conflict");

        solver.assert_bounds(x, 1, 5);
        solver.assert_bounds(y, 0, 6);
    }

    #[test]
    fn conflict_when_the_lower_bounds_exceed_the_constant() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(5, 10);
        let y = solver.new_variable(4, 10);

        let result = solver.new_propagator(LinearLessOrEqualPropagatorArgs {
            x: [x, y].into(),
            c: 8,
        });

        assert!(result.is_err());
    }

    #[test]
    fn the_reason_names_the_other_lower_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 5);
        let y = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(LinearLessOrEqualPropagatorArgs {
                x: [x, y].into(),
                c: 7,
            })
            .expect("no conflict");

        let reason = solver.get_reason_for(predicate!(y <= 4));
        assert_eq!(conjunction!([x >= 3]), reason.into());
    }

    #[test]
    fn entailment_follows_the_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 2);
        let y = solver.new_variable(0, 2);

        let propagator = solver
            .new_propagator(LinearLessOrEqualPropagatorArgs {
                x: [x, y].into(),
                c: 4,
            })
            .expect("no conflict");

        assert_eq!(Entailment::True, solver.is_entailed(propagator));
    }
}
