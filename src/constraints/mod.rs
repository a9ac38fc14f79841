//! Defines the constraints that the solver provides out of the box, which can be added through
//! [`Solver::add_constraint`].
//!
//! A constraint is a relation over variables. In the solver, constraints are enforced through
//! propagators, and therefore constraints can be viewed as a collection of propagators.
//!
//! # Example
//! ```
//! # use calabash_solver::constraints;
//! # use calabash_solver::Solver;
//! let mut solver = Solver::default();
//!
//! let a = solver.new_bounded_integer(0, 3);
//! let b = solver.new_bounded_integer(0, 3);
//!
//! solver
//!     .add_constraint(constraints::equals(vec![a, b], 0))
//!     .expect("the constraint is consistent at the root");
//! ```

mod all_different;
mod arithmetic;

pub use all_different::all_different;
pub use arithmetic::*;

use crate::basic_types::ConstraintOperationError;
use crate::engine::propagation::PropagatorConstructor;
use crate::propagators::ReifiedPropagatorArgs;
use crate::variables::Literal;
use crate::Solver;

/// A [`Constraint`] is a relation over variables. It disqualifies certain partial assignments of
/// making it into a solution of the problem.
///
/// For example, the constraint `a = b` only allows assignments where `a` and `b` take the same
/// value.
pub trait Constraint {
    /// Add the [`Constraint`] to the [`Solver`] permanently.
    ///
    /// This method returns a [`ConstraintOperationError`] if the addition of the [`Constraint`]
    /// led to a root-level conflict.
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError>;

    /// Add the [`Constraint`] to the [`Solver`]; it is unposted automatically when the world in
    /// which it was posted is popped.
    fn post_temporary(self, solver: &mut Solver) -> Result<(), ConstraintOperationError>;

    /// Add the half-reified version of the [`Constraint`] to the [`Solver`], i.e. post
    /// `r -> constraint` where `r` is the given reification literal.
    fn implied_by(
        self,
        solver: &mut Solver,
        reification_literal: Literal,
    ) -> Result<(), ConstraintOperationError>;
}

impl<ConcretePropagator> Constraint for ConcretePropagator
where
    ConcretePropagator: PropagatorConstructor + 'static,
    ConcretePropagator::PropagatorImpl: 'static,
{
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        solver.add_propagator(self)
    }

    fn post_temporary(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        solver.add_temporary_propagator(self)
    }

    fn implied_by(
        self,
        solver: &mut Solver,
        reification_literal: Literal,
    ) -> Result<(), ConstraintOperationError> {
        solver.add_propagator(ReifiedPropagatorArgs {
            propagator: self,
            reification_literal,
        })
    }
}

impl<C: Constraint> Constraint for Vec<C> {
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        self.into_iter().try_for_each(|constraint| constraint.post(solver))
    }

    fn post_temporary(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        self.into_iter()
            .try_for_each(|constraint| constraint.post_temporary(solver))
    }

    fn implied_by(
        self,
        solver: &mut Solver,
        reification_literal: Literal,
    ) -> Result<(), ConstraintOperationError> {
        self.into_iter()
            .try_for_each(|constraint| constraint.implied_by(solver, reification_literal))
    }
}
