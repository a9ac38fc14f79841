//! Calabash is a finite-domain constraint solver core built around lazy clause generation.
//!
//! A model is a set of integer variables with finite domains and constraints relating them; the
//! solver searches depth-first for assignments that satisfy every constraint, optionally
//! optimising an objective. Domains live in reversible memory organised in *worlds*: opening a
//! world snapshots the state, popping it restores the snapshot. Propagators filter domains to a
//! fixed point between decisions, and conflicts are either refuted chronologically or resolved
//! into learned nogoods.
//!
//! # Example
//! ```
//! # use calabash_solver::constraints;
//! # use calabash_solver::results::SatisfactionResult;
//! # use calabash_solver::termination::Indefinite;
//! # use calabash_solver::Solver;
//! let mut solver = Solver::default();
//! let x = solver.new_bounded_integer(1, 3);
//! let y = solver.new_bounded_integer(1, 3);
//!
//! solver
//!     .add_constraint(constraints::equals(vec![x, y], 4))
//!     .expect("the constraint is consistent at the root");
//!
//! let mut brancher = solver.default_brancher();
//! let mut termination = Indefinite;
//! let SatisfactionResult::Satisfiable(solution) =
//!     solver.satisfy(&mut brancher, &mut termination)
//! else {
//!     panic!("expected a solution");
//! };
//! assert_eq!(4, solution.value(x) + solution.value(y));
//! ```

pub(crate) mod basic_types;
pub mod branching;
mod calabash_asserts;
pub mod constraints;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod math;
pub mod optimisation;
pub mod propagators;
pub mod statistics;

#[doc(hidden)]
pub mod asserts {
    pub use crate::calabash_asserts::*;
}

// We declare a private module with public use, so that all exports from the API are exports
// directly from the crate.
mod api;

pub use api::*;

pub use crate::api::solver::DefaultBrancher;
pub use crate::api::solver::Solver;
pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Random;
pub use crate::engine::test_solver::TestSolver;
pub use crate::engine::SolverStatistics;
pub use rand;

pub mod results {
    //! The outcomes of the solving endpoints.
    pub use crate::api::outputs::solution_iterator::IteratedSolution;
    pub use crate::api::outputs::solution_iterator::SolutionIterator;
    pub use crate::api::outputs::OptimisationResult;
    pub use crate::api::outputs::SatisfactionResult;
    pub use crate::basic_types::Solution;
    pub use crate::basic_types::SolutionReference;
}

pub mod options {
    //! The configuration of the solver.
    pub use crate::basic_types::sequence_generators::SequenceGeneratorType;
    pub use crate::engine::ConflictResolution;
    pub use crate::engine::RestartOptions;
    pub use crate::engine::SatisfactionSolverOptions as SolverOptions;
}

pub mod predicates {
    //! Containers and functions related to [`Predicate`], the atomic domain operations which
    //! double as the literals of the explanation layer.
    pub use crate::basic_types::PropositionalConjunction;
    pub use crate::engine::predicates::predicate::Predicate;
    pub use crate::engine::predicates::predicate::PredicateType;
    pub use crate::engine::predicates::predicate_constructor::PredicateConstructor;
}

pub mod variables {
    //! The variable views over the domains; see [`IntegerVariable`].
    pub use crate::engine::variables::AffineView;
    pub use crate::engine::variables::DomainId;
    pub use crate::engine::variables::IntegerVariable;
    pub use crate::engine::variables::Literal;
    pub use crate::engine::variables::TransformableVariable;
}

pub mod termination {
    //! Conditions polled by the solver to decide when to give up searching.
    pub use crate::engine::termination::Combinator;
    pub use crate::engine::termination::DecisionBudget;
    pub use crate::engine::termination::Indefinite;
    pub use crate::engine::termination::TerminationCondition;
    pub use crate::engine::termination::TimeBudget;
}

pub mod propagation {
    //! The contract between the engine and the propagators; implement
    //! [`Propagator`] and [`PropagatorConstructor`] to define custom filtering.
    pub use crate::engine::propagation::Domains;
    pub use crate::engine::propagation::EnqueueDecision;
    pub use crate::engine::propagation::Entailment;
    pub use crate::engine::propagation::ExplanationContext;
    pub use crate::engine::propagation::LocalId;
    pub use crate::engine::propagation::ManipulateTrailedValues;
    pub use crate::engine::propagation::NotificationContext;
    pub use crate::engine::propagation::PropagationContextMut;
    pub use crate::engine::propagation::Priority;
    pub use crate::engine::propagation::Propagator;
    pub use crate::engine::propagation::PropagatorConstructor;
    pub use crate::engine::propagation::PropagatorConstructorContext;
    pub use crate::engine::propagation::PropagatorId;
    pub use crate::engine::propagation::ReadDomains;
    pub use crate::engine::reason::Reason;

    pub use crate::basic_types::Inconsistency;
    pub use crate::basic_types::PropagationStatusCP;
    pub use crate::basic_types::PropagatorConflict;
    pub use crate::basic_types::StoredConflictInfo;
}

pub mod notifications {
    //! The domain events and condition masks through which propagators subscribe to changes.
    pub use crate::engine::notifications::DomainEvent;
    pub use crate::engine::notifications::DomainEvents;
    pub use crate::engine::notifications::Watchers;
}

pub mod domains {
    //! The domain store and the delta streams of removed values.
    pub use crate::engine::domains::DeltaChange;
    pub use crate::engine::domains::DeltaMonitor;
    pub use crate::engine::domains::DomainStore;
    pub use crate::engine::domains::EmptyDomain;
}

pub mod trailed {
    //! Reversible memory: worlds and the cells restored by backtracking.
    pub use crate::engine::trailed::Environment;
    pub use crate::engine::trailed::RevBitSet;
    pub use crate::engine::trailed::RevBool;
    pub use crate::engine::trailed::RevInt;
    pub use crate::engine::trailed::RevRef;
}
