//! The contract between the engine and the propagators.
//!
//! A propagator declares its watched variables with condition masks and a [`Priority`]; the engine
//! wakes it through [`Propagator::notify`], runs its filtering through [`Propagator::propagate`],
//! and lets it report entailment through [`Propagator::is_entailed`]. See [`Propagator`] for the
//! full contract.

pub(crate) mod constructor;
mod contexts;
mod local_id;
mod propagator;
mod propagator_id;
mod propagator_var_id;
pub(crate) mod store;

pub use constructor::PropagatorConstructor;
pub use constructor::PropagatorConstructorContext;
pub use contexts::*;
pub use local_id::LocalId;
pub use propagator::EnqueueDecision;
pub use propagator::Entailment;
pub use propagator::Priority;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
pub(crate) use propagator_var_id::PropagatorVarId;
