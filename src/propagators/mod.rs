//! The built-in propagators.
//!
//! This is deliberately a small set: enough to exercise every mechanism of the engine (bounds
//! reasoning with reversible state, assignment-triggered filtering with lazy explanations,
//! nogoods, reification). Richer global constraints follow the same
//! [`crate::engine::propagation::Propagator`] contract.

pub(crate) mod arithmetic;
pub(crate) mod nogoods;
mod reified_propagator;

pub use arithmetic::linear_less_or_equal::LinearLessOrEqualPropagator;
pub use arithmetic::linear_less_or_equal::LinearLessOrEqualPropagatorArgs;
pub use arithmetic::linear_not_equal::LinearNotEqualPropagator;
pub use arithmetic::linear_not_equal::LinearNotEqualPropagatorArgs;
pub use reified_propagator::ReifiedPropagator;
pub use reified_propagator::ReifiedPropagatorArgs;
