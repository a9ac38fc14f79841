mod nogood_propagator;

pub use nogood_propagator::NogoodPropagator;
pub use nogood_propagator::NogoodPropagatorArgs;
