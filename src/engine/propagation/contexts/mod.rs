mod explanation_context;
mod propagation_context;

pub use explanation_context::ExplanationContext;
pub use propagation_context::*;
