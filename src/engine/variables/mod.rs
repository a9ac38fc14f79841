//! The integer-variable views the propagators operate on.
//!
//! The most basic variable is a [`DomainId`], a plain handle into the domain store. Richer views
//! ([`AffineView`], [`Literal`]) implement the same [`IntegerVariable`] interface by transforming
//! bounds, values, events, and predicates on the fly.

mod affine_view;
mod domain_id;
mod integer_variable;
mod literal;

pub use affine_view::AffineView;
pub use domain_id::DomainId;
pub use integer_variable::IntegerVariable;
pub use integer_variable::TransformableVariable;
pub use literal::Literal;
