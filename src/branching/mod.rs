//! Contains structures and traits to define the decision making procedure of the solver.
//!
//! In general, it provides 3 traits:
//! - The [`Brancher`] which defines how a branching procedure (which selects an unfixed variable
//!   and splits its domain in some way) should operate; the main method of this trait is
//!   [`Brancher::next_decision`]. An example implementation is the
//!   [`branchers::IndependentVariableValueBrancher`].
//! - The [`VariableSelector`] which defines the method required of a variable selector; the main
//!   method is [`VariableSelector::select_variable`]. An example implementation is
//!   [`variable_selection::FirstFail`].
//! - The [`ValueSelector`] which defines the method required of a value selector; the main method
//!   is [`ValueSelector::select_value`]. An example implementation is
//!   [`value_selection::InDomainMin`].

mod brancher;
pub mod branchers;
mod selection_context;
pub mod tie_breaking;
pub mod value_selection;
pub mod variable_selection;

pub use brancher::Brancher;
pub use selection_context::SelectionContext;
pub use value_selection::ValueSelector;
pub use variable_selection::VariableSelector;
