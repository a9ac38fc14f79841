use std::error::Error;
use std::fmt;

/// Errors related to the posting and unposting of constraints. These are programming errors from
/// the perspective of the solver; they are never raised during a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The constraint was posted while the model is already known to be infeasible.
    InfeasibleState,
    /// Posting the constraint led to a root-level conflict.
    InfeasibleConstraint,
    /// The constraint that was requested to be unposted is not (or no longer) posted.
    UnknownConstraint,
}

impl fmt::Display for ConstraintOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOperationError::InfeasibleState => {
                write!(f, "Operation failed because the model is in an infeasible state")
            }
            ConstraintOperationError::InfeasibleConstraint => {
                write!(f, "Adding the constraint led to a root-level conflict")
            }
            ConstraintOperationError::UnknownConstraint => {
                write!(f, "The constraint is not posted")
            }
        }
    }
}

impl Error for ConstraintOperationError {}
