use super::Constraint;
use crate::propagators::LinearLessOrEqualPropagatorArgs;
use crate::propagators::LinearNotEqualPropagatorArgs;
use crate::variables::IntegerVariable;
use crate::variables::TransformableVariable;

/// Creates the [`Constraint`] `\sum terms_i <= rhs`.
pub fn less_than_or_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    LinearLessOrEqualPropagatorArgs {
        x: terms.into(),
        c: rhs,
    }
}

/// Creates the [`Constraint`] `\sum terms_i = rhs`, decomposed into the two inequalities.
pub fn equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    let terms: Box<[Var]> = terms.into();
    let negated: Box<[Var::AffineView]> =
        terms.iter().map(|term| term.scaled(-1)).collect();
    let positive: Box<[Var::AffineView]> =
        terms.iter().map(|term| term.scaled(1)).collect();

    vec![
        LinearLessOrEqualPropagatorArgs {
            x: positive,
            c: rhs,
        },
        LinearLessOrEqualPropagatorArgs {
            x: negated,
            c: -rhs,
        },
    ]
}

/// Creates the [`Constraint`] `\sum terms_i != rhs`.
pub fn not_equals<Var: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    LinearNotEqualPropagatorArgs {
        x: terms.into(),
        c: rhs,
    }
}

/// Creates the [`Constraint`] `lhs != rhs`.
pub fn binary_not_equals<Var: IntegerVariable + 'static>(lhs: Var, rhs: Var) -> impl Constraint {
    LinearNotEqualPropagatorArgs {
        x: [lhs.scaled(1), rhs.scaled(-1)].into(),
        c: 0,
    }
}
