use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::variables::IntegerVariable;

/// A [`ValueSelector`] which selects the lower bound of the domain, i.e. the decision is
/// `[x == lb(x)]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainMin;

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainMin {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: Var,
    ) -> Predicate {
        decision_variable.equality_predicate(context.lower_bound(&decision_variable))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::variables::DomainId;
    use crate::predicate;

    #[test]
    fn the_lower_bound_is_selected() {
        let store = SelectionContext::create_for_testing(vec![(3, 8)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variable: DomainId = context.get_domains().next().unwrap();

        let decision = InDomainMin.select_value(&mut context, variable);
        assert_eq!(predicate!(variable == 3), decision);
    }
}
