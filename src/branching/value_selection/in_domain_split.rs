use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::variables::IntegerVariable;

/// A [`ValueSelector`] which splits the domain in half, i.e. the decision is `[x <= m]` with `m`
/// the midpoint of the current bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainSplit;

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainSplit {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: Var,
    ) -> Predicate {
        let lower_bound = context.lower_bound(&decision_variable);
        let upper_bound = context.upper_bound(&decision_variable);
        // Rounded down, so the left branch never covers the whole domain.
        let middle = lower_bound + (upper_bound - lower_bound) / 2;
        decision_variable.upper_bound_predicate(middle)
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
    fn the_domain_is_split_in_the_middle() {
        let store = SelectionContext::create_for_testing(vec![(0, 10)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variable: DomainId = context.get_domains().next().unwrap();

        let decision = InDomainSplit.select_value(&mut context, variable);
        assert_eq!(predicate!(variable <= 5), decision);
    }

    #[test]
    fn a_two_value_domain_splits_on_the_lower_value() {
        let store = SelectionContext::create_for_testing(vec![(4, 5)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variable: DomainId = context.get_domains().next().unwrap();

        let decision = InDomainSplit.select_value(&mut context, variable);
        assert_eq!(predicate!(variable <= 4), decision);
    }
}
