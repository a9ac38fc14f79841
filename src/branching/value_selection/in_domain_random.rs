use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::variables::IntegerVariable;

/// A [`ValueSelector`] which selects a random value in the domain of the variable.
///
/// Intended for variables with an enumerated domain: refuting `[x == v]` for an interior value
/// `v` of a bounded interval cannot be recorded (the interval keeps no holes), so the refutation
/// would not prune anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct InDomainRandom;

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainRandom {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: Var,
    ) -> Predicate {
        let lower_bound = context.lower_bound(&decision_variable);
        let upper_bound = context.upper_bound(&decision_variable);
        let mut value = context
            .random()
            .generate_i32_in_range(lower_bound..upper_bound + 1);
        // The draw may have hit a hole of an enumerated domain.
        if !context.contains(&decision_variable, value) {
            value = context
                .next_value(&decision_variable, value)
                .expect("a value above a hole exists because the upper bound is a member");
        }
        decision_variable.equality_predicate(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::basic_types::tests::TestRandom;
    use crate::branching::SelectionContext;
    use crate::branching::ValueSelector;
    use crate::engine::variables::DomainId;
    use crate::predicate;

    use super::InDomainRandom;

    #[test]
    fn the_scripted_value_is_selected() {
        let store = SelectionContext::create_for_testing(vec![(0, 10)]);
        let mut random = TestRandom {
            integers: vec![7],
            ..Default::default()
        };
        let mut context = SelectionContext::new(&store, &mut random);
        let variable: DomainId = context.get_domains().next().unwrap();

        let decision = InDomainRandom.select_value(&mut context, variable);
        assert_eq!(predicate!(variable == 7), decision);
    }
}
