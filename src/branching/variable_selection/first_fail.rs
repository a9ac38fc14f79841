use log::warn;

use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::calabash_assert_eq_simple;
use crate::engine::variables::IntegerVariable;

/// A [`VariableSelector`] which selects the variable with the smallest domain (based on the
/// lower bound and upper bound, disregarding holes).
///
/// Uses a [`TieBreaker`] to break ties; the default is the [`InOrderTieBreaker`], but it is
/// possible to construct the variable selector with a custom one using
/// [`FirstFail::with_tie_breaker`].
#[derive(Debug)]
pub struct FirstFail<Var, TieBreaking> {
    variables: Vec<Var>,
    tie_breaker: TieBreaking,
}

impl<Var: Clone> FirstFail<Var, InOrderTieBreaker<Var, i64>> {
    pub fn new(variables: &[Var]) -> Self {
        if variables.is_empty() {
            warn!("The FirstFail variable selector was not provided with any variables");
        }
        FirstFail {
            variables: variables.to_vec(),
            tie_breaker: InOrderTieBreaker::new(Direction::Minimum),
        }
    }
}

impl<Var: Clone, TieBreaking: TieBreaker<Var, i64>> FirstFail<Var, TieBreaking> {
    pub fn with_tie_breaker(variables: &[Var], tie_breaker: TieBreaking) -> Self {
        calabash_assert_eq_simple!(
            tie_breaker.get_direction(),
            Direction::Minimum,
            "the tie-breaker of FirstFail must select the minimum domain size"
        );
        FirstFail {
            variables: variables.to_vec(),
            tie_breaker,
        }
    }
}

impl<Var, TieBreaking> VariableSelector<Var> for FirstFail<Var, TieBreaking>
where
    Var: IntegerVariable,
    TieBreaking: TieBreaker<Var, i64>,
{
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        self.variables
            .iter()
            .filter(|variable| !context.is_integer_fixed(*variable))
            .for_each(|variable| {
                self.tie_breaker
                    .consider(variable.clone(), context.get_size_of_domain(variable));
            });
        self.tie_breaker.select()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::variables::DomainId;

    #[test]
    fn the_smallest_domain_is_selected() {
        let store = SelectionContext::create_for_testing(vec![(0, 10), (5, 7), (1, 2)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variables: Vec<DomainId> = context.get_domains().collect();

        let mut strategy = FirstFail::new(&variables);
        let selected = strategy.select_variable(&mut context);

        assert_eq!(Some(variables[2]), selected);
    }

    #[test]
    fn fixed_variables_are_not_selected() {
        let store = SelectionContext::create_for_testing(vec![(10, 10), (20, 20)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variables: Vec<DomainId> = context.get_domains().collect();

        let mut strategy = FirstFail::new(&variables);
        assert_eq!(None, strategy.select_variable(&mut context));
    }
}
