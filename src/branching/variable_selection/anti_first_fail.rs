use log::warn;

use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::SelectionContext;
use crate::branching::VariableSelector;
use crate::engine::variables::IntegerVariable;

/// A [`VariableSelector`] which selects the variable with the largest domain (based on the lower
/// bound and upper bound, disregarding holes).
#[derive(Debug)]
pub struct AntiFirstFail<Var, TieBreaking> {
    variables: Vec<Var>,
    tie_breaker: TieBreaking,
}

impl<Var: Clone> AntiFirstFail<Var, InOrderTieBreaker<Var, i64>> {
    pub fn new(variables: &[Var]) -> Self {
        if variables.is_empty() {
            warn!("The AntiFirstFail variable selector was not provided with any variables");
        }
        AntiFirstFail {
            variables: variables.to_vec(),
            tie_breaker: InOrderTieBreaker::new(Direction::Maximum),
        }
    }
}

impl<Var, TieBreaking> VariableSelector<Var> for AntiFirstFail<Var, TieBreaking>
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
    fn the_largest_domain_is_selected() {
        let store = SelectionContext::create_for_testing(vec![(0, 10), (5, 70), (1, 2)]);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut context = SelectionContext::new(&store, &mut rng);
        let variables: Vec<DomainId> = context.get_domains().collect();

        let mut strategy = AntiFirstFail::new(&variables);
        let selected = strategy.select_variable(&mut context);

        assert_eq!(Some(variables[1]), selected);
    }
}
