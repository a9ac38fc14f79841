use super::Direction;
use super::TieBreaker;

/// A [`TieBreaker`] which selects the first variable that attains the best measure, i.e. ties are
/// broken in order of consideration.
#[derive(Debug)]
pub struct InOrderTieBreaker<Var, Value> {
    /// The best variable considered so far with its measure.
    best: Option<(Var, Value)>,
    direction: Direction,
}

impl<Var, Value> InOrderTieBreaker<Var, Value> {
    pub fn new(direction: Direction) -> Self {
        InOrderTieBreaker {
            best: None,
            direction,
        }
    }
}

impl<Var, Value: PartialOrd> TieBreaker<Var, Value> for InOrderTieBreaker<Var, Value> {
    fn consider(&mut self, variable: Var, value: Value) {
        match &self.best {
            Some((_, best_value)) => {
                let improves = match self.direction {
                    Direction::Minimum => value < *best_value,
                    Direction::Maximum => value > *best_value,
                };
                if improves {
                    self.best = Some((variable, value));
                }
            }
            None => self.best = Some((variable, value)),
        }
    }

    fn select(&mut self) -> Option<Var> {
        self.best.take().map(|(variable, _)| variable)
    }

    fn get_direction(&self) -> Direction {
        self.direction
    }
}
