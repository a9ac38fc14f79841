use crate::basic_types::sequence_generators::ConstantSequence;
use crate::basic_types::sequence_generators::GeometricSequence;
use crate::basic_types::sequence_generators::LubySequence;
use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::basic_types::sequence_generators::SequenceGeneratorType;

/// The options which are used by the solver to determine when a restart should occur.
///
/// A restart is considered after a number of conflicts given by the configured sequence
/// (constant, geometric, or Luby); restarts keep the learned nogoods but return the search to the
/// root, escaping unlucky early decisions.
#[derive(Debug, Clone, Copy)]
pub struct RestartOptions {
    /// Decides the sequence based on which the restarts are performed, to be used in combination
    /// with [`RestartOptions::base_interval`].
    pub sequence_generator_type: SequenceGeneratorType,
    /// The base interval length is used as a multiplier to the restart sequence; for example,
    /// constant restarts with base interval 100 means a restart is triggered every 100 conflicts.
    pub base_interval: u64,
    /// The minimum number of conflicts to be reached before the first restart is considered.
    pub min_num_conflicts_before_first_restart: u64,
    /// The coefficient in the geometric sequence `x_i = x_{i-1} * geometric_coef` where
    /// `x_1 = base_interval`. Used only when [`RestartOptions::sequence_generator_type`] is
    /// [`SequenceGeneratorType::Geometric`].
    pub geometric_coef: Option<f64>,
}

impl Default for RestartOptions {
    fn default() -> Self {
        RestartOptions {
            sequence_generator_type: SequenceGeneratorType::Constant,
            base_interval: 50,
            min_num_conflicts_before_first_restart: 10000,
            geometric_coef: None,
        }
    }
}

/// Tracks the number of conflicts since the last restart and decides when the next one is due.
#[derive(Debug)]
pub(crate) struct RestartStrategy {
    /// Generates the number of conflicts before the next restart.
    sequence_generator: Box<dyn SequenceGenerator>,
    num_conflicts_encountered_since_restart: u64,
    num_conflicts_until_restart: u64,
    min_num_conflicts_before_first_restart: u64,
    num_restarts: u64,
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy::new(RestartOptions::default())
    }
}

impl RestartStrategy {
    pub(crate) fn new(options: RestartOptions) -> Self {
        let mut sequence_generator: Box<dyn SequenceGenerator> =
            match options.sequence_generator_type {
                SequenceGeneratorType::Constant => {
                    Box::new(ConstantSequence::new(options.base_interval as i64))
                }
                SequenceGeneratorType::Geometric => Box::new(GeometricSequence::new(
                    options.base_interval as i64,
                    options.geometric_coef.expect(
                        "the geometric sequence requires the geometric coefficient to be set",
                    ),
                )),
                SequenceGeneratorType::Luby => {
                    Box::new(LubySequence::new(options.base_interval as i64))
                }
            };

        let num_conflicts_until_restart = sequence_generator
            .next()
            .try_into()
            .expect("restart sequences generate positive values");

        RestartStrategy {
            sequence_generator,
            num_conflicts_encountered_since_restart: 0,
            num_conflicts_until_restart,
            min_num_conflicts_before_first_restart: options
                .min_num_conflicts_before_first_restart,
            num_restarts: 0,
        }
    }

    pub(crate) fn should_restart(&self) -> bool {
        if self.num_restarts == 0 {
            self.num_conflicts_encountered_since_restart
                >= self
                    .min_num_conflicts_before_first_restart
                    .max(self.num_conflicts_until_restart)
        } else {
            self.num_conflicts_encountered_since_restart >= self.num_conflicts_until_restart
        }
    }

    pub(crate) fn notify_conflict(&mut self) {
        self.num_conflicts_encountered_since_restart += 1;
    }

    pub(crate) fn notify_restart(&mut self) {
        self.num_restarts += 1;
        self.num_conflicts_encountered_since_restart = 0;
        self.num_conflicts_until_restart = self
            .sequence_generator
            .next()
            .try_into()
            .expect("restart sequences generate positive values");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eager_options() -> RestartOptions {
        RestartOptions {
            sequence_generator_type: SequenceGeneratorType::Luby,
            base_interval: 2,
            min_num_conflicts_before_first_restart: 0,
            geometric_coef: None,
        }
    }

    #[test]
    fn restarts_follow_the_conflict_budget() {
        let mut strategy = RestartStrategy::new(eager_options());
        assert!(!strategy.should_restart());

        strategy.notify_conflict();
        assert!(!strategy.should_restart());
        strategy.notify_conflict();
        assert!(strategy.should_restart());

        strategy.notify_restart();
        assert!(!strategy.should_restart());
    }

    #[test]
    fn the_first_restart_waits_for_the_minimum() {
        let mut strategy = RestartStrategy::new(RestartOptions {
            min_num_conflicts_before_first_restart: 5,
            base_interval: 1,
            ..RestartOptions::default()
        });

        for _ in 0..4 {
            strategy.notify_conflict();
        }
        assert!(!strategy.should_restart());
        strategy.notify_conflict();
        assert!(strategy.should_restart());
    }
}
