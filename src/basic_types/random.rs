use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;

/// Abstraction over the random number generator used by the solver.
///
/// All randomised components (value selectors, tie breakers) draw through this trait so that tests
/// can substitute a scripted generator. Any [`Rng`] implements it.
pub trait Random: Debug {
    /// Returns `true` with the given probability.
    fn generate_bool(&mut self, probability: f64) -> bool;

    /// Generates a `usize` in the provided range.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generates an `i32` in the provided range.
    fn generate_i32_in_range(&mut self, range: Range<i32>) -> i32;
}

impl<T: Rng + Debug> Random for T {
    fn generate_bool(&mut self, probability: f64) -> bool {
        self.gen_bool(probability)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_i32_in_range(&mut self, range: Range<i32>) -> i32 {
        self.gen_range(range)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A scripted [`Random`] implementation; every call pops the next prepared value. Intended for
    /// deterministic unit tests of randomised components.
    #[derive(Debug, Default)]
    pub(crate) struct TestRandom {
        pub(crate) bools: Vec<bool>,
        pub(crate) usizes: Vec<usize>,
        pub(crate) integers: Vec<i32>,
    }

    impl Random for TestRandom {
        fn generate_bool(&mut self, _probability: f64) -> bool {
            self.bools.pop().expect("no scripted bool left")
        }

        fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
            let value = self.usizes.pop().expect("no scripted usize left");
            assert!(range.contains(&value), "scripted usize outside query range");
            value
        }

        fn generate_i32_in_range(&mut self, range: Range<i32>) -> i32 {
            let value = self.integers.pop().expect("no scripted integer left");
            assert!(range.contains(&value), "scripted integer outside query range");
            value
        }
    }
}
