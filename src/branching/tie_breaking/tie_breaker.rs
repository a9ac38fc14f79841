/// The interface of a tie breaker: it is fed `(variable, measure)` pairs through
/// [`TieBreaker::consider`] and yields the winning variable through [`TieBreaker::select`].
///
/// A tie breaker has a [`Direction`] stating whether the minimum or the maximum measure wins;
/// only among variables with the winning measure is there anything to break.
pub trait TieBreaker<Var, Value> {
    /// Consider a variable with its measure.
    fn consider(&mut self, variable: Var, value: Value);

    /// Return the winning variable and reset the internal state for the next round of
    /// comparisons. Returns [`None`] when no variable was considered.
    fn select(&mut self) -> Option<Var>;

    /// The direction in which the measure wins.
    fn get_direction(&self) -> Direction;
}

/// Whether the minimum or the maximum measure should be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimum,
    Maximum,
}
