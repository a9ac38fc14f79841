/// The sequence along which restart intervals grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequenceGeneratorType {
    /// Restart after a constant number of conflicts.
    #[default]
    Constant,
    /// Intervals follow a geometric progression.
    Geometric,
    /// Intervals follow the Luby sequence.
    Luby,
}
