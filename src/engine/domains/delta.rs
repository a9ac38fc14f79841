use crate::engine::propagation::PropagatorId;
use crate::engine::trailed::Environment;
use crate::engine::trailed::RevInt;
use crate::engine::variables::DomainId;

/// One removal recorded in a delta stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaChange {
    /// A single value was removed.
    Removed(i32),
    /// An inclusive range of values was removed by a bound update.
    RemovedRange(i32, i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DeltaEntry {
    pub(crate) change: DeltaChange,
    /// The propagator that caused the removal; [`None`] for search decisions and external posts.
    pub(crate) cause: Option<PropagatorId>,
}

/// The append-only stream of removals of one variable.
///
/// The length is a reversible cell, so backtracking rewinds the visible part of the stream; stale
/// entries past the length are overwritten by later pushes.
#[derive(Debug)]
pub(crate) struct Delta {
    entries: Vec<DeltaEntry>,
    len: RevInt,
}

impl Delta {
    pub(crate) fn new(env: &mut Environment) -> Delta {
        Delta {
            entries: Vec::new(),
            len: env.make_int(0),
        }
    }

    pub(crate) fn push(
        &mut self,
        env: &mut Environment,
        change: DeltaChange,
        cause: Option<PropagatorId>,
    ) {
        let len = env.int_value(self.len) as usize;
        self.entries.truncate(len);
        self.entries.push(DeltaEntry { change, cause });
        env.assign_int(self.len, (len + 1) as i64);
    }

    pub(crate) fn len(&self, env: &Environment) -> usize {
        env.int_value(self.len) as usize
    }

    pub(crate) fn entry(&self, index: usize) -> DeltaEntry {
        self.entries[index]
    }
}

/// An independent cursor into the delta stream of one variable.
///
/// The read position is a reversible cell: backtracking restores the consumer's view together
/// with the stream itself.
#[derive(Clone, Copy, Debug)]
pub struct DeltaMonitor {
    pub(crate) domain: DomainId,
    pub(crate) cursor: RevInt,
}
