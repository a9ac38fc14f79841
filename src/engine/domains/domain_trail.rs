use crate::calabash_assert_simple;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::reason::ReasonRef;

/// One domain operation on the trail, with the bounds around it and the reason that justified it.
///
/// Decisions, refutations and external posts have no reason.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DomainTrailEntry {
    pub(crate) predicate: Predicate,
    pub(crate) old_lower_bound: i32,
    pub(crate) old_upper_bound: i32,
    pub(crate) new_lower_bound: i32,
    pub(crate) new_upper_bound: i32,
    pub(crate) reason: Option<ReasonRef>,
}

/// The chronological log of domain operations, segmented by world.
///
/// The log is not what restores domains on backtracking (the reversible cells do that
/// themselves); it exists for the protocols built on top of the domains. The search reads the
/// head of the current segment to find the decision it has to refute, and conflict analysis
/// walks the recorded bound transitions to date predicates and to look up their reasons.
///
/// A world's segment holds exactly the operations performed while it was the current world; the
/// segment of a world opened by the search therefore starts with its decision. Rewinding drops
/// whole segments, and committing a world hands its operations to the parent segment.
#[derive(Debug, Default)]
pub(crate) struct DomainTrail {
    entries: Vec<DomainTrailEntry>,
    /// `segment_start[w]` is the index at which the segment of world `w + 1` begins; the root
    /// segment begins at index 0.
    segment_start: Vec<usize>,
}

impl DomainTrail {
    pub(crate) fn world(&self) -> u32 {
        self.segment_start.len() as u32
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, index: usize) -> DomainTrailEntry {
        self.entries[index]
    }

    /// Append an operation to the current world's segment.
    pub(crate) fn record(&mut self, entry: DomainTrailEntry) {
        self.entries.push(entry);
    }

    /// Open the segment of a new world.
    pub(crate) fn push_world(&mut self) {
        self.segment_start.push(self.entries.len());
    }

    /// The index at which the segment of `world` begins.
    pub(crate) fn segment_start_of(&self, world: usize) -> usize {
        if world == 0 {
            0
        } else {
            self.segment_start[world - 1]
        }
    }

    /// The world whose segment contains the entry at `index`.
    pub(crate) fn world_of_index(&self, index: usize) -> usize {
        self.segment_start.partition_point(|&start| start <= index)
    }

    /// The operation which opened the current world, i.e. the decision the search would have to
    /// refute. [`None`] at the root, or when the current segment is still empty.
    pub(crate) fn current_decision(&self) -> Option<DomainTrailEntry> {
        if self.world() == 0 {
            return None;
        }
        self.entries
            .get(self.segment_start_of(self.world() as usize))
            .copied()
    }

    /// Drop every segment above `world` and hand back the removed operations, most recent first.
    pub(crate) fn rewind_to(&mut self, world: u32) -> Vec<DomainTrailEntry> {
        calabash_assert_simple!(world < self.world(), "cannot rewind to the current world");

        let cut = self.segment_start[world as usize];
        let mut removed = self.entries.split_off(cut);
        removed.reverse();
        self.segment_start.truncate(world as usize);
        removed
    }

    /// Merge the current world's operations into the parent segment.
    pub(crate) fn merge_current_world_into_parent(&mut self) {
        calabash_assert_simple!(self.world() > 0, "cannot merge the root world");
        let _ = self.segment_start.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::variables::DomainId;
    use crate::predicate;

    fn entry(predicate: Predicate) -> DomainTrailEntry {
        DomainTrailEntry {
            predicate,
            old_lower_bound: 0,
            old_upper_bound: 9,
            new_lower_bound: 0,
            new_upper_bound: 9,
            reason: None,
        }
    }

    #[test]
    fn the_root_has_no_decision() {
        let mut trail = DomainTrail::default();
        let x = DomainId::new(1);

        trail.record(entry(predicate!(x >= 1)));
        assert_eq!(None, trail.current_decision().map(|e| e.predicate));
    }

    #[test]
    fn the_decision_is_the_head_of_the_current_segment() {
        let mut trail = DomainTrail::default();
        let x = DomainId::new(1);
        let y = DomainId::new(2);

        trail.push_world();
        trail.record(entry(predicate!(x == 4)));
        trail.record(entry(predicate!(y <= 6)));

        assert_eq!(
            Some(predicate!(x == 4)),
            trail.current_decision().map(|e| e.predicate)
        );

        trail.push_world();
        trail.record(entry(predicate!(y == 5)));
        assert_eq!(
            Some(predicate!(y == 5)),
            trail.current_decision().map(|e| e.predicate)
        );
    }

    #[test]
    fn entries_are_attributed_to_the_world_that_recorded_them() {
        let mut trail = DomainTrail::default();
        let x = DomainId::new(1);

        trail.record(entry(predicate!(x >= 0)));
        trail.push_world();
        trail.record(entry(predicate!(x >= 2)));
        trail.record(entry(predicate!(x >= 3)));
        trail.push_world();
        // World 2 records nothing before world 3 opens.
        trail.push_world();
        trail.record(entry(predicate!(x >= 4)));

        assert_eq!(0, trail.world_of_index(0));
        assert_eq!(1, trail.world_of_index(1));
        assert_eq!(1, trail.world_of_index(2));
        assert_eq!(3, trail.world_of_index(3));

        assert_eq!(0, trail.segment_start_of(0));
        assert_eq!(1, trail.segment_start_of(1));
        assert_eq!(3, trail.segment_start_of(2));
        assert_eq!(3, trail.segment_start_of(3));
    }

    #[test]
    fn rewinding_hands_back_the_operations_most_recent_first() {
        let mut trail = DomainTrail::default();
        let x = DomainId::new(1);

        trail.push_world();
        trail.record(entry(predicate!(x == 1)));
        trail.push_world();
        trail.record(entry(predicate!(x != 5)));
        trail.record(entry(predicate!(x <= 4)));

        let removed = trail.rewind_to(1);
        assert_eq!(
            vec![predicate!(x <= 4), predicate!(x != 5)],
            removed.iter().map(|e| e.predicate).collect::<Vec<_>>()
        );
        assert_eq!(1, trail.world());
        assert_eq!(1, trail.len());

        let removed = trail.rewind_to(0);
        assert_eq!(
            vec![predicate!(x == 1)],
            removed.iter().map(|e| e.predicate).collect::<Vec<_>>()
        );
        assert_eq!(0, trail.world());
        assert_eq!(0, trail.len());
    }

    #[test]
    fn merging_reattributes_the_operations_to_the_parent() {
        let mut trail = DomainTrail::default();
        let x = DomainId::new(1);

        trail.push_world();
        trail.record(entry(predicate!(x == 1)));
        trail.push_world();
        trail.record(entry(predicate!(x != 3)));

        trail.merge_current_world_into_parent();

        assert_eq!(1, trail.world());
        assert_eq!(1, trail.world_of_index(1));
        // The merged operations are gone together with the parent's segment on rewind.
        let removed = trail.rewind_to(0);
        assert_eq!(2, removed.len());
        assert_eq!(0, trail.len());
    }
}
