use std::collections::VecDeque;

use crate::containers::KeyedVec;
use crate::engine::propagation::Priority;
use crate::engine::propagation::PropagatorId;

/// The scheduler of awoken propagators: one FIFO bucket per [`Priority`], served from the
/// cheapest occupied bucket down to the most expensive one.
///
/// A propagator with a strictly higher priority always runs before a lower one, even when it was
/// scheduled later — in particular, an arrival during a running fixed point is served before the
/// loop ends. Scheduling an already-scheduled propagator has no effect; ties within one bucket
/// are broken first-in-first-out.
///
/// Instead of tracking the occupied priorities in an ordered structure, the queue keeps a cursor
/// below which every bucket is known to be empty: [`PropagatorQueue::pop`] sweeps the cursor
/// forward, and scheduling into a cheaper bucket pulls it back.
#[derive(Debug)]
pub(crate) struct PropagatorQueue {
    buckets: [VecDeque<PropagatorId>; Priority::LEVELS as usize],
    scheduled: KeyedVec<PropagatorId, bool>,
    /// Every bucket cheaper than this one is empty.
    first_occupied: usize,
    num_scheduled: usize,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        PropagatorQueue {
            buckets: Default::default(),
            scheduled: KeyedVec::default(),
            first_occupied: Priority::LEVELS as usize,
            num_scheduled: 0,
        }
    }
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.num_scheduled == 0
    }

    /// Schedule the propagator at its priority bucket, unless it is already scheduled.
    pub(crate) fn schedule(&mut self, propagator_id: PropagatorId, priority: Priority) {
        self.scheduled.accomodate(propagator_id, false);
        if std::mem::replace(&mut self.scheduled[propagator_id], true) {
            return;
        }

        let bucket = priority as usize;
        self.buckets[bucket].push_back(propagator_id);
        self.first_occupied = self.first_occupied.min(bucket);
        self.num_scheduled += 1;
    }

    /// The next propagator to run: the oldest entry of the cheapest occupied bucket.
    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        while self.first_occupied < self.buckets.len() {
            if let Some(propagator_id) = self.buckets[self.first_occupied].pop_front() {
                self.scheduled[propagator_id] = false;
                self.num_scheduled -= 1;
                return Some(propagator_id);
            }
            self.first_occupied += 1;
        }
        debug_assert_eq!(0, self.num_scheduled);
        None
    }

    /// Discard the schedule, e.g. when a contradiction abandons the current fixed point.
    pub(crate) fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            for propagator_id in bucket.drain(..) {
                self.scheduled[propagator_id] = false;
            }
        }
        self.first_occupied = self.buckets.len();
        self.num_scheduled = 0;
    }

    pub(crate) fn is_scheduled(&self, propagator_id: PropagatorId) -> bool {
        self.scheduled
            .get(propagator_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_priority_class_is_served_cheapest_first() {
        let mut queue = PropagatorQueue::default();

        // Scheduled from the most expensive class to the cheapest.
        let classes = [
            Priority::VerySlow,
            Priority::Cubic,
            Priority::Quadratic,
            Priority::Linear,
            Priority::Ternary,
            Priority::Binary,
            Priority::Unary,
        ];
        for (id, &priority) in classes.iter().enumerate() {
            queue.schedule(PropagatorId(id as u32), priority);
        }

        // Served in the opposite order: unary filters before the very slow global reasoning.
        let served: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(
            vec![
                PropagatorId(6),
                PropagatorId(5),
                PropagatorId(4),
                PropagatorId(3),
                PropagatorId(2),
                PropagatorId(1),
                PropagatorId(0),
            ],
            served
        );
    }

    #[test]
    fn cubic_overtakes_very_slow_regardless_of_arrival_order() {
        let mut queue = PropagatorQueue::default();

        queue.schedule(PropagatorId(9), Priority::VerySlow);
        queue.schedule(PropagatorId(4), Priority::Cubic);

        assert_eq!(Some(PropagatorId(4)), queue.pop());
        assert_eq!(Some(PropagatorId(9)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn one_bucket_is_first_in_first_out_across_interleavings() {
        let mut queue = PropagatorQueue::default();

        queue.schedule(PropagatorId(2), Priority::Linear);
        queue.schedule(PropagatorId(0), Priority::VerySlow);
        queue.schedule(PropagatorId(7), Priority::Linear);
        queue.schedule(PropagatorId(1), Priority::Unary);
        queue.schedule(PropagatorId(5), Priority::Linear);

        assert_eq!(Some(PropagatorId(1)), queue.pop());
        assert_eq!(Some(PropagatorId(2)), queue.pop());
        assert_eq!(Some(PropagatorId(7)), queue.pop());
        assert_eq!(Some(PropagatorId(5)), queue.pop());
        assert_eq!(Some(PropagatorId(0)), queue.pop());
    }

    #[test]
    fn an_arrival_during_the_drain_is_served_before_cheaper_leftovers() {
        let mut queue = PropagatorQueue::default();

        queue.schedule(PropagatorId(0), Priority::Quadratic);
        queue.schedule(PropagatorId(1), Priority::Quadratic);
        assert_eq!(Some(PropagatorId(0)), queue.pop());

        // A newly posted binary propagator arrives while the engine is mid-loop; it overtakes
        // the quadratic one that was scheduled earlier.
        queue.schedule(PropagatorId(2), Priority::Binary);

        assert_eq!(Some(PropagatorId(2)), queue.pop());
        assert_eq!(Some(PropagatorId(1)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn rescheduling_a_scheduled_propagator_has_no_effect() {
        let mut queue = PropagatorQueue::default();

        queue.schedule(PropagatorId(3), Priority::Ternary);
        assert!(queue.is_scheduled(PropagatorId(3)));

        // Further events on its variables must not duplicate the entry, not even at another
        // priority.
        queue.schedule(PropagatorId(3), Priority::Ternary);
        queue.schedule(PropagatorId(3), Priority::Unary);

        assert_eq!(Some(PropagatorId(3)), queue.pop());
        assert!(!queue.is_scheduled(PropagatorId(3)));
        assert_eq!(None, queue.pop());
        assert!(queue.is_empty());
    }

    #[test]
    fn clearing_resets_membership_so_everything_can_be_rescheduled() {
        let mut queue = PropagatorQueue::default();

        queue.schedule(PropagatorId(0), Priority::Unary);
        queue.schedule(PropagatorId(1), Priority::Cubic);
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(None, queue.pop());
        assert!(!queue.is_scheduled(PropagatorId(0)));
        assert!(!queue.is_scheduled(PropagatorId(1)));

        queue.schedule(PropagatorId(1), Priority::Cubic);
        assert_eq!(Some(PropagatorId(1)), queue.pop());
    }
}
