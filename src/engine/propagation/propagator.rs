use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
use enumset::EnumSet;

use super::Domains;
use super::ExplanationContext;
use super::NotificationContext;
use super::PropagationContextMut;
use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropositionalConjunction;
use crate::engine::notifications::DomainEvent;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::local_id::LocalId;

// We need to use this to cast from `Box<dyn Propagator>` to a concrete propagator type; Rust
// inherently does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

/// A propagator removes values from domains which will never be in any solution, or raises
/// explicit conflicts.
///
/// The only required functions are [`Propagator::name`], [`Propagator::priority`] and
/// [`Propagator::propagate`]; all other functions have default implementations.
///
/// A propagator must not cache search-dependent state across calls except in reversible cells
/// (see [`crate::engine::trailed::Environment`]); everything else survives backtracking
/// unchanged, which makes it stale.
pub trait Propagator: Downcast {
    /// Return the name of the propagator; used for display purposes.
    fn name(&self) -> &str;

    /// Returns the [`Priority`] of the propagator, used for determining the order in which
    /// propagators are called.
    ///
    /// See the [`Priority`] documentation for more explanation.
    fn priority(&self) -> Priority;

    /// Perform a full filtering step.
    ///
    /// The main aims of this method are to remove values from the domains of variables (using
    /// [`PropagationContextMut::post`]) which cannot be part of any solution given the current
    /// domains, and to detect conflicts.
    ///
    /// In case no conflict has been detected this function should return [`Result::Ok`],
    /// otherwise it should return [`Result::Err`] with the conflict; either because a
    /// propagation would have emptied a domain or because the propagator found the current
    /// state to be inconsistent.
    ///
    /// Propagators are not required to reach their own fixed point in one call; the engine calls
    /// again as long as events keep firing.
    fn propagate(&mut self, context: PropagationContextMut) -> PropagationStatusCP;

    /// Perform an incremental filtering step after events fired on a single watched position.
    ///
    /// Only called when [`Propagator::prefers_incremental_propagation`] returns `true` and all
    /// events since the last execution concern one position. By default this falls back to a full
    /// [`Propagator::propagate`].
    fn propagate_incremental(
        &mut self,
        context: PropagationContextMut,
        local_id: LocalId,
        events: EnumSet<DomainEvent>,
    ) -> PropagationStatusCP {
        let _ = (local_id, events);
        self.propagate(context)
    }

    /// Whether the engine should dispatch [`Propagator::propagate_incremental`] when only a
    /// single watched position accumulated events.
    fn prefers_incremental_propagation(&self) -> bool {
        false
    }

    /// Returns whether the propagator should be enqueued for propagation when a [`DomainEvent`]
    /// happens on one of the variables the propagator is subscribed to.
    ///
    /// This can be used to incrementally maintain data structures, and should only be used for
    /// computationally cheap logic; expensive computation belongs in [`Propagator::propagate`].
    ///
    /// By default the propagator is always enqueued for every event it is subscribed to.
    fn notify(
        &mut self,
        _context: NotificationContext,
        _local_id: LocalId,
        _events: EnumSet<DomainEvent>,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Called after backtracking, allowing the propagator to update its internal data structures
    /// given the new variable domains.
    ///
    /// Rolled-back mutations do not fire events, so this hook is the only signal a propagator
    /// gets about backtracking.
    fn synchronise(&mut self, _context: Domains) {}

    /// Report whether the relation of this propagator is decided by the current domains.
    ///
    /// [`Entailment::True`] means every remaining assignment satisfies the relation,
    /// [`Entailment::False`] means none does. Used by reification wrappers and by solution
    /// checking; an implementation is not needed for correctness of plain propagation.
    fn is_entailed(&self, _context: Domains) -> Entailment {
        Entailment::Undefined
    }

    /// A function which returns [`Some`] with the conjunction of currently-true predicates under
    /// which this propagator detects an inconsistency, without performing a domain operation (and
    /// [`None`] otherwise).
    ///
    /// By implementing this function, a reified version of the propagator can propagate its
    /// reification literal with a proper explanation.
    fn detect_inconsistency(&self, _context: Domains) -> Option<PropositionalConjunction> {
        None
    }

    /// Hook which is called when a propagated [`Predicate`] should be explained using a lazy
    /// reason. The code which was attached to the propagation is given, as well as a context
    /// which defines what can be inspected to build the explanation.
    fn lazy_explanation(&mut self, _code: u64, _context: ExplanationContext) -> &[Predicate] {
        panic!(
            "{}",
            format!(
                "Propagator {} does not support lazy explanations.",
                self.name()
            )
        );
    }
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}

/// The verdict of [`Propagator::is_entailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entailment {
    /// Every assignment in the remaining domains satisfies the relation.
    True,
    /// No assignment in the remaining domains satisfies the relation.
    False,
    /// The relation is not decided yet.
    Undefined,
}

/// The priority of a propagator, used for determining the order in which propagators are run.
///
/// Propagators with a higher priority always run before propagators with a lower one, even when
/// scheduled later; within one priority the order is first-in-first-out. The names classify the
/// cost of one filtering step, from constant-time unary filters to very expensive global
/// reasoning.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum Priority {
    Unary = 0,
    Binary = 1,
    Ternary = 2,
    Linear = 3,
    Quadratic = 4,
    Cubic = 5,
    #[default]
    VerySlow = 6,
}

impl Priority {
    pub(crate) const LEVELS: u32 = 7;
}

impl PartialOrd for Priority {
    /// A "greater" priority runs earlier; [`Priority::Unary`] is the greatest.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        ((*other) as u8).partial_cmp(&((*self) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheaper_priorities_run_first() {
        assert!(Priority::Unary > Priority::Binary);
        assert!(Priority::Binary > Priority::Ternary);
        assert!(Priority::Ternary > Priority::Linear);
        assert!(Priority::Linear > Priority::Quadratic);
        assert!(Priority::Quadratic > Priority::Cubic);
        assert!(Priority::Cubic > Priority::VerySlow);
    }
}
