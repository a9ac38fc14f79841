use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A description of the kinds of events that can happen on a domain variable.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// Event where an (integer) variable domain collapses to a single value.
    Assign,
    /// Event where an (integer) variable domain tightens the lower bound.
    LowerBound,
    /// Event where an (integer) variable domain tightens the upper bound.
    UpperBound,
    /// Event where an (integer) variable domain removes an inner value within the domain.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// A condition mask declaring which [`DomainEvent`]s should wake a propagator on a watched
/// variable. Masks compose by union.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// Both lower- and upper-bound tightening (but not other value removal).
    pub const BOUNDS: DomainEvents = DomainEvents::create_with_events(enum_set!(
        DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// Lower- and upper-bound tightening, assigning to a single value, and single value removal.
    pub const ANY: DomainEvents = DomainEvents::create_with_events(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));
    /// Single value removal (also fires when a bound tightening or assignment removes values).
    pub const REMOVAL: DomainEvents =
        DomainEvents::create_with_events(enum_set!(DomainEvent::Removal));
    /// Only lower-bound tightening.
    pub const LOWER_BOUND: DomainEvents =
        DomainEvents::create_with_events(enum_set!(DomainEvent::LowerBound));
    /// Only upper-bound tightening.
    pub const UPPER_BOUND: DomainEvents =
        DomainEvents::create_with_events(enum_set!(DomainEvent::UpperBound));
    /// Only assigning to a single value.
    pub const ASSIGN: DomainEvents =
        DomainEvents::create_with_events(enum_set!(DomainEvent::Assign));

    pub const fn create_with_events(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub fn get_events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_compose_by_union() {
        let bounds = DomainEvents::BOUNDS.get_events();
        assert!(bounds.contains(DomainEvent::LowerBound));
        assert!(bounds.contains(DomainEvent::UpperBound));
        assert!(!bounds.contains(DomainEvent::Assign));

        let any = DomainEvents::ANY.get_events();
        assert_eq!(
            any,
            bounds | DomainEvent::Assign | DomainEvent::Removal
        );
    }
}
