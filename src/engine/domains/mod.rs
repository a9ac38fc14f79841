//! Integer domains and their store.
//!
//! A domain is either a bounded interval, an enumerated (sparse) set, or a constant. All
//! representations share one mutation contract: mutators are idempotent, signal wipeout *before*
//! emptying a domain, trail their changes through the reversible memory, append removed values to
//! the per-variable delta stream, and emit a domain event.

mod delta;
mod domain_store;
mod domain_trail;
mod integer_domain;

pub use delta::DeltaChange;
pub use delta::DeltaMonitor;
pub(crate) use delta::Delta;
pub use domain_store::DomainStore;
pub use domain_store::EmptyDomain;
pub(crate) use domain_trail::DomainTrail;
pub(crate) use domain_trail::DomainTrailEntry;
pub(crate) use integer_domain::IntegerDomain;
