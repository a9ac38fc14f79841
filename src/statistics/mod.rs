//! Statistic logging in a machine-readable format.
//!
//! The channel is process-wide and disabled until configured through
//! [`configure_statistic_logging`]; the solver then dumps its counters through
//! [`log_statistic`].

pub mod statistic_logging;

pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic;
pub use statistic_logging::log_statistic_postfix;
pub use statistic_logging::should_log_statistics;
