//! Drives each autonomous agent's `think -> plan -> act -> observe -> reflect`
//! cycle on a timer, accelerated by buffered event volume, coalesced so an
//! agent never runs two cycles concurrently.

pub mod cycle;
pub mod error;
pub mod scheduler;

pub use cycle::{standalone_messenger, AutonomousCycle, MockCycle};
pub use error::SchedulerError;
pub use scheduler::{AgentScheduler, SchedulerConfig};
