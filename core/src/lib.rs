//! # FraudGuard Core
//!
//! Shared primitives for the FraudGuard marketplace fraud-detection
//! decisioning platform: the error taxonomy, the `Clock`/`IdGenerator`
//! dependency-injection traits, the internal event bus, and the handful of
//! domain types (risk domains, risk events, feature groups) that more than
//! one component needs.
//!
//! Component-specific types (graph nodes, seller risk profiles, agent
//! state, knowledge entries...) live in their own crates.

pub mod domain;
pub mod environment;
pub mod error;
pub mod event_bus;

pub use domain::{Domain, FeatureGroup, RiskEvent};
pub use environment::{Clock, IdGenerator, SystemClock, UuidGenerator};
pub use error::{Classify, ErrorKind};
pub use event_bus::{BroadcastEventBus, BusEvent, EventBus, EventBusError, EventStream};
