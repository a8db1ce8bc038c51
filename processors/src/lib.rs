//! # FraudGuard Stream Processors
//!
//! Long-running consumers that poll the streaming engine roughly once a
//! second and materialize computed features. Built on one generic windowed
//! aggregation primitive ([`window::WindowedAggregator`]) shared by the
//! velocity processor.

pub mod materialize;
pub mod risk_signal;
pub mod runner;
pub mod velocity;
pub mod window;

pub use materialize::FeatureMaterializationProcessor;
pub use risk_signal::RiskSignalAggregator;
pub use runner::Processor;
pub use velocity::TransactionVelocityProcessor;
pub use window::{Aggregate, WindowedAggregator};
