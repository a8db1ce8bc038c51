//! # FraudGuard Agent
//!
//! The autonomous agent runtime: a [`base_agent::BaseAgent`] every
//! specialized agent extends, built around a `think -> plan -> act ->
//! observe -> reflect` reasoning cycle. Carries the chain-of-thought
//! builder, short/long-term memory, confidence calibration, self-correction
//! logging, and the inter-agent [`messenger::Messenger`] (unicast,
//! broadcast, help-request/response, delegation, consensus).
//!
//! Two concrete agents are provided: [`agents::CrossDomainAgent`] and
//! [`agents::PolicyEvolutionAgent`].

pub mod agents;
pub mod base_agent;
pub mod calibration;
pub mod chain_of_thought;
pub mod error;
pub mod memory;
pub mod messenger;
pub mod scoring;
pub mod self_correction;
pub mod status;

pub use agents::{CrossDomainAgent, PolicyEvolutionAgent};
pub use base_agent::{ActionOutcome, AgentDependencies, BaseAgent, Detection, InvestigationReport, PlannedAction, ReasoningContext};
pub use calibration::ConfidenceCalibrator;
pub use chain_of_thought::{ChainOfThought, Step, StepType, ValidationResult};
pub use error::AgentError;
pub use memory::{extract_features_for_pattern_matching, Episode, LongTermMemory, Observation, ShortTermMemory};
pub use messenger::{BroadcastMessage, Delegation, HelpRequest, HelpResponse, Messenger, SharedMessenger, UnicastMessage};
pub use scoring::{score_evidence, Recommendation, RiskFactor, ScoreContribution, ScoringResult, RISK_FACTORS};
pub use self_correction::{LoggedPrediction, SelfCorrectionLog};
pub use status::AgentStatus;
