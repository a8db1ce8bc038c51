//! Coordinates the agents defined in `fraudguard-agent`: a registry keyed
//! by id/role/name, a workflow executor with human-escalation suspension,
//! sequential/parallel/consensus collaboration strategies, and a
//! help-request routing loop.

pub mod agent;
pub mod collaboration;
pub mod error;
pub mod help_routing;
pub mod registry;
pub mod workflow;

pub use agent::{MockOrchestratedAgent, OrchestratedAgent};
pub use collaboration::{consensus, parallel, sequential};
pub use error::OrchestratorError;
pub use help_routing::{HelpRouter, ROUTING_INTERVAL_MS};
pub use registry::AgentRegistry;
pub use workflow::{ExecutionStatus, InputMapper, OutputMapper, WorkflowExecutor, WorkflowState, WorkflowStep};
