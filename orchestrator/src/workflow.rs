//! Workflow executor: ordered steps threaded through a shared state, with
//! `AWAITING_HUMAN` suspension when a step's result needs review.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use fraudguard_agent::{InvestigationReport, Recommendation};
use fraudguard_core::environment::IdGenerator;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::OrchestratorError;
use crate::registry::AgentRegistry;

/// Maps the threaded workflow state to the string input the next step's
/// agent is invoked with.
pub type InputMapper = Arc<dyn Fn(&WorkflowState) -> String + Send + Sync>;
/// Maps an agent's report to the value recorded as this step's result.
pub type OutputMapper = Arc<dyn Fn(&InvestigationReport) -> Value + Send + Sync>;

/// One step of a workflow: which agent runs, how its input and output are
/// mapped, and whether a failure should abort the workflow or be skipped.
#[derive(Clone)]
pub struct WorkflowStep {
    /// Step name, also the key under which its result is recorded.
    pub name: String,
    /// Id or name of the agent to invoke, resolved against the registry.
    pub agent: String,
    /// Builds this step's input from the state so far. Defaults to the
    /// workflow's original input, serialized.
    pub input_mapper: Option<InputMapper>,
    /// Builds this step's recorded result from the agent's report. Defaults
    /// to a summary tagging `needsHumanReview` when the recommendation is
    /// `REVIEW` or `BLOCK`.
    pub output_mapper: Option<OutputMapper>,
    /// If true, an unknown agent for this step is recorded as an error and
    /// the workflow proceeds; otherwise the workflow fails at this step.
    pub continue_on_error: bool,
}

impl WorkflowStep {
    /// A step invoking `agent` with the default input/output mapping.
    #[must_use]
    pub fn new(name: impl Into<String>, agent: impl Into<String>) -> Self {
        Self { name: name.into(), agent: agent.into(), input_mapper: None, output_mapper: None, continue_on_error: false }
    }

    /// Override how this step's input is built from the state so far.
    #[must_use]
    pub fn with_input_mapper(mut self, mapper: InputMapper) -> Self {
        self.input_mapper = Some(mapper);
        self
    }

    /// Override how this step's result is built from the agent's report.
    #[must_use]
    pub fn with_output_mapper(mut self, mapper: OutputMapper) -> Self {
        self.output_mapper = Some(mapper);
        self
    }

    /// Mark this step as non-fatal: an unknown agent skips it rather than
    /// failing the whole workflow.
    #[must_use]
    pub fn continue_on_error(mut self) -> Self {
        self.continue_on_error = true;
        self
    }
}

/// The original input plus every prior step's recorded result, keyed by
/// step name.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    /// The workflow's original input.
    pub input: Value,
    /// Results recorded so far, by step name.
    pub previous_results: HashMap<String, Value>,
}

/// Where a workflow execution currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionStatus {
    /// Stepping through the workflow normally.
    Running,
    /// Suspended at `step`, waiting for `resolve_escalation`.
    AwaitingHuman {
        /// The step that triggered the suspension.
        step: String,
    },
    /// Every step ran (or was skipped via `continue_on_error`).
    Completed,
    /// A step failed without `continue_on_error` set.
    Failed {
        /// The step that failed.
        step: String,
        /// Why.
        reason: String,
    },
}

struct Execution {
    steps: Vec<WorkflowStep>,
    state: WorkflowState,
    status: ExecutionStatus,
    cursor: usize,
}

fn default_output_mapper(report: &InvestigationReport) -> Value {
    let needs_human = matches!(report.recommendation, Recommendation::Review | Recommendation::Block);
    json!({
        "subjectId": report.subject_id,
        "recommendation": report.recommendation,
        "compositeScore": report.composite_score,
        "calibratedConfidence": report.calibrated_confidence,
        "needsHumanReview": needs_human,
    })
}

/// Runs workflows, step by step, against a shared agent registry.
pub struct WorkflowExecutor {
    registry: Arc<AgentRegistry>,
    id_generator: Arc<dyn IdGenerator>,
    executions: Mutex<HashMap<String, Execution>>,
}

impl WorkflowExecutor {
    /// Construct an executor driving agents from `registry`.
    #[must_use]
    pub fn new(registry: Arc<AgentRegistry>, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self { registry, id_generator, executions: Mutex::new(HashMap::new()) }
    }

    /// Start a new execution of `steps` against `input`, running until
    /// completion, failure, or the first `AWAITING_HUMAN` suspension.
    /// Returns the execution id.
    pub async fn execute_workflow(&self, steps: Vec<WorkflowStep>, input: Value) -> String {
        let execution_id = self.id_generator.next_id();
        let execution = Execution { steps, state: WorkflowState { input, previous_results: HashMap::new() }, status: ExecutionStatus::Running, cursor: 0 };
        self.executions.lock().unwrap_or_else(PoisonError::into_inner).insert(execution_id.clone(), execution);
        self.advance(&execution_id).await;
        execution_id
    }

    /// Current status of `execution_id`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::UnknownExecution`] if no such execution
    /// was ever started.
    pub fn status(&self, execution_id: &str) -> Result<ExecutionStatus, OrchestratorError> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(execution_id)
            .map(|execution| execution.status.clone())
            .ok_or_else(|| OrchestratorError::UnknownExecution(execution_id.to_string()))
    }

    /// The result recorded for a completed or in-flight step, if any.
    #[must_use]
    pub fn step_result(&self, execution_id: &str, step_name: &str) -> Option<Value> {
        self.executions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(execution_id)
            .and_then(|execution| execution.state.previous_results.get(step_name).cloned())
    }

    /// Resolve a suspended execution with a human decision and resume
    /// stepping from the next step.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::UnknownExecution`] or
    /// [`OrchestratorError::NotAwaitingHuman`].
    pub async fn resolve_escalation(&self, execution_id: &str, human_decision: Value) -> Result<(), OrchestratorError> {
        {
            let mut executions = self.executions.lock().unwrap_or_else(PoisonError::into_inner);
            let execution = executions.get_mut(execution_id).ok_or_else(|| OrchestratorError::UnknownExecution(execution_id.to_string()))?;
            let step = match &execution.status {
                ExecutionStatus::AwaitingHuman { step } => step.clone(),
                _ => return Err(OrchestratorError::NotAwaitingHuman(execution_id.to_string())),
            };
            execution.state.previous_results.insert(format!("{step}:humanDecision"), human_decision);
            execution.status = ExecutionStatus::Running;
            execution.cursor += 1;
        }
        self.advance(execution_id).await;
        Ok(())
    }

    async fn advance(&self, execution_id: &str) {
        loop {
            let (step, step_input) = {
                let mut executions = self.executions.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(execution) = executions.get_mut(execution_id) else { return };
                if !matches!(execution.status, ExecutionStatus::Running) {
                    return;
                }
                if execution.cursor >= execution.steps.len() {
                    execution.status = ExecutionStatus::Completed;
                    return;
                }
                let step = execution.steps[execution.cursor].clone();
                let input = step.input_mapper.as_ref().map_or_else(|| execution.state.input.to_string(), |mapper| mapper(&execution.state));
                (step, input)
            };

            let Some(agent) = self.registry.get(&step.agent).cloned() else {
                warn!(execution_id, step = %step.name, agent = %step.agent, "workflow step references unknown agent");
                let mut executions = self.executions.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(execution) = executions.get_mut(execution_id) else { return };
                if step.continue_on_error {
                    execution.state.previous_results.insert(step.name.clone(), json!({"error": format!("unknown agent {}", step.agent)}));
                    execution.cursor += 1;
                    continue;
                }
                execution.status = ExecutionStatus::Failed { step: step.name.clone(), reason: format!("unknown agent {}", step.agent) };
                return;
            };

            let report = agent.invoke(&step_input).await;
            let result = step.output_mapper.as_ref().map_or_else(|| default_output_mapper(&report), |mapper| mapper(&report));
            let needs_human = result.get("needsHumanReview").and_then(Value::as_bool).unwrap_or(false);

            let mut executions = self.executions.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(execution) = executions.get_mut(execution_id) else { return };
            execution.state.previous_results.insert(step.name.clone(), result);

            if needs_human {
                info!(execution_id, step = %step.name, "workflow suspended awaiting human review");
                execution.status = ExecutionStatus::AwaitingHuman { step: step.name.clone() };
                return;
            }

            execution.cursor += 1;
        }
    }
}
