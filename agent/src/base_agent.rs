//! Base agent: the think -> plan -> act -> observe -> reflect reasoning
//! cycle every specialized agent extends.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use fraudguard_completion::{CompletionRequest, CompletionService};
use fraudguard_core::environment::{Clock, IdGenerator};
use fraudguard_knowledge::{KnowledgeBase, Namespace};
use fraudguard_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::calibration::ConfidenceCalibrator;
use crate::chain_of_thought::ChainOfThought;
use crate::memory::{Episode, LongTermMemory, ShortTermMemory};
use crate::messenger::SharedMessenger;
use crate::scoring::{score_evidence, Recommendation, ScoreContribution};
use crate::self_correction::SelfCorrectionLog;
use crate::status::AgentStatus;

const MAX_DETECTIONS: usize = 200;

/// A materialized `{tool, params}` step from the Plan phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    /// Name of the tool to call, as registered on the [`ToolRegistry`].
    pub tool: String,
    /// JSON parameters to pass to the tool.
    pub params: Value,
}

/// The outcome of executing a single planned action. Tools never panic:
/// failures are carried as `Err` inside this struct, not propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The tool that was called.
    pub tool: String,
    /// `Ok(parsed JSON output)` on success, `Err(message)` on failure.
    pub output: Result<Value, String>,
}

/// A structured finding emitted at the end of a reasoning cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Unique id for this detection.
    pub id: String,
    /// Subject the detection is about (a seller id, typically).
    pub subject_id: String,
    /// The recommendation reached.
    pub recommendation: Recommendation,
    /// The composite score behind the recommendation.
    pub composite_score: f64,
    /// Individual scoring contributions.
    pub contributions: Vec<ScoreContribution>,
    /// Epoch-ms time the detection was recorded.
    pub created_at: i64,
}

/// The structured result of a full reasoning cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    /// Subject the cycle reasoned about.
    pub subject_id: String,
    /// Model-reported understanding of the input.
    pub understanding: String,
    /// Every action taken during Act.
    pub actions: Vec<ActionOutcome>,
    /// The recommendation reached during Observe.
    pub recommendation: Recommendation,
    /// The composite score behind the recommendation.
    pub composite_score: f64,
    /// Individual scoring contributions.
    pub contributions: Vec<ScoreContribution>,
    /// Confidence, after calibration against this agent's reliability curve.
    pub calibrated_confidence: f64,
    /// The full chain-of-thought trace, serialized for persistence.
    pub chain_of_thought: Value,
}

/// Everything a `reason` cycle needs beyond the agent's own state.
pub struct ReasoningContext<'a> {
    /// The subject id this cycle is investigating (a seller id, typically).
    pub subject_id: &'a str,
}

/// Shared collaborators every `BaseAgent` is constructed from.
pub struct AgentDependencies {
    /// Tool registry this agent may call during Act.
    pub tools: ToolRegistry,
    /// Pluggable completion backend for the Think step.
    pub completion: Arc<dyn CompletionService>,
    /// Shared knowledge base for Reflect's trace persistence.
    pub knowledge: Arc<KnowledgeBase>,
    /// Shared messaging hub.
    pub messenger: SharedMessenger,
    /// Clock abstraction.
    pub clock: Arc<dyn Clock>,
    /// Id generator abstraction.
    pub id_generator: Arc<dyn IdGenerator>,
}

/// The base agent every specialized agent wraps.
pub struct BaseAgent {
    agent_id: String,
    name: String,
    role: String,
    capabilities: HashSet<String>,
    status: RwLock<AgentStatus>,
    /// Whether this agent always appends an `ml_query` + `similar_case_lookup`
    /// call to its plan, the way investigator-class agents do.
    is_investigator: bool,
    tools: ToolRegistry,
    completion: Arc<dyn CompletionService>,
    knowledge: Arc<KnowledgeBase>,
    messenger: SharedMessenger,
    clock: Arc<dyn Clock>,
    id_generator: Arc<dyn IdGenerator>,
    short_term: Mutex<ShortTermMemory>,
    long_term: Mutex<LongTermMemory>,
    calibrator: Mutex<ConfidenceCalibrator>,
    self_correction: Mutex<SelfCorrectionLog>,
    detections: Mutex<VecDeque<Detection>>,
}

impl BaseAgent {
    /// Construct a base agent and register it with the shared messenger.
    #[must_use]
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        capabilities: HashSet<String>,
        is_investigator: bool,
        deps: AgentDependencies,
    ) -> Self {
        let name = name.into();
        deps.messenger.register(&name);
        Self {
            agent_id: agent_id.into(),
            name,
            role: role.into(),
            capabilities,
            status: RwLock::new(AgentStatus::Idle),
            is_investigator,
            tools: deps.tools,
            completion: deps.completion,
            knowledge: deps.knowledge,
            messenger: deps.messenger,
            clock: deps.clock,
            id_generator: deps.id_generator,
            short_term: Mutex::new(ShortTermMemory::default()),
            long_term: Mutex::new(LongTermMemory::new()),
            calibrator: Mutex::new(ConfidenceCalibrator::new()),
            self_correction: Mutex::new(SelfCorrectionLog::new()),
            detections: Mutex::new(VecDeque::with_capacity(MAX_DETECTIONS)),
        }
    }

    /// This agent's id.
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// This agent's name (also its messenger address).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This agent's declared role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// The capabilities this agent advertises for help-request routing.
    #[must_use]
    pub fn capabilities(&self) -> &HashSet<String> {
        &self.capabilities
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        *self.status.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_status(&self, status: AgentStatus) {
        *self.status.write().unwrap_or_else(std::sync::PoisonError::into_inner) = status;
    }

    /// Every detection recorded so far, oldest first.
    #[must_use]
    pub fn detections(&self) -> Vec<Detection> {
        self.detections.lock().unwrap_or_else(std::sync::PoisonError::into_inner).iter().cloned().collect()
    }

    fn push_detection(&self, detection: Detection) {
        let mut detections = self.detections.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if detections.len() == MAX_DETECTIONS {
            detections.pop_front();
        }
        detections.push_back(detection);
    }

    /// Builds the plan's tool parameters for a given tool against the
    /// subject under investigation. Tools that don't recognize a subject id
    /// (none currently) would simply ignore the extra field.
    fn params_for(tool: &str, subject_id: &str) -> Value {
        match tool {
            "ml_query" => json!({ "modelName": "fraud_composite_v1", "features": { "sellerId": subject_id } }),
            "similar_case_lookup" => json!({ "namespace": "decisions", "query": subject_id, "sellerId": subject_id }),
            "graph_query" => json!({ "operation": "investigate", "sellerId": subject_id }),
            "risk_history" => json!({ "sellerId": subject_id, "mode": "profile" }),
            "velocity_check" => json!({ "entityId": subject_id }),
            "feature_lookup" => json!({ "entityId": subject_id, "group": "seller_profile" }),
            _ => json!({ "sellerId": subject_id }),
        }
    }

    /// The full think -> plan -> act -> observe -> reflect reasoning cycle.
    pub async fn reason(&self, input: Value, ctx: &ReasoningContext<'_>) -> InvestigationReport {
        let now = self.clock.now_millis();
        let mut cot = ChainOfThought::new();

        // Think
        self.set_status(AgentStatus::Thinking);
        let available_tools = self.tools.list_tools();
        let completion_response = self
            .completion
            .complete(CompletionRequest {
                system_prompt: format!("You are {}, a {} investigating {}", self.name, self.role, ctx.subject_id),
                input: input.to_string(),
                available_tools: available_tools.clone(),
            })
            .await;
        let understanding = match completion_response {
            Ok(response) => {
                cot.observe(response.understanding.clone(), 0.8);
                response
            }
            Err(err) => {
                warn!(agent = %self.name, %err, "think step failed, falling back to the full tool set");
                cot.observe(format!("completion service unavailable: {err}"), 0.3);
                fraudguard_completion::CompletionResponse { understanding: String::new(), strategy: available_tools }
            }
        };
        {
            let mut short_term = self.short_term.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            short_term.record(format!("reasoned about {}", ctx.subject_id), now);
        }

        // Plan
        self.set_status(AgentStatus::Planning);
        let mut plan: Vec<PlannedAction> = understanding
            .strategy
            .iter()
            .map(|tool| PlannedAction { tool: tool.clone(), params: Self::params_for(tool, ctx.subject_id) })
            .collect();
        if self.is_investigator {
            for required in ["ml_query", "similar_case_lookup"] {
                if !plan.iter().any(|a| a.tool == required) {
                    plan.push(PlannedAction { tool: required.to_string(), params: Self::params_for(required, ctx.subject_id) });
                }
            }
        }

        // Act
        self.set_status(AgentStatus::Executing);
        let mut actions = Vec::with_capacity(plan.len());
        for planned in &plan {
            let result = self.tools.execute(&planned.tool, planned.params.to_string()).await;
            let outcome = match result {
                Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => ActionOutcome { tool: planned.tool.clone(), output: Ok(value) },
                    Err(err) => ActionOutcome { tool: planned.tool.clone(), output: Err(err.to_string()) },
                },
                Err(err) => ActionOutcome { tool: planned.tool.clone(), output: Err(err.message) },
            };
            cot.action(
                format!("called {}", planned.tool),
                json!({ "tool": planned.tool, "success": outcome.output.is_ok() }),
            );
            actions.push(outcome);
        }

        // Observe
        self.set_status(AgentStatus::Investigating);
        let successful: Vec<Value> = actions.iter().filter_map(|a| a.output.as_ref().ok().cloned()).collect();
        let scoring = score_evidence(&successful);

        let hypothesis = cot.hypothesize(format!("{} presents elevated fraud risk", ctx.subject_id), 0.5);
        for contribution in &scoring.contributions {
            cot.evidence(format!("{} contributed {:.1} points", contribution.source, contribution.points), (contribution.points / 45.0).min(1.0), &[hypothesis], &[]);
        }
        let validation = cot.validate_hypothesis(hypothesis);
        cot.conclude(
            format!("recommendation: {:?} (score {:.1})", scoring.recommendation, scoring.composite_score),
            validation.adjusted_confidence,
            &[hypothesis],
        );

        // Reflect
        let calibrated_confidence = {
            let calibrator = self.calibrator.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            calibrator.calibrate(validation.adjusted_confidence)
        };

        let report = InvestigationReport {
            subject_id: ctx.subject_id.to_string(),
            understanding: understanding.understanding,
            actions,
            recommendation: scoring.recommendation,
            composite_score: scoring.composite_score,
            contributions: scoring.contributions,
            calibrated_confidence,
            chain_of_thought: cot.to_trace_document(),
        };

        let prediction_id = self.id_generator.next_id();
        {
            let mut self_correction = self.self_correction.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            self_correction.record(prediction_id, ctx.subject_id, format!("{:?}", report.recommendation), Some(calibrated_confidence), now);
        }
        {
            let mut long_term = self.long_term.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            long_term.record(
                &input,
                Episode {
                    input_summary: ctx.subject_id.to_string(),
                    recommendation: format!("{:?}", report.recommendation),
                    composite_score: report.composite_score,
                    recorded_at: now,
                },
            );
        }
        self.knowledge.add_knowledge(
            Namespace::Decisions,
            format!("{} -> {:?} (score {:.1})", ctx.subject_id, report.recommendation, report.composite_score),
            json!({
                "sellerId": ctx.subject_id,
                "domain": null,
                "outcome": format!("{:?}", report.recommendation),
                "agent": self.name,
            }),
        );

        self.push_detection(Detection {
            id: self.id_generator.next_id(),
            subject_id: ctx.subject_id.to_string(),
            recommendation: report.recommendation,
            composite_score: report.composite_score,
            contributions: report.contributions.clone(),
            created_at: now,
        });

        debug!(agent = %self.name, subject = %ctx.subject_id, recommendation = ?report.recommendation, "reasoning cycle complete");
        self.set_status(AgentStatus::Idle);
        report
    }

    /// Drain and process every message queued for this agent since the last
    /// call (unicast/broadcast deliveries and delegated tasks).
    pub fn drain_messages(&self) -> Vec<Value> {
        self.messenger.drain_inbox(&self.name)
    }

    /// Record the ground-truth outcome of a previously logged prediction and
    /// feed it back into the confidence calibrator.
    pub fn review_prediction(&self, prediction_id: &str, was_correct: bool) {
        let now = self.clock.now_millis();
        let confidence = {
            let mut self_correction = self.self_correction.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            self_correction.review(prediction_id, was_correct, now)
        };
        if let Some(confidence) = confidence {
            let mut calibrator = self.calibrator.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            calibrator.record_outcome(confidence, was_correct);
        } else {
            warn!(agent = %self.name, prediction_id, "reviewed an unknown or already-reviewed prediction");
        }
    }

    /// Recall prior episodes whose input shape matches the given input.
    #[must_use]
    pub fn recall_similar_episodes(&self, input: &Value) -> Vec<Episode> {
        let long_term = self.long_term.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        long_term.recall(input).into_iter().cloned().collect()
    }

    /// Shared messenger handle, for sending help requests/delegations.
    #[must_use]
    pub fn messenger(&self) -> &SharedMessenger {
        &self.messenger
    }
}

impl std::fmt::Debug for BaseAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseAgent")
            .field("agent_id", &self.agent_id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_completion::MockCompletionService;
    use fraudguard_core::environment::{SystemClock, UuidGenerator};
    use fraudguard_tools::{graph_query_tool, risk_history_tool};
    use std::sync::atomic::{AtomicI64, Ordering};

    struct FakeClock(AtomicI64);
    impl Clock for FakeClock {
        fn now(&self) -> chrono::DateTime<chrono::Utc> {
            let millis = self.0.fetch_add(1, Ordering::SeqCst);
            chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default()
        }
    }

    fn test_agent() -> BaseAgent {
        let clock: Arc<dyn Clock> = Arc::new(FakeClock(AtomicI64::new(1_000)));
        let id_generator = Arc::new(UuidGenerator);
        let tools = ToolRegistry::new();
        let graph = Arc::new(fraudguard_graph::GraphEngine::new());
        let risk = Arc::new(fraudguard_risk::RiskProfileEngine::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        let (tool, executor) = graph_query_tool(graph);
        tools.register(tool, executor);
        let (tool, executor) = risk_history_tool(risk);
        tools.register(tool, executor);

        let deps = AgentDependencies {
            tools,
            completion: Arc::new(MockCompletionService),
            knowledge: Arc::new(fraudguard_knowledge::KnowledgeBase::new(clock.clone(), id_generator.clone())),
            messenger: Arc::new(crate::messenger::Messenger::new()),
            clock,
            id_generator,
        };
        BaseAgent::new("agent-1", "cross-domain", "investigator", HashSet::from(["graph-investigation".to_string()]), true, deps)
    }

    #[tokio::test]
    async fn reasoning_cycle_produces_a_report_and_a_detection() {
        let agent = test_agent();
        let report = agent.reason(json!({"sellerId": "S1"}), &ReasoningContext { subject_id: "S1" }).await;

        assert_eq!(report.subject_id, "S1");
        assert_eq!(agent.detections().len(), 1);
        assert_eq!(agent.status(), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn investigator_agents_always_append_ml_query_and_similar_case_lookup() {
        let agent = test_agent();
        let report = agent.reason(json!({"sellerId": "S1"}), &ReasoningContext { subject_id: "S1" }).await;
        let tools_called: Vec<&str> = report.actions.iter().map(|a| a.tool.as_str()).collect();
        assert!(tools_called.contains(&"ml_query"));
        assert!(tools_called.contains(&"similar_case_lookup"));
    }
}
