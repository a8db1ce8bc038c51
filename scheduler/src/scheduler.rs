//! Per-agent autonomous cycle scheduler: a timer-driven poll loop plus
//! event-acceleration triggering, coalesced so never more than one cycle is
//! in flight per agent.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use fraudguard_core::environment::Clock;
use fraudguard_core::event_bus::{BusEvent, EventBus};
use fraudguard_knowledge::{KnowledgeBase, Namespace};
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::cycle::AutonomousCycle;

/// Per-agent scheduling configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the timer fires a scan cycle.
    pub scan_interval_ms: u64,
    /// Number of newly buffered events since the last cycle that triggers
    /// an immediate, coalesced cycle ahead of the timer.
    pub event_acceleration_threshold: usize,
    /// Topics this agent subscribes to.
    pub subscribed_topics: Vec<String>,
}

impl SchedulerConfig {
    /// The event buffer's max size before oldest-dropped backpressure kicks
    /// in: 10x the acceleration threshold, per the documented lossy default.
    #[must_use]
    pub fn max_buffer_size(&self) -> usize {
        self.event_acceleration_threshold.max(1) * 10
    }
}

struct Buffer {
    events: VecDeque<BusEvent>,
    since_last_cycle: usize,
}

/// Drives one agent's autonomous cycle against a shared event bus.
pub struct AgentScheduler {
    config: SchedulerConfig,
    agent: Arc<dyn AutonomousCycle>,
    event_bus: Arc<dyn EventBus>,
    knowledge: Arc<KnowledgeBase>,
    clock: Arc<dyn Clock>,
    buffer: Mutex<Buffer>,
    in_flight: AtomicBool,
    cycles_run: AtomicUsize,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl AgentScheduler {
    /// Construct a scheduler for `agent`.
    #[must_use]
    pub fn new(
        config: SchedulerConfig,
        agent: Arc<dyn AutonomousCycle>,
        event_bus: Arc<dyn EventBus>,
        knowledge: Arc<KnowledgeBase>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Arc::new(Self {
            config,
            agent,
            event_bus,
            knowledge,
            clock,
            buffer: Mutex::new(Buffer { events: VecDeque::new(), since_last_cycle: 0 }),
            in_flight: AtomicBool::new(false),
            cycles_run: AtomicUsize::new(0),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Number of cycles completed so far.
    #[must_use]
    pub fn cycles_run(&self) -> usize {
        self.cycles_run.load(Ordering::SeqCst)
    }

    /// Signal both the subscription loop and the timer loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    fn push_event(&self, event: BusEvent) -> bool {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.events.len() >= self.config.max_buffer_size() {
            buffer.events.pop_front();
        }
        buffer.events.push_back(event);
        buffer.since_last_cycle += 1;
        buffer.since_last_cycle >= self.config.event_acceleration_threshold
    }

    /// Groups the buffered events by `sellerId` (falling back to `domain`
    /// for events that carry no seller), returning the distinct subjects a
    /// cycle should scan, and draining the buffer.
    fn build_scan_input(&self) -> Vec<String> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut subjects = Vec::new();
        for event in buffer.events.drain(..) {
            let subject = event
                .payload
                .get("sellerId")
                .and_then(serde_json::Value::as_str)
                .or_else(|| event.payload.get("domain").and_then(serde_json::Value::as_str));
            if let Some(subject) = subject {
                if !subjects.contains(&subject.to_string()) {
                    subjects.push(subject.to_string());
                }
            }
        }
        buffer.since_last_cycle = 0;
        subjects
    }

    /// Run one cycle now if none is already in flight; otherwise a no-op
    /// (the in-flight cycle will pick up whatever has buffered by the time
    /// it drains).
    pub async fn run_cycle_once(self: &Arc<Self>) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return;
        }
        let subjects = self.build_scan_input();
        for subject in &subjects {
            match futures::FutureExt::catch_unwind(AssertUnwindSafe(self.agent.run_cycle(subject))).await {
                Ok(report) => self.post_cycle(subject, report).await,
                Err(_) => {
                    error!(agent = %self.agent.agent_name(), subject, "autonomous cycle panicked, agent remains runnable");
                }
            }
        }
        self.cycles_run.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn post_cycle(&self, subject: &str, report: fraudguard_agent::InvestigationReport) {
        self.agent.messenger().broadcast(
            self.agent.agent_name(),
            serde_json::json!({
                "kind": "detection",
                "subjectId": subject,
                "recommendation": report.recommendation,
                "compositeScore": report.composite_score,
            }),
        );

        let topic = format!("{}:detection", self.agent.agent_name());
        let publish_result = self
            .event_bus
            .publish(BusEvent {
                topic: topic.clone(),
                key: Some(subject.to_string()),
                payload: serde_json::json!({
                    "subjectId": subject,
                    "recommendation": report.recommendation,
                    "compositeScore": report.composite_score,
                }),
                timestamp: self.clock.now_millis(),
            })
            .await;
        if let Err(err) = publish_result {
            warn!(%topic, %err, "failed to publish detection event");
        }

        self.knowledge.add_knowledge(
            Namespace::RiskEvents,
            format!("{} cycle: {:?} for {}", self.agent.agent_name(), report.recommendation, subject),
            serde_json::json!({
                "sellerId": subject,
                "outcome": format!("{:?}", report.recommendation),
                "agent": self.agent.agent_name(),
            }),
        );
    }

    /// Run the scheduler: subscribes to the configured topics and starts
    /// both the event-buffering loop and the timer loop. Returns once
    /// `shutdown` has been called and both loops have exited.
    pub async fn run(self: Arc<Self>) {
        let topics: Vec<&str> = self.config.subscribed_topics.iter().map(String::as_str).collect();
        let subscription = self.event_bus.subscribe(&topics).await;

        let subscription_task = match subscription {
            Ok(stream) => {
                let scheduler = self.clone();
                let mut shutdown_rx = self.shutdown_rx.clone();
                Some(tokio::spawn(async move {
                    let mut stream = stream;
                    loop {
                        tokio::select! {
                            _ = shutdown_rx.changed() => {
                                if *shutdown_rx.borrow() {
                                    break;
                                }
                            }
                            next = stream.next() => {
                                match next {
                                    Some(Ok(event)) => {
                                        if scheduler.push_event(event) {
                                            scheduler.run_cycle_once().await;
                                        }
                                    }
                                    Some(Err(err)) => warn!(%err, "event bus subscription error"),
                                    None => break,
                                }
                            }
                        }
                    }
                }))
            }
            Err(err) => {
                warn!(%err, topics = ?self.config.subscribed_topics, "failed to subscribe, acceleration triggers disabled for this agent");
                None
            }
        };

        let timer_task = {
            let scheduler = self.clone();
            let mut shutdown_rx = self.shutdown_rx.clone();
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(self.config.scan_interval_ms));
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                break;
                            }
                        }
                        _ = interval.tick() => {
                            scheduler.run_cycle_once().await;
                        }
                    }
                }
            })
        };

        info!(agent = %self.agent.agent_name(), "autonomous scheduler running");
        if let Some(task) = subscription_task {
            let _ = task.await;
        }
        let _ = timer_task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::{standalone_messenger, MockCycle};
    use fraudguard_core::environment::SystemClock;
    use fraudguard_core::event_bus::BroadcastEventBus;
    use fraudguard_core::environment::UuidGenerator;

    fn scheduler(threshold: usize) -> Arc<AgentScheduler> {
        let agent: Arc<dyn AutonomousCycle> =
            Arc::new(MockCycle { name: "mock".to_string(), messenger: standalone_messenger() });
        let bus: Arc<dyn EventBus> = Arc::new(BroadcastEventBus::new(64));
        let knowledge = Arc::new(KnowledgeBase::new(Arc::new(SystemClock), Arc::new(UuidGenerator)));
        AgentScheduler::new(
            SchedulerConfig { scan_interval_ms: 60_000, event_acceleration_threshold: threshold, subscribed_topics: vec!["risk.events".to_string()] },
            agent,
            bus,
            knowledge,
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn max_buffer_size_is_ten_times_the_threshold() {
        let config = SchedulerConfig { scan_interval_ms: 1000, event_acceleration_threshold: 5, subscribed_topics: vec![] };
        assert_eq!(config.max_buffer_size(), 50);
    }

    #[tokio::test]
    async fn push_event_signals_acceleration_once_threshold_crossed() {
        let scheduler = scheduler(2);
        let event = |seller: &str| BusEvent { topic: "risk.events".into(), key: None, payload: serde_json::json!({"sellerId": seller}), timestamp: 1 };
        assert!(!scheduler.push_event(event("S1")));
        assert!(scheduler.push_event(event("S2")));
    }

    #[tokio::test]
    async fn build_scan_input_dedupes_subjects_and_drains_buffer() {
        let scheduler = scheduler(10);
        let event = |seller: &str| BusEvent { topic: "risk.events".into(), key: None, payload: serde_json::json!({"sellerId": seller}), timestamp: 1 };
        scheduler.push_event(event("S1"));
        scheduler.push_event(event("S1"));
        scheduler.push_event(event("S2"));

        let subjects = scheduler.build_scan_input();
        assert_eq!(subjects, vec!["S1".to_string(), "S2".to_string()]);
        assert!(scheduler.build_scan_input().is_empty());
    }

    #[tokio::test]
    async fn run_cycle_once_coalesces_concurrent_calls() {
        let scheduler = scheduler(10);
        scheduler.push_event(BusEvent { topic: "risk.events".into(), key: None, payload: serde_json::json!({"sellerId": "S1"}), timestamp: 1 });

        let a = scheduler.clone();
        let b = scheduler.clone();
        let (r1, r2) = tokio::join!(a.run_cycle_once(), b.run_cycle_once());
        let _ = (r1, r2);
        assert_eq!(scheduler.cycles_run(), 1);
    }

    #[tokio::test]
    async fn buffer_drops_oldest_past_max_size() {
        let scheduler = scheduler(1);
        for i in 0..20 {
            scheduler.push_event(BusEvent { topic: "risk.events".into(), key: None, payload: serde_json::json!({"sellerId": format!("S{i}")}), timestamp: 1 });
        }
        let buffer = scheduler.buffer.lock().unwrap();
        assert!(buffer.events.len() <= scheduler.config.max_buffer_size());
    }
}
