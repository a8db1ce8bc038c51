//! Process entrypoint: wires [`AppState`], starts the metrics server,
//! spawns every background task, serves HTTP, and waits for a shutdown
//! signal before winding everything down.

use std::sync::Arc;
use std::time::Duration;

use fraudguard_core::environment::SystemClock;
use fraudguard_orchestrator::HelpRouter;
use fraudguard_processors::{FeatureMaterializationProcessor, RiskSignalAggregator, TransactionVelocityProcessor};
use fraudguard_runtime::shutdown::{wait_for_signal, GenericShutdownHandler, ShutdownCoordinator};
use fraudguard_runtime::AppConfig;

use crate::routes::build_router;
use crate::state::AppState;

/// Runs the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to install, the HTTP
/// listener can't bind, or the server exits with an I/O error.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::bootstrap(config.clone());

    if config.server.metrics_enabled {
        state.metrics.lock().await.start()?;
    }

    let _retention_task = state.streaming.clone().spawn_retention_task();

    let _materialize_task = fraudguard_processors::runner::spawn(
        state.streaming.clone(),
        Arc::new(FeatureMaterializationProcessor::new(state.features.clone(), Arc::new(SystemClock))),
    );
    let _velocity_task = fraudguard_processors::runner::spawn(
        state.streaming.clone(),
        Arc::new(TransactionVelocityProcessor::new(state.features.clone(), Arc::new(SystemClock))),
    );
    let _risk_signal_task =
        fraudguard_processors::runner::spawn(state.streaming.clone(), Arc::new(RiskSignalAggregator::new(state.features.clone())));

    for scheduler in &state.schedulers {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await });
    }

    let help_router = Arc::new(HelpRouter::new(state.registry.clone(), state.messenger.clone()));
    let help_router_loop = help_router.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(fraudguard_orchestrator::ROUTING_INTERVAL_MS));
        loop {
            interval.tick().await;
            help_router_loop.route_pending();
        }
    });

    let router = build_router(state.clone());

    let mut shutdown = ShutdownCoordinator::new(Duration::from_secs(30));
    for (index, scheduler) in state.schedulers.iter().enumerate() {
        let scheduler = scheduler.clone();
        shutdown.register(Arc::new(GenericShutdownHandler::new(format!("scheduler-{index}"), move || {
            let scheduler = scheduler.clone();
            async move {
                scheduler.shutdown();
                Ok(())
            }
        })));
    }

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "fraudguard-server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            if let Err(errors) = shutdown.shutdown().await {
                tracing::error!(?errors, "graceful shutdown completed with errors");
            }
        })
        .await?;

    Ok(())
}
