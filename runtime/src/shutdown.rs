//! Graceful shutdown coordination across top-level components: the HTTP
//! server, every autonomous scheduler, and the help-request router.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Implemented by any top-level component that needs a chance to wind down
/// cleanly: finish an in-flight cycle, flush a buffer, close a socket.
#[async_trait]
pub trait ShutdownHandler: Send + Sync {
    /// Component name for logging.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns an error if the component could not shut down cleanly.
    async fn shutdown(&self) -> Result<(), String>;
}

/// Drives shutdown for every registered handler in parallel, bounded by a
/// single timeout, and broadcasts a signal any subscriber can observe.
pub struct ShutdownCoordinator {
    handlers: Vec<Arc<dyn ShutdownHandler>>,
    shutdown_tx: broadcast::Sender<()>,
    timeout_duration: Duration,
}

impl ShutdownCoordinator {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);
        Self { handlers: Vec::new(), shutdown_tx, timeout_duration: timeout }
    }

    /// Handlers shut down in parallel, not registration order.
    pub fn register(&mut self, handler: Arc<dyn ShutdownHandler>) {
        info!(component = handler.name(), "registered shutdown handler");
        self.handlers.push(handler);
    }

    /// Subscribe to be notified when shutdown starts.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Broadcast the shutdown signal, then shut every handler down in
    /// parallel, bounded by `timeout_duration` per handler.
    ///
    /// # Errors
    ///
    /// Returns the per-component error messages for every handler that
    /// failed or timed out.
    pub async fn shutdown(&self) -> Result<(), Vec<String>> {
        info!(handlers = self.handlers.len(), timeout = ?self.timeout_duration, "initiating graceful shutdown");

        if let Err(err) = self.shutdown_tx.send(()) {
            warn!(%err, "no active shutdown signal receivers");
        }

        let shutdown_futures = self.handlers.iter().map(|handler| async move {
            let name = handler.name();
            match tokio::time::timeout(self.timeout_duration, handler.shutdown()).await {
                Ok(Ok(())) => {
                    info!(component = name, "component shut down");
                    Ok(())
                }
                Ok(Err(err)) => {
                    error!(component = name, %err, "component shutdown failed");
                    Err(format!("{name}: {err}"))
                }
                Err(_) => {
                    error!(component = name, "component shutdown timed out");
                    Err(format!("{name}: timeout after {:?}", self.timeout_duration))
                }
            }
        });

        let errors: Vec<String> = futures::future::join_all(shutdown_futures)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if errors.is_empty() {
            info!("all components shut down successfully");
            Ok(())
        } else {
            error!(count = errors.len(), "shutdown completed with errors");
            Err(errors)
        }
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Adapts a closure into a `ShutdownHandler`, for components that don't
/// warrant a dedicated type (e.g. a scheduler's `Arc<AgentScheduler>`).
pub struct GenericShutdownHandler {
    name: String,
    on_shutdown: Arc<dyn Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), String>> + Send>> + Send + Sync>,
}

impl GenericShutdownHandler {
    pub fn new<F, Fut>(name: String, on_shutdown: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), String>> + Send + 'static,
    {
        Self { name, on_shutdown: Arc::new(move || Box::pin(on_shutdown())) }
    }
}

#[async_trait]
impl ShutdownHandler for GenericShutdownHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn shutdown(&self) -> Result<(), String> {
        (self.on_shutdown)().await
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            warn!("failed to register SIGTERM handler, falling back to Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C");
            return;
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received Ctrl+C"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl+C");
    }
}
