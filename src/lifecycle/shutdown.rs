//! Graceful Shutdown Handler
//!
//! Waits for OS signals and tears down the registry.

use crate::di::Registry;
use std::future::Future;
use std::sync::Arc;
use tokio::signal;

/// Handles graceful shutdown of the application
///
/// ShutdownHandler listens for OS signals (SIGTERM, SIGINT) and then shuts the
/// registry down, running every singleton's pre-destroy hooks.
///
/// # Example
///
/// ```rust,ignore
/// use papersheet::lifecycle::ShutdownHandler;
/// use std::sync::Arc;
///
/// let handler = ShutdownHandler::new(Arc::clone(&registry));
///
/// tokio::spawn(async move {
///     handler.wait_for_shutdown().await;
///     std::process::exit(0);
/// });
/// ```
pub struct ShutdownHandler {
    registry: Arc<Registry>,
}

impl ShutdownHandler {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Wait for SIGINT or SIGTERM, then shut down.
    pub async fn wait_for_shutdown(&self) {
        self.shutdown_on(shutdown_signal()).await;
    }

    /// Wait for `trigger` to complete, then shut down.
    pub async fn shutdown_on<F>(&self, trigger: F)
    where
        F: Future<Output = ()>,
    {
        trigger.await;
        self.shutdown();
    }

    fn shutdown(&self) {
        tracing::info!("Starting graceful shutdown...");
        self.registry.shutdown();
        tracing::info!("Graceful shutdown complete");
    }
}

/// Create a future that completes when a shutdown signal is received
///
/// If a signal handler cannot be installed the failure is logged and that
/// signal is never reported.
///
/// # Example
///
/// ```rust,ignore
/// use papersheet::lifecycle::shutdown_signal;
///
/// tokio::select! {
///     _ = shutdown_signal() => {
///         println!("Shutdown signal received");
///     }
///     _ = worker.run() => {}
/// }
/// ```
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::ObjectDefinition;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    struct Pool;

    #[tokio::test]
    async fn test_shutdown_on_trigger() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);

        let mut registry = Registry::new();
        registry
            .register(ObjectDefinition::new(|_| Ok(Pool)).pre_destroy("close", move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        registry.refresh().unwrap();
        let registry = Arc::new(registry);

        let (tx, rx) = oneshot::channel::<()>();
        let handler = ShutdownHandler::new(Arc::clone(&registry));
        let task = tokio::spawn(async move {
            handler
                .shutdown_on(async {
                    let _ = rx.await;
                })
                .await;
        });

        assert!(!registry.is_closed());
        tx.send(()).unwrap();
        task.await.unwrap();

        assert!(registry.is_closed());
        assert!(closed.load(Ordering::SeqCst));
    }
}
