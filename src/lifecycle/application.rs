//! Application Bootstrap
//!
//! Provides a high-level API for building a registry, eagerly instantiating
//! its singletons and tearing it down again.

use super::ShutdownHandler;
use crate::config::PropertySource;
use crate::di::{ObjectDefinition, Registry, RegistryBuilder};
use crate::error::Result;
use std::sync::Arc;

/// A started application: a refreshed registry shared behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use papersheet::lifecycle::Application;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let app = Application::builder()
///         .properties(ConfigService::load_file("application.properties")?)
///         .register(ObjectDefinition::new(|_| Ok(GreetingService::new())))
///         .start()?;
///
///     println!("{}", app.get::<GreetingService>()?.greet());
///
///     app.shutdown();
///     Ok(())
/// }
/// ```
pub struct Application {
    registry: Arc<Registry>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.registry.get::<T>()
    }

    /// Create a shutdown handler for graceful shutdown
    pub fn shutdown_handler(&self) -> ShutdownHandler {
        ShutdownHandler::new(Arc::clone(&self.registry))
    }

    /// Run every singleton's pre-destroy hooks.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down application...");
        self.registry.shutdown();
        tracing::info!("Application shutdown complete");
    }
}

/// Builder for Application
#[derive(Default)]
pub struct ApplicationBuilder {
    registry: RegistryBuilder,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(mut self, source: impl PropertySource + 'static) -> Self {
        self.registry = self.registry.properties(source);
        self
    }

    pub fn active_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry = self.registry.active_profiles(profiles);
        self
    }

    pub fn register<T: Send + Sync + 'static>(mut self, definition: ObjectDefinition<T>) -> Self {
        self.registry = self.registry.register(definition);
        self
    }

    /// Build the registry and instantiate every non-lazy singleton
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails or any singleton cannot be
    /// constructed. Singletons built before the failure are torn down.
    pub fn start(self) -> Result<Application> {
        tracing::info!("Starting application initialization...");

        let registry = self.registry.build()?;
        registry.refresh()?;

        tracing::info!(
            "Application initialization complete ({} definitions)",
            registry.len()
        );
        Ok(Application {
            registry: Arc::new(registry),
        })
    }
}
