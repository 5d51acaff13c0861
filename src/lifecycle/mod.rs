//! Lifecycle Hooks Module
//!
//! This module runs the initialization and cleanup hooks of managed objects.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Configuration Loading
//!    ↓
//! 2. Registry Creation + Definition Registration (profiles applied)
//!    ↓
//! 3. Refresh: each non-lazy singleton, in registration order
//!      constructor → property injection → post-construct hooks
//!    ↓
//! [Running...]  (lazy singletons and prototypes built on demand)
//!    ↓
//! 4. Shutdown Signal (SIGTERM/SIGINT) or explicit shutdown()
//!    ↓
//! 5. Pre-destroy hooks, singletons in reverse construction order
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use papersheet::di::ObjectDefinition;
//! use papersheet::lifecycle::{OnDestroy, OnInit};
//!
//! pub struct DatabaseService {
//!     url: String,
//! }
//!
//! impl OnInit for DatabaseService {
//!     fn on_init(&mut self) -> anyhow::Result<()> {
//!         tracing::info!("Opening connection to {}", self.url);
//!         Ok(())
//!     }
//! }
//!
//! impl OnDestroy for DatabaseService {
//!     fn on_destroy(&self) -> anyhow::Result<()> {
//!         tracing::info!("Closing database connections");
//!         Ok(())
//!     }
//! }
//!
//! let definition = ObjectDefinition::new(|_| Ok(DatabaseService { url: String::new() }))
//!     .property("datasource.url", |db: &mut DatabaseService, url: String| db.url = url)
//!     .on_init()
//!     .on_destroy();
//! ```

mod application;
pub(crate) mod hooks;
mod shutdown;
mod traits;

pub use application::{Application, ApplicationBuilder};
pub use shutdown::{ShutdownHandler, shutdown_signal};
pub use traits::{OnDestroy, OnInit};
