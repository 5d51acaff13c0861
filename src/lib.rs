//! # Papersheet
//!
//! A managed object registry with scoped instantiation, property injection and
//! ordered lifecycle hooks.
//!
//! ## Features
//!
//! - **Scopes**: singletons are built once per registry; prototypes are built per request
//! - **Property Injection**: typed bindings resolved from a [`PropertySource`](config::PropertySource)
//! - **Ordered Hooks**: post-construct and pre-destroy chains run in declaration order
//! - **Reverse Teardown**: singletons are destroyed in reverse construction order
//! - **Profiles**: definitions can be limited to active profiles
//! - **Cycle Detection**: dependency cycles fail with an error instead of overflowing the stack
//!
//! ## Quick Start
//!
//! ```rust
//! use papersheet::prelude::*;
//! use std::collections::HashMap;
//!
//! struct Repository;
//!
//! struct GreetingService {
//!     repository: Arc<Repository>,
//!     greeting: String,
//! }
//!
//! let mut config = HashMap::new();
//! config.insert("greeting".to_string(), "Hello".to_string());
//!
//! let mut registry = Registry::with_properties(config);
//! registry
//!     .register(ObjectDefinition::new(|_| Ok(Repository)))
//!     .unwrap()
//!     .register(
//!         ObjectDefinition::new(|resolver| {
//!             Ok(GreetingService {
//!                 repository: resolver.get::<Repository>()?,
//!                 greeting: String::new(),
//!             })
//!         })
//!         .property("greeting", |s: &mut GreetingService, v: String| s.greeting = v)
//!         .pre_destroy("goodbye", |_| Ok(())),
//!     )
//!     .unwrap();
//!
//! registry.refresh().unwrap();
//!
//! let service = registry.get::<GreetingService>().unwrap();
//! assert_eq!(service.greeting, "Hello");
//!
//! registry.shutdown();
//! ```

pub mod config;
pub mod di;
pub mod error;
pub mod lifecycle;
pub mod profile;

// Re-export core types
pub use config::{ConfigService, PropertySource};
pub use di::{Injectable, ObjectDefinition, Registry, RegistryBuilder, Resolver, Scope};
pub use error::{PapersheetError, Result};
pub use profile::Profiles;

// Re-export macros
pub use papersheet_macro::Injectable as DeriveInjectable;

// Used by the code generated from `#[derive(Injectable)]`
pub use anyhow;

/// Prelude module for convenient imports
///
/// ```
/// use papersheet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::DeriveInjectable as Injectable;
    pub use crate::config::{ConfigService, PropertySource};
    pub use crate::di::{Injectable, ObjectDefinition, Registry, RegistryBuilder, Resolver, Scope};
    pub use crate::error::{PapersheetError, Result};
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, OnDestroy, OnInit, ShutdownHandler, shutdown_signal,
    };
    pub use crate::profile::Profiles;
    pub use std::sync::Arc;
}
