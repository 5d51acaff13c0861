use crate::config::{ConfigService, PropertySource};
use crate::di::creation::CreationTracker;
use crate::di::definition::{Definition, Identity, Instance, ObjectDefinition, Scope};
use crate::di::Resolver;
use crate::error::{PapersheetError, Result};
use crate::profile::Profiles;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once, PoisonError, TryLockError};

/// Thread-safe registry of managed objects.
///
/// Definitions are added through `&mut self` and are read-only once the
/// registry is shared, so prototype construction needs no locking. Singleton
/// construction is guarded per identity with a double-checked lookup.
///
/// Dropping the registry runs [`Registry::shutdown`].
pub struct Registry {
    definitions: HashMap<Identity, Arc<dyn Definition>>,
    registration_order: Vec<Identity>,
    properties: Arc<dyn PropertySource>,
    profiles: Profiles,
    singletons: DashMap<Identity, Instance>,
    creation_locks: DashMap<Identity, Arc<Mutex<()>>>,
    creation: CreationTracker,
    creation_order: Mutex<Vec<Identity>>,
    closed: AtomicBool,
    shutdown_once: Once,
}

impl Registry {
    /// An empty registry with no configuration and the default profile.
    pub fn new() -> Self {
        Self::with_profiles(Arc::new(ConfigService::new()), Profiles::default())
    }

    /// Use `source` for property injection. Active profiles are read from it.
    pub fn with_properties(source: impl PropertySource + 'static) -> Self {
        let profiles = Profiles::from_source(&source);
        Self::with_profiles(Arc::new(source), profiles)
    }

    pub fn with_profiles(properties: Arc<dyn PropertySource>, profiles: Profiles) -> Self {
        Self {
            definitions: HashMap::new(),
            registration_order: Vec::new(),
            properties,
            profiles,
            singletons: DashMap::new(),
            creation_locks: DashMap::new(),
            creation: CreationTracker::default(),
            creation_order: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            shutdown_once: Once::new(),
        }
    }

    /// Register a definition.
    ///
    /// Definitions whose profile condition does not match the active profiles
    /// are skipped.
    ///
    /// # Errors
    /// Returns [`PapersheetError::DuplicateDefinition`] if `T` is already
    /// registered.
    pub fn register<T: Send + Sync + 'static>(
        &mut self,
        definition: ObjectDefinition<T>,
    ) -> Result<&mut Self> {
        self.insert(Arc::new(definition))
    }

    pub(crate) fn insert(&mut self, definition: Arc<dyn Definition>) -> Result<&mut Self> {
        let identity = definition.identity();

        if !self.profiles.accepts(definition.profiles()) {
            tracing::debug!(
                "Skipping {}: profiles {:?} not active",
                identity,
                definition.profiles()
            );
            return Ok(self);
        }

        if self.definitions.contains_key(&identity) {
            return Err(PapersheetError::DuplicateDefinition {
                type_name: identity.type_name().to_string(),
            });
        }

        tracing::debug!("Registered {} ({})", identity, definition.scope());
        self.definitions.insert(identity, definition);
        self.registration_order.push(identity);
        Ok(self)
    }

    /// Get an instance of `T`, constructing it if needed.
    ///
    /// Singletons are built once and cached; prototypes are built on every
    /// call and never tracked.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        Resolver::new(self).get::<T>()
    }

    pub(crate) fn resolve(&self, identity: Identity, resolver: &Resolver<'_>) -> Result<Instance> {
        if self.is_closed() {
            return Err(PapersheetError::RegistryClosed);
        }

        let definition =
            self.definitions
                .get(&identity)
                .ok_or_else(|| PapersheetError::DependencyNotFound {
                    type_name: identity.type_name().to_string(),
                })?;

        if definition.scope() == Scope::Singleton {
            if let Some(instance) = self.cached(identity) {
                return Ok(instance);
            }
        }

        // The cycle check must come before the creation lock: a re-entrant
        // request for the same identity would otherwise block on itself.
        resolver.enter(identity)?;
        let result = match definition.scope() {
            Scope::Singleton => self.create_singleton(identity, definition.as_ref(), resolver),
            Scope::Prototype => definition.build(resolver),
        };
        resolver.leave();
        result
    }

    fn create_singleton(
        &self,
        identity: Identity,
        definition: &dyn Definition,
        resolver: &Resolver<'_>,
    ) -> Result<Instance> {
        let lock = Arc::clone(self.creation_locks.entry(identity).or_default().value());
        let _guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                // Another thread is building it; blocking is only safe when
                // that thread is not, transitively, waiting on this one.
                self.creation.wait_for(identity)?;
                lock.lock().unwrap_or_else(PoisonError::into_inner)
            }
        };
        let _building = self.creation.building(identity);

        if let Some(instance) = self.cached(identity) {
            return Ok(instance);
        }
        if self.is_closed() {
            return Err(PapersheetError::RegistryClosed);
        }

        let instance = definition.build(resolver)?;
        {
            let mut order = self
                .creation_order
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !self.is_closed() {
                self.singletons.insert(identity, Arc::clone(&instance));
                order.push(identity);
                tracing::debug!("Singleton ready: {}", identity);
                return Ok(instance);
            }
        }

        // Shutdown began while this instance was being built.
        tracing::debug!("Registry closed during construction of {}", identity);
        definition.destroy(&instance);
        Err(PapersheetError::RegistryClosed)
    }

    fn cached(&self, identity: Identity) -> Option<Instance> {
        self.singletons
            .get(&identity)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Eagerly construct every non-lazy singleton, in registration order.
    ///
    /// # Errors
    /// On the first failure the registry is shut down, tearing down the
    /// singletons built so far, and the error is returned.
    pub fn refresh(&self) -> Result<()> {
        tracing::info!("Pre-instantiating singletons...");

        let mut count = 0;
        for identity in &self.registration_order {
            let definition = &self.definitions[identity];
            if definition.scope() != Scope::Singleton || definition.is_lazy() {
                continue;
            }
            if let Err(e) = self.resolve(*identity, &Resolver::new(self)) {
                tracing::error!("Failed to instantiate {}: {}", identity, e);
                self.shutdown();
                return Err(e);
            }
            count += 1;
        }

        tracing::info!("Refresh complete ({} singletons instantiated)", count);
        Ok(())
    }

    /// Run pre-destroy hooks on every cached singleton and clear the cache.
    ///
    /// Singletons are destroyed in **reverse order** of their first
    /// construction. Hook failures are logged and never stop the remaining
    /// teardown. Only the first call does anything; concurrent callers wait
    /// for it to finish.
    pub fn shutdown(&self) {
        self.shutdown_once.call_once(|| {
            let order = {
                let mut order = self
                    .creation_order
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                self.closed.store(true, Ordering::Release);
                std::mem::take(&mut *order)
            };
            tracing::info!("Shutting down registry ({} singletons)...", order.len());

            let mut failures = 0;
            for identity in order.iter().rev() {
                let Some((_, instance)) = self.singletons.remove(identity) else {
                    continue;
                };
                if let Some(definition) = self.definitions.get(identity) {
                    failures += definition.destroy(&instance);
                }
                tracing::debug!("Destroyed: {}", identity);
            }

            self.singletons.clear();
            self.creation_locks.clear();

            if failures > 0 {
                tracing::warn!("Registry shutdown finished with {} failed hooks", failures);
            } else {
                tracing::info!("Registry shutdown complete");
            }
        });
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.definitions.contains_key(&Identity::of::<T>())
    }

    pub fn scope_of<T: 'static>(&self) -> Option<Scope> {
        self.definitions
            .get(&Identity::of::<T>())
            .map(|definition| definition.scope())
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of singletons constructed and not yet torn down.
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    pub fn active_profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub fn properties(&self) -> &dyn PropertySource {
        self.properties.as_ref()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
