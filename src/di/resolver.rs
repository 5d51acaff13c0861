use crate::di::definition::Identity;
use crate::di::Registry;
use crate::error::{PapersheetError, Result};
use std::cell::RefCell;
use std::sync::Arc;

/// Handle passed to construction functions and post-construct hooks
///
/// A resolver belongs to a single top-level [`Registry::get`] call. It tracks
/// the chain of objects currently under construction on that call stack, which
/// is how dependency cycles (and a hook resolving its own object) are detected
/// instead of recursing forever.
///
/// # Example
/// ```
/// use papersheet::di::{ObjectDefinition, Registry};
/// use std::sync::Arc;
///
/// struct Repository;
/// struct Service {
///     repository: Arc<Repository>,
/// }
///
/// let mut registry = Registry::new();
/// registry.register(ObjectDefinition::new(|_| Ok(Repository))).unwrap();
/// registry
///     .register(ObjectDefinition::new(|resolver| {
///         Ok(Service {
///             repository: resolver.get::<Repository>()?,
///         })
///     }))
///     .unwrap();
///
/// let service = registry.get::<Service>().unwrap();
/// assert!(Arc::ptr_eq(&service.repository, &registry.get::<Repository>().unwrap()));
/// ```
pub struct Resolver<'r> {
    registry: &'r Registry,
    path: RefCell<Vec<Identity>>,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            path: RefCell::new(Vec::new()),
        }
    }

    /// Resolve a dependency from the owning registry.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.registry
            .resolve(Identity::of::<T>(), self)?
            .downcast::<T>()
            .map_err(|_| PapersheetError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    /// Look up a raw configuration value.
    pub fn property(&self, key: &str) -> Option<String> {
        self.registry.properties().lookup(key)
    }

    /// Number of objects currently under construction on this call stack.
    pub fn depth(&self) -> usize {
        self.path.borrow().len()
    }

    /// Mark `identity` as under construction.
    pub(crate) fn enter(&self, identity: Identity) -> Result<()> {
        let mut path = self.path.borrow_mut();
        if let Some(start) = path.iter().position(|id| *id == identity) {
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&identity))
                .map(Identity::type_name)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(PapersheetError::CircularDependency { cycle });
        }
        path.push(identity);
        Ok(())
    }

    pub(crate) fn leave(&self) {
        self.path.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_enter_detects_repeat() {
        let registry = Registry::new();
        let resolver = Resolver::new(&registry);

        resolver.enter(Identity::of::<A>()).unwrap();
        resolver.enter(Identity::of::<B>()).unwrap();
        assert_eq!(resolver.depth(), 2);

        let err = resolver.enter(Identity::of::<A>()).unwrap_err();
        match err {
            PapersheetError::CircularDependency { cycle } => {
                assert!(cycle.ends_with("::A"), "{cycle}");
                assert_eq!(cycle.matches(" -> ").count(), 2, "{cycle}");
            }
            other => panic!("unexpected error: {other}"),
        }

        resolver.leave();
        resolver.leave();
        assert_eq!(resolver.depth(), 0);
        resolver.enter(Identity::of::<A>()).unwrap();
    }
}
