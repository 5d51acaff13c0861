//! Ordered hook chains
//!
//! Every definition carries one chain per lifecycle phase. Post-construct
//! hooks fail fast: the first error aborts construction. Pre-destroy hooks are
//! best-effort: each failure is logged and the remaining hooks still run.

use crate::di::Resolver;
use crate::error::{PapersheetError, Result};

type InitFn<T> = Box<dyn Fn(&mut T, &Resolver<'_>) -> anyhow::Result<()> + Send + Sync>;
type DestroyFn<T> = Box<dyn Fn(&T) -> anyhow::Result<()> + Send + Sync>;

struct Hook<F> {
    name: String,
    callback: F,
}

/// Post-construct hooks in declaration order.
pub(crate) struct InitChain<T> {
    hooks: Vec<Hook<InitFn<T>>>,
}

impl<T> InitChain<T> {
    pub(crate) fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub(crate) fn push<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&mut T, &Resolver<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            callback: Box::new(callback),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run every hook in order, stopping at the first failure.
    pub(crate) fn run(&self, instance: &mut T, resolver: &Resolver<'_>) -> Result<()> {
        let type_name = std::any::type_name::<T>();
        for hook in &self.hooks {
            tracing::debug!("Post-construct: {}::{}", type_name, hook.name);
            (hook.callback)(instance, resolver).map_err(|e| {
                tracing::error!(
                    "Post-construct hook '{}' failed for {}: {}",
                    hook.name,
                    type_name,
                    e
                );
                PapersheetError::construction(
                    type_name,
                    format!("post-construct hook '{}'", hook.name),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

/// Pre-destroy hooks in declaration order.
pub(crate) struct DestroyChain<T> {
    hooks: Vec<Hook<DestroyFn<T>>>,
}

impl<T> DestroyChain<T> {
    pub(crate) fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub(crate) fn push<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            callback: Box::new(callback),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run every hook in order. Failures are logged, never propagated.
    ///
    /// Returns the number of hooks that failed.
    pub(crate) fn run(&self, instance: &T) -> usize {
        let type_name = std::any::type_name::<T>();
        let mut failures = 0;
        for hook in &self.hooks {
            tracing::debug!("Pre-destroy: {}::{}", type_name, hook.name);
            if let Err(e) = (hook.callback)(instance) {
                // Log error but continue with other hooks
                let err = PapersheetError::teardown(type_name, &hook.name, e);
                tracing::error!("{}", err);
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Registry;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_init_chain_stops_at_first_failure() {
        let registry = Registry::new();
        let resolver = Resolver::new(&registry);

        let mut chain: InitChain<Vec<&'static str>> = InitChain::new();
        chain.push("a", |trace, _| {
            trace.push("a");
            Ok(())
        });
        chain.push("b", |_, _| anyhow::bail!("b failed"));
        chain.push("c", |trace, _| {
            trace.push("c");
            Ok(())
        });
        assert_eq!(chain.len(), 3);

        let mut trace = Vec::new();
        let err = chain.run(&mut trace, &resolver).unwrap_err();

        assert_eq!(trace, vec!["a"]);
        assert!(matches!(err, PapersheetError::Construction { .. }));
        assert!(err.to_string().contains("post-construct hook 'b'"));
    }

    #[test]
    fn test_destroy_chain_continues_after_failure() {
        let trace = Arc::new(Mutex::new(Vec::new()));

        let mut chain: DestroyChain<Arc<Mutex<Vec<&'static str>>>> = DestroyChain::new();
        chain.push("first", |t| {
            t.lock().unwrap().push("first");
            anyhow::bail!("first failed")
        });
        chain.push("second", |t| {
            t.lock().unwrap().push("second");
            Ok(())
        });

        let failures = chain.run(&trace);

        assert_eq!(failures, 1);
        assert_eq!(*trace.lock().unwrap(), vec!["first", "second"]);
    }
}
