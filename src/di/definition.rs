use crate::di::{Injectable, Resolver};
use crate::error::{PapersheetError, Result};
use crate::lifecycle::hooks::{DestroyChain, InitChain};
use crate::lifecycle::{OnDestroy, OnInit};
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

/// A constructed instance as stored by the registry.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

type Constructor<T> = Box<dyn Fn(&Resolver<'_>) -> anyhow::Result<T> + Send + Sync>;
type ApplyFn<T> = Box<dyn Fn(&mut T, Option<String>) -> Result<()> + Send + Sync>;

/// Instantiation scope of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    /// One instance per registry, built once and torn down at shutdown.
    #[default]
    Singleton,
    /// A fresh instance per request.
    ///
    /// The registry forgets prototype instances as soon as they are handed
    /// out, so pre-destroy hooks never run for them. Anything a prototype
    /// acquires in a post-construct hook must be released by its owner (for
    /// example in `Drop`).
    Prototype,
}

/// Identity of a managed object: its Rust type.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    type_id: TypeId,
    type_name: &'static str,
}

impl Identity {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

struct PropertyBinding<T> {
    key: String,
    apply: ApplyFn<T>,
}

/// Recipe for a managed object of type `T`
///
/// A definition bundles the construction function, the scope, the property
/// bindings and the two hook chains. Construction always runs in this order:
///
/// ```text
/// constructor -> property bindings (declared order) -> post-construct hooks (declared order)
/// ```
///
/// # Example
/// ```
/// use papersheet::di::{ObjectDefinition, Registry};
///
/// #[derive(Default)]
/// struct Greeter {
///     greeting: String,
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .register(
///         ObjectDefinition::new(|_| Ok(Greeter::default()))
///             .property_or("greeting", "Hello".to_string(), |g: &mut Greeter, v| g.greeting = v)
///             .post_construct("validate", |g, _| {
///                 papersheet::anyhow::ensure!(!g.greeting.is_empty(), "empty greeting");
///                 Ok(())
///             }),
///     )
///     .unwrap();
///
/// assert_eq!(registry.get::<Greeter>().unwrap().greeting, "Hello");
/// ```
pub struct ObjectDefinition<T> {
    constructor: Constructor<T>,
    scope: Scope,
    properties: Vec<PropertyBinding<T>>,
    post_construct: InitChain<T>,
    pre_destroy: DestroyChain<T>,
    profiles: Vec<String>,
    lazy: bool,
}

impl<T: Send + Sync + 'static> ObjectDefinition<T> {
    /// Create a singleton definition from a construction function.
    ///
    /// The function receives a [`Resolver`] for constructor-level
    /// dependencies.
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
            scope: Scope::Singleton,
            properties: Vec::new(),
            post_construct: InitChain::new(),
            pre_destroy: DestroyChain::new(),
            profiles: Vec::new(),
            lazy: false,
        }
    }

    /// Create a definition that constructs `T` through [`Injectable::inject`].
    pub fn injectable() -> Self
    where
        T: Injectable,
    {
        Self::new(T::inject)
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn prototype(self) -> Self {
        self.scope(Scope::Prototype)
    }

    /// Exclude this singleton from the eager [`Registry::refresh`](crate::di::Registry::refresh)
    /// pass. It is built on first request instead.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Only register this definition when the profile expression matches.
    ///
    /// May be called several times; any matching expression activates the
    /// definition. `!name` matches when `name` is not active.
    pub fn profile(mut self, expression: impl Into<String>) -> Self {
        self.profiles.push(expression.into());
        self
    }

    /// Bind a required property.
    ///
    /// The raw value is parsed with [`FromStr`]. Construction fails with
    /// [`PapersheetError::MissingProperty`] when the configuration source has
    /// no value for `key`.
    pub fn property<V, F>(mut self, key: impl Into<String>, setter: F) -> Self
    where
        V: FromStr + 'static,
        V::Err: fmt::Display,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let key = key.into();
        let binding_key = key.clone();
        let apply = move |instance: &mut T, raw: Option<String>| -> Result<()> {
            let raw = raw.ok_or_else(|| PapersheetError::MissingProperty {
                type_name: type_name::<T>().to_string(),
                key: binding_key.clone(),
            })?;
            setter(instance, parse_property::<T, V>(&binding_key, raw)?);
            Ok(())
        };
        self.properties.push(PropertyBinding {
            key,
            apply: Box::new(apply),
        });
        self
    }

    /// Bind an optional property, falling back to `default` when absent.
    pub fn property_or<V, F>(mut self, key: impl Into<String>, default: V, setter: F) -> Self
    where
        V: FromStr + Clone + Send + Sync + 'static,
        V::Err: fmt::Display,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let key = key.into();
        let binding_key = key.clone();
        let apply = move |instance: &mut T, raw: Option<String>| -> Result<()> {
            let value = match raw {
                Some(raw) => parse_property::<T, V>(&binding_key, raw)?,
                None => default.clone(),
            };
            setter(instance, value);
            Ok(())
        };
        self.properties.push(PropertyBinding {
            key,
            apply: Box::new(apply),
        });
        self
    }

    /// Append a post-construct hook.
    ///
    /// Hooks run after every property binding has been applied. Resolving the
    /// object under construction from inside a hook fails with
    /// [`PapersheetError::CircularDependency`].
    pub fn post_construct<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T, &Resolver<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_construct.push(name, hook);
        self
    }

    /// Append a pre-destroy hook.
    ///
    /// Runs at registry shutdown for singletons only; see [`Scope::Prototype`].
    pub fn pre_destroy<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_destroy.push(name, hook);
        self
    }

    /// Append [`OnInit::on_init`] to the post-construct chain.
    pub fn on_init(self) -> Self
    where
        T: OnInit,
    {
        self.post_construct("on_init", |instance, _| instance.on_init())
    }

    /// Append [`OnDestroy::on_destroy`] to the pre-destroy chain.
    pub fn on_destroy(self) -> Self
    where
        T: OnDestroy,
    {
        self.pre_destroy("on_destroy", |instance| instance.on_destroy())
    }
}

fn parse_property<T, V>(key: &str, raw: String) -> Result<V>
where
    V: FromStr,
    V::Err: fmt::Display,
{
    raw.parse::<V>()
        .map_err(|e| PapersheetError::InvalidProperty {
            type_name: type_name::<T>().to_string(),
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        })
}

/// Type-erased view of an [`ObjectDefinition`] held by the registry.
pub(crate) trait Definition: Send + Sync {
    fn identity(&self) -> Identity;
    fn scope(&self) -> Scope;
    fn profiles(&self) -> &[String];
    fn is_lazy(&self) -> bool;
    fn build(&self, resolver: &Resolver<'_>) -> Result<Instance>;
    /// Run the pre-destroy chain. Returns the number of failed hooks.
    fn destroy(&self, instance: &Instance) -> usize;
}

impl<T: Send + Sync + 'static> Definition for ObjectDefinition<T> {
    fn identity(&self) -> Identity {
        Identity::of::<T>()
    }

    fn scope(&self) -> Scope {
        self.scope
    }

    fn profiles(&self) -> &[String] {
        &self.profiles
    }

    fn is_lazy(&self) -> bool {
        self.lazy
    }

    fn build(&self, resolver: &Resolver<'_>) -> Result<Instance> {
        let type_name = type_name::<T>();
        tracing::debug!("Constructing {} ({})", type_name, self.scope);

        let mut instance = (self.constructor)(resolver)
            .map_err(|e| PapersheetError::construction(type_name, "constructor", e))?;

        for binding in &self.properties {
            tracing::trace!("Injecting property '{}' into {}", binding.key, type_name);
            (binding.apply)(&mut instance, resolver.property(&binding.key))?;
        }

        self.post_construct.run(&mut instance, resolver)?;

        tracing::debug!(
            "Constructed {} ({} properties, {} post-construct hooks)",
            type_name,
            self.properties.len(),
            self.post_construct.len()
        );
        Ok(Arc::new(instance))
    }

    fn destroy(&self, instance: &Instance) -> usize {
        match (**instance).downcast_ref::<T>() {
            Some(instance) => self.pre_destroy.run(instance),
            None => {
                tracing::error!(
                    "Skipping teardown: instance is not a {}",
                    type_name::<T>()
                );
                self.pre_destroy.len()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_strings() {
        assert_eq!(Scope::Singleton.to_string(), "singleton");
        assert_eq!(Scope::Prototype.as_ref(), "prototype");
        assert_eq!("prototype".parse::<Scope>().unwrap(), Scope::Prototype);
        assert!("request".parse::<Scope>().is_err());
        assert_eq!(Scope::default(), Scope::Singleton);
    }

    #[test]
    fn test_identity_equality_by_type() {
        assert_eq!(Identity::of::<String>(), Identity::of::<String>());
        assert_ne!(Identity::of::<String>(), Identity::of::<u32>());
        assert_eq!(Identity::of::<u32>().to_string(), "u32");
    }

    #[test]
    fn test_definition_defaults() {
        let definition = ObjectDefinition::new(|_| Ok(1u8));
        assert_eq!(Definition::scope(&definition), Scope::Singleton);
        assert!(!definition.is_lazy());
        assert!(definition.profiles().is_empty());

        let definition = ObjectDefinition::new(|_| Ok(1u8))
            .prototype()
            .lazy()
            .profile("dev")
            .profile("!prod");
        assert_eq!(Definition::scope(&definition), Scope::Prototype);
        assert!(definition.is_lazy());
        assert_eq!(definition.profiles(), &["dev".to_string(), "!prod".to_string()]);
    }
}
