//! Lifecycle hook traits
//!
//! Implementing a trait does nothing on its own. A definition opts in with
//! [`ObjectDefinition::on_init`](crate::di::ObjectDefinition::on_init) or
//! [`ObjectDefinition::on_destroy`](crate::di::ObjectDefinition::on_destroy),
//! which append the trait method to the ordered hook chain at that position.

/// Called after the instance is constructed and its properties are injected
///
/// Use this hook to:
/// - Validate injected properties
/// - Open connections or warm caches
///
/// # Example
///
/// ```rust,ignore
/// use papersheet::lifecycle::OnInit;
///
/// impl OnInit for DatabaseService {
///     fn on_init(&mut self) -> anyhow::Result<()> {
///         self.pool = Some(Pool::connect(&self.url)?);
///         Ok(())
///     }
/// }
/// ```
pub trait OnInit: Send + Sync {
    fn on_init(&mut self) -> anyhow::Result<()>;
}

/// Called when the owning registry shuts down
///
/// Only singletons are torn down. Prototype instances are never tracked after
/// handoff, so this hook does not run for them.
///
/// # Note
///
/// Singletons are destroyed in **reverse order** of their construction so a
/// dependency always outlives its dependents.
pub trait OnDestroy: Send + Sync {
    fn on_destroy(&self) -> anyhow::Result<()>;
}
