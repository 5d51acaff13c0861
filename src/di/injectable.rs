use crate::di::Resolver;

/// Trait for types that can construct themselves from the registry
///
/// This trait is typically implemented automatically via the `#[derive(Injectable)]` macro,
/// which resolves every `Arc<T>` field from the registry and fills the remaining
/// fields with `Default::default()`. Register such a type with
/// [`ObjectDefinition::injectable`](crate::di::ObjectDefinition::injectable).
///
/// # Example
/// ```ignore
/// use papersheet::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct UserService {
///     // Resolved from the registry
///     repository: Arc<UserRepository>,
///     // Default::default(), usually set by a property binding
///     page_size: usize,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies through the resolver
    ///
    /// # Errors
    /// Returns an error if any required dependency cannot be resolved.
    fn inject(resolver: &Resolver<'_>) -> anyhow::Result<Self>;
}
