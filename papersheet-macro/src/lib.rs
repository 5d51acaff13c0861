use proc_macro::TokenStream;

mod injectable;

/// Derive macro for constructing a struct from the registry
///
/// Every `Arc<T>` field is resolved with `Resolver::get::<T>()`. Any other
/// field starts as `Default::default()` and is typically filled by a property
/// binding or a post-construct hook afterwards.
///
/// # Example
/// ```ignore
/// use papersheet::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct UserService {
///     repository: Arc<UserRepository>,
///     page_size: usize,
/// }
///
/// let definition = ObjectDefinition::<UserService>::injectable()
///     .property("users.page-size", |s: &mut UserService, v: usize| s.page_size = v);
/// ```
#[proc_macro_derive(Injectable)]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
