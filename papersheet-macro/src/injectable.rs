use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let body = match &data.fields {
        Fields::Named(fields) => {
            // Arc<T> fields are resolved, everything else starts from Default
            let field_injections = fields
                .named
                .iter()
                .map(|field| {
                    let field_name = &field.ident;
                    match extract_arc_inner(&field.ty) {
                        Some(inner) if is_unsized(inner) => Err(syn::Error::new_spanned(
                            &field.ty,
                            "#[derive(Injectable)] can only resolve `Arc<T>` for a concrete, \
                             sized `T`; register the implementing type and depend on it instead",
                        )),
                        Some(inner) => Ok(quote! {
                            #field_name: resolver.get::<#inner>()?
                        }),
                        None => Ok(quote! {
                            #field_name: ::core::default::Default::default()
                        }),
                    }
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! {
                Self {
                    #(#field_injections),*
                }
            }
        }
        Fields::Unit => quote!(Self),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "#[derive(Injectable)] only supports structs with named fields",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::papersheet::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                resolver: &::papersheet::Resolver<'_>
            ) -> ::papersheet::anyhow::Result<Self> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}

/// Extract `T` from `Arc<T>` (or `std::sync::Arc<T>`)
fn extract_arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Trait objects, slices and `str` have no registry identity of their own.
fn is_unsized(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(_) | Type::Slice(_) | Type::ImplTrait(_) => true,
        Type::Paren(inner) => is_unsized(&inner.elem),
        Type::Group(inner) => is_unsized(&inner.elem),
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("str"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_arc_fields_resolved() {
        let input: DeriveInput = parse_quote! {
            struct Controller {
                service: std::sync::Arc<Service>,
                visits: u64,
            }
        };

        let tokens = generate_injectable_impl(&input).unwrap().to_string();
        assert!(tokens.contains("resolver . get :: < Service >"), "{tokens}");
        assert!(tokens.contains("Default :: default"), "{tokens}");
    }

    #[test]
    fn test_arc_dyn_trait_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Controller {
                service: Arc<dyn Service>,
            }
        };

        let err = generate_injectable_impl(&input).unwrap_err();
        assert!(err.to_string().contains("concrete, sized"), "{err}");
    }

    #[test]
    fn test_arc_str_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Named {
                name: Arc<str>,
            }
        };

        assert!(generate_injectable_impl(&input).is_err());
    }

    #[test]
    fn test_tuple_struct_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper(Arc<Service>);
        };

        assert!(generate_injectable_impl(&input).is_err());
    }
}
