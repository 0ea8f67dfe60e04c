//! Derive macro for autowire
//!
//! `#[derive(Component)]` writes a `Component` declaration from a struct's
//! fields, so the container can build it without a hand-written
//! `describe`.
//!
//! # Example
//!
//! ```rust,ignore
//! use autowire::{Component, Container, Provider, Qualifier};
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicU64;
//!
//! struct Primary;
//! impl Qualifier for Primary {}
//!
//! #[derive(Component)]
//! #[component(singleton, implements(dyn Service))]
//! struct UserService {
//!     db: Arc<Database>,
//!     #[inject(named = "greeting")]
//!     greeting: Arc<String>,
//!     #[inject(qualifier = Primary)]
//!     cache: Arc<dyn Cache>,
//!     audit: Provider<AuditLog>,
//!     #[inject(skip)]
//!     request_count: AtomicU64,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parse;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Path, Token, Type};

/// Derive `autowire::Component`.
///
/// # Field rules
///
/// - `Arc<T>` - resolved as a dependency on `T`
/// - `Provider<T>` - deferred; a provider for `T` is injected
/// - `#[inject(named = "name")]` - `Arc<T>` taken from the named table
/// - `#[inject(qualifier = Path)]` - `Arc<T>` taken from the qualifier table
/// - `#[inject(skip)]` - not injected, set with `Default::default()`
///
/// Any other field type needs `#[inject(skip)]`.
///
/// # Struct attributes
///
/// - `#[component(singleton)]` - cache the first resolved instance
/// - `#[component(implements(dyn A, dyn B))]` - generate `Implements` impls
///   and record the upcasts in the declaration
///
/// A struct with no injected fields gets a zero-parameter constructor;
/// otherwise an injectable constructor taking the fields in order.
#[proc_macro_derive(Component, attributes(component, inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return expand_unit(input),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Component can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Component can only be derived for structs",
            ));
        }
    };

    let options = ComponentAttr::parse(&input.attrs)?;

    let mut field_inits = Vec::new();
    let mut params = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let field_type = &field.ty;

        let attr = InjectAttr::parse(&field.attrs)?;
        if attr.skip {
            field_inits.push(quote! {
                #field_name: ::std::default::Default::default()
            });
            continue;
        }

        if let Some(inner) = extract_inner_type(field_type, "Arc") {
            let mut param = quote! { ::autowire::Parameter::of::<#inner>() };
            if let Some(named) = &attr.named {
                param = quote! { #param.named(#named) };
            }
            if let Some(qualifier) = &attr.qualifier {
                param = quote! { #param.qualified::<#qualifier>() };
            }
            params.push(param);
            field_inits.push(quote! {
                #field_name: args.next::<#inner>()?
            });
        } else if let Some(inner) = extract_inner_type(field_type, "Provider") {
            if attr.named.is_some() || attr.qualifier.is_some() {
                return Err(syn::Error::new_spanned(
                    field_type,
                    "named and qualifier bindings require an Arc<T> field",
                ));
            }
            params.push(quote! { ::autowire::Parameter::provider::<#inner>() });
            field_inits.push(quote! {
                #field_name: args.provider::<#inner>()?
            });
        } else {
            return Err(syn::Error::new_spanned(
                field_type,
                "injected fields must have type Arc<T> or Provider<T>; use #[inject(skip)] for others",
            ));
        }
    }

    let inject = if params.is_empty() {
        quote! {}
    } else {
        quote! { .inject() }
    };
    let args_ident = if params.is_empty() {
        quote! { _args }
    } else {
        quote! { args }
    };
    let describe_head = options.describe_head();
    let upcasts = options.upcast_impls(input);

    Ok(quote! {
        impl #impl_generics ::autowire::Component for #name #ty_generics #where_clause {
            fn describe(info: ::autowire::Describe<Self>) -> ::autowire::Describe<Self> {
                info #describe_head
                    .constructor(
                        ::autowire::Constructor::new(|#args_ident: &mut ::autowire::Args| {
                            ::std::result::Result::Ok(Self {
                                #(#field_inits),*
                            })
                        })
                        #inject
                        #(.param(#params))*
                    )
            }
        }

        #upcasts
    })
}

fn expand_unit(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let options = ComponentAttr::parse(&input.attrs)?;
    let describe_head = options.describe_head();
    let upcasts = options.upcast_impls(input);

    Ok(quote! {
        impl #impl_generics ::autowire::Component for #name #ty_generics #where_clause {
            fn describe(info: ::autowire::Describe<Self>) -> ::autowire::Describe<Self> {
                info #describe_head
                    .constructor(::autowire::Constructor::new(|_: &mut ::autowire::Args| {
                        ::std::result::Result::Ok(Self)
                    }))
            }
        }

        #upcasts
    })
}

/// Parsed `#[component(...)]`
#[derive(Default)]
struct ComponentAttr {
    singleton: bool,
    implements: Vec<Type>,
}

impl ComponentAttr {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs {
            if !attr.path().is_ident("component") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("singleton") {
                    parsed.singleton = true;
                    Ok(())
                } else if meta.path.is_ident("implements") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let contracts = content.parse_terminated(Type::parse, Token![,])?;
                    parsed.implements.extend(contracts);
                    Ok(())
                } else {
                    Err(meta.error("expected `singleton` or `implements(...)`"))
                }
            })?;
        }
        Ok(parsed)
    }

    /// Builder calls before the constructor.
    fn describe_head(&self) -> TokenStream2 {
        let singleton = if self.singleton {
            quote! { .singleton() }
        } else {
            quote! {}
        };
        let contracts = &self.implements;
        quote! {
            #singleton
            #(.implements::<#contracts>())*
        }
    }

    fn upcast_impls(&self, input: &DeriveInput) -> TokenStream2 {
        let name = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
        let contracts = &self.implements;
        quote! {
            #(
                impl #impl_generics ::autowire::Implements<#contracts> for #name #ty_generics #where_clause {
                    #[inline]
                    fn upcast(self: ::autowire::Arc<Self>) -> ::autowire::Arc<#contracts> {
                        self
                    }
                }
            )*
        }
    }
}

/// Parsed `#[inject(...)]`
#[derive(Default)]
struct InjectAttr {
    named: Option<LitStr>,
    qualifier: Option<Path>,
    skip: bool,
}

impl InjectAttr {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs {
            if !attr.path().is_ident("inject") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("named") {
                    parsed.named = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("qualifier") {
                    parsed.qualifier = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `named = \"...\"`, `qualifier = Path` or `skip`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

/// Extract `T` from `Wrapper<T>`, matching on the last path segment.
fn extract_inner_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == wrapper {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}
