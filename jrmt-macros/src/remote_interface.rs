//! `#[remote_interface]` implementation
//!
//! The attributed trait is emitted unchanged apart from the `#[rpc]` helper
//! attributes. Next to it the macro generates `<Trait>Proxy<'a>`, a struct
//! wrapping `jrmt_client::RemoteProxy<'a>` with one async method per trait
//! method, and a `jrmt_client::RemoteInterface` impl listing their
//! signatures.
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! #[remote_interface]
//! pub trait Calculator {
//!     fn add(&self, a: i64, b: i64) -> i64;
//!     #[rpc(name = "system.log")]
//!     fn log(&self, line: String);
//! }
//! ```
//!
//! Generated output (abridged):
//! ```ignore
//! pub struct CalculatorProxy<'a> {
//!     proxy: ::jrmt_client::RemoteProxy<'a>,
//! }
//!
//! impl<'a> CalculatorProxy<'a> {
//!     pub async fn add(&self, a: i64, b: i64) -> ::jrmt_core::Result<i64> {
//!         let args = vec![::jrmt_client::to_param(&a)?, ::jrmt_client::to_param(&b)?];
//!         let result = self.proxy.invoke(&Self::METHODS[0], args).await?;
//!         ::jrmt_client::from_result(result)
//!     }
//!     // log(...) goes through METHODS[1], a notification
//! }
//!
//! impl<'a> ::jrmt_client::RemoteInterface for CalculatorProxy<'a> {
//!     const NAME: &'static str = "Calculator";
//!     const METHODS: &'static [::jrmt_client::MethodSignature] = &[
//!         ::jrmt_client::MethodSignature::value("add", 2),
//!         ::jrmt_client::MethodSignature::unit("system.log", 1),
//!     ];
//! }
//! ```

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    Attribute, FnArg, Ident, ItemTrait, LitStr, Pat, ReturnType, TraitItem, TraitItemFn, Type,
};

struct RemoteMethod {
    ident: Ident,
    wire_name: String,
    docs: Vec<Attribute>,
    args: Vec<(Ident, Type)>,
    output: Option<Type>,
}

pub fn remote_interface_impl(mut item: ItemTrait) -> syn::Result<TokenStream> {
    let mut methods = Vec::new();
    for trait_item in item.items.iter_mut() {
        match trait_item {
            TraitItem::Fn(method) => methods.push(parse_method(method)?),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "remote_interface traits may only contain methods",
                ))
            }
        }
    }

    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "remote_interface traits cannot be generic",
        ));
    }

    let vis = &item.vis;
    let trait_ident = &item.ident;
    let trait_name = trait_ident.to_string();
    let proxy_ident = format_ident!("{}Proxy", trait_ident);
    let proxy_doc = format!(
        "Remote proxy for [`{}`], generated by `#[remote_interface]`",
        trait_name
    );

    let signatures = methods.iter().map(|method| {
        let name = &method.wire_name;
        let arity = method.args.len();
        if method.output.is_some() {
            quote! { ::jrmt_client::MethodSignature::value(#name, #arity) }
        } else {
            quote! { ::jrmt_client::MethodSignature::unit(#name, #arity) }
        }
    });

    let stubs = methods.iter().enumerate().map(|(index, method)| {
        let ident = &method.ident;
        let docs = &method.docs;
        let params = method.args.iter().map(|(name, ty)| quote! { #name: #ty });
        let converted = method
            .args
            .iter()
            .map(|(name, _)| quote! { ::jrmt_client::to_param(&#name)? });
        let invoke = quote! {
            let args = ::std::vec![#(#converted),*];
            let signature = &<Self as ::jrmt_client::RemoteInterface>::METHODS[#index];
            let result = self.proxy.invoke(signature, args).await?;
        };

        match &method.output {
            Some(output) => quote! {
                #(#docs)*
                pub async fn #ident(&self, #(#params),*) -> ::jrmt_core::Result<#output> {
                    #invoke
                    ::jrmt_client::from_result(result)
                }
            },
            None => quote! {
                #(#docs)*
                pub async fn #ident(&self, #(#params),*) -> ::jrmt_core::Result<()> {
                    #invoke
                    let _ = result;
                    Ok(())
                }
            },
        }
    });

    Ok(quote! {
        #item

        #[doc = #proxy_doc]
        #[derive(Debug, Clone, Copy)]
        #vis struct #proxy_ident<'a> {
            proxy: ::jrmt_client::RemoteProxy<'a>,
        }

        impl<'a> #proxy_ident<'a> {
            /// Proxy sending through `session`
            pub fn new(session: &'a ::jrmt_client::RpcSession) -> Self {
                Self {
                    proxy: ::jrmt_client::RemoteProxy::new(session),
                }
            }

            /// Session invocations are sent through
            pub fn session(&self) -> &'a ::jrmt_client::RpcSession {
                self.proxy.session()
            }

            #(#stubs)*
        }

        impl<'a> ::jrmt_client::RemoteInterface for #proxy_ident<'a> {
            const NAME: &'static str = #trait_name;
            const METHODS: &'static [::jrmt_client::MethodSignature] = &[#(#signatures),*];
        }
    })
}

fn parse_method(method: &mut TraitItemFn) -> syn::Result<RemoteMethod> {
    let sig = &method.sig;
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "remote methods cannot be generic",
        ));
    }

    let mut args = Vec::new();
    for (position, input) in sig.inputs.iter().enumerate() {
        if let FnArg::Typed(pat_type) = input {
            let name = match pat_type.pat.as_ref() {
                Pat::Ident(pat) => pat.ident.clone(),
                _ => Ident::new(&format!("arg{}", position), Span::call_site()),
            };
            args.push((name, (*pat_type.ty).clone()));
        }
    }

    let output = match &sig.output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) if is_unit(ty) => None,
        ReturnType::Type(_, ty) => Some((**ty).clone()),
    };

    let ident = sig.ident.clone();
    let wire_name = take_rpc_name(&mut method.attrs)?.unwrap_or_else(|| ident.to_string());
    let docs = method
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .cloned()
        .collect();

    Ok(RemoteMethod {
        ident,
        wire_name,
        docs,
        args,
        output,
    })
}

/// Remove `#[rpc(...)]` from `attrs`, returning its `name` if given
fn take_rpc_name(attrs: &mut Vec<Attribute>) -> syn::Result<Option<String>> {
    let mut name = None;
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if !attr.path().is_ident("rpc") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("rpc name cannot be empty"));
                }
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported rpc attribute, expected `name`"))
            }
        })?;
    }
    *attrs = kept;
    Ok(name)
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}
