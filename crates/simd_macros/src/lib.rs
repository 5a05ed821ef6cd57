// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

mod target;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{FnArg, GenericParam, ItemFn, LitStr, Pat, Token};

struct Levels {
    levels: Punctuated<LitStr, Token![,]>,
}

impl syn::parse::Parse for Levels {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        Ok(Levels {
            levels: Punctuated::parse_terminated(input)?,
        })
    }
}

fn lookup(level: &LitStr) -> syn::Result<&'static target::TargetCpu> {
    let value = level.value();
    let name = value.split(':').next().unwrap_or_default();
    target::TARGET_CPUS
        .iter()
        .find(|target_cpu| target_cpu.target_cpu == name)
        .ok_or_else(|| syn::Error::new(level.span(), format!("unknown target_cpu `{name}`")))
}

fn check_signature(item_fn: &ItemFn) -> syn::Result<Vec<syn::Ident>> {
    let sig = &item_fn.sig;
    if let Some(constness) = sig.constness {
        return Err(syn::Error::new_spanned(constness, "const functions are not supported"));
    }
    if let Some(asyncness) = sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "async functions are not supported"));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(syn::Error::new_spanned(variadic, "variadic parameters are not supported"));
    }
    for param in sig.generics.params.iter() {
        if !matches!(param, GenericParam::Lifetime(_)) {
            return Err(syn::Error::new_spanned(param, "generic parameters are not supported"));
        }
    }
    let mut arguments = Vec::new();
    for input in sig.inputs.iter() {
        match input {
            FnArg::Typed(typed) => match &*typed.pat {
                Pat::Ident(ident) => arguments.push(ident.ident.clone()),
                pat => {
                    return Err(syn::Error::new_spanned(pat, "patterns on parameters are not supported"));
                }
            },
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(receiver, "receiver parameters are not supported"));
            }
        }
    }
    Ok(arguments)
}

fn expand_multiversion(levels: Levels, item_fn: ItemFn) -> syn::Result<TokenStream> {
    let arguments = check_signature(&item_fn)?;
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = item_fn;
    let name = sig.ident.to_string();
    let generics_params = &sig.generics.params;
    let generics_where = &sig.generics.where_clause;
    let inputs = &sig.inputs;
    let output = &sig.output;
    let mut versions = quote! {};
    let mut branches = quote! {};
    for level in levels.levels.iter() {
        let target_cpu = lookup(level)?;
        let value = level.value();
        let extra_features = value.split(':').skip(1).collect::<Vec<_>>();
        let ident = syn::Ident::new(
            &format!("{name}_{}", value.replace([':', '.'], "_")),
            Span::mixed_site(),
        );
        let target_arch = target_cpu.target_arch;
        let target_cpu = target_cpu.target_cpu;
        versions.extend(quote! {
            #[inline]
            #[cfg(target_arch = #target_arch)]
            #[crate::target_cpu(enable = #target_cpu)]
            #(#[target_feature(enable = #extra_features)])*
            fn #ident < #generics_params > (#inputs) #output #generics_where #block
        });
        branches.extend(quote! {
            #[cfg(target_arch = #target_arch)]
            if crate::is_cpu_detected!(#target_cpu) #(&& crate::is_feature_detected!(#extra_features))* {
                let selected: unsafe fn(#inputs) #output = #ident;
                CACHE.store(selected as *mut (), core::sync::atomic::Ordering::Relaxed);
                return unsafe { selected(#(#arguments,)*) };
            }
        });
    }
    Ok(quote! {
        #versions
        fn fallback < #generics_params > (#inputs) #output #generics_where #block
        #[inline(always)]
        #(#attrs)* #vis #sig {
            static CACHE: core::sync::atomic::AtomicPtr<()> = core::sync::atomic::AtomicPtr::new(core::ptr::null_mut());
            let cache = CACHE.load(core::sync::atomic::Ordering::Relaxed);
            if !cache.is_null() {
                let f = unsafe { core::mem::transmute::<*mut (), unsafe fn(#inputs) #output>(cache as _) };
                return unsafe { f(#(#arguments,)*) };
            }
            #branches
            let selected: unsafe fn(#inputs) #output = fallback;
            CACHE.store(selected as *mut (), core::sync::atomic::Ordering::Relaxed);
            unsafe { selected(#(#arguments,)*) }
        }
    })
}

/// Compiles the function once per listed CPU level plus a portable fallback,
/// and dispatches to the best detected level on first call.
///
/// A level may carry extra target features, as in `"v2:fma"`.
#[proc_macro_attribute]
pub fn multiversion(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let levels = syn::parse_macro_input!(attr as Levels);
    let item_fn = syn::parse_macro_input!(item as ItemFn);
    expand_multiversion(levels, item_fn)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct TargetCpuAttr {
    enable: LitStr,
}

impl syn::parse::Parse for TargetCpuAttr {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let key: syn::Ident = input.parse()?;
        if key != "enable" {
            return Err(syn::Error::new(key.span(), "expected `enable`"));
        }
        let _: Token![=] = input.parse()?;
        Ok(Self {
            enable: input.parse()?,
        })
    }
}

#[proc_macro_attribute]
pub fn target_cpu(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = syn::parse_macro_input!(attr as TargetCpuAttr);
    let mut result = quote! {};
    for name in attr.enable.value().split(',') {
        let Some(target_cpu) = target::TARGET_CPUS
            .iter()
            .find(|target_cpu| target_cpu.target_cpu == name)
        else {
            return syn::Error::new(attr.enable.span(), format!("unknown target_cpu `{name}`"))
                .into_compile_error()
                .into();
        };
        let target_features = target_cpu.target_features;
        result.extend(quote!(
            #(#[target_feature(enable = #target_features)])*
        ));
    }
    result.extend(TokenStream::from(item));
    result.into()
}

#[proc_macro]
pub fn define_is_cpu_detected(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let target_arch = syn::parse_macro_input!(input as LitStr).value();
    let arms = target::TARGET_CPUS
        .iter()
        .filter(|target_cpu| target_cpu.target_arch == target_arch)
        .map(|target_cpu| {
            let name = target_cpu.target_cpu;
            let ident = syn::Ident::new(
                &format!("is_{}_detected", name.replace('.', "_")),
                Span::mixed_site(),
            );
            quote! { (#name) => { $crate::internal::#ident() }; }
        });
    let ident = syn::Ident::new(
        &format!("is_{target_arch}_cpu_detected"),
        Span::mixed_site(),
    );
    quote! {
        #[macro_export]
        macro_rules! #ident {
            #(#arms)*
        }
    }
    .into()
}
