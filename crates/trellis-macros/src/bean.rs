//! `#[derive(Bean)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::parse::{BeanField, ContainerAttrs};

/// Expands `#[derive(Bean)]` on a struct with named fields.
///
/// Generates `Bean`, `BeanType`, `Element` and `Field`, so the struct can be
/// bound, validated and nested inside other beans and containers.
pub fn expand_bean(input: DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::parse(&input, "bean")?;
    let krate = &attrs.krate;
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic beans are not supported",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .map(BeanField::parse)
                .collect::<syn::Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Bean can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bean can only be derived for structs",
            ))
        }
    };

    let (direct, flattened): (Vec<_>, Vec<_>) = fields.iter().partition(|f| !f.flatten);

    let names = direct.iter().map(|f| &f.name);
    let flattened_types = flattened.iter().map(|f| &f.ty);
    let properties = if flattened.is_empty() {
        quote! { ::std::vec![#(#names),*] }
    } else {
        quote! {
            let mut names: ::std::vec::Vec<&'static str> = ::std::vec![#(#names),*];
            #(names.extend(<#flattened_types as #krate::BeanType>::properties());)*
            names
        }
    };

    let read_arms = direct.iter().map(|f| {
        let (prop, ident) = (&f.name, &f.ident);
        quote! { #prop => ::core::option::Option::Some(&self.#ident as &dyn #krate::Field), }
    });
    let write_arms = direct.iter().map(|f| {
        let (prop, ident) = (&f.name, &f.ident);
        quote! { #prop => ::core::option::Option::Some(&mut self.#ident as &mut dyn #krate::Field), }
    });
    let read_fallback = flattened.iter().map(|f| {
        let (ident, ty) = (&f.ident, &f.ty);
        quote! {
            if <#ty as #krate::BeanType>::properties().contains(&name) {
                return <#ty as #krate::Bean>::field(&self.#ident, name);
            }
        }
    });
    let write_fallback = flattened.iter().map(|f| {
        let (ident, ty) = (&f.ident, &f.ty);
        quote! {
            if <#ty as #krate::BeanType>::properties().contains(&name) {
                return <#ty as #krate::Bean>::field_mut(&mut self.#ident, name);
            }
        }
    });

    let new_instance = if attrs.no_default {
        quote! { ::core::option::Option::None }
    } else {
        quote! { ::core::option::Option::Some(<Self as ::core::default::Default>::default()) }
    };

    Ok(quote! {
        impl #krate::Bean for #name {
            fn bean_type(&self) -> #krate::TypeInfo {
                #krate::TypeInfo::of::<Self>()
            }

            fn property_names(&self) -> ::std::vec::Vec<&'static str> {
                <Self as #krate::BeanType>::properties()
            }

            fn field(&self, name: &str) -> ::core::option::Option<&dyn #krate::Field> {
                match name {
                    #(#read_arms)*
                    _ => {
                        #(#read_fallback)*
                        ::core::option::Option::None
                    }
                }
            }

            fn field_mut(&mut self, name: &str) -> ::core::option::Option<&mut dyn #krate::Field> {
                match name {
                    #(#write_arms)*
                    _ => {
                        #(#write_fallback)*
                        ::core::option::Option::None
                    }
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl #krate::BeanType for #name {
            fn properties() -> ::std::vec::Vec<&'static str> {
                #properties
            }

            fn new_instance() -> ::core::option::Option<Self> {
                #new_instance
            }
        }

        impl #krate::Element for #name {
            fn element_type() -> #krate::FieldType {
                #krate::FieldType::bean(#krate::TypeInfo::of::<Self>())
            }

            fn view(&self) -> #krate::FieldRef<'_> {
                #krate::FieldRef::Bean(#krate::BeanHandle::Borrowed(self))
            }

            fn from_converted(
                value: #krate::Converted,
            ) -> ::core::result::Result<Self, #krate::FieldError> {
                #krate::downcast::<Self>(value)
            }

            fn instantiate() -> ::core::option::Option<Self> {
                <Self as #krate::BeanType>::new_instance()
            }

            fn bean_mut(&mut self) -> ::core::result::Result<#krate::BeanMut<'_>, #krate::FieldError> {
                ::core::result::Result::Ok(#krate::BeanMut::Borrowed(self))
            }
        }

        #krate::element_field!(#name);
    })
}
