//! `#[derive(ParamEnum)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput};

use crate::parse::{ContainerAttrs, EnumVariant};

/// Expands `#[derive(ParamEnum)]` on a fieldless enum.
pub fn expand_param_enum(input: DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ContainerAttrs::parse(&input, "param")?;
    let krate = &attrs.krate;
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic enums are not supported",
        ));
    }

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "ParamEnum can only be derived for enums",
        ));
    };

    let variants = data
        .variants
        .iter()
        .map(EnumVariant::parse)
        .collect::<syn::Result<Vec<_>>>()?;

    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "ParamEnum needs at least one variant",
        ));
    }

    let idents = variants.iter().map(|v| &v.ident).collect::<Vec<_>>();
    let names = variants.iter().map(|v| &v.name).collect::<Vec<_>>();

    Ok(quote! {
        impl #krate::Scalar for #name {
            fn type_info(&self) -> #krate::TypeInfo {
                <Self as #krate::ParamEnum>::enum_type_info()
            }

            fn to_text(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(<Self as #krate::ParamEnum>::name(self))
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl #krate::ParamEnum for #name {
            fn variants() -> &'static [Self] {
                &[#(Self::#idents),*]
            }

            fn name(&self) -> &'static str {
                match self {
                    #(Self::#idents => #names,)*
                }
            }

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#names => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #krate::Element for #name {
            fn element_type() -> #krate::FieldType {
                #krate::FieldType::scalar(<Self as #krate::ParamEnum>::enum_type_info())
            }

            fn view(&self) -> #krate::FieldRef<'_> {
                #krate::FieldRef::Scalar(self)
            }

            fn from_converted(
                value: #krate::Converted,
            ) -> ::core::result::Result<Self, #krate::FieldError> {
                #krate::downcast::<Self>(value)
            }
        }

        #krate::element_field!(#name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expand_param_enum() {
        let input: DeriveInput = parse_quote! {
            enum Color {
                Red,
                #[param(rename = "GREEN")]
                Green,
            }
        };
        let expanded = expand_param_enum(input).unwrap().to_string();
        assert!(expanded.contains("\"Red\""));
        assert!(expanded.contains("\"GREEN\""));
        assert!(!expanded.contains("\"Green\""));
    }

    #[test]
    fn test_struct_rejected() {
        let input: DeriveInput = parse_quote! { struct Color; };
        assert!(expand_param_enum(input).is_err());
    }

    #[test]
    fn test_empty_enum_rejected() {
        let input: DeriveInput = parse_quote! { enum Never {} };
        assert!(expand_param_enum(input).is_err());
    }

    #[test]
    fn test_data_variant_rejected() {
        let input: DeriveInput = parse_quote! { enum Shape { Circle(f64) } };
        assert!(expand_param_enum(input).is_err());
    }
}
