//! Attribute parsing for the derive macros.

use syn::spanned::Spanned;
use syn::{Attribute, DeriveInput, Field, Ident, LitStr, Path, Type, Variant};

/// Container attributes: `#[bean(no_default, crate = "...")]`.
#[derive(Debug)]
pub struct ContainerAttrs {
    /// Path of the core crate in generated code.
    pub krate: Path,
    /// The type has no no-argument constructor.
    pub no_default: bool,
}

impl ContainerAttrs {
    pub fn parse(input: &DeriveInput, attr_name: &str) -> syn::Result<Self> {
        let mut krate = None;
        let mut no_default = false;

        for attr in attrs_named(&input.attrs, attr_name) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let value: LitStr = meta.value()?.parse()?;
                    krate = Some(value.parse::<Path>()?);
                    Ok(())
                } else if meta.path.is_ident("no_default") && attr_name == "bean" {
                    no_default = true;
                    Ok(())
                } else {
                    Err(meta.error(format!(
                        "unknown attribute: {}",
                        path_name(&meta.path)
                    )))
                }
            })?;
        }

        Ok(Self {
            krate: krate.unwrap_or_else(|| syn::parse_quote!(::trellis_core)),
            no_default,
        })
    }
}

/// One struct field after `#[bean(...)]` processing.
#[derive(Debug)]
pub struct BeanField {
    /// Rust field name.
    pub ident: Ident,
    /// Field type.
    pub ty: Type,
    /// Property name exposed to binding and validation.
    pub name: String,
    /// Properties come from the nested bean instead.
    pub flatten: bool,
}

impl BeanField {
    /// Returns `None` for `#[bean(skip)]` fields.
    pub fn parse(field: &Field) -> syn::Result<Option<Self>> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;

        let mut name = None;
        let mut skip = false;
        let mut flatten = false;

        for attr in attrs_named(&field.attrs, "bean") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                } else if meta.path.is_ident("flatten") {
                    flatten = true;
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown attribute: {}",
                        path_name(&meta.path)
                    )));
                }
                Ok(())
            })?;
        }

        if skip {
            return Ok(None);
        }
        if flatten && name.is_some() {
            return Err(syn::Error::new(
                field.span(),
                "`flatten` and `rename` cannot be combined",
            ));
        }

        Ok(Some(Self {
            name: name.unwrap_or_else(|| unraw(&ident)),
            ident,
            ty: field.ty.clone(),
            flatten,
        }))
    }
}

/// One enum variant after `#[param(...)]` processing.
#[derive(Debug)]
pub struct EnumVariant {
    /// Variant identifier.
    pub ident: Ident,
    /// Parameter name.
    pub name: String,
}

impl EnumVariant {
    pub fn parse(variant: &Variant) -> syn::Result<Self> {
        if !variant.fields.is_empty() {
            return Err(syn::Error::new(
                variant.span(),
                "ParamEnum variants cannot have fields",
            ));
        }

        let mut name = None;
        for attr in attrs_named(&variant.attrs, "param") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error(format!(
                        "unknown attribute: {}",
                        path_name(&meta.path)
                    )))
                }
            })?;
        }

        Ok(Self {
            name: name.unwrap_or_else(|| unraw(&variant.ident)),
            ident: variant.ident.clone(),
        })
    }
}

fn attrs_named<'a>(attrs: &'a [Attribute], name: &'a str) -> impl Iterator<Item = &'a Attribute> {
    attrs.iter().filter(move |attr| attr.path().is_ident(name))
}

fn path_name(path: &Path) -> String {
    path.get_ident()
        .map_or_else(|| "(path)".to_string(), ToString::to_string)
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, ItemStruct};

    fn fields(item: &ItemStruct) -> Vec<Option<BeanField>> {
        item.fields
            .iter()
            .map(|f| BeanField::parse(f).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_bean_fields() {
        let item: ItemStruct = parse_quote! {
            struct Person {
                name: String,
                #[bean(rename = "years")]
                age: i32,
                #[bean(skip)]
                cache: Vec<u8>,
                #[bean(flatten)]
                base: Entity,
                r#type: String,
            }
        };
        let fields = fields(&item);
        assert_eq!(fields[0].as_ref().unwrap().name, "name");
        assert_eq!(fields[1].as_ref().unwrap().name, "years");
        assert!(fields[2].is_none());
        assert!(fields[3].as_ref().unwrap().flatten);
        assert_eq!(fields[4].as_ref().unwrap().name, "type");
    }

    #[test]
    fn test_flatten_with_rename_rejected() {
        let item: ItemStruct = parse_quote! {
            struct Person {
                #[bean(flatten, rename = "x")]
                base: Entity,
            }
        };
        assert!(BeanField::parse(item.fields.iter().next().unwrap()).is_err());
    }

    #[test]
    fn test_unknown_field_attribute_rejected() {
        let item: ItemStruct = parse_quote! {
            struct Person {
                #[bean(default)]
                name: String,
            }
        };
        let err = BeanField::parse(item.fields.iter().next().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown attribute: default"));
    }

    #[test]
    fn test_container_attrs() {
        let input: DeriveInput = parse_quote! {
            #[bean(no_default, crate = "crate::core")]
            struct Person;
        };
        let attrs = ContainerAttrs::parse(&input, "bean").unwrap();
        assert!(attrs.no_default);
        let krate = &attrs.krate;
        assert_eq!(quote::quote!(#krate).to_string().replace(' ', ""), "crate::core");

        let input: DeriveInput = parse_quote! { struct Person; };
        let attrs = ContainerAttrs::parse(&input, "bean").unwrap();
        assert!(!attrs.no_default);
    }

    #[test]
    fn test_enum_variant_rename() {
        let variant: Variant = parse_quote! {
            #[param(rename = "dark-blue")]
            DarkBlue
        };
        assert_eq!(EnumVariant::parse(&variant).unwrap().name, "dark-blue");

        let variant: Variant = parse_quote! { Red };
        assert_eq!(EnumVariant::parse(&variant).unwrap().name, "Red");

        let variant: Variant = parse_quote! { Rgb(u8, u8, u8) };
        assert!(EnumVariant::parse(&variant).is_err());
    }
}
