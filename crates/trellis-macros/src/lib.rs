//! Derive macros for Trellis beans.
//!
//! Binding and validation reach bean properties by name through the
//! `Bean` trait of `trellis-core`. Writing those accessors by hand is
//! mechanical, so this crate derives them.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_macros::{Bean, ParamEnum};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, ParamEnum)]
//! enum Role {
//!     #[param(rename = "ADMIN")]
//!     Admin,
//!     #[param(rename = "USER")]
//!     User,
//! }
//!
//! #[derive(Debug, Default, Bean)]
//! struct Account {
//!     #[bean(flatten)]
//!     entity: Entity,
//!     #[bean(rename = "login")]
//!     username: String,
//!     roles: Vec<Role>,
//!     #[bean(skip)]
//!     cached_hash: Option<String>,
//! }
//! ```
//!
//! # Attributes
//!
//! | Attribute | On | Effect |
//! |-----------|----|--------|
//! | `#[bean(rename = "x")]` | field | property is called `x` |
//! | `#[bean(skip)]` | field | not a property |
//! | `#[bean(flatten)]` | field | the nested bean's properties become this bean's |
//! | `#[bean(no_default)]` | struct | no no-argument constructor; nested nulls cannot be instantiated |
//! | `#[bean(crate = "path")]` | struct | path of `trellis-core` in generated code |
//! | `#[param(rename = "x")]` | variant | parameter name of the variant |

mod bean;
mod param_enum;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Bean`, `BeanType`, `Element` and `Field` for a struct.
///
/// Unless `#[bean(no_default)]` is given the struct must implement
/// `Default`, which serves as its no-argument constructor.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    bean::expand_bean(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `Scalar`, `ParamEnum`, `Element` and `Field` for a fieldless enum.
///
/// The enum must implement `Debug`. Variants bind from their names, or from
/// the name given by `#[param(rename = "...")]`.
#[proc_macro_derive(ParamEnum, attributes(param))]
pub fn derive_param_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    param_enum::expand_param_enum(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
