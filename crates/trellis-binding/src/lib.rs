//! # Trellis Binding
//!
//! Writes a [`Params`](trellis_params::Params) tree onto a bean.
//!
//! The [`Binder`] walks the properties a bean declares, converts the
//! matching parameter text through registered converters and collects
//! every failure as a [`PropertyError`](trellis_core::PropertyError) keyed
//! by property path. Binding never aborts: a bad `age` leaves `age`
//! untouched and the rest of the bean is still populated.
//!
//! ```rust,ignore
//! use trellis_binding::Binder;
//! use trellis_macros::Bean;
//! use trellis_params::Params;
//!
//! #[derive(Debug, Default, Bean)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! let binder = Binder::new();
//! let mut person = Person::default();
//! let errors = binder.bind(&mut person, &Params::parse("name=Ada&age=abc")?);
//!
//! assert_eq!(person.name, "Ada");
//! assert_eq!(errors.get("age")[0].invalid_value(), Some("abc"));
//! ```
//!
//! Converters come in two flavours, value-only and contextual (they also
//! see the [`BeanProperty`]). Both can be registered for an exact type or,
//! through [`Binder::register_kind`], for a scalar family such as enums.

#![doc(html_root_url = "https://docs.rs/trellis-binding/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod context;
pub mod converter;
mod error;
mod property;

pub use binder::Binder;
pub use context::BindingContext;
pub use converter::{ContextualFn, ConversionResult, Converter, FormatFn, ValueFn};
pub use error::ConversionError;
pub use property::BeanProperty;
