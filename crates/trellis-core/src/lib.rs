//! # Trellis Core
//!
//! The data model shared by the Trellis binder and validator.
//!
//! - [`Bean`] / [`BeanType`] - named property access, usually derived
//! - [`Field`] / [`Element`] - typed property slots and container elements
//! - [`TypeInfo`] / [`FieldType`] - declared-type metadata
//! - [`Scalar`] / [`ParamEnum`] - leaf values
//! - [`PropertyError`] / [`Errors`] - per-path binding and validation failures
//! - [`MessageSource`] - localized messages for those failures

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bean;
mod error;
mod field;
pub mod message;
mod scalar;
mod types;

pub use bean::{
    identity, shared, Bean, BeanId, BeanHandle, BeanMut, BeanRef, BeanType, Shared, SharedBean,
};
pub use error::{Attributes, Errors, PropertyError, INVALID};
pub use field::{
    downcast, CollectionSink, Element, Field, FieldError, FieldRef, MapSink, RawList,
};
pub use message::{MapMessageSource, MessageSource};
pub use scalar::{ParamEnum, Scalar};
pub use types::{
    simple_type_name, CollectionKind, Converted, FieldType, NameParser, ScalarKind, Shape,
    TypeInfo,
};

/// Joins a parent path and a property name: `("a", "b")` → `a.b`, `("", "b")` → `b`.
#[must_use]
pub fn join_path(parent: &str, property: &str) -> String {
    if parent.is_empty() {
        property.to_string()
    } else {
        format!("{parent}.{property}")
    }
}

/// Appends an index to a path: `("tags", 2)` → `tags[2]`.
#[must_use]
pub fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}
