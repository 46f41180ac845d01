//! Typed property slots.
//!
//! [`Field`] is the object-safe view of one bean property: the binder writes
//! through it and the validator reads through it. [`Element`] is the static
//! counterpart implemented by everything that can sit inside a property,
//! alone or in a container, and drives the generic implementations for
//! `Option`, `Box`, [`Shared`], collections and maps.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

use crate::bean::{shared, Bean, BeanHandle, BeanMut, BeanType, Shared, SharedBean};
use crate::scalar::Scalar;
use crate::types::{simple_type_name, CollectionKind, Converted, FieldType, ScalarKind, TypeInfo};

/// Failure to read or write a property slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A converter produced a value of the wrong type.
    #[error("expected a value of type {expected}")]
    TypeMismatch {
        /// Simple name of the declared type
        expected: String,
    },

    /// Null was assigned to a non-nullable property.
    #[error("null is not allowed for {type_name}")]
    NullNotAllowed {
        /// Simple name of the declared type
        type_name: String,
    },

    /// The declared type has no no-argument constructor.
    #[error("{type_name} cannot be instantiated")]
    NotInstantiable {
        /// Simple name of the declared type
        type_name: String,
    },

    /// Bean access was requested on a non-bean property.
    #[error("{type_name} is not a bean")]
    NotABean {
        /// Simple name of the declared type
        type_name: String,
    },

    /// A [`Shared`] node is locked by someone else.
    #[error("{type_name} is locked elsewhere")]
    Locked {
        /// Simple name of the locked bean type
        type_name: String,
    },
}

impl FieldError {
    /// A converter output that is not a `T`.
    pub fn type_mismatch<T: ?Sized>() -> Self {
        Self::TypeMismatch {
            expected: short_name::<T>(),
        }
    }

    /// Null assigned to a non-nullable `T`.
    pub fn null_not_allowed<T: ?Sized>() -> Self {
        Self::NullNotAllowed {
            type_name: short_name::<T>(),
        }
    }

    /// `T` has no no-argument constructor.
    pub fn not_instantiable<T: ?Sized>() -> Self {
        Self::NotInstantiable {
            type_name: short_name::<T>(),
        }
    }

    /// `T` is not a bean.
    pub fn not_a_bean<T: ?Sized>() -> Self {
        Self::NotABean {
            type_name: short_name::<T>(),
        }
    }

    /// A shared `T` is locked.
    pub fn locked<T: ?Sized>() -> Self {
        Self::Locked {
            type_name: short_name::<T>(),
        }
    }
}

fn short_name<T: ?Sized>() -> String {
    simple_type_name(std::any::type_name::<T>())
}

/// Takes a converter output apart as a `T`.
pub fn downcast<T: Any>(value: Converted) -> Result<T, FieldError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| FieldError::type_mismatch::<T>())
}

/// Read-only view of a property value.
#[derive(Clone)]
pub enum FieldRef<'a> {
    /// Null (`None`)
    Null,
    /// A scalar value
    Scalar(&'a dyn Scalar),
    /// A nested bean
    Bean(BeanHandle<'a>),
    /// Collection elements in iteration order
    Collection(Vec<FieldRef<'a>>),
    /// Map entries in iteration order
    Map(Vec<(FieldRef<'a>, FieldRef<'a>)>),
    /// A value that cannot be inspected (raw collection elements)
    Opaque,
}

impl<'a> FieldRef<'a> {
    /// Returns true for null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the scalar, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&'a dyn Scalar> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is a text scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Length of text (in characters), collections and maps.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Scalar(value) => value.as_str().map(|s| s.chars().count()),
            Self::Collection(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Returns true if [`len`](Self::len) is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Text form for error reports; `None` for null.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Scalar(value) => Some(value.to_text()),
            Self::Bean(handle) => Some(handle.read().bean_type().simple_name()),
            Self::Collection(items) => Some(format!(
                "[{}]",
                items
                    .iter()
                    .map(|item| item.to_text().unwrap_or_else(|| "null".to_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::Map(entries) => Some(format!(
                "{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            k.to_text().unwrap_or_default(),
                            v.to_text().unwrap_or_else(|| "null".to_string())
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::Opaque => Some("?".to_string()),
        }
    }
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "FieldRef({text})"),
            None => f.write_str("FieldRef(null)"),
        }
    }
}

/// Anything that can be the value of a property or a container element.
pub trait Element: Sized + Send + Sync + 'static {
    /// Declared type of the element.
    fn element_type() -> FieldType;

    /// Read-only view of the value.
    fn view(&self) -> FieldRef<'_>;

    /// Builds the element from a converter output.
    fn from_converted(value: Converted) -> Result<Self, FieldError>;

    /// The no-argument constructor, for beans.
    fn instantiate() -> Option<Self> {
        None
    }

    /// Mutable bean access, for beans.
    fn bean_mut(&mut self) -> Result<BeanMut<'_>, FieldError> {
        Err(FieldError::not_a_bean::<Self>())
    }
}

/// One bean property, type-erased.
pub trait Field: Send + Sync {
    /// Declared type of the property.
    fn field_type(&self) -> FieldType;

    /// Read-only view of the current value.
    fn view(&self) -> FieldRef<'_>;

    /// Replaces the value with a converter output; `None` assigns null.
    fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError>;

    /// Mutable access to a nested bean.
    ///
    /// A null property is filled through the bean's no-argument constructor
    /// when `instantiate` is set, and reported as `Ok(None)` otherwise.
    fn bean_mut(&mut self, instantiate: bool) -> Result<Option<BeanMut<'_>>, FieldError> {
        let _ = instantiate;
        Ok(None)
    }

    /// Element-wise access to a collection the binder can populate.
    fn collection_mut(&mut self) -> Option<&mut dyn CollectionSink> {
        None
    }

    /// Entry-wise access to a map.
    fn map_mut(&mut self) -> Option<&mut dyn MapSink> {
        None
    }
}

/// Writes collection elements one at a time.
pub trait CollectionSink {
    /// Removes every element.
    fn clear(&mut self);

    /// Adds a converted element.
    fn push_converted(&mut self, value: Option<Converted>) -> Result<(), FieldError>;

    /// Instantiates a bean element, lets `bind` populate it, then adds it.
    fn push_bean(&mut self, bind: &mut dyn FnMut(&mut dyn Bean)) -> Result<(), FieldError>;
}

/// Writes map entries one at a time.
pub trait MapSink {
    /// Removes every entry.
    fn clear(&mut self);

    /// Inserts a converted key and value.
    fn insert_converted(&mut self, key: Converted, value: Option<Converted>) -> Result<(), FieldError>;

    /// Instantiates a bean value, lets `bind` populate it, then inserts it.
    fn insert_bean(
        &mut self,
        key: Converted,
        bind: &mut dyn FnMut(&mut dyn Bean),
    ) -> Result<(), FieldError>;
}

/// Implements [`Field`] for a type that implements [`Element`].
///
/// Used for the built-in scalars; the derive macros emit the equivalent for
/// beans and enums.
#[macro_export]
macro_rules! element_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Field for $ty {
            fn field_type(&self) -> $crate::FieldType {
                <$ty as $crate::Element>::element_type()
            }

            fn view(&self) -> $crate::FieldRef<'_> {
                $crate::Element::view(self)
            }

            fn assign(
                &mut self,
                value: ::core::option::Option<$crate::Converted>,
            ) -> ::core::result::Result<(), $crate::FieldError> {
                match value {
                    ::core::option::Option::Some(value) => {
                        *self = <$ty as $crate::Element>::from_converted(value)?;
                        ::core::result::Result::Ok(())
                    }
                    ::core::option::Option::None => {
                        ::core::result::Result::Err($crate::FieldError::null_not_allowed::<$ty>())
                    }
                }
            }

            fn bean_mut(
                &mut self,
                _instantiate: bool,
            ) -> ::core::result::Result<::core::option::Option<$crate::BeanMut<'_>>, $crate::FieldError> {
                if <$ty as $crate::Element>::element_type().is_bean() {
                    $crate::Element::bean_mut(self).map(::core::option::Option::Some)
                } else {
                    ::core::result::Result::Ok(::core::option::Option::None)
                }
            }
        }
    )+};
}

macro_rules! scalar_element {
    ($kind:ident => $($ty:ty),+) => {$(
        impl Element for $ty {
            fn element_type() -> FieldType {
                FieldType::scalar(TypeInfo::scalar::<$ty>(ScalarKind::$kind))
            }

            fn view(&self) -> FieldRef<'_> {
                FieldRef::Scalar(self)
            }

            fn from_converted(value: Converted) -> Result<Self, FieldError> {
                downcast::<$ty>(value)
            }
        }

        crate::element_field!($ty);
    )+};
}

scalar_element!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
scalar_element!(Float => f32, f64);
scalar_element!(Boolean => bool);
scalar_element!(Char => char);
scalar_element!(Text => String);

impl<T: Element> Element for Box<T> {
    fn element_type() -> FieldType {
        T::element_type()
    }

    fn view(&self) -> FieldRef<'_> {
        (**self).view()
    }

    fn from_converted(value: Converted) -> Result<Self, FieldError> {
        match value.downcast::<Self>() {
            Ok(boxed) => Ok(*boxed),
            Err(value) => T::from_converted(value).map(Box::new),
        }
    }

    fn instantiate() -> Option<Self> {
        T::instantiate().map(Box::new)
    }

    fn bean_mut(&mut self) -> Result<BeanMut<'_>, FieldError> {
        (**self).bean_mut()
    }
}

impl<B: BeanType> Element for Arc<RwLock<B>> {
    fn element_type() -> FieldType {
        FieldType::bean(TypeInfo::of::<B>())
    }

    fn view(&self) -> FieldRef<'_> {
        FieldRef::Bean(BeanHandle::Shared(&**self))
    }

    fn from_converted(value: Converted) -> Result<Self, FieldError> {
        match value.downcast::<Self>() {
            Ok(node) => Ok(*node),
            Err(value) => downcast::<B>(value).map(shared),
        }
    }

    fn instantiate() -> Option<Self> {
        B::new_instance().map(shared)
    }

    fn bean_mut(&mut self) -> Result<BeanMut<'_>, FieldError> {
        (**self)
            .try_write_bean()
            .ok_or_else(FieldError::locked::<B>)
    }
}

impl<B: BeanType> Field for Shared<B> {
    fn field_type(&self) -> FieldType {
        <Self as Element>::element_type()
    }

    fn view(&self) -> FieldRef<'_> {
        Element::view(self)
    }

    fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
        let value = value.ok_or_else(FieldError::null_not_allowed::<B>)?;
        *self = <Self as Element>::from_converted(value)?;
        Ok(())
    }

    fn bean_mut(&mut self, _instantiate: bool) -> Result<Option<BeanMut<'_>>, FieldError> {
        Element::bean_mut(self).map(Some)
    }
}

impl<T: Element> Field for Box<T> {
    fn field_type(&self) -> FieldType {
        T::element_type()
    }

    fn view(&self) -> FieldRef<'_> {
        Element::view(self)
    }

    fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
        let value = value.ok_or_else(FieldError::null_not_allowed::<T>)?;
        *self = <Self as Element>::from_converted(value)?;
        Ok(())
    }

    fn bean_mut(&mut self, _instantiate: bool) -> Result<Option<BeanMut<'_>>, FieldError> {
        if T::element_type().is_bean() {
            Element::bean_mut(self).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Element> Field for Option<T> {
    fn field_type(&self) -> FieldType {
        T::element_type().nullable()
    }

    fn view(&self) -> FieldRef<'_> {
        self.as_ref().map_or(FieldRef::Null, Element::view)
    }

    fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
        *self = value.map(T::from_converted).transpose()?;
        Ok(())
    }

    fn bean_mut(&mut self, instantiate: bool) -> Result<Option<BeanMut<'_>>, FieldError> {
        if !T::element_type().is_bean() {
            return Ok(None);
        }
        if self.is_none() {
            if !instantiate {
                return Ok(None);
            }
            *self = Some(T::instantiate().ok_or_else(FieldError::not_instantiable::<T>)?);
        }
        match self {
            Some(value) => value.bean_mut().map(Some),
            None => Ok(None),
        }
    }
}

fn collection_type<C: Any, T: Element>(kind: CollectionKind) -> FieldType {
    FieldType::collection(TypeInfo::of::<C>(), kind, Some(T::element_type()))
}

fn build_bean<T: Element>(bind: &mut dyn FnMut(&mut dyn Bean)) -> Result<T, FieldError> {
    let mut value = T::instantiate().ok_or_else(FieldError::not_instantiable::<T>)?;
    {
        let mut bean = value.bean_mut()?;
        bind(&mut *bean);
    }
    Ok(value)
}

macro_rules! collection_field {
    ($coll:ident<T: $($bound:path),*>, $kind:expr, $add:ident) => {
        impl<T: Element $(+ $bound)*> Field for $coll<T> {
            fn field_type(&self) -> FieldType {
                collection_type::<Self, T>($kind)
            }

            fn view(&self) -> FieldRef<'_> {
                FieldRef::Collection(self.iter().map(Element::view).collect())
            }

            fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
                let value = value.ok_or_else(FieldError::null_not_allowed::<Self>)?;
                *self = downcast::<Self>(value)?;
                Ok(())
            }

            fn collection_mut(&mut self) -> Option<&mut dyn CollectionSink> {
                Some(self)
            }
        }

        impl<T: Element $(+ $bound)*> CollectionSink for $coll<T> {
            fn clear(&mut self) {
                $coll::clear(self);
            }

            fn push_converted(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
                let value = value.ok_or_else(FieldError::null_not_allowed::<T>)?;
                self.$add(T::from_converted(value)?);
                Ok(())
            }

            fn push_bean(&mut self, bind: &mut dyn FnMut(&mut dyn Bean)) -> Result<(), FieldError> {
                let value = build_bean::<T>(bind)?;
                self.$add(value);
                Ok(())
            }
        }
    };
}

collection_field!(Vec<T: >, CollectionKind::List, push);
collection_field!(HashSet<T: Eq, Hash>, CollectionKind::Set, insert);
collection_field!(BTreeSet<T: Ord>, CollectionKind::SortedSet, insert);

macro_rules! unsupported_collection_field {
    ($($coll:ident),+) => {$(
        impl<T: Element> Field for $coll<T> {
            fn field_type(&self) -> FieldType {
                collection_type::<Self, T>(CollectionKind::Unsupported)
            }

            fn view(&self) -> FieldRef<'_> {
                FieldRef::Collection(self.iter().map(Element::view).collect())
            }

            fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
                let value = value.ok_or_else(FieldError::null_not_allowed::<Self>)?;
                *self = downcast::<Self>(value)?;
                Ok(())
            }
        }
    )+};
}

unsupported_collection_field!(VecDeque, LinkedList);

/// A collection without a declared element type.
///
/// The binder cannot populate it and reports every submitted element as an
/// error; validation sees its elements as opaque values.
#[derive(Debug, Default)]
pub struct RawList(pub Vec<Box<dyn Any + Send + Sync>>);

impl Field for RawList {
    fn field_type(&self) -> FieldType {
        FieldType::collection(TypeInfo::of::<Self>(), CollectionKind::List, None)
    }

    fn view(&self) -> FieldRef<'_> {
        FieldRef::Collection(self.0.iter().map(|_| FieldRef::Opaque).collect())
    }

    fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
        let value = value.ok_or_else(FieldError::null_not_allowed::<Self>)?;
        *self = downcast::<Self>(value)?;
        Ok(())
    }
}

macro_rules! map_field {
    ($map:ident<K: $($bound:path),+>) => {
        impl<K: Element $(+ $bound)+, V: Element> Field for $map<K, V> {
            fn field_type(&self) -> FieldType {
                FieldType::map(TypeInfo::of::<Self>(), K::element_type(), V::element_type())
            }

            fn view(&self) -> FieldRef<'_> {
                FieldRef::Map(self.iter().map(|(k, v)| (k.view(), v.view())).collect())
            }

            fn assign(&mut self, value: Option<Converted>) -> Result<(), FieldError> {
                let value = value.ok_or_else(FieldError::null_not_allowed::<Self>)?;
                *self = downcast::<Self>(value)?;
                Ok(())
            }

            fn map_mut(&mut self) -> Option<&mut dyn MapSink> {
                Some(self)
            }
        }

        impl<K: Element $(+ $bound)+, V: Element> MapSink for $map<K, V> {
            fn clear(&mut self) {
                $map::clear(self);
            }

            fn insert_converted(&mut self, key: Converted, value: Option<Converted>) -> Result<(), FieldError> {
                let key = K::from_converted(key)?;
                let value = value.ok_or_else(FieldError::null_not_allowed::<V>)?;
                self.insert(key, V::from_converted(value)?);
                Ok(())
            }

            fn insert_bean(
                &mut self,
                key: Converted,
                bind: &mut dyn FnMut(&mut dyn Bean),
            ) -> Result<(), FieldError> {
                let key = K::from_converted(key)?;
                let value = build_bean::<V>(bind)?;
                self.insert(key, value);
                Ok(())
            }
        }
    };
}

map_field!(HashMap<K: Eq, Hash>);
map_field!(BTreeMap<K: Ord>);
map_field!(IndexMap<K: Eq, Hash>);
