//! Declared-type metadata for bean properties.
//!
//! [`TypeInfo`] identifies a concrete Rust type and is the key of the
//! converter and formatter registries. [`FieldType`] adds what a property
//! declaration says about the value: whether it may be null and whether it
//! is a scalar, a nested bean, a collection or a map, including the element,
//! key and value types.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A type-erased value produced by a converter.
pub type Converted = Box<dyn Any + Send + Sync>;

/// Constructs an enum value from its parameter name.
pub type NameParser = fn(&str) -> Option<Converted>;

/// Broad family of a scalar type.
///
/// Converters and formatters can be registered for a whole family instead of
/// a single type; the built-in enum converter is registered for
/// [`ScalarKind::Enum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed and unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `String`
    Text,
    /// Fieldless enums deriving `ParamEnum`
    Enum,
    /// Anything else (beans, collections, user types)
    Other,
}

/// Identity, name and family of a concrete type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: ScalarKind,
    parse_name: Option<NameParser>,
}

impl TypeInfo {
    /// Describes `T` with no scalar family.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self::scalar::<T>(ScalarKind::Other)
    }

    /// Describes `T` as a member of a scalar family.
    #[must_use]
    pub fn scalar<T: Any>(kind: ScalarKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind,
            parse_name: None,
        }
    }

    /// Describes an enum that can be constructed from its variant names.
    #[must_use]
    pub fn enumeration<T: Any>(parse_name: NameParser) -> Self {
        Self {
            parse_name: Some(parse_name),
            ..Self::scalar::<T>(ScalarKind::Enum)
        }
    }

    /// Returns the `TypeId`.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without module paths, e.g. `Vec<String>`.
    #[must_use]
    pub fn simple_name(&self) -> String {
        simple_type_name(self.name)
    }

    /// Returns the scalar family.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Returns true if this describes `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Builds an enum value from a variant name, for enum types.
    #[must_use]
    pub fn parse_name(&self, name: &str) -> Option<Converted> {
        self.parse_name.and_then(|parse| parse(name))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.simple_name())
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Strips module paths from every path inside a type name.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
#[must_use]
pub fn simple_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut path_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(path_start);
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' | '*' => {
                out.push(c);
                path_start = out.len();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Container kind of a collection property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Ordered list (`Vec`)
    List,
    /// Hash set
    Set,
    /// Sorted set
    SortedSet,
    /// A collection type the binder cannot populate (`VecDeque`, `LinkedList`)
    Unsupported,
}

/// What a property holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A single convertible value
    Scalar,
    /// A nested bean
    Bean,
    /// A collection; `element` is `None` for raw, untyped collections
    Collection {
        /// Container kind
        kind: CollectionKind,
        /// Declared element type
        element: Option<Box<FieldType>>,
    },
    /// A map with declared key and value types
    Map {
        /// Declared key type
        key: Box<FieldType>,
        /// Declared value type
        value: Box<FieldType>,
    },
}

/// Declared type of a bean property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    /// The declared type, unwrapped from `Option`
    pub ty: TypeInfo,
    /// Whether the property may hold null (`Option<_>`)
    pub nullable: bool,
    /// Scalar, bean, collection or map
    pub shape: Shape,
}

impl FieldType {
    /// A non-null scalar of type `ty`.
    #[must_use]
    pub fn scalar(ty: TypeInfo) -> Self {
        Self {
            ty,
            nullable: false,
            shape: Shape::Scalar,
        }
    }

    /// A non-null nested bean of type `ty`.
    #[must_use]
    pub fn bean(ty: TypeInfo) -> Self {
        Self {
            ty,
            nullable: false,
            shape: Shape::Bean,
        }
    }

    /// A collection of `element`s, or a raw collection when `element` is `None`.
    #[must_use]
    pub fn collection(ty: TypeInfo, kind: CollectionKind, element: Option<FieldType>) -> Self {
        Self {
            ty,
            nullable: false,
            shape: Shape::Collection {
                kind,
                element: element.map(Box::new),
            },
        }
    }

    /// A map from `key` to `value`.
    #[must_use]
    pub fn map(ty: TypeInfo, key: FieldType, value: FieldType) -> Self {
        Self {
            ty,
            nullable: false,
            shape: Shape::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
        }
    }

    /// Marks the type as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns true for nested beans.
    #[must_use]
    pub fn is_bean(&self) -> bool {
        matches!(self.shape, Shape::Bean)
    }

    /// Returns true for scalars.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self.shape, Shape::Scalar)
    }

    /// Returns the declared element type of a typed collection.
    #[must_use]
    pub fn element(&self) -> Option<&FieldType> {
        match &self.shape {
            Shape::Collection {
                element: Some(element),
                ..
            } => Some(element),
            _ => None,
        }
    }

    /// Returns the simple name used in message keys.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.ty.simple_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("alloc::string::String"), "String");
        assert_eq!(simple_type_name("i32"), "i32");
        assert_eq!(
            simple_type_name("alloc::vec::Vec<alloc::string::String>"),
            "Vec<String>"
        );
        assert_eq!(
            simple_type_name("std::collections::hash::map::HashMap<alloc::string::String, app::model::Address>"),
            "HashMap<String, Address>"
        );
        assert_eq!(simple_type_name("&[core::primitive::u8]"), "&[u8]");
    }

    #[test]
    fn test_type_info_identity() {
        let a = TypeInfo::of::<String>();
        let b = TypeInfo::scalar::<String>(ScalarKind::Text);
        assert_eq!(a, b);
        assert!(a.is::<String>());
        assert!(!a.is::<i32>());
        assert_eq!(b.kind(), ScalarKind::Text);
        assert_eq!(b.simple_name(), "String");
        assert_eq!(b.to_string(), "String");
    }

    #[test]
    fn test_enumeration_parse_name() {
        fn parse(name: &str) -> Option<Converted> {
            (name == "ON").then(|| Box::new(true) as Converted)
        }
        let info = TypeInfo::enumeration::<bool>(parse);
        assert_eq!(info.kind(), ScalarKind::Enum);
        assert!(info.parse_name("ON").is_some());
        assert!(info.parse_name("OFF").is_none());
        assert!(TypeInfo::of::<bool>().parse_name("ON").is_none());
    }

    #[test]
    fn test_field_type_shapes() {
        let element = FieldType::scalar(TypeInfo::scalar::<i32>(ScalarKind::Integer));
        let list = FieldType::collection(
            TypeInfo::of::<Vec<i32>>(),
            CollectionKind::List,
            Some(element.clone()),
        );
        assert_eq!(list.element(), Some(&element));
        assert!(!list.is_scalar());
        assert_eq!(list.type_name(), "Vec<i32>");

        let raw = FieldType::collection(TypeInfo::of::<Vec<()>>(), CollectionKind::List, None);
        assert!(raw.element().is_none());

        assert!(element.clone().nullable().nullable);
        assert!(FieldType::bean(TypeInfo::of::<()>()).is_bean());
    }
}
