//! Property metadata handed to converters.

use trellis_core::{FieldType, TypeInfo};

/// One bindable property, as seen at the point of conversion.
///
/// For collection elements and map entries the declared type is the
/// element (or key, or value) type and the path carries the index or key.
#[derive(Debug, Clone, PartialEq)]
pub struct BeanProperty {
    name: String,
    path: String,
    declared: FieldType,
    leaf_type: TypeInfo,
    root_type: TypeInfo,
}

impl BeanProperty {
    /// Describes property `name` of a `leaf_type` bean.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        declared: FieldType,
        leaf_type: TypeInfo,
        root_type: TypeInfo,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            declared,
            leaf_type,
            root_type,
        }
    }

    /// The same property narrowed to one element, key or value.
    #[must_use]
    pub fn narrow(&self, path: impl Into<String>, declared: FieldType) -> Self {
        Self {
            name: self.name.clone(),
            path: path.into(),
            declared,
            leaf_type: self.leaf_type,
            root_type: self.root_type,
        }
    }

    /// Simple property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path from the binding root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared type, including element, key and value types.
    #[must_use]
    pub fn declared(&self) -> &FieldType {
        &self.declared
    }

    /// Type of the bean owning the property.
    #[must_use]
    pub fn leaf_type(&self) -> TypeInfo {
        self.leaf_type
    }

    /// Type of the bean binding started from.
    #[must_use]
    pub fn root_type(&self) -> TypeInfo {
        self.root_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{CollectionKind, Element};

    struct Form;

    #[test]
    fn test_narrow_keeps_owner() {
        let declared = FieldType::collection(
            TypeInfo::of::<Vec<u16>>(),
            CollectionKind::List,
            Some(u16::element_type()),
        );
        let property = BeanProperty::new(
            "ports",
            "server.ports",
            declared,
            TypeInfo::of::<Form>(),
            TypeInfo::of::<Form>(),
        );
        let element = property.narrow("server.ports[2]", u16::element_type());

        assert_eq!(element.name(), "ports");
        assert_eq!(element.path(), "server.ports[2]");
        assert!(element.declared().is_scalar());
        assert_eq!(element.leaf_type(), property.leaf_type());
        assert!(property.declared().element().is_some());
    }
}
