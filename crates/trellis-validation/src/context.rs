//! The validation cursor.

use std::cell::RefCell;
use std::collections::HashSet;

use trellis_core::{
    join_path, Bean, BeanHandle, BeanId, Errors, FieldRef, FieldType, PropertyError, TypeInfo,
};

use crate::error::ValidationResult;
use crate::validator::Validator;

/// Where validation currently is.
///
/// Like the binding cursor it is never mutated: [`update`](Self::update)
/// returns the cursor for the next level down. All cursors of one
/// `validate` call share the set of bean identities already visited.
#[derive(Debug, Clone)]
pub struct ValidationContext<'v> {
    validator: &'v Validator,
    root_type: TypeInfo,
    leaf_type: TypeInfo,
    path: String,
    visited: &'v RefCell<HashSet<BeanId>>,
}

impl<'v> ValidationContext<'v> {
    pub(crate) fn root(
        validator: &'v Validator,
        root_type: TypeInfo,
        visited: &'v RefCell<HashSet<BeanId>>,
    ) -> Self {
        Self {
            validator,
            root_type,
            leaf_type: root_type,
            path: String::new(),
            visited,
        }
    }

    /// A cursor at a nested bean.
    #[must_use]
    pub fn update(&self, leaf_type: TypeInfo, path: impl Into<String>) -> Self {
        Self {
            validator: self.validator,
            root_type: self.root_type,
            leaf_type,
            path: path.into(),
            visited: self.visited,
        }
    }

    /// Type of the bean validation started from.
    #[must_use]
    pub fn root_type(&self) -> TypeInfo {
        self.root_type
    }

    /// Type of the bean whose properties are being checked.
    #[must_use]
    pub fn leaf_type(&self) -> TypeInfo {
        self.leaf_type
    }

    /// Dotted path of the leaf; empty at the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Dotted path of a property of the leaf.
    #[must_use]
    pub fn property_path(&self, name: &str) -> String {
        join_path(&self.path, name)
    }

    /// Returns true if the bean with this identity was already entered.
    #[must_use]
    pub fn is_visited(&self, identity: BeanId) -> bool {
        self.visited.borrow().contains(&identity)
    }

    /// Validates a nested bean reached at `path`.
    ///
    /// A bean already entered during this call counts as valid, which is
    /// what stops cycles.
    pub fn cascade(&self, handle: BeanHandle<'_>, path: impl Into<String>) -> ValidationResult<Errors> {
        let identity = handle.identity();
        if self.is_visited(identity) {
            return Ok(Errors::new());
        }
        let bean = handle.read();
        self.update(bean.bean_type(), path).check(&*bean, identity)
    }

    /// Applies the registered constraints of the leaf bean.
    pub(crate) fn check(&self, bean: &dyn Bean, identity: BeanId) -> ValidationResult<Errors> {
        if !self.visited.borrow_mut().insert(identity) {
            return Ok(Errors::new());
        }
        let registration = self.validator.registration(bean.bean_type())?;

        let mut errors = Errors::new();
        for (name, constraints) in registration.rules() {
            let Some(field) = bean.field(name) else {
                continue;
            };
            let value = PropertyValue {
                name,
                path: self.property_path(name),
                declared: field.field_type(),
                value: field.view(),
            };
            for constraint in constraints {
                errors.append(constraint.validate(self, &value)?);
            }
        }
        Ok(errors)
    }

    /// A violation of `key` by `value`, with the value's text as invalid value.
    #[must_use]
    pub fn violation(&self, value: &PropertyValue<'_>, key: &str) -> PropertyError {
        PropertyError::new(self.root_type, self.leaf_type, &value.path, value.name, key)
            .with_property_type(value.declared.ty)
            .with_invalid_value(value.value.to_text())
    }
}

/// A property value handed to a constraint.
///
/// For `each` the same property is narrowed to one element: the path gains
/// the index and the declared type becomes the element type.
#[derive(Debug, Clone)]
pub struct PropertyValue<'a> {
    /// Property name
    pub name: &'a str,
    /// Dotted path from the validation root
    pub path: String,
    /// Declared type
    pub declared: FieldType,
    /// Current value
    pub value: FieldRef<'a>,
}

impl<'a> PropertyValue<'a> {
    /// The same property narrowed to one element.
    #[must_use]
    pub fn element(&self, path: String, declared: FieldType, value: FieldRef<'a>) -> Self {
        Self {
            name: self.name,
            path,
            declared,
            value,
        }
    }
}
