//! Property errors produced by binding and validation.
//!
//! Binding and validation never fail as a whole because of bad input.
//! Each failure becomes a [`PropertyError`] filed under the dotted path of
//! the property in an [`Errors`] map, and messages are resolved later
//! against a [`MessageSource`].

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::message::MessageSource;
use crate::types::TypeInfo;

/// Named values available to message templates, e.g. `min` and `max`.
pub type Attributes = IndexMap<String, String>;

/// Message key used for conversion failures and for cascaded failures.
pub const INVALID: &str = "invalid";

/// One binding failure or constraint violation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyError {
    root_type: TypeInfo,
    leaf_type: TypeInfo,
    path: String,
    property: String,
    property_type: Option<TypeInfo>,
    invalid_value: Option<String>,
    message_key: String,
    attributes: Attributes,
    detail: Option<String>,
}

impl PropertyError {
    /// Creates an error for `property` of a `leaf_type` bean reached at
    /// `path` from a `root_type` bean.
    pub fn new(
        root_type: TypeInfo,
        leaf_type: TypeInfo,
        path: impl Into<String>,
        property: impl Into<String>,
        message_key: impl Into<String>,
    ) -> Self {
        Self {
            root_type,
            leaf_type,
            path: path.into(),
            property: property.into(),
            property_type: None,
            invalid_value: None,
            message_key: message_key.into(),
            attributes: Attributes::new(),
            detail: None,
        }
    }

    /// Sets the declared type of the property.
    #[must_use]
    pub fn with_property_type(mut self, property_type: TypeInfo) -> Self {
        self.property_type = Some(property_type);
        self
    }

    /// Sets the rejected value.
    #[must_use]
    pub fn with_invalid_value(mut self, value: Option<String>) -> Self {
        self.invalid_value = value;
        self
    }

    /// Adds a named attribute for message interpolation.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds several attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: &Attributes) -> Self {
        self.attributes
            .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Attaches a diagnostic detail, such as a converter's error text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Type of the bean binding or validation started from.
    #[must_use]
    pub fn root_type(&self) -> TypeInfo {
        self.root_type
    }

    /// Type of the bean owning the property.
    #[must_use]
    pub fn leaf_type(&self) -> TypeInfo {
        self.leaf_type
    }

    /// Dotted path from the root, e.g. `address.lines[1]`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Simple property name, e.g. `lines`.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Declared type of the property, when known.
    #[must_use]
    pub fn property_type(&self) -> Option<TypeInfo> {
        self.property_type
    }

    /// The rejected value; `None` for null.
    #[must_use]
    pub fn invalid_value(&self) -> Option<&str> {
        self.invalid_value.as_deref()
    }

    /// Message key, e.g. `notNull` or `invalid`.
    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    /// Named attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Candidate message keys, most specific first.
    ///
    /// 1. `{RootType}.{path}.{key}`
    /// 2. `{LeafType}.{property}.{key}`
    /// 3. `{PropertyType}.{key}`
    /// 4. `{key}`
    #[must_use]
    pub fn message_keys(&self) -> Vec<String> {
        let key = &self.message_key;
        let mut keys = Vec::with_capacity(4);
        keys.push(format!("{}.{}.{key}", self.root_type.simple_name(), self.path));
        keys.push(format!("{}.{}.{key}", self.leaf_type.simple_name(), self.property));
        if let Some(property_type) = &self.property_type {
            keys.push(format!("{}.{key}", property_type.simple_name()));
        }
        keys.push(key.clone());
        keys
    }

    /// Arguments passed to message templates.
    #[must_use]
    pub fn message_args(&self) -> Attributes {
        let mut args = self.attributes.clone();
        args.insert("property".to_string(), self.property.clone());
        args.insert("path".to_string(), self.path.clone());
        args.insert(
            "value".to_string(),
            self.invalid_value.clone().unwrap_or_default(),
        );
        args
    }

    /// Resolves the message for `locale`.
    ///
    /// The first candidate key the source contains wins; if none is known,
    /// the bare message key is returned.
    pub fn message(&self, source: &dyn MessageSource, locale: &str) -> String {
        let args = self.message_args();
        self.message_keys()
            .iter()
            .find(|key| source.contains(key, locale))
            .map_or_else(
                || self.message_key.clone(),
                |key| source.message(key, locale, &args),
            )
    }
}

impl Serialize for PropertyError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PropertyError", 4)?;
        state.serialize_field("key", &self.message_key)?;
        state.serialize_field("property", &self.property)?;
        state.serialize_field("value", &self.invalid_value)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}

/// Property errors grouped by dotted path, in the order paths were first reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors {
    by_path: IndexMap<String, Vec<PropertyError>>,
}

impl Errors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files an error under its path.
    pub fn add(&mut self, error: PropertyError) {
        self.by_path
            .entry(error.path.clone())
            .or_default()
            .push(error);
    }

    /// Accumulates every error of `other`, keeping both lists for shared paths.
    pub fn append(&mut self, other: Errors) {
        for (path, errors) in other.by_path {
            self.by_path.entry(path).or_default().extend(errors);
        }
    }

    /// Overlays `other` underneath `self`: paths already present here win
    /// and the errors `other` has for them are dropped.
    pub fn merge(&mut self, other: Errors) {
        for (path, errors) in other.by_path {
            self.by_path.entry(path).or_insert(errors);
        }
    }

    /// Returns true if there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Number of paths with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Total number of errors across all paths.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.by_path.values().map(Vec::len).sum()
    }

    /// Errors filed under `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> &[PropertyError] {
        self.by_path.get(path).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `path` has errors.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Returns true if `path` has an error with `message_key`.
    #[must_use]
    pub fn has_key(&self, path: &str, message_key: &str) -> bool {
        self.get(path).iter().any(|e| e.message_key == message_key)
    }

    /// Paths with errors, in report order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.by_path.keys().map(String::as_str)
    }

    /// Iterates over `(path, errors)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyError])> {
        self.by_path.iter().map(|(p, e)| (p.as_str(), e.as_slice()))
    }

    /// Resolves every message for `locale`, grouped by path.
    pub fn messages(&self, source: &dyn MessageSource, locale: &str) -> IndexMap<String, Vec<String>> {
        self.by_path
            .iter()
            .map(|(path, errors)| {
                let messages = errors.iter().map(|e| e.message(source, locale)).collect();
                (path.clone(), messages)
            })
            .collect()
    }
}

impl IntoIterator for Errors {
    type Item = (String, Vec<PropertyError>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<PropertyError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_path.into_iter()
    }
}

impl FromIterator<PropertyError> for Errors {
    fn from_iter<I: IntoIterator<Item = PropertyError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for error in iter {
            errors.add(error);
        }
        errors
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.by_path.len()))?;
        for (path, errors) in &self.by_path {
            map.serialize_entry(path, errors)?;
        }
        map.end()
    }
}
