//! The parameter tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of the parameter tree.
///
/// A key submitted without a value (`a` or `a=`) is stored as an empty
/// [`ParamValue::Map`], the placeholder that tells "present but empty"
/// apart from "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single decoded value
    Text(String),
    /// Nested parameters (`a.b=...`), or the empty placeholder
    Map(Params),
    /// Indexed or appended values (`a[0]=...`, `a[]=...`)
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// A text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The empty placeholder.
    #[must_use]
    pub fn empty() -> Self {
        Self::Map(Params::new())
    }

    /// Returns true for the empty placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Map(map) if map.is_empty())
    }

    /// Returns true for empty text, empty maps and empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// The text, if this is a single value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The nested parameters, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&Params> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "value",
            Self::Map(_) => "map",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        Self::List(value)
    }
}

/// An ordered tree of request parameters.
///
/// Keys keep the order in which they were first submitted. Built by
/// [`Params::parse`] or [`Params::from_pairs`]; every transformation
/// returns a new tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    pub(crate) entries: IndexMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// The value stored under a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Returns true if the top-level key is present, even as a placeholder.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Top-level keys in submission order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = indexmap::map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = indexmap::map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder() {
        assert!(ParamValue::empty().is_placeholder());
        assert!(ParamValue::empty().is_empty());
        assert!(!ParamValue::List(vec![]).is_placeholder());
        assert!(ParamValue::List(vec![]).is_empty());
        assert!(!ParamValue::text("x").is_empty());
    }

    #[test]
    fn test_builder_and_accessors() {
        let params = Params::new()
            .with("name", "Ada")
            .with("tags", vec![ParamValue::text("a"), ParamValue::empty()])
            .with("address", Params::new().with("city", "London"));

        assert_eq!(params.len(), 3);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["name", "tags", "address"]);
        assert_eq!(params.get("name").and_then(ParamValue::as_text), Some("Ada"));
        assert_eq!(params.get("tags").and_then(ParamValue::as_list).map(<[_]>::len), Some(2));
        assert!(params.get("address").and_then(ParamValue::as_map).is_some());
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_serde_shape() {
        let params = Params::new()
            .with("a", ParamValue::empty())
            .with("b", vec![ParamValue::text("x")])
            .with("c", "y");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"a": {}, "b": ["x"], "c": "y"}));

        let back: Params = serde_json::from_value(value).unwrap();
        assert_eq!(back, params);
    }
}
