//! URI template variables extracted from a matched path.
//!
//! Most route patterns declare one to three variables, so the pairs are kept
//! in a small vector that stays on the stack for the common case.

use smallvec::SmallVec;

/// Number of variables stored inline before spilling to the heap.
const INLINE_VARIABLES: usize = 4;

/// Ordered `name -> value` pairs captured by `{name}` pattern segments.
///
/// Unlike a plain list of pairs, inserting a name that is already present
/// replaces its value in place, so a pattern that declares the same
/// variable twice keeps the last captured value at the first position.
///
/// # Example
///
/// ```rust
/// use trellis_router::PathVariables;
///
/// let mut vars = PathVariables::new();
/// vars.insert("userId", "123");
/// vars.insert("action", "view");
/// vars.insert("userId", "456");
///
/// assert_eq!(vars.get("userId"), Some("456"));
/// assert_eq!(vars.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathVariables {
    inner: SmallVec<[(String, String); INLINE_VARIABLES]>,
}

impl PathVariables {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing the value of an existing name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the value of a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a variable with this name was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns true if no variables were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts into owned pairs, keeping capture order.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.inner.into_vec()
    }
}

impl<'a> IntoIterator for &'a PathVariables {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PathVariables {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_insert_and_get() {
        let mut vars = PathVariables::new();
        vars.insert("id", "123");
        vars.insert("name", "alice");

        assert_eq!(vars.get("id"), Some("123"));
        assert_eq!(vars.get("name"), Some("alice"));
        assert_eq!(vars.get("unknown"), None);
        assert!(vars.contains("id"));
    }

    #[test]
    fn test_variables_replace_keeps_position() {
        let mut vars = PathVariables::new();
        vars.insert("a", "1");
        vars.insert("b", "2");
        vars.insert("a", "3");

        let pairs: Vec<_> = vars.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_variables_spill_to_heap() {
        let vars: PathVariables = (0..10).map(|i| (format!("v{i}"), i.to_string())).collect();
        assert_eq!(vars.len(), 10);
        assert_eq!(vars.get("v9"), Some("9"));
    }

    #[test]
    fn test_variables_into_pairs() {
        let vars: PathVariables = [("x", "1"), ("y", "2")].into_iter().collect();
        assert_eq!(
            vars.into_pairs(),
            vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_variables_empty() {
        let vars = PathVariables::new();
        assert!(vars.is_empty());
        assert_eq!((&vars).into_iter().count(), 0);
    }
}
