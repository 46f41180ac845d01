//! Projections of the parameter tree.
//!
//! Paths are dotted (`address.city`). A path names a key at its depth;
//! lists are transparent, so `rows.id` reaches the `id` of every row.

use crate::value::{ParamValue, Params};

/// Groups paths by their first segment.
fn split_paths<'p>(paths: &[&'p str]) -> Vec<(&'p str, Option<&'p str>)> {
    paths
        .iter()
        .copied()
        .filter(|path| !path.is_empty())
        .map(|path| match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        })
        .collect()
}

fn rests<'p>(split: &[(&'p str, Option<&'p str>)], key: &str) -> (bool, Vec<&'p str>) {
    let mut whole = false;
    let mut nested = Vec::new();
    for (head, rest) in split {
        if *head == key {
            match rest {
                Some(rest) => nested.push(*rest),
                None => whole = true,
            }
        }
    }
    (whole, nested)
}

fn exclude_value(value: &ParamValue, paths: &[&str]) -> ParamValue {
    match value {
        ParamValue::Map(map) => ParamValue::Map(map.excluding(paths)),
        ParamValue::List(items) => {
            ParamValue::List(items.iter().map(|item| exclude_value(item, paths)).collect())
        }
        text => text.clone(),
    }
}

fn include_value(value: &ParamValue, paths: &[&str]) -> ParamValue {
    match value {
        ParamValue::Map(map) => ParamValue::Map(map.including(paths)),
        ParamValue::List(items) => {
            ParamValue::List(items.iter().map(|item| include_value(item, paths)).collect())
        }
        ParamValue::Text(_) => ParamValue::empty(),
    }
}

fn trim_value(value: &ParamValue) -> ParamValue {
    match value {
        ParamValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                ParamValue::empty()
            } else {
                ParamValue::text(trimmed)
            }
        }
        ParamValue::Map(map) => ParamValue::Map(map.trim()),
        ParamValue::List(items) => ParamValue::List(items.iter().map(trim_value).collect()),
    }
}

impl Params {
    /// Returns a copy without the named paths.
    ///
    /// Naming a key removes its whole subtree.
    #[must_use]
    pub fn excluding(&self, paths: &[&str]) -> Self {
        let split = split_paths(paths);
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                let (whole, nested) = rests(&split, key);
                if whole {
                    None
                } else if nested.is_empty() {
                    Some((key.clone(), value.clone()))
                } else {
                    Some((key.clone(), exclude_value(value, &nested)))
                }
            })
            .collect()
    }

    /// Returns a copy with only the named paths.
    ///
    /// Keys on the way to a named path are kept as containers holding only
    /// the named branches; a value standing where a container was expected
    /// becomes the empty placeholder.
    #[must_use]
    pub fn including(&self, paths: &[&str]) -> Self {
        let split = split_paths(paths);
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                let (whole, nested) = rests(&split, key);
                if whole {
                    Some((key.clone(), value.clone()))
                } else if nested.is_empty() {
                    None
                } else {
                    Some((key.clone(), include_value(value, &nested)))
                }
            })
            .collect()
    }

    /// Descends through nested maps along `keys`.
    ///
    /// Returns an empty tree when a key is absent or not a map.
    ///
    /// ```rust
    /// use trellis_params::Params;
    ///
    /// let params = Params::parse("user.address.city=Oslo").unwrap();
    /// let address = params.sub_params(&["user", "address"]);
    /// assert_eq!(address.required::<String>("city").unwrap(), "Oslo");
    /// ```
    #[must_use]
    pub fn sub_params(&self, keys: &[&str]) -> Self {
        let mut current = self;
        for key in keys {
            match current.get(key) {
                Some(ParamValue::Map(map)) => current = map,
                _ => return Self::new(),
            }
        }
        current.clone()
    }

    /// Returns a copy with surrounding whitespace removed from every value.
    ///
    /// A value that trims to nothing becomes the empty placeholder.
    #[must_use]
    pub fn trim(&self) -> Self {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), trim_value(value)))
            .collect()
    }
}
