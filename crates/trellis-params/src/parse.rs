//! Building the parameter tree from flat key/value pairs.
//!
//! Keys are split on `.` and every segment may carry a list suffix:
//!
//! | Segment   | Meaning                                        |
//! |-----------|------------------------------------------------|
//! | `name`    | map entry                                      |
//! | `name[n]` | slot `n` of a list, earlier slots backfilled   |
//! | `name[]`  | append to a list                               |
//! | `_name[]` | make sure list `name` exists, append nothing   |
//!
//! `_name[]` only appends nothing as the last segment; in the middle of a
//! key it opens a new element, like `name[]`.
//!
//! A plain key submitted twice keeps its first value. Indexed and appended
//! values are all kept. A key whose first segment has no name (`[]=x`,
//! `.a=1`) is skipped.

use tracing::trace;

use crate::error::{ParamsError, ParamsResult};
use crate::value::{ParamValue, Params};

/// Default upper bound for explicit list indices.
pub const DEFAULT_MAX_INDEX: usize = 10_000;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Largest explicit index accepted in `name[n]`
    pub max_index: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_index: DEFAULT_MAX_INDEX,
        }
    }
}

impl ParseOptions {
    /// Sets the largest accepted explicit index.
    #[must_use]
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Suffix {
    None,
    Index(usize),
    Append,
    Ensure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub(crate) name: &'a str,
    pub(crate) suffix: Suffix,
}

/// Splits a key into segments.
pub(crate) fn segments(key: &str) -> ParamsResult<Vec<Segment<'_>>> {
    key.split('.')
        .map(|part| {
            let segment = segment(part);
            if segment.name.is_empty() {
                Err(ParamsError::decode(format!("empty segment in key \"{key}\"")))
            } else {
                Ok(segment)
            }
        })
        .collect()
}

fn segment(part: &str) -> Segment<'_> {
    let literal = Segment {
        name: part,
        suffix: Suffix::None,
    };
    let Some(body) = part.strip_suffix(']') else {
        return literal;
    };
    let Some((name, inner)) = body.split_once('[') else {
        return literal;
    };

    if inner.is_empty() {
        return match name.strip_prefix('_') {
            Some(listed) if !listed.is_empty() => Segment {
                name: listed,
                suffix: Suffix::Ensure,
            },
            _ => Segment {
                name,
                suffix: Suffix::Append,
            },
        };
    }
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return literal;
    }
    let index = inner.parse().unwrap_or(usize::MAX);
    Segment {
        name,
        suffix: Suffix::Index(index),
    }
}

impl Params {
    /// Parses a raw `application/x-www-form-urlencoded` string.
    ///
    /// ```rust
    /// use trellis_params::{ParamValue, Params};
    ///
    /// let params = Params::parse("user.name=Ada&user.tags[]=math&user.tags[]=poetry").unwrap();
    /// let user = params.get("user").and_then(ParamValue::as_map).unwrap();
    /// assert_eq!(user.get("name").and_then(ParamValue::as_text), Some("Ada"));
    /// assert_eq!(user.get("tags").and_then(ParamValue::as_list).map(<[_]>::len), Some(2));
    /// ```
    pub fn parse(raw: &str) -> ParamsResult<Self> {
        Self::parse_with(raw, ParseOptions::default())
    }

    /// Parses a raw string with explicit limits.
    pub fn parse_with(raw: &str, options: ParseOptions) -> ParamsResult<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(raw).map_err(|e| ParamsError::decode(e.to_string()))?;
        Self::from_pairs_with(pairs, options)
    }

    /// Builds a tree from already decoded pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> ParamsResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_pairs_with(pairs, ParseOptions::default())
    }

    /// Builds a tree from already decoded pairs with explicit limits.
    pub fn from_pairs_with<I, K, V>(pairs: I, options: ParseOptions) -> ParamsResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.store(key.as_ref(), value.as_ref(), options)?;
        }
        trace!(keys = params.len(), "parsed parameters");
        Ok(params)
    }

    /// Parses a multi-valued map such as a servlet-style parameter map.
    ///
    /// Every value of every key is folded in; a key with no values is
    /// stored as a placeholder.
    pub fn parse_map<I, K, VS, V>(map: I) -> ParamsResult<Self>
    where
        I: IntoIterator<Item = (K, VS)>,
        K: AsRef<str>,
        VS: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        Self::parse_map_with(map, ParseOptions::default())
    }

    /// Parses a multi-valued map with explicit limits.
    pub fn parse_map_with<I, K, VS, V>(map: I, options: ParseOptions) -> ParamsResult<Self>
    where
        I: IntoIterator<Item = (K, VS)>,
        K: AsRef<str>,
        VS: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (key, values) in map {
            let key = key.as_ref();
            let mut stored = false;
            for value in values {
                params.store(key, value.as_ref(), options)?;
                stored = true;
            }
            if !stored {
                params.store(key, "", options)?;
            }
        }
        Ok(params)
    }

    fn store(&mut self, key: &str, value: &str, options: ParseOptions) -> ParamsResult<()> {
        if key.is_empty() {
            return Ok(());
        }
        let first = key.split('.').next().unwrap_or(key);
        if segment(first).name.is_empty() {
            trace!(key, "skipping key without a name");
            return Ok(());
        }
        let path = segments(key)?;
        let walker = Walker { key, options };
        walker.insert(self, &path, value)
    }
}

struct Walker<'k> {
    key: &'k str,
    options: ParseOptions,
}

impl Walker<'_> {
    fn insert(&self, params: &mut Params, path: &[Segment<'_>], value: &str) -> ParamsResult<()> {
        match path {
            [] => Ok(()),
            [last] => self.store_leaf(params, last, value),
            [head, rest @ ..] => {
                let child = self.descend(params, head)?;
                self.insert(child, rest, value)
            }
        }
    }

    fn descend<'p>(&self, params: &'p mut Params, segment: &Segment<'_>) -> ParamsResult<&'p mut Params> {
        let slot = match segment.suffix {
            Suffix::None => params
                .entries
                .entry(segment.name.to_string())
                .or_insert_with(ParamValue::empty),
            Suffix::Index(index) => {
                let list = self.list(params, segment.name)?;
                self.backfill(list, index)?;
                &mut list[index]
            }
            Suffix::Append | Suffix::Ensure => {
                let list = self.list(params, segment.name)?;
                list.push(ParamValue::empty());
                let last = list.len() - 1;
                &mut list[last]
            }
        };
        match slot {
            ParamValue::Map(child) => Ok(child),
            _ => Err(ParamsError::conflict(self.key)),
        }
    }

    fn store_leaf(&self, params: &mut Params, segment: &Segment<'_>, value: &str) -> ParamsResult<()> {
        let incoming = (!value.is_empty()).then_some(value);
        match segment.suffix {
            Suffix::None => match params.entries.get_mut(segment.name) {
                Some(slot) => self.merge(slot, incoming),
                None => {
                    params
                        .entries
                        .insert(segment.name.to_string(), leaf_value(incoming));
                    Ok(())
                }
            },
            Suffix::Index(index) => {
                let list = self.list(params, segment.name)?;
                self.backfill(list, index)?;
                self.merge(&mut list[index], incoming)
            }
            Suffix::Append => {
                self.list(params, segment.name)?.push(leaf_value(incoming));
                Ok(())
            }
            Suffix::Ensure => self.list(params, segment.name).map(|_| ()),
        }
    }

    /// Stores into an occupied slot: first value wins, a placeholder
    /// is upgraded, a container cannot take a value.
    fn merge(&self, slot: &mut ParamValue, incoming: Option<&str>) -> ParamsResult<()> {
        let Some(value) = incoming else {
            return Ok(());
        };
        match slot {
            ParamValue::Text(_) => Ok(()),
            placeholder if placeholder.is_placeholder() => {
                *placeholder = ParamValue::text(value);
                Ok(())
            }
            _ => Err(ParamsError::conflict(self.key)),
        }
    }

    fn list<'p>(&self, params: &'p mut Params, name: &str) -> ParamsResult<&'p mut Vec<ParamValue>> {
        let slot = params
            .entries
            .entry(name.to_string())
            .or_insert_with(|| ParamValue::List(Vec::new()));
        if slot.is_placeholder() {
            *slot = ParamValue::List(Vec::new());
        }
        match slot {
            ParamValue::List(items) => Ok(items),
            _ => Err(ParamsError::conflict(self.key)),
        }
    }

    fn backfill(&self, list: &mut Vec<ParamValue>, index: usize) -> ParamsResult<()> {
        if index > self.options.max_index {
            return Err(ParamsError::IndexOutOfRange {
                key: self.key.to_string(),
                index,
                max: self.options.max_index,
            });
        }
        if list.len() <= index {
            list.resize_with(index + 1, ParamValue::empty);
        }
        Ok(())
    }
}

fn leaf_value(incoming: Option<&str>) -> ParamValue {
    incoming.map_or_else(ParamValue::empty, ParamValue::text)
}
