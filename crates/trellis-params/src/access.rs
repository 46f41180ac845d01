//! Typed reads from the parameter tree.

use std::str::FromStr;

use crate::error::{ParamsError, ParamsResult};
use crate::parse::{segments, Suffix};
use crate::value::{ParamValue, Params};

/// Conversion from a parameter node.
///
/// `Ok(None)` means the node is empty: empty text or an empty container.
/// `Err` carries a message describing why the node does not fit.
pub trait FromParam: Sized {
    /// Converts a node.
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String>;
}

fn single_text(value: &ParamValue) -> Result<Option<&str>, String> {
    match value {
        ParamValue::Text(text) if text.is_empty() => Ok(None),
        ParamValue::Text(text) => Ok(Some(text)),
        other if other.is_empty() => Ok(None),
        other => Err(format!("expected a single value, found a {}", other.kind())),
    }
}

macro_rules! from_param_via_from_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromParam for $ty {
            fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
                single_text(value)?
                    .map(|text| <$ty as FromStr>::from_str(text).map_err(|e| e.to_string()))
                    .transpose()
            }
        }
    )+};
}

from_param_via_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char
);

impl FromParam for String {
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
        Ok(single_text(value)?.map(str::to_string))
    }
}

/// Only a case-insensitive `false` is false.
impl FromParam for bool {
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
        Ok(single_text(value)?.map(|text| !text.eq_ignore_ascii_case("false")))
    }
}

impl FromParam for Params {
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
        match value {
            ParamValue::Map(map) if map.is_empty() => Ok(None),
            ParamValue::Map(map) => Ok(Some(map.clone())),
            ParamValue::Text(text) if text.is_empty() => Ok(None),
            other => Err(format!("expected a map, found a {}", other.kind())),
        }
    }
}

impl FromParam for ParamValue {
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
        Ok((!value.is_empty()).then(|| value.clone()))
    }
}

/// Lists convert element-wise and skip empty slots; a single value becomes
/// a one-element list.
impl<T: FromParam> FromParam for Vec<T> {
    fn from_param(value: &ParamValue) -> Result<Option<Self>, String> {
        let items = match value {
            ParamValue::List(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    T::from_param(item)
                        .map_err(|message| format!("element {i}: {message}"))
                        .transpose()
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => T::from_param(other)?.into_iter().collect(),
        };
        Ok((!items.is_empty()).then_some(items))
    }
}

impl Params {
    /// Resolves a dotted, indexed path such as `user.tags[1]` or `rows[0].id`.
    ///
    /// Returns `Ok(None)` when any step is absent.
    pub fn get_path(&self, path: &str) -> ParamsResult<Option<&ParamValue>> {
        let steps = segments(path).map_err(|_| ParamsError::InvalidPath {
            path: path.to_string(),
        })?;

        let mut current = self;
        let mut found: Option<&ParamValue> = None;
        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                match found {
                    Some(ParamValue::Map(map)) => current = map,
                    _ => return Ok(None),
                }
            }
            let Some(value) = current.get(step.name) else {
                return Ok(None);
            };
            found = match step.suffix {
                Suffix::None => Some(value),
                Suffix::Index(index) => match value {
                    ParamValue::List(items) => items.get(index),
                    _ => None,
                },
                Suffix::Append | Suffix::Ensure => {
                    return Err(ParamsError::InvalidPath {
                        path: path.to_string(),
                    })
                }
            };
            if found.is_none() {
                return Ok(None);
            }
        }
        Ok(found)
    }

    /// Reads an optional typed value.
    ///
    /// ```rust
    /// use trellis_params::Params;
    ///
    /// let params = Params::parse("page=2&q=").unwrap();
    /// assert_eq!(params.optional::<u32>("page").unwrap(), Some(2));
    /// assert_eq!(params.optional::<String>("q").unwrap(), None);
    /// assert!(params.optional::<u32>("missing").unwrap().is_none());
    /// ```
    pub fn optional<T: FromParam>(&self, path: &str) -> ParamsResult<Option<T>> {
        match self.get_path(path)? {
            Some(value) => T::from_param(value).map_err(|message| ParamsError::conversion(path, message)),
            None => Ok(None),
        }
    }

    /// Reads a typed value that must be present and non-empty.
    pub fn required<T: FromParam>(&self, path: &str) -> ParamsResult<T> {
        self.optional(path)?
            .ok_or_else(|| ParamsError::missing(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &str) -> Params {
        Params::parse(raw).unwrap()
    }

    #[test]
    fn test_get_path() {
        let p = params("user.tags[1]=b&rows[0].id=7&name=x");
        assert_eq!(
            p.get_path("user.tags[1]").unwrap().and_then(ParamValue::as_text),
            Some("b")
        );
        assert_eq!(
            p.get_path("rows[0].id").unwrap().and_then(ParamValue::as_text),
            Some("7")
        );
        assert!(p.get_path("user.tags[0]").unwrap().unwrap().is_placeholder());
        assert!(p.get_path("user.tags[5]").unwrap().is_none());
        assert!(p.get_path("name.first").unwrap().is_none());
        assert!(p.get_path("nothing").unwrap().is_none());
        assert!(matches!(
            p.get_path("user.tags[]"),
            Err(ParamsError::InvalidPath { .. })
        ));
        assert!(p.get_path("a..b").is_err());
        assert_eq!(p.optional::<String>("user.missing").unwrap(), None);
        assert_eq!(p.required::<u32>("rows[0].id").unwrap(), 7);
    }

    #[test]
    fn test_scalar_conversion() {
        let p = params("age=41&ratio=0.5&initial=A&bad=abc");
        assert_eq!(p.required::<i32>("age").unwrap(), 41);
        assert_eq!(p.required::<f64>("ratio").unwrap(), 0.5);
        assert_eq!(p.required::<char>("initial").unwrap(), 'A');

        let err = p.required::<i32>("bad").unwrap_err();
        assert!(matches!(err, ParamsError::Conversion { ref path, .. } if path == "bad"));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_empty_is_absent() {
        let p = params("a&b=&c[]=");
        assert_eq!(p.optional::<String>("a").unwrap(), None);
        assert_eq!(p.optional::<i64>("b").unwrap(), None);
        assert_eq!(p.optional::<Vec<String>>("c").unwrap(), None);
        assert_eq!(p.required::<String>("a").unwrap_err(), ParamsError::missing("a"));
        assert_eq!(p.required::<u8>("zzz").unwrap_err(), ParamsError::missing("zzz"));
    }

    #[test]
    fn test_lenient_bool() {
        let p = params("a=false&b=FALSE&c=true&d=garbage&e=0");
        assert_eq!(p.required::<bool>("a").unwrap(), false);
        assert_eq!(p.required::<bool>("b").unwrap(), false);
        assert_eq!(p.required::<bool>("c").unwrap(), true);
        assert_eq!(p.required::<bool>("d").unwrap(), true);
        assert_eq!(p.required::<bool>("e").unwrap(), true);
    }

    #[test]
    fn test_map_requires_map() {
        let p = params("user.name=Ada&flat=x");
        let user = p.required::<Params>("user").unwrap();
        assert_eq!(user.required::<String>("name").unwrap(), "Ada");
        assert!(matches!(
            p.required::<Params>("flat"),
            Err(ParamsError::Conversion { .. })
        ));
    }

    #[test]
    fn test_collection_wraps_scalar() {
        let p = params("one=5&many[]=1&many[]=2&holes[2]=9&mixed[]=1&mixed[]=x");
        assert_eq!(p.required::<Vec<u32>>("one").unwrap(), vec![5]);
        assert_eq!(p.required::<Vec<u32>>("many").unwrap(), vec![1, 2]);
        assert_eq!(p.required::<Vec<u32>>("holes").unwrap(), vec![9]);

        let err = p.required::<Vec<u32>>("mixed").unwrap_err();
        match err {
            ParamsError::Conversion { path, message } => {
                assert_eq!(path, "mixed");
                assert!(message.starts_with("element 1:"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_scalar_rejects_container() {
        let p = params("user.name=Ada");
        let err = p.required::<String>("user").unwrap_err();
        assert!(matches!(err, ParamsError::Conversion { .. }));
    }
}
