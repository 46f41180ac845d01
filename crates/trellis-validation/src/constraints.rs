//! Built-in constraints.
//!
//! Only [`not_null`] fails on a null value; every other constraint treats
//! null as valid, so combine it with `not_null` when the value is required.
//!
//! | Constraint | Message key | Attributes |
//! |------------|-------------|------------|
//! | [`not_null`] | `notNull` | |
//! | [`not_blank`] | `notBlank` | |
//! | [`not_empty`] | `notEmpty` | |
//! | [`min`] | `min` | `min` |
//! | [`max`] | `max` | `max` |
//! | [`size`] | `size` | `min`, `max` |
//! | [`pattern`] | `pattern` | `regex` |
//! | [`email`] | `email` | |
//! | [`custom`] | caller's key | |
//! | [`valid`] | `invalid` on the parent | |
//! | [`each`] | inner keys at `prop[i]`, `invalid` on `prop` | |

use std::sync::OnceLock;

use regex::Regex;
use trellis_core::{index_path, join_path, Attributes, Errors, FieldRef, FieldType, INVALID};

use crate::constraint::{BoxedConstraint, Constraint};
use crate::context::{PropertyValue, ValidationContext};
use crate::error::ValidationResult;

/// A constraint defined by a predicate over non-null values.
struct Check<F> {
    key: String,
    attributes: Attributes,
    description: String,
    nullable: bool,
    test: F,
}

impl<F> Constraint for Check<F>
where
    F: Fn(&FieldRef<'_>) -> bool + Send + Sync,
{
    fn validate(
        &self,
        context: &ValidationContext<'_>,
        property: &PropertyValue<'_>,
    ) -> ValidationResult<Errors> {
        let mut errors = Errors::new();
        let passes = if property.value.is_null() {
            self.nullable
        } else {
            (self.test)(&property.value)
        };
        if !passes {
            errors.add(
                context
                    .violation(property, &self.key)
                    .with_attributes(&self.attributes),
            );
        }
        Ok(errors)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

fn check<F>(key: &str, description: String, attributes: Attributes, test: F) -> BoxedConstraint
where
    F: Fn(&FieldRef<'_>) -> bool + Send + Sync + 'static,
{
    Box::new(Check {
        key: key.to_string(),
        attributes,
        description,
        nullable: true,
        test,
    })
}

fn attributes<const N: usize>(pairs: [(&str, String); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Text of a scalar; `None` for beans, containers and opaque values.
fn text(value: &FieldRef<'_>) -> Option<String> {
    value.as_scalar().map(|scalar| scalar.to_text())
}

/// The value must not be null.
#[must_use]
pub fn not_null() -> BoxedConstraint {
    Box::new(Check {
        key: "notNull".to_string(),
        attributes: Attributes::new(),
        description: "notNull".to_string(),
        nullable: false,
        test: |_: &FieldRef<'_>| true,
    })
}

/// Text must contain a non-whitespace character; containers must not be empty.
#[must_use]
pub fn not_blank() -> BoxedConstraint {
    check("notBlank", "notBlank".to_string(), Attributes::new(), |value| {
        match value {
            FieldRef::Scalar(_) => text(value).is_some_and(|s| !s.trim().is_empty()),
            other => !other.is_empty(),
        }
    })
}

/// Text, collections and maps must not be empty.
#[must_use]
pub fn not_empty() -> BoxedConstraint {
    check("notEmpty", "notEmpty".to_string(), Attributes::new(), |value| {
        !value.is_empty()
    })
}

/// Numbers must be at least `min`.
#[must_use]
pub fn min(min: impl Into<f64>) -> BoxedConstraint {
    let min = min.into();
    check(
        "min",
        format!("min({min})"),
        attributes([("min", min.to_string())]),
        move |value| number(value).map_or(true, |n| n >= min),
    )
}

/// Numbers must be at most `max`.
#[must_use]
pub fn max(max: impl Into<f64>) -> BoxedConstraint {
    let max = max.into();
    check(
        "max",
        format!("max({max})"),
        attributes([("max", max.to_string())]),
        move |value| number(value).map_or(true, |n| n <= max),
    )
}

fn number(value: &FieldRef<'_>) -> Option<f64> {
    value.as_scalar().and_then(|scalar| scalar.as_f64())
}

/// Length of text (in characters), collections and maps must lie in `min..=max`.
#[must_use]
pub fn size(min: usize, max: usize) -> BoxedConstraint {
    check(
        "size",
        format!("size({min}, {max})"),
        attributes([("min", min.to_string()), ("max", max.to_string())]),
        move |value| value.len().map_or(true, |len| (min..=max).contains(&len)),
    )
}

/// The text form of a scalar must match `regex` in full.
#[must_use]
pub fn pattern(regex: Regex) -> BoxedConstraint {
    let source = regex.as_str().to_string();
    check(
        "pattern",
        format!("pattern({source})"),
        attributes([("regex", source)]),
        move |value| text(value).map_or(true, |s| full_match(&regex, &s)),
    )
}

fn full_match(regex: &Regex, text: &str) -> bool {
    regex
        .find(text)
        .is_some_and(|m| m.start() == 0 && m.end() == text.len())
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("valid regex")
    })
}

/// Text must look like an email address (`local@domain.tld`).
#[must_use]
pub fn email() -> BoxedConstraint {
    check("email", "email".to_string(), Attributes::new(), |value| {
        text(value).map_or(true, |s| email_regex().is_match(&s))
    })
}

/// Fails with `key` when `predicate` returns false for a non-null value.
#[must_use]
pub fn custom<F>(key: impl Into<String>, predicate: F) -> BoxedConstraint
where
    F: Fn(&FieldRef<'_>) -> bool + Send + Sync + 'static,
{
    let key = key.into();
    Box::new(Check {
        description: format!("custom({key})"),
        key,
        attributes: Attributes::new(),
        nullable: true,
        test: predicate,
    })
}

/// Cascades into nested beans.
struct Valid;

impl Constraint for Valid {
    fn validate(
        &self,
        context: &ValidationContext<'_>,
        property: &PropertyValue<'_>,
    ) -> ValidationResult<Errors> {
        let mut nested = Errors::new();
        match &property.value {
            FieldRef::Bean(handle) => {
                nested.append(context.cascade(*handle, property.path.clone())?);
            }
            FieldRef::Collection(items) => {
                for (i, item) in items.iter().enumerate() {
                    if let FieldRef::Bean(handle) = item {
                        nested.append(context.cascade(*handle, index_path(&property.path, i))?);
                    }
                }
            }
            FieldRef::Map(entries) => {
                for (key, value) in entries {
                    if let FieldRef::Bean(handle) = value {
                        let path = join_path(&property.path, &key.to_text().unwrap_or_default());
                        nested.append(context.cascade(*handle, path)?);
                    }
                }
            }
            _ => {}
        }

        if !nested.is_empty() {
            nested.add(context.violation(property, INVALID).with_invalid_value(None));
        }
        Ok(nested)
    }

    fn describe(&self) -> String {
        "valid".to_string()
    }
}

/// Validates nested beans with their own registered constraints.
///
/// Applies to a bean property and to the bean elements of collections and
/// maps. Null is skipped. When anything nested fails, the property itself
/// also gets an `invalid` error. A nested bean type without registered
/// constraints is a configuration error.
#[must_use]
pub fn valid() -> BoxedConstraint {
    Box::new(Valid)
}

/// Applies constraints to each element.
struct Each {
    inner: Vec<BoxedConstraint>,
}

impl Constraint for Each {
    fn validate(
        &self,
        context: &ValidationContext<'_>,
        property: &PropertyValue<'_>,
    ) -> ValidationResult<Errors> {
        let element_type = property
            .declared
            .element()
            .cloned()
            .unwrap_or_else(|| property.declared.clone());

        let elements: Vec<(String, FieldType, FieldRef<'_>)> = match &property.value {
            FieldRef::Collection(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (index_path(&property.path, i), element_type.clone(), item.clone()))
                .collect(),
            FieldRef::Map(entries) => {
                let value_type = match &property.declared.shape {
                    trellis_core::Shape::Map { value, .. } => (**value).clone(),
                    _ => element_type,
                };
                entries
                    .iter()
                    .map(|(key, value)| {
                        let path = join_path(&property.path, &key.to_text().unwrap_or_default());
                        (path, value_type.clone(), value.clone())
                    })
                    .collect()
            }
            _ => return Ok(Errors::new()),
        };

        let mut errors = Errors::new();
        for (path, declared, value) in elements {
            let element = property.element(path, declared, value);
            for constraint in &self.inner {
                errors.append(constraint.validate(context, &element)?);
            }
        }

        if !errors.is_empty() {
            errors.add(context.violation(property, INVALID).with_invalid_value(None));
        }
        Ok(errors)
    }

    fn describe(&self) -> String {
        let inner: Vec<String> = self.inner.iter().map(|c| c.describe()).collect();
        format!("each({})", inner.join(", "))
    }
}

/// Applies `constraints` to every element of a collection (at `prop[i]`)
/// or every value of a map (at `prop.key`).
///
/// A null container is skipped. When any element fails, the property
/// itself also gets an `invalid` error.
#[must_use]
pub fn each<I>(constraints: I) -> BoxedConstraint
where
    I: IntoIterator<Item = BoxedConstraint>,
{
    Box::new(Each {
        inner: constraints.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use trellis_core::{Element, Field, TypeInfo};

    use crate::Validator;

    struct Form;

    fn run(constraint: &BoxedConstraint, field: &dyn Field) -> Errors {
        let validator = Validator::new();
        let visited = RefCell::new(HashSet::new());
        let context = ValidationContext::root(&validator, TypeInfo::of::<Form>(), &visited);
        let property = PropertyValue {
            name: "value",
            path: "value".to_string(),
            declared: field.field_type(),
            value: field.view(),
        };
        constraint.validate(&context, &property).unwrap()
    }

    fn fails(constraint: &BoxedConstraint, field: &dyn Field) -> bool {
        !run(constraint, field).is_empty()
    }

    #[test]
    fn test_not_null() {
        let c = not_null();
        assert!(fails(&c, &None::<String>));
        assert!(!fails(&c, &Some(String::new())));
        let errors = run(&c, &None::<i32>);
        let error = &errors.get("value")[0];
        assert_eq!(error.message_key(), "notNull");
        assert_eq!(error.invalid_value(), None);
        assert_eq!(error.property_type(), Some(TypeInfo::of::<i32>()));
    }

    #[test]
    fn test_null_passes_everything_but_not_null() {
        let none = None::<String>;
        for c in [
            not_blank(),
            not_empty(),
            min(1),
            max(1),
            size(1, 2),
            pattern(Regex::new("x").unwrap()),
            email(),
            custom("never", |_| false),
            valid(),
            each([not_null()]),
        ] {
            assert!(!fails(&c, &none), "{} fired on null", c.describe());
        }
    }

    #[test]
    fn test_not_blank() {
        let c = not_blank();
        assert!(fails(&c, &"   ".to_string()));
        assert!(fails(&c, &String::new()));
        assert!(!fails(&c, &" x ".to_string()));
        assert!(fails(&c, &Vec::<String>::new()));
    }

    #[test]
    fn test_not_empty() {
        let c = not_empty();
        assert!(fails(&c, &String::new()));
        assert!(!fails(&c, &" ".to_string()));
        assert!(fails(&c, &Vec::<i32>::new()));
        assert!(!fails(&c, &vec![1]));
    }

    #[test]
    fn test_min_max() {
        assert!(fails(&min(18), &17_i32));
        assert!(!fails(&min(18), &18_i32));
        assert!(!fails(&max(2.5), &2.5_f64));
        assert!(fails(&max(2.5), &2.6_f64));
        assert!(!fails(&min(5), &"text".to_string()));

        let errors = run(&min(18), &3_u8);
        let error = &errors.get("value")[0];
        assert_eq!(error.attributes().get("min").map(String::as_str), Some("18"));
        assert_eq!(error.invalid_value(), Some("3"));
    }

    #[test]
    fn test_size() {
        let c = size(2, 3);
        assert!(fails(&c, &"a".to_string()));
        assert!(!fails(&c, &"abc".to_string()));
        assert!(fails(&c, &vec![1, 2, 3, 4]));
        assert!(!fails(&c, &vec![1, 2]));
        assert!(!fails(&c, &7_i32));
    }

    #[test]
    fn test_pattern_matches_whole_text() {
        let c = pattern(Regex::new(r"\d{3}").unwrap());
        assert!(!fails(&c, &"123".to_string()));
        assert!(fails(&c, &"1234".to_string()));
        assert!(fails(&c, &"a123".to_string()));
        assert!(!fails(&c, &123_u32));
        let errors = run(&c, &"x".to_string());
        assert_eq!(
            errors.get("value")[0].attributes().get("regex").map(String::as_str),
            Some(r"\d{3}")
        );
    }

    #[test]
    fn test_email() {
        let c = email();
        assert!(!fails(&c, &"ada@example.com".to_string()));
        assert!(!fails(&c, &"a.b+c@mail.example.org".to_string()));
        assert!(fails(&c, &"ada".to_string()));
        assert!(fails(&c, &"ada@example".to_string()));
        assert!(fails(&c, &"@example.com".to_string()));
    }

    #[test]
    fn test_custom() {
        let even = custom("even", |value| {
            value
                .as_scalar()
                .and_then(|s| s.as_f64())
                .is_some_and(|n| n % 2.0 == 0.0)
        });
        assert!(!fails(&even, &4_i64));
        assert!(run(&even, &3_i64).has_key("value", "even"));
    }

    #[test]
    fn test_each_indexes_errors() {
        let c = each([not_blank(), size(0, 3)]);
        let errors = run(&c, &vec!["ok".to_string(), " ".to_string(), "long".to_string()]);
        assert!(errors.has_key("value[1]", "notBlank"));
        assert!(errors.has_key("value[2]", "size"));
        assert!(!errors.contains("value[0]"));
        assert!(errors.has_key("value", "invalid"));
        assert_eq!(
            errors.get("value[1]")[0].property_type(),
            Some(String::element_type().ty)
        );

        assert!(run(&c, &vec!["a".to_string()]).is_empty());
    }

    #[test]
    fn test_describe() {
        assert_eq!(size(1, 2).describe(), "size(1, 2)");
        assert_eq!(each([min(1), not_null()]).describe(), "each(min(1), notNull)");
        assert_eq!(format!("{:?}", email()), "email");
    }
}
