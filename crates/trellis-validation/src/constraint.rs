//! The constraint trait and per-type registrations.

use std::fmt;

use trellis_core::Errors;

use crate::context::{PropertyValue, ValidationContext};
use crate::error::ValidationResult;

/// A reusable check of one property value.
///
/// Returns the violations it found, usually at `property.path`. Only
/// configuration problems met while cascading (an unregistered nested bean
/// type) are returned as `Err`.
pub trait Constraint: Send + Sync {
    /// Checks `property` in `context`.
    fn validate(
        &self,
        context: &ValidationContext<'_>,
        property: &PropertyValue<'_>,
    ) -> ValidationResult<Errors>;

    /// Short description for diagnostics, e.g. `min(18)`.
    fn describe(&self) -> String;
}

/// A boxed constraint.
pub type BoxedConstraint = Box<dyn Constraint>;

impl fmt::Debug for dyn Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Constraints of one bean type, keyed by property name.
///
/// Properties keep the order in which they were first named, and the
/// constraints of a property run in the order they were added.
///
/// ```rust
/// use trellis_validation::{not_blank, not_null, size, Constraints};
///
/// let constraints = Constraints::new()
///     .property("name", [not_null(), not_blank()])
///     .property("tags", [size(0, 5)]);
/// assert_eq!(constraints.property_names().collect::<Vec<_>>(), vec!["name", "tags"]);
/// ```
#[derive(Debug, Default)]
pub struct Constraints {
    rules: Vec<(String, Vec<BoxedConstraint>)>,
}

impl Constraints {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds constraints to `name`, after any it already has.
    #[must_use]
    pub fn property<I>(mut self, name: impl Into<String>, constraints: I) -> Self
    where
        I: IntoIterator<Item = BoxedConstraint>,
    {
        let name = name.into();
        let constraints = constraints.into_iter();
        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, list)) => list.extend(constraints),
            None => self.rules.push((name, constraints.collect())),
        }
        self
    }

    /// Property names in registration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true if no property has constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn rules(&self) -> impl Iterator<Item = (&str, &[BoxedConstraint])> {
        self.rules
            .iter()
            .map(|(name, list)| (name.as_str(), list.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{max, min, not_null};

    #[test]
    fn test_property_appends() {
        let constraints = Constraints::new()
            .property("age", [min(0)])
            .property("name", [not_null()])
            .property("age", [max(150)]);

        let rules: Vec<_> = constraints
            .rules()
            .map(|(name, list)| {
                (
                    name,
                    list.iter().map(|c| c.describe()).collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(
            rules,
            vec![
                ("age", vec!["min(0)".to_string(), "max(150)".to_string()]),
                ("name", vec!["notNull".to_string()]),
            ]
        );
        assert!(!constraints.is_empty());
        assert!(Constraints::new().is_empty());
    }
}
