//! Validator configuration errors.

use thiserror::Error;

/// Result type for validator operations.
pub type ValidationResult<T> = Result<T, ValidatorError>;

/// A programming mistake in how the validator is set up or called.
///
/// Constraint violations are never reported this way; they are entries in
/// the returned [`Errors`](trellis_core::Errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    /// No constraints are registered for the bean type.
    #[error("no constraints registered for {type_name}")]
    Unregistered {
        /// Simple name of the bean type
        type_name: String,
    },

    /// A registration names a property the bean does not have.
    #[error("{type_name} has no property named \"{property}\"")]
    UnknownProperty {
        /// Simple name of the bean type
        type_name: String,
        /// The unknown property name
        property: String,
    },

    /// `validate_option` was called with `None`.
    #[error("cannot validate a null bean")]
    NullBean,
}

impl ValidatorError {
    /// Creates an unregistered-type error.
    pub fn unregistered(type_name: impl Into<String>) -> Self {
        Self::Unregistered {
            type_name: type_name.into(),
        }
    }

    /// Creates an unknown-property error.
    pub fn unknown_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidatorError::unregistered("Person").to_string(),
            "no constraints registered for Person"
        );
        assert_eq!(
            ValidatorError::unknown_property("Person", "nmae").to_string(),
            "Person has no property named \"nmae\""
        );
        assert_eq!(ValidatorError::NullBean.to_string(), "cannot validate a null bean");
    }
}
