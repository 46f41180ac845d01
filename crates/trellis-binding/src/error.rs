//! Conversion errors.

use std::fmt;

use thiserror::Error;
use trellis_core::INVALID;

/// A converter's refusal to turn a raw string into a value.
///
/// Never escapes [`Binder::bind`](crate::Binder::bind); it becomes a
/// property error with the raw input as invalid value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConversionError {
    message: String,
    key: Option<String>,
}

impl ConversionError {
    /// Creates an error reported under the `invalid` message key.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// Reports the error under a specific message key instead of `invalid`.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Wraps any displayable error.
    pub fn from_display(error: impl fmt::Display) -> Self {
        Self::new(error.to_string())
    }

    /// Diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message key the resulting property error uses.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(INVALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_is_invalid() {
        let err = ConversionError::new("not a number");
        assert_eq!(err.key(), "invalid");
        assert_eq!(err.to_string(), "not a number");
    }

    #[test]
    fn test_custom_key() {
        let err = ConversionError::from_display("bad date").with_key("typeMismatch.date");
        assert_eq!(err.key(), "typeMismatch.date");
        assert_eq!(err.message(), "bad date");
    }
}
