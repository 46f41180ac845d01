//! Parameter errors.

use thiserror::Error;

/// Result type for parameter operations.
pub type ParamsResult<T> = Result<T, ParamsError>;

/// Errors raised while parsing or reading request parameters.
///
/// Parse errors reject the whole input because its structure is ambiguous.
/// Access errors come from [`required`](crate::Params::required) and
/// [`optional`](crate::Params::optional) and are meant to be turned into a
/// client-facing response by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A key was used both as a single value and as a container.
    #[error("parameter \"{key}\" is used both as a value and as a container")]
    Conflict {
        /// The raw parameter key that could not be stored
        key: String,
    },

    /// An explicit list index exceeded the configured maximum.
    #[error("index {index} in parameter \"{key}\" exceeds the maximum of {max}")]
    IndexOutOfRange {
        /// The raw parameter key
        key: String,
        /// The requested index
        index: usize,
        /// The configured maximum
        max: usize,
    },

    /// The input could not be decoded or a key is malformed.
    #[error("malformed parameters: {message}")]
    Decode {
        /// What went wrong
        message: String,
    },

    /// A required parameter is absent or empty.
    #[error("required parameter \"{path}\" is missing")]
    Missing {
        /// The requested path
        path: String,
    },

    /// A parameter value could not be converted to the requested type.
    #[error("parameter \"{path}\" is invalid: {message}")]
    Conversion {
        /// The requested path
        path: String,
        /// Why the conversion failed
        message: String,
    },

    /// A lookup path is malformed.
    #[error("invalid parameter path \"{path}\"")]
    InvalidPath {
        /// The requested path
        path: String,
    },
}

impl ParamsError {
    /// Creates a conflict error.
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict { key: key.into() }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a missing parameter error.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// Creates a conversion error.
    pub fn conversion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised while parsing, as opposed to reading.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::IndexOutOfRange { .. } | Self::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(ParamsError::conflict("a").is_parse_error());
        assert!(ParamsError::decode("bad").is_parse_error());
        assert!(ParamsError::IndexOutOfRange {
            key: "a[20000]".into(),
            index: 20_000,
            max: 10_000,
        }
        .is_parse_error());
        assert!(!ParamsError::missing("a").is_parse_error());
        assert!(!ParamsError::conversion("a", "nope").is_parse_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ParamsError::missing("user.name").to_string(),
            "required parameter \"user.name\" is missing"
        );
        assert_eq!(
            ParamsError::conversion("age", "invalid digit found in string").to_string(),
            "parameter \"age\" is invalid: invalid digit found in string"
        );
    }
}
