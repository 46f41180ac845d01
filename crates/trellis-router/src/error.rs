//! Path matching errors.

use thiserror::Error;

/// Errors raised while matching a path against an Ant-style pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Variables were requested for a path the pattern does not match.
    #[error("pattern \"{pattern}\" is not a match for \"{path}\"")]
    NoMatch {
        /// The pattern that was tried
        pattern: String,
        /// The path (after matrix parameters were stripped)
        path: String,
    },

    /// A pattern segment compiled to an invalid regular expression.
    #[error("invalid pattern segment \"{segment}\": {message}")]
    InvalidPattern {
        /// The raw pattern segment
        segment: String,
        /// Message from the regex compiler
        message: String,
    },

    /// A `{name:regex}` variable used capturing groups of its own.
    ///
    /// This is a fault in the pattern, not in the request: the captured
    /// groups can no longer be correlated with variable names.
    #[error(
        "the number of capturing groups in segment \"{segment}\" ({groups}) does not match \
         the number of URI template variables it defines ({variables}); use non-capturing groups instead"
    )]
    CapturingGroupMismatch {
        /// The raw pattern segment
        segment: String,
        /// Capture groups found in the compiled expression
        groups: usize,
        /// Variables declared in the segment
        variables: usize,
    },
}

impl MatchError {
    /// Creates a no-match error.
    pub fn no_match(pattern: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NoMatch {
            pattern: pattern.into(),
            path: path.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(segment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a broken pattern rather than a non-matching path.
    #[must_use]
    pub fn is_pattern_fault(&self) -> bool {
        !matches!(self, Self::NoMatch { .. })
    }
}
