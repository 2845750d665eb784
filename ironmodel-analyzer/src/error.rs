//! Error types for model analysis.

use thiserror::Error;

/// Fatal error of the analysis phase.
///
/// Resolution failures and duplicates are not errors: they are collected as
/// diagnostics and the analysis keeps going.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Inheritance chain that loops back on itself.
    #[error("circular {kind} inheritance detected: {path}")]
    CircularInheritance {
        /// Kind of entity (type or service).
        kind: &'static str,
        /// Names in the cycle, joined with `->`.
        path: String,
    },

    /// Declaration whose name is empty once canonicalized.
    #[error("invalid {kind} name '{text}'")]
    InvalidName {
        /// Kind of declaration.
        kind: &'static str,
        /// Name as written.
        text: String,
    },
}

impl AnalyzerError {
    /// Creates a circular inheritance error.
    pub fn circular<I, S>(kind: &'static str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let path = names
            .into_iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CircularInheritance { kind, path }
    }

    /// Creates an invalid name error.
    pub fn invalid_name(kind: &'static str, text: impl Into<String>) -> Self {
        Self::InvalidName {
            kind,
            text: text.into(),
        }
    }
}

/// Error returned by a constraint parser.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConstraintError {
    /// Error message.
    pub message: String,
}

impl ConstraintError {
    /// Creates a constraint error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_path() {
        let err = AnalyzerError::circular("type", ["a", "b", "a"]);
        assert_eq!(err.to_string(), "circular type inheritance detected: a -> b -> a");
    }
}
