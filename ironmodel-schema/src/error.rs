//! Error types for schema generation.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for schema generation operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A type the schema layout depends on isn't part of the model.
    #[error("the {role} type '{name}' doesn't exist in the model")]
    MissingType {
        /// Role of the type in the schema, e.g. `identified`.
        role: &'static str,
        /// Name that was looked up.
        name: String,
    },

    /// The base document can't be used to host the generated definitions.
    #[error("invalid base schema: {message}")]
    InvalidBase {
        /// Error message.
        message: String,
    },

    /// XML reading error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Error reading or writing a file.
    #[error("can't access '{}': {source}", path.display())]
    File {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Creates a missing type error.
    pub fn missing_type(role: &'static str, name: impl Into<String>) -> Self {
        Self::MissingType {
            role,
            name: name.into(),
        }
    }

    /// Creates an invalid base error with the given message.
    pub fn invalid_base(message: impl Into<String>) -> Self {
        Self::InvalidBase {
            message: message.into(),
        }
    }

    /// Creates a file access error.
    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for schema generation operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
