//! Error types for model registry operations.

use crate::name::Name;
use thiserror::Error;

/// Error returned by the registry when an entity can't be added.
///
/// These errors are not fatal for a compilation: the builder reports them as
/// diagnostics and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A different type is already registered with the same name.
    #[error("duplicate type definition: '{name}'")]
    DuplicateType {
        /// Name of the duplicate.
        name: Name,
    },

    /// A different service is already registered with the same name.
    #[error("duplicate service definition: '{name}'")]
    DuplicateService {
        /// Name of the duplicate.
        name: Name,
    },

    /// A module is already registered with the same name.
    #[error("duplicate module definition: '{name}'")]
    DuplicateModule {
        /// Name of the duplicate.
        name: Name,
    },

    /// Attempt to register an undefined placeholder.
    #[error("undefined {kind} '{name}' can't be registered")]
    PlaceholderInsert {
        /// Kind of entity (type or service).
        kind: &'static str,
        /// Name of the placeholder.
        name: Name,
    },

    /// Attempt to register a list type by name.
    #[error("list of '{element}' is interned, not registered by name")]
    ListInsert {
        /// Element type name.
        element: Name,
    },
}

impl ModelError {
    /// Creates a duplicate type error.
    pub fn duplicate_type(name: &Name) -> Self {
        Self::DuplicateType { name: name.clone() }
    }

    /// Creates a duplicate service error.
    pub fn duplicate_service(name: &Name) -> Self {
        Self::DuplicateService { name: name.clone() }
    }

    /// Creates a placeholder insertion error.
    pub fn placeholder(kind: &'static str, name: &Name) -> Self {
        Self::PlaceholderInsert {
            kind,
            name: name.clone(),
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, ModelError>;
