//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```
//! use ironmodel::prelude::*;
//! ```

// Core types
pub use ironmodel_core::{
    Concept, DiagnosticKind, Diagnostics, Direction, Model, Name, NameMode, PrimitiveKind, Type,
    TypeId, canonicalize,
};

// Declarations and analysis
pub use ironmodel_analyzer::{
    Analysis, AnnotationDecl, ConstraintDecl, ConstraintParser, DeclMeta, Declaration, DocTag,
    DocumentDecl, LocatorDecl, MemberDecl, MethodDecl, ModelBuilder, ParameterDecl, ServiceDecl,
    Supertype, TypeDecl, TypeRefDecl, analyze,
};

// Schema generation
pub use ironmodel_schema::{
    DEFAULT_BASE_SCHEMA, GeneratedSchema, MemberClassifier, Pluralizer, SchemaGenerator,
    SchemaNaming,
};

pub use crate::{Compilation, Error, compile};
