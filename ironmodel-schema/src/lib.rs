//! # IronModel Schema
//!
//! XML schema generation from IronModel API models.
//!
//! This crate provides:
//! - XSD generation with JAXB binding customizations
//! - Merging of the generated definitions into a base schema document
//! - Pluggable naming, pluralization and attribute classification
//! - The fixed member type overrides of the API schema

pub mod error;
pub mod exceptions;
pub mod generator;
pub mod names;
pub mod writer;

pub use error::{Result, SchemaError};
pub use exceptions::{MemberTypeOverrides, default_member_types, default_without_collection};
pub use generator::{DEFAULT_BASE_SCHEMA, GeneratedSchema, SchemaGenerator, SchemaGeneratorBuilder};
pub use names::{
    AttributeSet, DefaultNaming, EnglishPluralizer, MemberClassifier, Pluralizer, SchemaNaming,
};
pub use writer::{JAXB_NAMESPACE, XS_NAMESPACE, XsdWriter};

use ironmodel_core::Model;
use std::path::Path;

/// Generates the XML schema of a model, hosting the definitions in `base`.
///
/// # Arguments
/// * `model` - Resolved model
/// * `base` - Base schema document
///
/// # Errors
/// Returns `SchemaError` if a required type is missing or the base document
/// is malformed.
pub fn generate_schema(model: &Model, base: &str) -> Result<GeneratedSchema> {
    SchemaGenerator::new(model).generate(base)
}

/// Generates the XML schema of a model from a base schema file into an
/// output file.
///
/// # Errors
/// Returns `SchemaError` if reading, generation or writing fails.
pub fn generate_schema_file(
    model: &Model,
    base_path: &Path,
    out_path: &Path,
) -> Result<ironmodel_core::Diagnostics> {
    SchemaGenerator::new(model).generate_to_file(base_path, out_path)
}
