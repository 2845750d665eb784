//! # IronModel
//!
//! Model-driven compiler for API metamodels.
//!
//! IronModel turns front-end declarations of types and services into a
//! resolved, name-indexed model, and generates an XML schema with JAXB
//! binding customizations from it.
//!
//! ## Features
//!
//! - **Canonical names** - Case and separator independent word sequences
//! - **Order independent declarations** - Forward references are resolved in a fixup pass
//! - **Non-fatal diagnostics** - Unresolved and duplicate names are reported, not raised
//! - **Deterministic output** - The same model always produces the same schema bytes
//!
//! ## Quick Start
//!
//! ```
//! use ironmodel::prelude::*;
//!
//! let declarations: Vec<Declaration> = vec![
//!     TypeDecl::structure("Identified", "types").into(),
//!     TypeDecl::structure("Api", "types").into(),
//!     TypeDecl::structure("Vm", "types")
//!         .extends(Supertype::Class("Identified".into()))
//!         .into(),
//! ];
//!
//! let compilation = ironmodel::compile(declarations, DEFAULT_BASE_SCHEMA)?;
//! assert!(compilation.schema.contains(r#"<xs:complexType name="Vms">"#));
//! # Ok::<(), ironmodel::Error>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Names, concepts, the model registry and the resolver
//! - [`analyzer`] - Declarations and the model builder
//! - [`schema`] - XML schema generation

pub mod prelude;

/// Names, concepts, the model registry and the resolver.
pub mod core {
    pub use ironmodel_core::*;
}

/// Declarations and the model builder.
pub mod analyzer {
    pub use ironmodel_analyzer::*;
}

/// XML schema generation.
pub mod schema {
    pub use ironmodel_schema::*;
}

use ironmodel_analyzer::{AnalyzerError, Declaration};
use ironmodel_core::{Diagnostics, Model};
use ironmodel_schema::{SchemaError, SchemaGenerator};
use std::path::Path;
use thiserror::Error;

pub use ironmodel_analyzer::{ModelBuilder, analyze};
pub use ironmodel_core::{Name, canonicalize};
pub use ironmodel_schema::{DEFAULT_BASE_SCHEMA, generate_schema};

/// Error type for a full compilation.
#[derive(Debug, Error)]
pub enum Error {
    /// The declarations couldn't be turned into a model.
    #[error("analysis failed: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// The schema couldn't be generated.
    #[error("schema generation failed: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type for a full compilation.
pub type Result<T> = std::result::Result<T, Error>;

/// Output of a full compilation.
#[derive(Debug)]
pub struct Compilation {
    /// Resolved model.
    pub model: Model,
    /// Generated schema document.
    pub schema: String,
    /// Diagnostics of the analysis followed by those of the generation.
    pub diagnostics: Diagnostics,
}

/// Builds the model of `declarations` and generates its schema inside `base`.
///
/// # Errors
/// Returns `Error::Analyzer` if the inheritance graph has a cycle, and
/// `Error::Schema` if generation fails.
pub fn compile<I, D>(declarations: I, base: &str) -> Result<Compilation>
where
    I: IntoIterator<Item = D>,
    D: Into<Declaration>,
{
    let analysis = analyze(declarations)?;
    let generated = SchemaGenerator::new(&analysis.model).generate(base)?;

    let mut diagnostics = analysis.diagnostics;
    let mut schema_diagnostics = generated.diagnostics;
    diagnostics.append(&mut schema_diagnostics);

    tracing::info!(
        "compiled model: {} types, {} services, {} diagnostics",
        analysis.model.types().count(),
        analysis.model.services().count(),
        diagnostics.len()
    );

    Ok(Compilation {
        model: analysis.model,
        schema: generated.xml,
        diagnostics,
    })
}

/// Compiles `declarations` with the base schema read from `base_path` and
/// writes the result to `out_path`.
///
/// # Errors
/// Returns `Error` if analysis, generation or file access fails.
pub fn compile_to_file<I, D>(declarations: I, base_path: &Path, out_path: &Path) -> Result<Diagnostics>
where
    I: IntoIterator<Item = D>,
    D: Into<Declaration>,
{
    let analysis = analyze(declarations)?;
    let mut diagnostics = analysis.diagnostics;
    let mut schema_diagnostics =
        SchemaGenerator::new(&analysis.model).generate_to_file(base_path, out_path)?;
    diagnostics.append(&mut schema_diagnostics);
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmodel_analyzer::{MemberDecl, Supertype, TypeDecl, TypeRefDecl};
    use ironmodel_core::DiagnosticKind;

    fn resource(name: &str) -> TypeDecl {
        TypeDecl::structure(name, "types").extends(Supertype::Class("Identified".into()))
    }

    fn disk_and_vm() -> Vec<Declaration> {
        vec![
            resource("Disk")
                .with_member(MemberDecl::attribute("provisionedSize", TypeRefDecl::named("Integer")))
                .into(),
            resource("Vm")
                .with_member(MemberDecl::link("disks", TypeRefDecl::array_of("Disk")))
                .with_member(MemberDecl::attribute("bootDisk", TypeRefDecl::named("Disk")))
                .into(),
        ]
    }

    fn anchors() -> Vec<Declaration> {
        vec![
            TypeDecl::structure("Identified", "types")
                .with_member(MemberDecl::attribute("id", TypeRefDecl::named("String")))
                .into(),
            TypeDecl::structure("Api", "types").into(),
        ]
    }

    #[test]
    fn test_declaration_order_does_not_change_output() {
        let mut forward = anchors();
        forward.extend(disk_and_vm());
        let mut backward = disk_and_vm();
        backward.reverse();
        backward.extend(anchors());

        let first = compile(forward, DEFAULT_BASE_SCHEMA).expect("Failed to compile");
        let second = compile(backward, DEFAULT_BASE_SCHEMA).expect("Failed to compile");

        assert_eq!(first.schema, second.schema);
        assert!(first.diagnostics.is_empty());
        assert!(first.schema.contains(
            r#"<xs:element name="disks" type="Disks" minOccurs="0" maxOccurs="1"/>"#
        ));
        assert!(first.schema.contains(
            r#"<xs:element name="boot_disk" type="Disk" minOccurs="0" maxOccurs="1"/>"#
        ));
        assert!(first.schema.contains(
            r#"<xs:element name="provisioned_size" type="xs:long" minOccurs="0" maxOccurs="1"/>"#
        ));
    }

    #[test]
    fn test_diagnostics_are_merged() {
        let mut declarations = anchors();
        declarations.push(
            resource("Vm")
                .with_member(MemberDecl::attribute("host", TypeRefDecl::named("Host")))
                .into(),
        );

        let compilation = compile(declarations, DEFAULT_BASE_SCHEMA).expect("Failed to compile");
        assert_eq!(compilation.diagnostics.count(DiagnosticKind::UnresolvedType), 1);
        assert_eq!(
            compilation.diagnostics.count(DiagnosticKind::UnrenderableMember),
            1
        );
        assert!(compilation.diagnostics.has_errors());
    }

    #[test]
    fn test_cycle_is_an_analyzer_error() {
        let mut declarations = anchors();
        declarations.push(
            TypeDecl::structure("A", "types")
                .extends(Supertype::Class("B".into()))
                .into(),
        );
        declarations.push(
            TypeDecl::structure("B", "types")
                .extends(Supertype::Class("A".into()))
                .into(),
        );
        let result = compile(declarations, DEFAULT_BASE_SCHEMA);
        assert!(matches!(result, Err(Error::Analyzer(_))));
    }

    #[test]
    fn test_missing_api_is_a_schema_error() {
        let result = compile(disk_and_vm(), DEFAULT_BASE_SCHEMA);
        assert!(matches!(
            result,
            Err(Error::Schema(SchemaError::MissingType { .. }))
        ));
    }

    #[test]
    fn test_compile_to_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let base_path = dir.path().join("base.xsd");
        let out_path = dir.path().join("api.xsd");
        std::fs::write(&base_path, DEFAULT_BASE_SCHEMA).expect("Failed to write base");

        let mut declarations = anchors();
        declarations.extend(disk_and_vm());
        let diagnostics =
            compile_to_file(declarations, &base_path, &out_path).expect("Failed to compile");

        assert!(diagnostics.is_empty());
        let schema = std::fs::read_to_string(&out_path).expect("Failed to read schema");
        assert!(schema.contains(r#"<xs:complexType name="Disks">"#));
    }
}
