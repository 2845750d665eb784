//! # IronModel Analyzer
//!
//! Turns API declarations into a resolved [`ironmodel_core::Model`].
//!
//! This crate provides:
//! - The declaration tree produced by front-ends ([`decl`])
//! - The declaration-to-model builder, with two-phase reference resolution
//! - Deferred parsing of constraint bodies through a [`ConstraintParser`]
//! - Inheritance validation

pub mod builder;
pub mod constraint;
pub mod decl;
pub mod error;
pub mod validate;

pub use builder::{Analysis, ModelBuilder, analyze};
pub use constraint::ConstraintParser;
pub use decl::{
    AnnotationDecl, ConstantDecl, ConstraintDecl, DeclMeta, Declaration, DocTag, DocumentDecl,
    LocatorDecl, MemberDecl, MethodDecl, ParameterDecl, ServiceDecl, Supertype, TypeBody,
    TypeDecl, TypeRefDecl,
};
pub use error::{AnalyzerError, ConstraintError, Result};
pub use validate::check_inheritance;
