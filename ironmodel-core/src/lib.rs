//! # IronModel Core
//!
//! Core types of the IronModel API metamodel.
//!
//! This crate provides:
//! - Canonical word-sequence names ([`Name`])
//! - Concepts, annotations, modules and documents
//! - The closed type and service variants of the model
//! - The [`Model`] registry, with interned list types
//! - Two-phase resolution of forward references ([`Resolver`])
//! - Non-fatal diagnostics collected during a compilation

pub mod concepts;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod model;
pub mod name;
pub mod resolver;
pub mod service;
pub mod types;

pub use concepts::{Annotation, AnnotationParameter, Concept, Document, Module, ModuleId};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{ModelError, Result};
pub use expression::{Expression, Operator};
pub use model::Model;
pub use name::{Name, NameMode, canonicalize};
pub use resolver::{
    Reference, Resolver, ServiceReference, ServiceResolver, ServiceSlot, TypeReference,
    TypeResolver, TypeSlot,
};
pub use service::{
    Constraint, ConstraintRef, DefinedService, Direction, Locator, Method, MethodRef, Parameter,
    Service, ServiceId, UndefinedService,
};
pub use types::{
    EnumType, EnumValue, ListType, MemberKind, PrimitiveKind, PrimitiveType, StructMember,
    StructType, Type, TypeId, UndefinedType,
};
