//! Declaration-to-model builder.
//!
//! The builder walks the declarations once, in whatever order they arrive.
//! Known type and service names are resolved eagerly, unknown ones receive a
//! placeholder that is patched when [`ModelBuilder::build`] runs the fixup
//! pass. Constraint bodies are parsed last, against the complete model.

use crate::constraint::{ConstraintParser, ConstraintQueue};
use crate::decl::{
    AnnotationDecl, ConstantDecl, ConstraintDecl, DeclMeta, Declaration, DocTag, DocumentDecl,
    LocatorDecl, MemberDecl, MethodDecl, ParameterDecl, ServiceDecl, TypeBody, TypeDecl,
    TypeRefDecl,
};
use crate::error::{AnalyzerError, Result};
use crate::validate::check_inheritance;
use ironmodel_core::concepts::VALUE_PARAMETER;
use ironmodel_core::name::ENUM_SEPARATOR;
use ironmodel_core::{
    Annotation, Concept, Constraint, ConstraintRef, DefinedService, DiagnosticKind, Diagnostics,
    Document, EnumType, EnumValue, Locator, MemberKind, Method, MethodRef, Model, ModelError,
    ModuleId, Name, Parameter, ServiceId, ServiceResolver, ServiceSlot, StructMember, StructType,
    Type, TypeId, TypeResolver, TypeSlot,
};
use std::path::Path;

/// Suffix removed from service names and service references.
const SERVICE_SUFFIX: &str = "Service";

/// Result of a successful analysis.
#[derive(Debug)]
pub struct Analysis {
    /// Resolved model.
    pub model: Model,
    /// Diagnostics collected while building and resolving the model.
    pub diagnostics: Diagnostics,
}

/// Builds a [`Model`] from declarations.
///
/// # Example
/// ```
/// use ironmodel_analyzer::{ModelBuilder, decl::{MemberDecl, TypeDecl, TypeRefDecl}};
///
/// let mut builder = ModelBuilder::new();
/// builder.declare(
///     TypeDecl::structure("Vm", "types")
///         .with_member(MemberDecl::attribute("disk", TypeRefDecl::named("Disk"))),
/// )?;
/// builder.declare(TypeDecl::structure("Disk", "types"))?;
/// let analysis = builder.build()?;
/// assert!(analysis.diagnostics.is_empty());
/// # Ok::<(), ironmodel_analyzer::AnalyzerError>(())
/// ```
pub struct ModelBuilder {
    model: Model,
    types: TypeResolver,
    services: ServiceResolver,
    constraints: ConstraintQueue,
    diagnostics: Diagnostics,
    parser: Option<Box<dyn ConstraintParser>>,
    declarations: usize,
}

impl ModelBuilder {
    /// Creates a builder for an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: Model::new(),
            types: TypeResolver::new(),
            services: ServiceResolver::new(),
            constraints: ConstraintQueue::default(),
            diagnostics: Diagnostics::new(),
            parser: None,
            declarations: 0,
        }
    }

    /// Sets the parser used for constraint bodies.
    #[must_use]
    pub fn constraint_parser(mut self, parser: impl ConstraintParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Processes a single declaration.
    ///
    /// # Errors
    /// Returns `AnalyzerError::InvalidName` if a declared name is empty.
    pub fn declare(&mut self, declaration: impl Into<Declaration>) -> Result<()> {
        self.declarations += 1;
        match declaration.into() {
            Declaration::Type(decl) => match decl.body {
                TypeBody::Enum { .. } => self.declare_enum(decl),
                TypeBody::Struct { .. } => self.declare_struct(decl),
            },
            Declaration::Service(decl) => self.declare_service(decl),
            Declaration::Document(decl) => {
                self.declare_document(decl);
                Ok(())
            }
        }
    }

    /// Processes every declaration of `declarations`.
    ///
    /// # Errors
    /// Stops at the first declaration that fails.
    pub fn declare_all<I, D>(&mut self, declarations: I) -> Result<()>
    where
        I: IntoIterator<Item = D>,
        D: Into<Declaration>,
    {
        for declaration in declarations {
            self.declare(declaration)?;
        }
        Ok(())
    }

    /// Resolves pending references, validates the model and parses constraints.
    ///
    /// # Errors
    /// Returns `AnalyzerError::CircularInheritance` if an inheritance chain loops.
    pub fn build(self) -> Result<Analysis> {
        let Self {
            mut model,
            types,
            services,
            constraints,
            mut diagnostics,
            parser,
            declarations,
        } = self;

        tracing::debug!(
            "processed {} declarations, fixing up {} type and {} service references",
            declarations,
            types.pending(),
            services.pending()
        );
        let unresolved = types.fixup(&mut model, &mut diagnostics)
            + services.fixup(&mut model, &mut diagnostics);

        check_inheritance(&model)?;

        let queued = constraints.len();
        let parsed = constraints.drain(&mut model, parser.as_deref(), &mut diagnostics);

        tracing::info!(
            "model built: {} types, {} services, {} unresolved references, {}/{} constraints parsed",
            model.types().count(),
            model.services().count(),
            unresolved,
            parsed,
            queued
        );
        Ok(Analysis { model, diagnostics })
    }

    // Types

    fn declare_enum(&mut self, decl: TypeDecl) -> Result<()> {
        let TypeBody::Enum { constants } = decl.body else {
            return Ok(());
        };
        let name = parse_name("type", &decl.name)?;
        let module = self.module(&decl.namespace);

        let mut ty = EnumType::new(concept(name, &decl.meta));
        ty.module = module;
        let id = self.model.alloc_type(Type::Enum(ty));

        let values = constants
            .iter()
            .map(|c| enum_value(c, id))
            .collect::<Result<Vec<_>>>()?;
        if let Some(e) = self.model.ty_mut(id).as_enum_mut() {
            e.values = values;
        }

        self.register_type(id);
        Ok(())
    }

    fn declare_struct(&mut self, decl: TypeDecl) -> Result<()> {
        let TypeBody::Struct { supertype, members } = decl.body else {
            return Ok(());
        };
        let name = parse_name("type", &decl.name)?;
        let module = self.module(&decl.namespace);

        let mut ty = StructType::new(concept(name, &decl.meta));
        ty.module = module;
        let id = self.model.alloc_type(Type::Struct(ty));
        if !self.register_type(id) {
            return Ok(());
        }

        if let Some(base) = supertype.base_name() {
            let base_name = parse_name("type", base)?;
            let base = self
                .types
                .resolve(&mut self.model, &base_name, TypeSlot::StructBase(id));
            if let Some(s) = self.model.ty_mut(id).as_struct_mut() {
                s.base = Some(base);
            }
        }

        for member in &members {
            self.declare_member(id, member)?;
        }
        Ok(())
    }

    fn declare_member(&mut self, owner: TypeId, decl: &MemberDecl) -> Result<()> {
        let name = parse_name("member", &decl.name)?;
        let kind = if decl.link {
            MemberKind::Link
        } else {
            MemberKind::Attribute
        };

        let index = self.model.ty(owner).as_struct().map_or(0, |s| match kind {
            MemberKind::Attribute => s.attributes.len(),
            MemberKind::Link => s.links.len(),
        });
        let slot = match kind {
            MemberKind::Attribute => TypeSlot::Attribute { owner, index },
            MemberKind::Link => TypeSlot::Link { owner, index },
        };
        let ty = self.type_ref(&decl.ty, slot);

        let member = StructMember {
            concept: concept(name, &decl.meta),
            kind,
            ty,
            declaring_type: owner,
        };
        if let Some(s) = self.model.ty_mut(owner).as_struct_mut() {
            match kind {
                MemberKind::Attribute => s.attributes.push(member),
                MemberKind::Link => s.links.push(member),
            }
        }
        Ok(())
    }

    /// Returns true if the type was registered.
    fn register_type(&mut self, id: TypeId) -> bool {
        match self.model.add_type(id) {
            Ok(()) => true,
            Err(e) => {
                self.report_model_error(&e);
                false
            }
        }
    }

    /// Resolves a type reference, going through the interned list types for arrays.
    fn type_ref(&mut self, decl: &TypeRefDecl, slot: TypeSlot) -> TypeId {
        let name = self.type_name(&decl.name);
        if decl.array {
            let Self { model, types, .. } = self;
            model.intern_list(&name, |model, list| {
                types.resolve(model, &name, TypeSlot::ListElement(list))
            })
        } else {
            self.types.resolve(&mut self.model, &name, slot)
        }
    }

    /// Canonical name of a referenced type, mapping scalar synonyms to the primitives.
    fn type_name(&self, text: &str) -> Name {
        let primitive = match text {
            "Boolean" | "bool" => Some(self.model.boolean_type()),
            "Double" | "Float" | "double" | "float" => Some(self.model.decimal_type()),
            _ => None,
        };
        match primitive {
            Some(id) => self.model.ty(id).name().clone(),
            None => Name::from_case(text),
        }
    }

    // Services

    fn declare_service(&mut self, decl: ServiceDecl) -> Result<()> {
        let name = parse_name("service", strip_service_suffix(&decl.name))?;
        let mut service = DefinedService::new(concept(name, &decl.meta));
        service.module = self.module(&decl.namespace);
        let id = self.model.alloc_service(service);
        if let Err(e) = self.model.add_service(id) {
            self.report_model_error(&e);
            return Ok(());
        }

        if let Some(base) = decl.supertype.base_name() {
            let base_name = parse_name("service", strip_service_suffix(base))?;
            let base = self
                .services
                .resolve(&mut self.model, &base_name, ServiceSlot::Base(id));
            if let Some(s) = self.model.service_mut(id).as_defined_mut() {
                s.base = Some(base);
            }
        }

        for method in &decl.methods {
            self.declare_method(id, method)?;
        }
        for locator in &decl.locators {
            self.declare_locator(id, locator)?;
        }

        if decl.root {
            if let Some(previous) = self.model.set_root(id) {
                let message = format!(
                    "root service '{}' replaced with '{}'",
                    self.model.service(previous).name(),
                    self.model.service(id).name()
                );
                self.diagnostics.report(DiagnosticKind::RootReplaced, message);
            }
        }
        Ok(())
    }

    fn declare_method(&mut self, service: ServiceId, decl: &MethodDecl) -> Result<()> {
        let name = parse_name("method", &decl.name)?;
        let Some(defined) = self.model.service_mut(service).as_defined_mut() else {
            return Ok(());
        };
        let position = MethodRef {
            service,
            index: defined.methods.len(),
        };
        defined.methods.push(Method {
            concept: concept(name, &decl.meta),
            service,
            parameters: Vec::new(),
            constraints: Vec::new(),
        });

        for (index, parameter) in decl.parameters.iter().enumerate() {
            let slot = TypeSlot::MethodParameter {
                method: position,
                index,
            };
            let parameter = self.parameter(parameter, slot)?;
            if let Some(method) = self.model.method_mut(position) {
                method.parameters.push(parameter);
            }
        }

        for (index, constraint) in decl.constraints.iter().enumerate() {
            let constraint = self.constraint(constraint, position)?;
            if let Some(method) = self.model.method_mut(position) {
                method.constraints.push(constraint);
                self.constraints.push(ConstraintRef {
                    method: position,
                    index,
                });
            }
        }
        Ok(())
    }

    fn declare_locator(&mut self, service: ServiceId, decl: &LocatorDecl) -> Result<()> {
        let name = parse_name("locator", &decl.name)?;
        let target_name = parse_name("service", strip_service_suffix(&decl.service))?;
        let locator = self
            .model
            .service(service)
            .as_defined()
            .map_or(0, |s| s.locators.len());

        let target = self.services.resolve(
            &mut self.model,
            &target_name,
            ServiceSlot::Locator {
                service,
                index: locator,
            },
        );

        let parameters = decl
            .parameters
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let slot = TypeSlot::LocatorParameter {
                    service,
                    locator,
                    index,
                };
                self.parameter(p, slot)
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(s) = self.model.service_mut(service).as_defined_mut() {
            s.locators.push(Locator {
                concept: concept(name, &decl.meta),
                service: target,
                parameters,
            });
        }
        Ok(())
    }

    fn parameter(&mut self, decl: &ParameterDecl, slot: TypeSlot) -> Result<Parameter> {
        let name = parse_name("parameter", &decl.name)?;
        let ty = self.type_ref(&decl.ty, slot);
        Ok(Parameter {
            concept: concept(name, &decl.meta),
            ty,
            direction: decl.direction,
        })
    }

    fn constraint(&self, decl: &ConstraintDecl, method: MethodRef) -> Result<Constraint> {
        let name = parse_name("constraint", &decl.name)?;
        let mut concept = concept(name, &decl.meta);
        concept.source = Some(decl.source.clone());
        Ok(Constraint {
            concept,
            direction: decl.direction,
            source: decl.source.clone(),
            method,
            expression: None,
        })
    }

    // Modules and documents

    fn module(&mut self, namespace: &str) -> Option<ModuleId> {
        let name = Name::from_separator(namespace, '.');
        if name.is_empty() {
            return None;
        }
        Some(self.model.intern_module(&name))
    }

    fn declare_document(&mut self, decl: DocumentDecl) {
        let path = Path::new(&decl.file_name);
        let base = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&decl.file_name);

        let (prefix, rest) = match base.find('-') {
            Some(index) if index > 0 => (Some(&base[..index]), &base[index + 1..]),
            _ => (None, base),
        };

        let mut name = Name::from_case(rest);
        let mut appendix = false;
        if let Some(prefix) = prefix {
            name = name.with_prefix(prefix);
            appendix = prefix.chars().next().is_some_and(char::is_alphabetic);
        }

        tracing::debug!("document '{}' (appendix: {})", name, appendix);
        self.model.add_document(Document {
            name,
            source: decl.source,
            appendix,
        });
    }

    fn report_model_error(&mut self, error: &ModelError) {
        let kind = match error {
            ModelError::DuplicateService { .. } => DiagnosticKind::DuplicateService,
            _ => DiagnosticKind::DuplicateType,
        };
        self.diagnostics.report(kind, error.to_string());
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a model from a complete set of declarations.
///
/// # Errors
/// Returns `AnalyzerError` if a declaration is invalid or an inheritance
/// chain loops.
pub fn analyze<I, D>(declarations: I) -> Result<Analysis>
where
    I: IntoIterator<Item = D>,
    D: Into<Declaration>,
{
    let mut builder = ModelBuilder::new();
    builder.declare_all(declarations)?;
    builder.build()
}

fn parse_name(kind: &'static str, text: &str) -> Result<Name> {
    let name = Name::from_case(text);
    if name.is_empty() {
        return Err(AnalyzerError::invalid_name(kind, text));
    }
    Ok(name)
}

fn strip_service_suffix(text: &str) -> &str {
    match text.strip_suffix(SERVICE_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => text,
    }
}

fn enum_value(decl: &ConstantDecl, declaring_type: TypeId) -> Result<EnumValue> {
    let name = Name::from_separator(&decl.name, ENUM_SEPARATOR);
    if name.is_empty() {
        return Err(AnalyzerError::invalid_name("enum value", &decl.name));
    }
    Ok(EnumValue {
        concept: concept(name, &decl.meta),
        declaring_type,
    })
}

/// Builds the concept of a declaration: documentation, annotations, and the
/// synthetic annotations made from documentation tags.
fn concept(name: Name, meta: &DeclMeta) -> Concept {
    let mut concept = Concept::new(name);
    concept.set_doc(meta.doc.as_deref());
    concept.source = meta.source.clone().filter(|s| !s.is_empty());
    for annotation in &meta.annotations {
        concept.add_annotation(explicit_annotation(annotation));
    }
    for tag in &meta.tags {
        tag_annotation(&mut concept, tag);
    }
    concept
}

fn explicit_annotation(decl: &AnnotationDecl) -> Annotation {
    let mut annotation = Annotation::new(Name::from_case(&decl.name));
    for (name, values) in &decl.parameters {
        annotation
            .parameter_entry(Name::from_case(name))
            .values
            .extend(values.iter().map(|v| unquote(v).to_string()));
    }
    annotation
}

fn tag_annotation(concept: &mut Concept, tag: &DocTag) {
    let annotation = concept.annotation_entry(Name::from_case(&tag.name));
    // Blank values are dropped, others are kept verbatim.
    let value = tag.value.as_deref().filter(|v| !v.trim().is_empty());
    if let Some(value) = value {
        annotation
            .parameter_entry(Name::from_case(VALUE_PARAMETER))
            .values
            .push(value.to_string());
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
