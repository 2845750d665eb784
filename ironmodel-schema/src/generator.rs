//! XML schema generation.
//!
//! The generator copies a base schema document to the output unchanged and
//! injects the definitions derived from the model right before the end of its
//! root element. Everything is emitted in name order so that the same model
//! always produces the same bytes.

use crate::error::{Result, SchemaError};
use crate::exceptions::{MemberTypeOverrides, default_member_types, default_without_collection};
use crate::names::{AttributeSet, DefaultNaming, EnglishPluralizer, MemberClassifier, Pluralizer, SchemaNaming};
use crate::writer::{JAXB_NAMESPACE, XS_NAMESPACE, XsdWriter};
use ironmodel_core::{
    DiagnosticKind, Diagnostics, EnumType, Model, Name, PrimitiveKind, StructMember, StructType,
    Type, TypeId,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// Minimal base document: an empty `xs:schema` root with both namespaces.
pub const DEFAULT_BASE_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:jaxb="http://java.sun.com/xml/ns/jaxb" jaxb:version="2.0" version="1.0"/>
"#;

const UNBOUNDED: &str = "unbounded";

/// Output of a schema generation.
#[derive(Debug)]
pub struct GeneratedSchema {
    /// Complete schema document.
    pub xml: String,
    /// Members and bases that couldn't be rendered.
    pub diagnostics: Diagnostics,
}

/// Types the layout of the schema is organized around.
#[derive(Debug, Clone, Copy)]
struct Anchors {
    identified: TypeId,
    api: TypeId,
}

/// Generates an XML schema with JAXB customizations from a model.
pub struct SchemaGenerator<'a> {
    model: &'a Model,
    identified: Name,
    api: Name,
    base_resource: String,
    base_resources: String,
    naming: Box<dyn SchemaNaming + 'a>,
    pluralizer: Box<dyn Pluralizer + 'a>,
    classifier: Box<dyn MemberClassifier + 'a>,
    member_types: MemberTypeOverrides,
    without_collection: BTreeSet<Name>,
}

impl<'a> SchemaGenerator<'a> {
    /// Creates a generator with the default naming rules and exceptions.
    #[must_use]
    pub fn new(model: &'a Model) -> Self {
        Self::builder(model).build()
    }

    /// Creates a builder to customize the generator.
    #[must_use]
    pub fn builder(model: &'a Model) -> SchemaGeneratorBuilder<'a> {
        SchemaGeneratorBuilder::new(model)
    }

    /// Generates the schema, hosting the definitions in `base`.
    ///
    /// # Errors
    /// Returns `SchemaError` if a required type is missing or the base
    /// document can't be read.
    pub fn generate(&self, base: &str) -> Result<GeneratedSchema> {
        let mut out = Vec::new();
        let diagnostics = self.write_schema(base, &mut out)?;
        let xml = String::from_utf8(out).map_err(|e| e.utf8_error())?;
        Ok(GeneratedSchema { xml, diagnostics })
    }

    /// Generates the schema using [`DEFAULT_BASE_SCHEMA`] as base document.
    ///
    /// # Errors
    /// Returns `SchemaError` if a required type is missing.
    pub fn generate_standalone(&self) -> Result<GeneratedSchema> {
        self.generate(DEFAULT_BASE_SCHEMA)
    }

    /// Reads the base document from `base_path` and writes the schema to
    /// `out_path`, creating missing parent directories.
    ///
    /// # Errors
    /// Returns `SchemaError` if a file can't be accessed or generation fails.
    pub fn generate_to_file(&self, base_path: &Path, out_path: &Path) -> Result<Diagnostics> {
        let base = std::fs::read_to_string(base_path)
            .map_err(|e| SchemaError::file(base_path, e))?;
        let generated = self.generate(&base)?;

        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SchemaError::file(parent, e))?;
        }
        std::fs::write(out_path, generated.xml).map_err(|e| SchemaError::file(out_path, e))?;

        tracing::info!("wrote XML schema to {}", out_path.display());
        Ok(generated.diagnostics)
    }

    /// Streams the schema to `out`, returning the diagnostics of the run.
    ///
    /// The base document is copied byte for byte. Only missing namespace
    /// declarations are added to its root start tag.
    ///
    /// # Errors
    /// Returns `SchemaError` if a required type is missing, the base document
    /// is malformed or writing fails.
    pub fn write_schema<W: Write>(&self, base: &str, mut out: W) -> Result<Diagnostics> {
        let anchors = self.anchors()?;
        let root = locate_root(base)?;

        let mut diagnostics = Diagnostics::new();
        let mut writer = XsdWriter::new(Vec::new());
        self.write_definitions(&mut writer, anchors, &mut diagnostics)?;
        let definitions = writer.into_inner();

        out.write_all(base[..root.open_end].as_bytes())?;
        for (prefix, uri) in &root.missing_namespaces {
            write!(out, r#" {prefix}="{uri}""#)?;
        }
        match root.close.filter(|_| !root.self_closing) {
            Some(close) => {
                let content = &base[root.open_end..close];
                out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                out.write_all(&definitions)?;
                out.write_all(b"\n")?;
                out.write_all(base[close..].as_bytes())?;
            }
            None => {
                out.write_all(b">\n")?;
                out.write_all(&definitions)?;
                write!(out, "\n</{}>", root.name)?;
                out.write_all(base[root.end..].as_bytes())?;
            }
        }
        out.flush()?;
        Ok(diagnostics)
    }

    fn anchors(&self) -> Result<Anchors> {
        let lookup = |role: &'static str, name: &Name| {
            self.model
                .get_type(name)
                .ok_or_else(|| SchemaError::missing_type(role, name.to_string()))
        };
        Ok(Anchors {
            identified: lookup("identified", &self.identified)?,
            api: lookup("api", &self.api)?,
        })
    }

    fn write_definitions<W: Write>(
        &self,
        w: &mut XsdWriter<W>,
        anchors: Anchors,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        self.write_actions(w)?;

        let enums: Vec<&EnumType> = self.model.enums().map(|(_, e)| e).collect();
        self.write_enum_values(w, &enums)?;
        for ty in &enums {
            self.write_enum(w, ty)?;
        }

        let mut structs = 0usize;
        for (id, ty) in self.model.structs() {
            if id == anchors.identified {
                continue;
            }
            self.write_struct(w, id, ty, anchors, diagnostics)?;
            structs += 1;
        }

        tracing::debug!(
            "generated schema definitions for {} enums and {} structs",
            enums.len(),
            structs
        );
        Ok(())
    }

    fn write_actions<W: Write>(&self, w: &mut XsdWriter<W>) -> Result<()> {
        w.start("xs:complexType", &[("name", "Actions")])?;
        w.start("xs:sequence", &[])?;
        w.start(
            "xs:element",
            &[("ref", "link"), ("minOccurs", "0"), ("maxOccurs", UNBOUNDED)],
        )?;
        w.jaxb("property", "Links")?;
        w.end("xs:element")?;
        w.end("xs:sequence")?;
        w.end("xs:complexType")
    }

    fn write_enum_values<W: Write>(&self, w: &mut XsdWriter<W>, enums: &[&EnumType]) -> Result<()> {
        w.start("xs:group", &[("name", "EnumValues")])?;
        w.start("xs:sequence", &[])?;
        for ty in enums {
            let name = &ty.concept.name;
            let tag = self.naming.tag_name(&self.pluralizer.plural(name));
            let values_type = self.values_type_name(name);
            w.empty(
                "xs:element",
                &[
                    ("name", tag.as_str()),
                    ("type", values_type.as_str()),
                    ("minOccurs", "1"),
                    ("maxOccurs", "1"),
                ],
            )?;
        }
        w.end("xs:sequence")?;
        w.end("xs:group")?;

        for ty in enums {
            let name = &ty.concept.name;
            let tag = self.naming.tag_name(name);
            let type_name = self.naming.type_name(name);
            let values_type = self.values_type_name(name);
            w.start("xs:complexType", &[("name", values_type.as_str())])?;
            w.start("xs:sequence", &[])?;
            w.empty(
                "xs:element",
                &[
                    ("name", tag.as_str()),
                    ("type", type_name.as_str()),
                    ("minOccurs", "0"),
                    ("maxOccurs", UNBOUNDED),
                ],
            )?;
            w.end("xs:sequence")?;
            w.end("xs:complexType")?;
        }
        Ok(())
    }

    fn write_enum<W: Write>(&self, w: &mut XsdWriter<W>, ty: &EnumType) -> Result<()> {
        let type_name = self.naming.type_name(&ty.concept.name);
        let string_type = self.naming.primitive_type_name(PrimitiveKind::String);

        let mut values: Vec<_> = ty.values.iter().collect();
        values.sort_by(|a, b| a.name().cmp(b.name()));

        w.start("xs:simpleType", &[("name", type_name.as_str())])?;
        w.start("xs:restriction", &[("base", string_type.as_str())])?;
        for value in values {
            let token = value.lower_token();
            w.start("xs:enumeration", &[("value", token.as_str())])?;
            w.jaxb("property", &value.upper_token())?;
            w.end("xs:enumeration")?;
        }
        w.end("xs:restriction")?;
        w.end("xs:simpleType")
    }

    fn write_struct<W: Write>(
        &self,
        w: &mut XsdWriter<W>,
        id: TypeId,
        ty: &StructType,
        anchors: Anchors,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let name = &ty.concept.name;
        let tag = self.naming.tag_name(name);
        let type_name = self.naming.type_name(name);
        let is_resource = id == anchors.api || self.model.is_extension(id, anchors.identified);

        w.empty(
            "xs:element",
            &[("name", tag.as_str()), ("type", type_name.as_str())],
        )?;

        let base = match ty.base {
            Some(base) if base != anchors.identified => {
                match self.model.ty(base).as_struct() {
                    Some(parent) => Some(self.naming.type_name(&parent.concept.name)),
                    None => {
                        diagnostics.report(
                            DiagnosticKind::UnresolvedBase,
                            format!(
                                "base '{}' of type '{}' isn't a struct, ignoring it",
                                self.model.ty(base).name(),
                                name
                            ),
                        );
                        is_resource.then(|| self.base_resource.clone())
                    }
                }
            }
            _ => is_resource.then(|| self.base_resource.clone()),
        };

        w.start("xs:complexType", &[("name", type_name.as_str())])?;
        if let Some(base) = &base {
            w.start("xs:complexContent", &[])?;
            w.start("xs:extension", &[("base", base.as_str())])?;
        }
        self.write_members(w, ty, diagnostics)?;
        if base.is_some() {
            w.end("xs:extension")?;
            w.end("xs:complexContent")?;
        }
        w.end("xs:complexType")?;

        if self.without_collection.contains(name) {
            return Ok(());
        }

        let plural = self.pluralizer.plural(name);
        let plural_tag = self.naming.tag_name(&plural);
        let plural_type = self.naming.type_name(&plural);

        w.empty(
            "xs:element",
            &[("name", plural_tag.as_str()), ("type", plural_type.as_str())],
        )?;
        w.start("xs:complexType", &[("name", plural_type.as_str())])?;
        if is_resource {
            w.start("xs:complexContent", &[])?;
            w.start("xs:extension", &[("base", self.base_resources.as_str())])?;
        }
        w.start("xs:sequence", &[])?;
        w.start(
            "xs:element",
            &[("ref", tag.as_str()), ("minOccurs", "0"), ("maxOccurs", UNBOUNDED)],
        )?;
        w.jaxb("property", &plural_type)?;
        w.end("xs:element")?;
        w.end("xs:sequence")?;
        if is_resource {
            w.end("xs:extension")?;
            w.end("xs:complexContent")?;
        }
        w.end("xs:complexType")
    }

    fn write_members<W: Write>(
        &self,
        w: &mut XsdWriter<W>,
        ty: &StructType,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let mut members: Vec<&StructMember> = ty.members().collect();
        members.sort_by(|a, b| a.name().cmp(b.name()));
        let (attributes, elements): (Vec<&StructMember>, Vec<&StructMember>) = members
            .into_iter()
            .partition(|m| self.classifier.is_attribute(m.name()));

        w.start("xs:sequence", &[])?;
        for member in elements {
            self.write_member_element(w, ty, member, diagnostics)?;
        }
        w.end("xs:sequence")?;

        for member in attributes {
            let tag = self.naming.tag_name(member.name());
            match self.member_type_name(ty, member, member.ty) {
                Some(schema_type) => w.empty(
                    "xs:attribute",
                    &[("name", tag.as_str()), ("type", schema_type.as_str())],
                )?,
                None => self.unrenderable(ty, member, diagnostics),
            }
        }
        Ok(())
    }

    fn write_member_element<W: Write>(
        &self,
        w: &mut XsdWriter<W>,
        owner: &StructType,
        member: &StructMember,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let tag = self.naming.tag_name(member.name());

        let Type::List(list) = self.model.ty(member.ty) else {
            return match self.member_type_name(owner, member, member.ty) {
                Some(schema_type) => w.empty(
                    "xs:element",
                    &[
                        ("name", tag.as_str()),
                        ("type", schema_type.as_str()),
                        ("minOccurs", "0"),
                        ("maxOccurs", "1"),
                    ],
                ),
                None => {
                    self.unrenderable(owner, member, diagnostics);
                    Ok(())
                }
            };
        };

        match self.model.ty(list.element) {
            Type::Primitive(_) | Type::Enum(_) => {
                let Some(element_type) = self.member_type_name(owner, member, list.element) else {
                    self.unrenderable(owner, member, diagnostics);
                    return Ok(());
                };
                let wrapper = self.naming.type_name(member.name());
                let element_tag = self
                    .naming
                    .tag_name(&self.pluralizer.singular(member.name()));

                w.start(
                    "xs:element",
                    &[("name", tag.as_str()), ("minOccurs", "0"), ("maxOccurs", "1")],
                )?;
                w.start("xs:complexType", &[])?;
                w.jaxb("class", &format!("{wrapper}List"))?;
                w.start("xs:sequence", &[])?;
                w.start(
                    "xs:element",
                    &[
                        ("name", element_tag.as_str()),
                        ("type", element_type.as_str()),
                        ("minOccurs", "0"),
                        ("maxOccurs", UNBOUNDED),
                    ],
                )?;
                w.jaxb("property", &wrapper)?;
                w.end("xs:element")?;
                w.end("xs:sequence")?;
                w.end("xs:complexType")?;
                w.end("xs:element")
            }
            Type::Struct(element) => {
                let collection = self
                    .naming
                    .type_name(&self.pluralizer.plural(&element.concept.name));
                w.empty(
                    "xs:element",
                    &[
                        ("name", tag.as_str()),
                        ("type", collection.as_str()),
                        ("minOccurs", "0"),
                        ("maxOccurs", "1"),
                    ],
                )
            }
            Type::List(_) | Type::Undefined(_) => {
                self.unrenderable(owner, member, diagnostics);
                Ok(())
            }
        }
    }

    /// Schema type of a member, preferring the override table.
    fn member_type_name(&self, owner: &StructType, member: &StructMember, ty: TypeId) -> Option<String> {
        let key = (owner.concept.name.clone(), member.name().clone());
        if let Some(schema_type) = self.member_types.get(&key) {
            return Some(schema_type.clone());
        }
        self.schema_type_name(ty)
    }

    /// Schema type of a model type. Lists and undefined types have none.
    fn schema_type_name(&self, ty: TypeId) -> Option<String> {
        match self.model.ty(ty) {
            Type::Primitive(p) => Some(self.naming.primitive_type_name(p.kind)),
            Type::Struct(s) => Some(self.naming.type_name(&s.concept.name)),
            Type::Enum(e) => Some(self.naming.type_name(&e.concept.name)),
            Type::List(_) | Type::Undefined(_) => None,
        }
    }

    fn values_type_name(&self, name: &Name) -> String {
        format!("{}Values", self.naming.type_name(name))
    }

    fn unrenderable(&self, owner: &StructType, member: &StructMember, diagnostics: &mut Diagnostics) {
        diagnostics.report(
            DiagnosticKind::UnrenderableMember,
            format!(
                "member '{}' of type '{}' has {} type '{}', skipping it",
                member.name(),
                owner.concept.name,
                self.model.ty(member.ty).kind_label(),
                self.model.ty(member.ty).name()
            ),
        );
    }
}

/// Byte offsets of the root element of a base document.
#[derive(Debug)]
struct RootSpan {
    name: String,
    /// Offset of the `>` or `/>` closing the root start tag.
    open_end: usize,
    self_closing: bool,
    /// Offset of the root end tag.
    close: Option<usize>,
    /// Offset right after the root element.
    end: usize,
    missing_namespaces: Vec<(&'static str, &'static str)>,
}

/// Finds the root element of `base` and checks that the document is well formed.
fn locate_root(base: &str) -> Result<RootSpan> {
    let mut reader = Reader::from_str(base);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut root: Option<RootSpan> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if depth == 0 => {
                let position = offset(reader.buffer_position())?;
                root = Some(root_span(root.is_some(), &e, position, false)?);
                depth += 1;
            }
            Event::Empty(e) if depth == 0 => {
                let position = offset(reader.buffer_position())?;
                root = Some(root_span(root.is_some(), &e, position, true)?);
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SchemaError::invalid_base("unbalanced end tag"))?;
                if depth == 0 {
                    let position = offset(reader.buffer_position())?;
                    if let Some(root) = root.as_mut() {
                        root.close = base[..position].rfind("</");
                        root.end = position;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or_else(|| SchemaError::invalid_base("the document has no root element"))?;
    if depth > 0 || (!root.self_closing && root.close.is_none()) {
        return Err(SchemaError::invalid_base(format!(
            "root element '{}' isn't closed",
            root.name
        )));
    }
    Ok(root)
}

/// Span of a root start tag that ends right before `end`.
fn root_span(
    seen: bool,
    start: &BytesStart<'_>,
    end: usize,
    self_closing: bool,
) -> Result<RootSpan> {
    if seen {
        return Err(SchemaError::invalid_base("more than one root element"));
    }
    let closer = if self_closing { "/>" } else { ">" };
    Ok(RootSpan {
        name: std::str::from_utf8(start.name().as_ref())?.to_string(),
        open_end: end.saturating_sub(closer.len()),
        self_closing,
        close: None,
        end,
        missing_namespaces: missing_namespaces(start),
    })
}

fn offset<P: TryInto<usize>>(position: P) -> Result<usize> {
    position
        .try_into()
        .map_err(|_| SchemaError::invalid_base("document is too large"))
}

/// Schema and JAXB namespace declarations the root lacks.
fn missing_namespaces(root: &BytesStart<'_>) -> Vec<(&'static str, &'static str)> {
    [("xmlns:xs", XS_NAMESPACE), ("xmlns:jaxb", JAXB_NAMESPACE)]
        .into_iter()
        .filter(|(prefix, _)| {
            !root
                .attributes()
                .flatten()
                .any(|a| a.key.as_ref() == prefix.as_bytes())
        })
        .collect()
}

/// Builder for [`SchemaGenerator`].
pub struct SchemaGeneratorBuilder<'a> {
    model: &'a Model,
    identified: Name,
    api: Name,
    base_resource: String,
    base_resources: String,
    naming: Box<dyn SchemaNaming + 'a>,
    pluralizer: Box<dyn Pluralizer + 'a>,
    classifier: Box<dyn MemberClassifier + 'a>,
    member_types: MemberTypeOverrides,
    without_collection: BTreeSet<Name>,
}

impl<'a> SchemaGeneratorBuilder<'a> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            identified: Name::from_case("Identified"),
            api: Name::from_case("Api"),
            base_resource: "BaseResource".to_string(),
            base_resources: "BaseResources".to_string(),
            naming: Box::new(DefaultNaming),
            pluralizer: Box::new(EnglishPluralizer),
            classifier: Box::new(AttributeSet::default()),
            member_types: default_member_types().clone(),
            without_collection: default_without_collection().clone(),
        }
    }

    /// Sets the name of the type every resource extends.
    #[must_use]
    pub fn identified_type(mut self, name: Name) -> Self {
        self.identified = name;
        self
    }

    /// Sets the name of the API entry point type.
    #[must_use]
    pub fn api_type(mut self, name: Name) -> Self {
        self.api = name;
        self
    }

    /// Sets the schema type every resource extends.
    #[must_use]
    pub fn base_resource(mut self, name: impl Into<String>) -> Self {
        self.base_resource = name.into();
        self
    }

    /// Sets the schema type every resource collection extends.
    #[must_use]
    pub fn base_resources(mut self, name: impl Into<String>) -> Self {
        self.base_resources = name.into();
        self
    }

    /// Sets the naming policy.
    #[must_use]
    pub fn naming(mut self, naming: impl SchemaNaming + 'a) -> Self {
        self.naming = Box::new(naming);
        self
    }

    /// Sets the pluralizer.
    #[must_use]
    pub fn pluralizer(mut self, pluralizer: impl Pluralizer + 'a) -> Self {
        self.pluralizer = Box::new(pluralizer);
        self
    }

    /// Sets the attribute classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: impl MemberClassifier + 'a) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replaces the member type overrides.
    #[must_use]
    pub fn member_type_overrides(mut self, member_types: MemberTypeOverrides) -> Self {
        self.member_types = member_types;
        self
    }

    /// Replaces the set of types emitted without a collection.
    #[must_use]
    pub fn types_without_collection(mut self, names: BTreeSet<Name>) -> Self {
        self.without_collection = names;
        self
    }

    /// Builds the generator.
    #[must_use]
    pub fn build(self) -> SchemaGenerator<'a> {
        SchemaGenerator {
            model: self.model,
            identified: self.identified,
            api: self.api,
            base_resource: self.base_resource,
            base_resources: self.base_resources,
            naming: self.naming,
            pluralizer: self.pluralizer,
            classifier: self.classifier,
            member_types: self.member_types,
            without_collection: self.without_collection,
        }
    }
}
