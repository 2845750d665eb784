//! Declaration tree consumed by the model builder.
//!
//! A front-end (source parser, test fixture, ...) describes the API as a flat
//! list of [`Declaration`]s. Names are kept as written in the source notation;
//! the builder canonicalizes them.

use ironmodel_core::Direction;

/// Documentation tag attached to a declaration, such as `@author` or `@date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name, without the leading marker.
    pub name: String,
    /// Tag text.
    pub value: Option<String>,
}

impl DocTag {
    /// Creates a tag with the given text.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Source annotation attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationDecl {
    /// Annotation name.
    pub name: String,
    /// Named parameters and their values, as written.
    pub parameters: Vec<(String, Vec<String>)>,
}

impl AnnotationDecl {
    /// Creates an annotation without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }
}

/// Data shared by every declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclMeta {
    /// Free-text documentation, without tags.
    pub doc: Option<String>,
    /// Documentation tags.
    pub tags: Vec<DocTag>,
    /// Source annotations, excluding the ones that drive the builder.
    pub annotations: Vec<AnnotationDecl>,
    /// Raw source text of the declaration.
    pub source: Option<String>,
}

impl DeclMeta {
    /// Creates metadata with only documentation.
    pub fn doc(text: impl Into<String>) -> Self {
        Self {
            doc: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Reference to a type, as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefDecl {
    /// Referenced type name.
    pub name: String,
    /// True if the reference is an array of the named type.
    pub array: bool,
}

impl TypeRefDecl {
    /// Reference to a single value of the named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            array: false,
        }
    }

    /// Reference to an array of the named type.
    pub fn array_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            array: true,
        }
    }
}

/// Stated supertype of a type or service declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Supertype {
    /// No supertype.
    #[default]
    None,
    /// Superclass of a class declaration.
    Class(String),
    /// Extended interfaces of an interface declaration.
    Interfaces(Vec<String>),
}

impl Supertype {
    /// Returns the name used as base: the superclass, or the first interface.
    #[must_use]
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Class(name) => Some(name),
            Self::Interfaces(names) => names.first().map(String::as_str),
        }
    }
}

/// Exposed operation of a data type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Member name.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Returned type.
    pub ty: TypeRefDecl,
    /// True if the member is tagged as a link.
    pub link: bool,
}

impl MemberDecl {
    /// Creates an attribute member.
    pub fn attribute(name: impl Into<String>, ty: TypeRefDecl) -> Self {
        Self {
            name: name.into(),
            meta: DeclMeta::default(),
            ty,
            link: false,
        }
    }

    /// Creates a link member.
    pub fn link(name: impl Into<String>, ty: TypeRefDecl) -> Self {
        Self {
            link: true,
            ..Self::attribute(name, ty)
        }
    }
}

/// Enumerated constant of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDecl {
    /// Constant name, usually upper case with underscores.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
}

impl ConstantDecl {
    /// Creates a constant.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: DeclMeta::default(),
        }
    }
}

/// Body of a data type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody {
    /// Structured type.
    Struct {
        /// Stated supertype.
        supertype: Supertype,
        /// Exposed operations, in declaration order.
        members: Vec<MemberDecl>,
    },
    /// Enumerated type.
    Enum {
        /// Constants, in declaration order.
        constants: Vec<ConstantDecl>,
    },
}

/// Declaration tagged as a data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Type name.
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Struct or enum body.
    pub body: TypeBody,
}

impl TypeDecl {
    /// Creates a struct declaration without supertype or members.
    pub fn structure(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            meta: DeclMeta::default(),
            body: TypeBody::Struct {
                supertype: Supertype::None,
                members: Vec::new(),
            },
        }
    }

    /// Creates an enum declaration from constant names.
    pub fn enumeration<I, S>(name: impl Into<String>, namespace: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            meta: DeclMeta::default(),
            body: TypeBody::Enum {
                constants: constants.into_iter().map(ConstantDecl::new).collect(),
            },
        }
    }

    /// Sets the supertype. Ignored for enums.
    #[must_use]
    pub fn extends(mut self, supertype: Supertype) -> Self {
        if let TypeBody::Struct { supertype: s, .. } = &mut self.body {
            *s = supertype;
        }
        self
    }

    /// Adds a member. Ignored for enums.
    #[must_use]
    pub fn with_member(mut self, member: MemberDecl) -> Self {
        if let TypeBody::Struct { members, .. } = &mut self.body {
            members.push(member);
        }
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: DeclMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Parameter of a method or locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    /// Parameter name.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Parameter type.
    pub ty: TypeRefDecl,
    /// Direction.
    pub direction: Direction,
}

impl ParameterDecl {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, ty: TypeRefDecl, direction: Direction) -> Self {
        Self {
            name: name.into(),
            meta: DeclMeta::default(),
            ty,
            direction,
        }
    }
}

/// Constraint operation of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDecl {
    /// Constraint name.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Whether the constraint applies to input or output.
    pub direction: Direction,
    /// Raw body of the constraint.
    pub source: String,
}

impl ConstraintDecl {
    /// Creates a constraint.
    pub fn new(name: impl Into<String>, direction: Direction, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: DeclMeta::default(),
            direction,
            source: source.into(),
        }
    }
}

/// Nested declaration describing a remote operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Parameters, in declaration order.
    pub parameters: Vec<ParameterDecl>,
    /// Constraints, in declaration order.
    pub constraints: Vec<ConstraintDecl>,
}

impl MethodDecl {
    /// Creates a method without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: ConstraintDecl) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Operation tagged as a sub-service accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorDecl {
    /// Locator name.
    pub name: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Parameters, in declaration order.
    pub parameters: Vec<ParameterDecl>,
    /// Returned service name, as written.
    pub service: String,
}

impl LocatorDecl {
    /// Creates a locator without parameters.
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: DeclMeta::default(),
            parameters: Vec::new(),
            service: service.into(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Declaration tagged as a service or as the root of the service tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    /// Service name, as written.
    pub name: String,
    /// Dotted namespace.
    pub namespace: String,
    /// Metadata.
    pub meta: DeclMeta,
    /// Stated supertype.
    pub supertype: Supertype,
    /// True if tagged as the root of the service tree.
    pub root: bool,
    /// Methods, in declaration order.
    pub methods: Vec<MethodDecl>,
    /// Locators, in declaration order.
    pub locators: Vec<LocatorDecl>,
}

impl ServiceDecl {
    /// Creates a service without members.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            meta: DeclMeta::default(),
            supertype: Supertype::None,
            root: false,
            methods: Vec::new(),
            locators: Vec::new(),
        }
    }

    /// Marks the service as root.
    #[must_use]
    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    /// Sets the supertype.
    #[must_use]
    pub fn extends(mut self, supertype: Supertype) -> Self {
        self.supertype = supertype;
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a locator.
    #[must_use]
    pub fn with_locator(mut self, locator: LocatorDecl) -> Self {
        self.locators.push(locator);
        self
    }
}

/// Free-standing document shipped with the model sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDecl {
    /// File name, optionally prefixed with an ordering token and a dash.
    pub file_name: String,
    /// Document text.
    pub source: String,
}

impl DocumentDecl {
    /// Creates a document.
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Data type.
    Type(TypeDecl),
    /// Service.
    Service(ServiceDecl),
    /// Document.
    Document(DocumentDecl),
}

impl From<TypeDecl> for Declaration {
    fn from(decl: TypeDecl) -> Self {
        Self::Type(decl)
    }
}

impl From<ServiceDecl> for Declaration {
    fn from(decl: ServiceDecl) -> Self {
        Self::Service(decl)
    }
}

impl From<DocumentDecl> for Declaration {
    fn from(decl: DocumentDecl) -> Self {
        Self::Document(decl)
    }
}
