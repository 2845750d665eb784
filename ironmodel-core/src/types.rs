//! Type definitions of the model.
//!
//! Types form a closed set of variants: primitives, structs, enums, lists and
//! undefined placeholders. Cross references between types are [`TypeId`]s
//! into the arena owned by [`crate::Model`].

use crate::concepts::{Concept, ModuleId};
use crate::name::Name;

/// Identifier of a type inside a [`crate::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Returns the arena index of the type.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Well-known primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    /// Boolean values.
    Boolean,
    /// Text.
    String,
    /// Integer numbers.
    Integer,
    /// Decimal (floating point) numbers.
    Decimal,
    /// Dates and times.
    Date,
}

impl PrimitiveKind {
    /// All primitive kinds, in registration order.
    pub const ALL: [Self; 5] = [
        Self::Boolean,
        Self::String,
        Self::Integer,
        Self::Decimal,
        Self::Date,
    ];

    /// Returns the fixed name under which the primitive is registered.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
        }
    }
}

/// Primitive type.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    /// Concept data.
    pub concept: Concept,
    /// Which primitive this is.
    pub kind: PrimitiveKind,
}

impl PrimitiveType {
    /// Creates the primitive type for the given kind.
    #[must_use]
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            concept: Concept::new(Name::from_case(kind.type_name())),
            kind,
        }
    }
}

/// Whether a struct member embeds a value or references another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Embedded value.
    Attribute,
    /// Reference to another entity.
    Link,
}

/// Attribute or link declared by a struct type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    /// Concept data.
    pub concept: Concept,
    /// Attribute or link.
    pub kind: MemberKind,
    /// Type of the member.
    pub ty: TypeId,
    /// Struct that declares the member.
    pub declaring_type: TypeId,
}

impl StructMember {
    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.concept.name
    }
}

/// Structured type with single inheritance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructType {
    /// Concept data.
    pub concept: Concept,
    /// Module the type belongs to.
    pub module: Option<ModuleId>,
    /// Base type, if any.
    pub base: Option<TypeId>,
    /// Declared attributes, in declaration order.
    pub attributes: Vec<StructMember>,
    /// Declared links, in declaration order.
    pub links: Vec<StructMember>,
}

impl StructType {
    /// Creates a struct without base or members.
    #[must_use]
    pub fn new(concept: Concept) -> Self {
        Self {
            concept,
            ..Self::default()
        }
    }

    /// Iterates all declared members, attributes first.
    pub fn members(&self) -> impl Iterator<Item = &StructMember> {
        self.attributes.iter().chain(self.links.iter())
    }

    /// Looks up a declared member by name.
    #[must_use]
    pub fn member(&self, name: &Name) -> Option<&StructMember> {
        self.members().find(|m| m.name() == name)
    }
}

/// Value of an enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Concept data.
    pub concept: Concept,
    /// Enum that declares the value.
    pub declaring_type: TypeId,
}

impl EnumValue {
    /// Returns the value name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.concept.name
    }

    /// Returns the lowercase, underscore separated token.
    #[must_use]
    pub fn lower_token(&self) -> String {
        self.concept.name.join("_").to_lowercase()
    }

    /// Returns the uppercase, underscore separated token.
    #[must_use]
    pub fn upper_token(&self) -> String {
        self.concept.name.join("_").to_uppercase()
    }
}

/// Enumerated type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumType {
    /// Concept data.
    pub concept: Concept,
    /// Module the type belongs to.
    pub module: Option<ModuleId>,
    /// Values, in declaration order.
    pub values: Vec<EnumValue>,
}

impl EnumType {
    /// Creates an enum without values.
    #[must_use]
    pub fn new(concept: Concept) -> Self {
        Self {
            concept,
            ..Self::default()
        }
    }
}

/// Anonymous collection type, interned by element type name.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    /// Name of the element type, also the interning key.
    pub element_name: Name,
    /// Element type.
    pub element: TypeId,
}

/// Placeholder for a type referenced before (or without) being declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedType {
    /// Referenced name.
    pub name: Name,
}

/// Type of the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Primitive type.
    Primitive(PrimitiveType),
    /// Struct type.
    Struct(StructType),
    /// Enum type.
    Enum(EnumType),
    /// List type.
    List(ListType),
    /// Unresolved placeholder.
    Undefined(UndefinedType),
}

impl Type {
    /// Returns the name of the type.
    ///
    /// Lists report the name of their element type.
    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            Self::Primitive(p) => &p.concept.name,
            Self::Struct(s) => &s.concept.name,
            Self::Enum(e) => &e.concept.name,
            Self::List(l) => &l.element_name,
            Self::Undefined(u) => &u.name,
        }
    }

    /// Returns the concept data, if the variant has any.
    #[must_use]
    pub fn concept(&self) -> Option<&Concept> {
        match self {
            Self::Primitive(p) => Some(&p.concept),
            Self::Struct(s) => Some(&s.concept),
            Self::Enum(e) => Some(&e.concept),
            Self::List(_) | Self::Undefined(_) => None,
        }
    }

    /// Returns the module the type belongs to.
    #[must_use]
    pub fn module(&self) -> Option<ModuleId> {
        match self {
            Self::Struct(s) => s.module,
            Self::Enum(e) => e.module,
            _ => None,
        }
    }

    /// Sets the module of struct and enum types. Other variants ignore it.
    pub fn set_module(&mut self, module: ModuleId) {
        match self {
            Self::Struct(s) => s.module = Some(module),
            Self::Enum(e) => e.module = Some(module),
            _ => {}
        }
    }

    /// Returns the struct definition, if this is a struct.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mutable struct definition, if this is a struct.
    pub fn as_struct_mut(&mut self) -> Option<&mut StructType> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the enum definition, if this is an enum.
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the mutable enum definition, if this is an enum.
    pub fn as_enum_mut(&mut self) -> Option<&mut EnumType> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the list definition, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns true if this is a primitive type.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns true if this is a struct type.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Returns true if this is an enum type.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// Returns true if this is a list type.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if this is an unresolved placeholder.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }

    /// Returns a short, lowercase label of the variant.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Struct(_) => "struct",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Undefined(_) => "undefined",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        let boolean = PrimitiveType::new(PrimitiveKind::Boolean);
        assert_eq!(boolean.concept.name, Name::from_case("boolean"));
        assert_eq!(PrimitiveKind::ALL.len(), 5);
    }

    #[test]
    fn test_enum_value_tokens() {
        let value = EnumValue {
            concept: Concept::new(Name::from_separator("READ_ONLY", '_')),
            declaring_type: TypeId(0),
        };
        assert_eq!(value.lower_token(), "read_only");
        assert_eq!(value.upper_token(), "READ_ONLY");
    }

    #[test]
    fn test_type_variant_queries() {
        let list = Type::List(ListType {
            element_name: Name::from_case("Disk"),
            element: TypeId(3),
        });
        assert!(list.is_list());
        assert!(list.concept().is_none());
        assert_eq!(list.name(), &Name::from_case("disk"));
        assert_eq!(list.kind_label(), "list");

        let undefined = Type::Undefined(UndefinedType {
            name: Name::from_case("Missing"),
        });
        assert!(undefined.is_undefined());
        assert!(undefined.as_struct().is_none());
    }

    #[test]
    fn test_struct_member_lookup() {
        let mut ty = StructType::new(Concept::new(Name::from_case("Vm")));
        ty.attributes.push(StructMember {
            concept: Concept::new(Name::from_case("name")),
            kind: MemberKind::Attribute,
            ty: TypeId(1),
            declaring_type: TypeId(0),
        });
        ty.links.push(StructMember {
            concept: Concept::new(Name::from_case("diskAttachments")),
            kind: MemberKind::Link,
            ty: TypeId(2),
            declaring_type: TypeId(0),
        });
        assert_eq!(ty.members().count(), 2);
        let link = ty
            .member(&Name::from_case("diskAttachments"))
            .expect("link missing");
        assert_eq!(link.kind, MemberKind::Link);
    }
}
