//! Service definitions of the model.
//!
//! Services group remote operations ([`Method`]) and accessors to child
//! services ([`Locator`]). Like types, services are stored in the arena of
//! [`crate::Model`] and referenced by [`ServiceId`].

use crate::concepts::{Concept, ModuleId};
use crate::expression::Expression;
use crate::name::Name;
use crate::types::TypeId;

/// Identifier of a service inside a [`crate::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub(crate) usize);

impl ServiceId {
    /// Returns the arena index of the service.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Direction of a parameter or constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Sent by the caller.
    #[default]
    In,
    /// Returned to the caller.
    Out,
    /// Both sent and returned.
    InOut,
}

impl Direction {
    /// Builds a direction from separate input/output flags.
    #[must_use]
    pub const fn from_flags(input: bool, output: bool) -> Option<Self> {
        match (input, output) {
            (true, true) => Some(Self::InOut),
            (true, false) => Some(Self::In),
            (false, true) => Some(Self::Out),
            (false, false) => None,
        }
    }

    /// Returns true if the direction includes input.
    #[must_use]
    pub const fn is_in(&self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    /// Returns true if the direction includes output.
    #[must_use]
    pub const fn is_out(&self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

/// Parameter of a method or locator.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Concept data.
    pub concept: Concept,
    /// Parameter type.
    pub ty: TypeId,
    /// Parameter direction.
    pub direction: Direction,
}

impl Parameter {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.concept.name
    }
}

/// Position of a method inside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Service declaring the method.
    pub service: ServiceId,
    /// Index of the method in the service.
    pub index: usize,
}

/// Position of a constraint inside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintRef {
    /// Method declaring the constraint.
    pub method: MethodRef,
    /// Index of the constraint in the method.
    pub index: usize,
}

/// Constraint attached to a method.
///
/// The source is captured verbatim; `expression` is filled in after the whole
/// model is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Concept data.
    pub concept: Concept,
    /// Whether the constraint applies to input or output.
    pub direction: Direction,
    /// Raw constraint body.
    pub source: String,
    /// Method declaring the constraint.
    pub method: MethodRef,
    /// Parsed body.
    pub expression: Option<Expression>,
}

/// Remote operation of a service.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Concept data.
    pub concept: Concept,
    /// Service declaring the method.
    pub service: ServiceId,
    /// Parameters, in declaration order.
    pub parameters: Vec<Parameter>,
    /// Constraints, in declaration order.
    pub constraints: Vec<Constraint>,
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.concept.name
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &Name) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Iterates the input parameters.
    pub fn in_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.direction.is_in())
    }

    /// Iterates the output parameters.
    pub fn out_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.direction.is_out())
    }
}

/// Parameterised accessor from a service to a child service.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    /// Concept data.
    pub concept: Concept,
    /// Service returned by the locator.
    pub service: ServiceId,
    /// Parameters, in declaration order.
    pub parameters: Vec<Parameter>,
}

/// Fully declared service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinedService {
    /// Concept data.
    pub concept: Concept,
    /// Module the service belongs to.
    pub module: Option<ModuleId>,
    /// Base service, if any.
    pub base: Option<ServiceId>,
    /// Methods, in declaration order.
    pub methods: Vec<Method>,
    /// Locators, in declaration order.
    pub locators: Vec<Locator>,
}

impl DefinedService {
    /// Creates a service without base, methods or locators.
    #[must_use]
    pub fn new(concept: Concept) -> Self {
        Self {
            concept,
            ..Self::default()
        }
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &Name) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Looks up a locator by name.
    #[must_use]
    pub fn locator(&self, name: &Name) -> Option<&Locator> {
        self.locators.iter().find(|l| &l.concept.name == name)
    }
}

/// Placeholder for a service referenced before (or without) being declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedService {
    /// Referenced name.
    pub name: Name,
}

/// Service of the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Service {
    /// Declared service.
    Defined(DefinedService),
    /// Unresolved placeholder.
    Undefined(UndefinedService),
}

impl Service {
    /// Returns the name of the service.
    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            Self::Defined(s) => &s.concept.name,
            Self::Undefined(u) => &u.name,
        }
    }

    /// Returns the definition, if this is a declared service.
    #[must_use]
    pub fn as_defined(&self) -> Option<&DefinedService> {
        match self {
            Self::Defined(s) => Some(s),
            Self::Undefined(_) => None,
        }
    }

    /// Returns the mutable definition, if this is a declared service.
    pub fn as_defined_mut(&mut self) -> Option<&mut DefinedService> {
        match self {
            Self::Defined(s) => Some(s),
            Self::Undefined(_) => None,
        }
    }

    /// Returns true if this is an unresolved placeholder.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_flags() {
        assert_eq!(Direction::from_flags(true, true), Some(Direction::InOut));
        assert_eq!(Direction::from_flags(false, true), Some(Direction::Out));
        assert_eq!(Direction::from_flags(false, false), None);
        assert!(Direction::InOut.is_in());
        assert!(Direction::InOut.is_out());
        assert!(!Direction::In.is_out());
    }

    #[test]
    fn test_method_parameter_filters() {
        let method = Method {
            concept: Concept::new(Name::from_case("add")),
            service: ServiceId(0),
            parameters: vec![
                Parameter {
                    concept: Concept::new(Name::from_case("vm")),
                    ty: TypeId(1),
                    direction: Direction::InOut,
                },
                Parameter {
                    concept: Concept::new(Name::from_case("async")),
                    ty: TypeId(2),
                    direction: Direction::In,
                },
            ],
            constraints: Vec::new(),
        };
        assert_eq!(method.in_parameters().count(), 2);
        assert_eq!(method.out_parameters().count(), 1);
        assert!(method.parameter(&Name::from_case("vm")).is_some());
    }

    #[test]
    fn test_undefined_service_name() {
        let service = Service::Undefined(UndefinedService {
            name: Name::from_case("Vms"),
        });
        assert!(service.is_undefined());
        assert!(service.as_defined().is_none());
        assert_eq!(service.name().to_string(), "vms");
    }
}
