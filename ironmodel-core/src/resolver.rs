//! Forward-reference resolution.
//!
//! Declarations may reference types and services that haven't been declared
//! yet. A [`Resolver`] hands out the registered entity when the name is known,
//! or an undefined placeholder when it isn't, and remembers which slot of the
//! model received the placeholder. Once every declaration has been processed,
//! [`Resolver::fixup`] looks the pending names up again and patches the slots.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Model;
use crate::name::Name;
use crate::service::{MethodRef, ServiceId};
use crate::types::{Type, TypeId};
use std::fmt;
use std::marker::PhantomData;

/// Kind of entity a [`Resolver`] works with.
pub trait Reference {
    /// Identifier stored in the model.
    type Id: Copy;
    /// Location of a reference inside the model.
    type Slot: Copy + fmt::Debug;

    /// Diagnostic reported for names that can't be resolved.
    const UNRESOLVED: DiagnosticKind;
    /// Entity label used in messages.
    const LABEL: &'static str;

    /// Looks up a registered entity.
    fn lookup(model: &Model, name: &Name) -> Option<Self::Id>;

    /// Returns the placeholder for an unknown name.
    fn placeholder(model: &mut Model, name: &Name) -> Self::Id;

    /// Stores `id` in the given slot.
    fn assign(model: &mut Model, slot: Self::Slot, id: Self::Id);
}

/// Model location holding a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSlot {
    /// Base of a struct.
    StructBase(TypeId),
    /// Type of a struct attribute.
    Attribute {
        /// Struct declaring the attribute.
        owner: TypeId,
        /// Index in the attribute list.
        index: usize,
    },
    /// Type of a struct link.
    Link {
        /// Struct declaring the link.
        owner: TypeId,
        /// Index in the link list.
        index: usize,
    },
    /// Element of a list type.
    ListElement(TypeId),
    /// Type of a method parameter.
    MethodParameter {
        /// Method declaring the parameter.
        method: MethodRef,
        /// Index in the parameter list.
        index: usize,
    },
    /// Type of a locator parameter.
    LocatorParameter {
        /// Service declaring the locator.
        service: ServiceId,
        /// Index of the locator.
        locator: usize,
        /// Index in the parameter list.
        index: usize,
    },
}

/// Model location holding a service reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSlot {
    /// Base of a service.
    Base(ServiceId),
    /// Service returned by a locator.
    Locator {
        /// Service declaring the locator.
        service: ServiceId,
        /// Index of the locator.
        index: usize,
    },
}

/// Type references.
#[derive(Debug)]
pub struct TypeReference;

/// Service references.
#[derive(Debug)]
pub struct ServiceReference;

impl Reference for TypeReference {
    type Id = TypeId;
    type Slot = TypeSlot;

    const UNRESOLVED: DiagnosticKind = DiagnosticKind::UnresolvedType;
    const LABEL: &'static str = "type";

    fn lookup(model: &Model, name: &Name) -> Option<TypeId> {
        model.get_type(name)
    }

    fn placeholder(model: &mut Model, name: &Name) -> TypeId {
        model.undefined_type(name)
    }

    fn assign(model: &mut Model, slot: TypeSlot, id: TypeId) {
        let target = match slot {
            TypeSlot::StructBase(owner) => {
                if let Some(s) = model.ty_mut(owner).as_struct_mut() {
                    s.base = Some(id);
                }
                return;
            }
            TypeSlot::Attribute { owner, index } => model
                .ty_mut(owner)
                .as_struct_mut()
                .and_then(|s| s.attributes.get_mut(index))
                .map(|m| &mut m.ty),
            TypeSlot::Link { owner, index } => model
                .ty_mut(owner)
                .as_struct_mut()
                .and_then(|s| s.links.get_mut(index))
                .map(|m| &mut m.ty),
            TypeSlot::ListElement(list) => match model.ty_mut(list) {
                Type::List(l) => Some(&mut l.element),
                _ => None,
            },
            TypeSlot::MethodParameter { method, index } => model
                .method_mut(method)
                .and_then(|m| m.parameters.get_mut(index))
                .map(|p| &mut p.ty),
            TypeSlot::LocatorParameter {
                service,
                locator,
                index,
            } => model
                .service_mut(service)
                .as_defined_mut()
                .and_then(|s| s.locators.get_mut(locator))
                .and_then(|l| l.parameters.get_mut(index))
                .map(|p| &mut p.ty),
        };

        match target {
            Some(target) => *target = id,
            None => tracing::debug!("type slot {:?} no longer exists", slot),
        }
    }
}

impl Reference for ServiceReference {
    type Id = ServiceId;
    type Slot = ServiceSlot;

    const UNRESOLVED: DiagnosticKind = DiagnosticKind::UnresolvedService;
    const LABEL: &'static str = "service";

    fn lookup(model: &Model, name: &Name) -> Option<ServiceId> {
        model.get_service(name)
    }

    fn placeholder(model: &mut Model, name: &Name) -> ServiceId {
        model.undefined_service(name)
    }

    fn assign(model: &mut Model, slot: ServiceSlot, id: ServiceId) {
        let target = match slot {
            ServiceSlot::Base(service) => {
                if let Some(s) = model.service_mut(service).as_defined_mut() {
                    s.base = Some(id);
                }
                return;
            }
            ServiceSlot::Locator { service, index } => model
                .service_mut(service)
                .as_defined_mut()
                .and_then(|s| s.locators.get_mut(index))
                .map(|l| &mut l.service),
        };

        match target {
            Some(target) => *target = id,
            None => tracing::debug!("service slot {:?} no longer exists", slot),
        }
    }
}

/// Two-phase resolver for references of kind `R`.
pub struct Resolver<R: Reference> {
    pending: Vec<(Name, R::Slot)>,
    _kind: PhantomData<R>,
}

/// Resolver for type references.
pub type TypeResolver = Resolver<TypeReference>;

/// Resolver for service references.
pub type ServiceResolver = Resolver<ServiceReference>;

impl<R: Reference> Resolver<R> {
    /// Creates a resolver with no pending references.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Resolves `name`, returning the id to store in `slot`.
    ///
    /// Unknown names yield a placeholder, and the slot is patched again by
    /// [`Resolver::fixup`].
    pub fn resolve(&mut self, model: &mut Model, name: &Name, slot: R::Slot) -> R::Id {
        if let Some(id) = R::lookup(model, name) {
            return id;
        }
        tracing::trace!("deferring {} '{}' for {:?}", R::LABEL, name, slot);
        self.pending.push((name.clone(), slot));
        R::placeholder(model, name)
    }

    /// Number of references waiting for fixup.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Re-resolves every pending reference against the complete model.
    ///
    /// Names that are still unknown keep their placeholder and are reported
    /// once each. Returns the number of unresolved references.
    pub fn fixup(self, model: &mut Model, diagnostics: &mut Diagnostics) -> usize {
        let mut unresolved = 0;
        let mut reported: Vec<Name> = Vec::new();

        for (name, slot) in self.pending {
            match R::lookup(model, &name) {
                Some(id) => R::assign(model, slot, id),
                None => {
                    unresolved += 1;
                    if !reported.contains(&name) {
                        diagnostics.report(
                            R::UNRESOLVED,
                            format!("can't resolve {} '{}'", R::LABEL, name),
                        );
                        reported.push(name);
                    }
                }
            }
        }

        unresolved
    }
}

impl<R: Reference> Default for Resolver<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reference> fmt::Debug for Resolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("kind", &R::LABEL)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::Concept;
    use crate::service::{DefinedService, Locator};
    use crate::types::{MemberKind, StructMember, StructType};

    fn name(text: &str) -> Name {
        Name::from_case(text)
    }

    fn declare_struct(model: &mut Model, text: &str) -> TypeId {
        let id = model.alloc_type(Type::Struct(StructType::new(Concept::new(name(text)))));
        model.add_type(id).expect("Failed to add type");
        id
    }

    fn add_attribute(
        model: &mut Model,
        resolver: &mut TypeResolver,
        owner: TypeId,
        member: &str,
        ty: &str,
    ) {
        let index = model.ty(owner).as_struct().map_or(0, |s| s.attributes.len());
        let resolved = resolver.resolve(model, &name(ty), TypeSlot::Attribute { owner, index });
        if let Some(s) = model.ty_mut(owner).as_struct_mut() {
            s.attributes.push(StructMember {
                concept: Concept::new(name(member)),
                kind: MemberKind::Attribute,
                ty: resolved,
                declaring_type: owner,
            });
        }
    }

    fn attribute_type(model: &Model, owner: TypeId, member: &str) -> TypeId {
        model
            .ty(owner)
            .as_struct()
            .and_then(|s| s.member(&name(member)))
            .map(|m| m.ty)
            .expect("Failed to find member")
    }

    #[test]
    fn test_known_name_resolves_immediately() {
        let mut model = Model::new();
        let mut resolver = TypeResolver::new();
        let disk = declare_struct(&mut model, "Disk");
        let vm = declare_struct(&mut model, "Vm");

        add_attribute(&mut model, &mut resolver, vm, "disk", "Disk");

        assert_eq!(resolver.pending(), 0);
        assert_eq!(attribute_type(&model, vm, "disk"), disk);
    }

    #[test]
    fn test_forward_reference_is_fixed_up() {
        let mut model = Model::new();
        let mut resolver = TypeResolver::new();
        let vm = declare_struct(&mut model, "Vm");

        add_attribute(&mut model, &mut resolver, vm, "disk", "Disk");
        assert_eq!(resolver.pending(), 1);
        assert!(model.ty(attribute_type(&model, vm, "disk")).is_undefined());

        let disk = declare_struct(&mut model, "Disk");
        let mut diagnostics = Diagnostics::new();
        assert_eq!(resolver.fixup(&mut model, &mut diagnostics), 0);

        assert!(diagnostics.is_empty());
        assert_eq!(attribute_type(&model, vm, "disk"), disk);
        assert!(model.unresolved_types().is_empty());
    }

    #[test]
    fn test_circular_references_resolve() {
        let mut model = Model::new();
        let mut resolver = TypeResolver::new();
        let host = declare_struct(&mut model, "Host");
        add_attribute(&mut model, &mut resolver, host, "cluster", "Cluster");
        let cluster = declare_struct(&mut model, "Cluster");
        add_attribute(&mut model, &mut resolver, cluster, "host", "Host");

        let mut diagnostics = Diagnostics::new();
        resolver.fixup(&mut model, &mut diagnostics);

        assert_eq!(attribute_type(&model, host, "cluster"), cluster);
        assert_eq!(attribute_type(&model, cluster, "host"), host);
    }

    #[test]
    fn test_unresolved_name_keeps_placeholder() {
        let mut model = Model::new();
        let mut resolver = TypeResolver::new();
        let vm = declare_struct(&mut model, "Vm");
        add_attribute(&mut model, &mut resolver, vm, "disk", "Disk");
        add_attribute(&mut model, &mut resolver, vm, "boot_disk", "Disk");

        let mut diagnostics = Diagnostics::new();
        assert_eq!(resolver.fixup(&mut model, &mut diagnostics), 2);

        assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedType), 1);
        let placeholder = attribute_type(&model, vm, "disk");
        assert!(model.ty(placeholder).is_undefined());
        assert_eq!(model.ty(placeholder).name(), &name("Disk"));
        assert_eq!(attribute_type(&model, vm, "boot_disk"), placeholder);
        assert!(model.get_type(&name("Disk")).is_none());
        assert!(model.unresolved_types().contains(&name("Disk")));
    }

    #[test]
    fn test_struct_base_fixup() {
        let mut model = Model::new();
        let mut resolver = TypeResolver::new();
        let vm = declare_struct(&mut model, "Vm");
        let base = resolver.resolve(&mut model, &name("Identified"), TypeSlot::StructBase(vm));
        if let Some(s) = model.ty_mut(vm).as_struct_mut() {
            s.base = Some(base);
        }

        let identified = declare_struct(&mut model, "Identified");
        resolver.fixup(&mut model, &mut Diagnostics::new());

        assert!(model.is_extension(vm, identified));
    }

    #[test]
    fn test_service_locator_fixup() {
        let mut model = Model::new();
        let mut resolver = ServiceResolver::new();
        let system = model.alloc_service(DefinedService::new(Concept::new(name("System"))));
        model.add_service(system).expect("Failed to add service");

        let target = resolver.resolve(
            &mut model,
            &name("Vms"),
            ServiceSlot::Locator {
                service: system,
                index: 0,
            },
        );
        if let Some(s) = model.service_mut(system).as_defined_mut() {
            s.locators.push(Locator {
                concept: Concept::new(name("vms")),
                service: target,
                parameters: Vec::new(),
            });
        }
        assert!(model.service(target).is_undefined());

        let vms = model.alloc_service(DefinedService::new(Concept::new(name("Vms"))));
        model.add_service(vms).expect("Failed to add service");
        let mut diagnostics = Diagnostics::new();
        assert_eq!(resolver.fixup(&mut model, &mut diagnostics), 0);

        let located = model
            .service(system)
            .as_defined()
            .and_then(|s| s.locator(&name("vms")))
            .map(|l| l.service);
        assert_eq!(located, Some(vms));
        assert!(model.unresolved_services().is_empty());
    }

    #[test]
    fn test_unresolved_service_is_reported() {
        let mut model = Model::new();
        let mut resolver = ServiceResolver::new();
        let system = model.alloc_service(DefinedService::new(Concept::new(name("System"))));
        model.add_service(system).expect("Failed to add service");
        let base = resolver.resolve(&mut model, &name("Missing"), ServiceSlot::Base(system));
        if let Some(s) = model.service_mut(system).as_defined_mut() {
            s.base = Some(base);
        }

        let mut diagnostics = Diagnostics::new();
        resolver.fixup(&mut model, &mut diagnostics);

        assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedService), 1);
        assert!(model.unresolved_services().contains(&name("Missing")));
    }
}
