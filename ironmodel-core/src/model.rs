//! Model registry.
//!
//! The [`Model`] owns every type, service, module and document. Entities live
//! in arenas and are referenced by id; the registered ones are also indexed by
//! [`Name`]. Undefined placeholders and list types are kept in the arenas but
//! never indexed by name.

use crate::concepts::{Document, Module, ModuleId};
use crate::error::{ModelError, Result};
use crate::name::Name;
use crate::service::{
    Constraint, ConstraintRef, DefinedService, Method, MethodRef, Service, ServiceId,
    UndefinedService,
};
use crate::types::{
    EnumType, ListType, PrimitiveKind, PrimitiveType, StructType, Type, TypeId, UndefinedType,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Root aggregate of a compiled API model.
#[derive(Debug, Clone)]
pub struct Model {
    types: Vec<Type>,
    type_index: BTreeMap<Name, TypeId>,
    undefined_types: HashMap<Name, TypeId>,
    list_types: HashMap<Name, TypeId>,
    services: Vec<Service>,
    service_index: BTreeMap<Name, ServiceId>,
    undefined_services: HashMap<Name, ServiceId>,
    modules: Vec<Module>,
    module_index: BTreeMap<Name, ModuleId>,
    documents: Vec<Document>,
    root: Option<ServiceId>,
    primitives: [TypeId; 5],
}

impl Model {
    /// Creates a model containing only the well-known primitive types.
    #[must_use]
    pub fn new() -> Self {
        let mut model = Self {
            types: Vec::new(),
            type_index: BTreeMap::new(),
            undefined_types: HashMap::new(),
            list_types: HashMap::new(),
            services: Vec::new(),
            service_index: BTreeMap::new(),
            undefined_services: HashMap::new(),
            modules: Vec::new(),
            module_index: BTreeMap::new(),
            documents: Vec::new(),
            root: None,
            primitives: [TypeId(0); 5],
        };

        for (slot, kind) in PrimitiveKind::ALL.into_iter().enumerate() {
            let primitive = PrimitiveType::new(kind);
            let name = primitive.concept.name.clone();
            let id = model.alloc_type(Type::Primitive(primitive));
            model.type_index.insert(name, id);
            model.primitives[slot] = id;
        }

        model
    }

    /// Returns the id of a well-known primitive type.
    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        self.primitives[kind as usize]
    }

    /// Returns the boolean type.
    #[must_use]
    pub fn boolean_type(&self) -> TypeId {
        self.primitive(PrimitiveKind::Boolean)
    }

    /// Returns the string type.
    #[must_use]
    pub fn string_type(&self) -> TypeId {
        self.primitive(PrimitiveKind::String)
    }

    /// Returns the integer type.
    #[must_use]
    pub fn integer_type(&self) -> TypeId {
        self.primitive(PrimitiveKind::Integer)
    }

    /// Returns the decimal type.
    #[must_use]
    pub fn decimal_type(&self) -> TypeId {
        self.primitive(PrimitiveKind::Decimal)
    }

    /// Returns the date type.
    #[must_use]
    pub fn date_type(&self) -> TypeId {
        self.primitive(PrimitiveKind::Date)
    }

    // Types

    /// Returns the type with the given id.
    ///
    /// # Panics
    /// Panics if the id doesn't belong to this model.
    #[must_use]
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    /// Returns the mutable type with the given id.
    ///
    /// # Panics
    /// Panics if the id doesn't belong to this model.
    pub fn ty_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0]
    }

    /// Looks up a registered type by name.
    #[must_use]
    pub fn get_type(&self, name: &Name) -> Option<TypeId> {
        self.type_index.get(name).copied()
    }

    /// Stores a type in the arena without registering its name.
    pub fn alloc_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(ty);
        id
    }

    /// Registers an allocated type under its name.
    ///
    /// Registering the same id twice is a no-op.
    ///
    /// # Errors
    /// Returns `ModelError` if another type already uses the name, or if the
    /// type is an undefined placeholder or a list.
    pub fn add_type(&mut self, id: TypeId) -> Result<()> {
        let ty = &self.types[id.0];
        match ty {
            Type::Undefined(u) => return Err(ModelError::placeholder("type", &u.name)),
            Type::List(l) => {
                return Err(ModelError::ListInsert {
                    element: l.element_name.clone(),
                });
            }
            _ => {}
        }

        let name = ty.name().clone();
        let module = ty.module();
        match self.type_index.get(&name) {
            Some(&existing) if existing == id => Ok(()),
            Some(_) => Err(ModelError::duplicate_type(&name)),
            None => {
                self.type_index.insert(name, id);
                if let Some(module) = module {
                    self.modules[module.0].types.push(id);
                }
                Ok(())
            }
        }
    }

    /// Iterates the registered types in name order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.type_index.values().map(|&id| (id, &self.types[id.0]))
    }

    /// Iterates the registered struct types in name order.
    pub fn structs(&self) -> impl Iterator<Item = (TypeId, &StructType)> {
        self.types()
            .filter_map(|(id, ty)| ty.as_struct().map(|s| (id, s)))
    }

    /// Iterates the registered enum types in name order.
    pub fn enums(&self) -> impl Iterator<Item = (TypeId, &EnumType)> {
        self.types().filter_map(|(id, ty)| ty.as_enum().map(|e| (id, e)))
    }

    /// Returns the interned list type for the given element name, creating it
    /// if needed.
    ///
    /// When the list is created, `element` is called with the model and the
    /// new list id and must return the element type.
    pub fn intern_list<F>(&mut self, element_name: &Name, element: F) -> TypeId
    where
        F: FnOnce(&mut Self, TypeId) -> TypeId,
    {
        if let Some(&id) = self.list_types.get(element_name) {
            return id;
        }

        // The element is unknown until the factory runs.
        let pending = self.undefined_type(element_name);
        let id = self.alloc_type(Type::List(ListType {
            element_name: element_name.clone(),
            element: pending,
        }));
        self.list_types.insert(element_name.clone(), id);

        let element = element(self, id);
        if let Type::List(list) = &mut self.types[id.0] {
            list.element = element;
        }
        id
    }

    /// Looks up the interned list type for the given element name.
    #[must_use]
    pub fn list_type(&self, element_name: &Name) -> Option<TypeId> {
        self.list_types.get(element_name).copied()
    }

    /// Returns the number of interned list types.
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.list_types.len()
    }

    /// Returns the placeholder for an unknown type name.
    pub(crate) fn undefined_type(&mut self, name: &Name) -> TypeId {
        if let Some(&id) = self.undefined_types.get(name) {
            return id;
        }
        let id = self.alloc_type(Type::Undefined(UndefinedType { name: name.clone() }));
        self.undefined_types.insert(name.clone(), id);
        id
    }

    /// Returns true if `ty` transitively extends `ancestor`.
    #[must_use]
    pub fn is_extension(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut current = self.struct_base(ty);
        let mut steps = 0;
        while let Some(base) = current {
            if base == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.types.len() {
                return false;
            }
            current = self.struct_base(base);
        }
        false
    }

    fn struct_base(&self, id: TypeId) -> Option<TypeId> {
        self.types.get(id.0)?.as_struct()?.base
    }

    // Services

    /// Returns the service with the given id.
    ///
    /// # Panics
    /// Panics if the id doesn't belong to this model.
    #[must_use]
    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.0]
    }

    /// Returns the mutable service with the given id.
    ///
    /// # Panics
    /// Panics if the id doesn't belong to this model.
    pub fn service_mut(&mut self, id: ServiceId) -> &mut Service {
        &mut self.services[id.0]
    }

    /// Looks up a registered service by name.
    #[must_use]
    pub fn get_service(&self, name: &Name) -> Option<ServiceId> {
        self.service_index.get(name).copied()
    }

    /// Stores a service in the arena without registering its name.
    pub fn alloc_service(&mut self, service: DefinedService) -> ServiceId {
        let id = ServiceId(self.services.len());
        self.services.push(Service::Defined(service));
        id
    }

    /// Registers an allocated service under its name.
    ///
    /// # Errors
    /// Returns `ModelError` if another service already uses the name, or if the
    /// service is an undefined placeholder.
    pub fn add_service(&mut self, id: ServiceId) -> Result<()> {
        let service = match &self.services[id.0] {
            Service::Defined(s) => s,
            Service::Undefined(u) => return Err(ModelError::placeholder("service", &u.name)),
        };

        let name = service.concept.name.clone();
        let module = service.module;
        match self.service_index.get(&name) {
            Some(&existing) if existing == id => Ok(()),
            Some(_) => Err(ModelError::duplicate_service(&name)),
            None => {
                self.service_index.insert(name, id);
                if let Some(module) = module {
                    self.modules[module.0].services.push(id);
                }
                Ok(())
            }
        }
    }

    /// Iterates the registered services in name order.
    pub fn services(&self) -> impl Iterator<Item = (ServiceId, &DefinedService)> {
        self.service_index
            .values()
            .filter_map(|&id| self.services[id.0].as_defined().map(|s| (id, s)))
    }

    /// Returns the placeholder for an unknown service name.
    pub(crate) fn undefined_service(&mut self, name: &Name) -> ServiceId {
        if let Some(&id) = self.undefined_services.get(name) {
            return id;
        }
        let id = ServiceId(self.services.len());
        self.services
            .push(Service::Undefined(UndefinedService { name: name.clone() }));
        self.undefined_services.insert(name.clone(), id);
        id
    }

    /// Returns the root service.
    #[must_use]
    pub fn root(&self) -> Option<ServiceId> {
        self.root
    }

    /// Sets the root service, returning the previous one.
    pub fn set_root(&mut self, id: ServiceId) -> Option<ServiceId> {
        self.root.replace(id)
    }

    /// Returns the method at the given position.
    #[must_use]
    pub fn method(&self, method: MethodRef) -> Option<&Method> {
        self.services
            .get(method.service.0)?
            .as_defined()?
            .methods
            .get(method.index)
    }

    /// Returns the mutable method at the given position.
    pub fn method_mut(&mut self, method: MethodRef) -> Option<&mut Method> {
        self.services
            .get_mut(method.service.0)?
            .as_defined_mut()?
            .methods
            .get_mut(method.index)
    }

    /// Returns the constraint at the given position.
    #[must_use]
    pub fn constraint(&self, constraint: ConstraintRef) -> Option<&Constraint> {
        self.method(constraint.method)?.constraints.get(constraint.index)
    }

    /// Returns the mutable constraint at the given position.
    pub fn constraint_mut(&mut self, constraint: ConstraintRef) -> Option<&mut Constraint> {
        self.method_mut(constraint.method)?
            .constraints
            .get_mut(constraint.index)
    }

    // Modules and documents

    /// Returns the module with the given id.
    ///
    /// # Panics
    /// Panics if the id doesn't belong to this model.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    /// Looks up a module by name.
    #[must_use]
    pub fn get_module(&self, name: &Name) -> Option<ModuleId> {
        self.module_index.get(name).copied()
    }

    /// Registers a module.
    ///
    /// # Errors
    /// Returns `ModelError::DuplicateModule` if the name is already used.
    pub fn add_module(&mut self, module: Module) -> Result<ModuleId> {
        if self.module_index.contains_key(&module.name) {
            return Err(ModelError::DuplicateModule { name: module.name });
        }
        let id = ModuleId(self.modules.len());
        self.module_index.insert(module.name.clone(), id);
        self.modules.push(module);
        Ok(id)
    }

    /// Returns the module with the given name, creating and registering it if needed.
    pub fn intern_module(&mut self, name: &Name) -> ModuleId {
        if let Some(id) = self.get_module(name) {
            return id;
        }
        let id = ModuleId(self.modules.len());
        self.module_index.insert(name.clone(), id);
        self.modules.push(Module::new(name.clone()));
        id
    }

    /// Iterates the modules in name order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.module_index.values().map(|&id| (id, &self.modules[id.0]))
    }

    /// Adds a document.
    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Returns the documents, sorted by name.
    #[must_use]
    pub fn documents(&self) -> Vec<&Document> {
        let mut documents: Vec<&Document> = self.documents.iter().collect();
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        documents
    }

    // Checks

    /// Returns the names of undefined types still referenced by registered
    /// types and services.
    #[must_use]
    pub fn unresolved_types(&self) -> BTreeSet<Name> {
        let mut names = BTreeSet::new();
        let mut check = |id: TypeId| {
            let mut ty = &self.types[id.0];
            if let Type::List(list) = ty {
                ty = &self.types[list.element.0];
            }
            if let Type::Undefined(u) = ty {
                names.insert(u.name.clone());
            }
        };

        for (_, ty) in self.types() {
            if let Type::Struct(s) = ty {
                s.base.into_iter().for_each(&mut check);
                s.members().for_each(|m| check(m.ty));
            }
        }
        for (_, service) in self.services() {
            for method in &service.methods {
                method.parameters.iter().for_each(|p| check(p.ty));
            }
            for locator in &service.locators {
                locator.parameters.iter().for_each(|p| check(p.ty));
            }
        }
        names
    }

    /// Returns the names of undefined services still referenced by registered services.
    #[must_use]
    pub fn unresolved_services(&self) -> BTreeSet<Name> {
        let mut names = BTreeSet::new();
        for (_, service) in self.services() {
            let referenced = service
                .base
                .into_iter()
                .chain(service.locators.iter().map(|l| l.service));
            for id in referenced {
                if let Service::Undefined(u) = &self.services[id.0] {
                    names.insert(u.name.clone());
                }
            }
        }
        names
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::Concept;

    fn alloc_struct(model: &mut Model, name: &str) -> TypeId {
        model.alloc_type(Type::Struct(StructType::new(Concept::new(Name::from_case(
            name,
        )))))
    }

    #[test]
    fn test_new_model_has_primitives() {
        let model = Model::new();
        assert_eq!(model.get_type(&Name::from_case("boolean")), Some(model.boolean_type()));
        assert_eq!(model.get_type(&Name::from_case("String")), Some(model.string_type()));
        assert!(model.ty(model.date_type()).is_primitive());
        assert_eq!(model.types().count(), 5);
    }

    #[test]
    fn test_add_type_and_lookup() {
        let mut model = Model::new();
        let vm = alloc_struct(&mut model, "Vm");
        assert!(model.get_type(&Name::from_case("Vm")).is_none());
        model.add_type(vm).expect("Failed to add type");
        assert_eq!(model.get_type(&Name::from_case("vm")), Some(vm));
        model.add_type(vm).expect("re-adding the same type is idempotent");
    }

    #[test]
    fn test_add_duplicate_type_fails() {
        let mut model = Model::new();
        let first = alloc_struct(&mut model, "Vm");
        let second = alloc_struct(&mut model, "Vm");
        model.add_type(first).expect("Failed to add type");
        let err = model.add_type(second).expect_err("duplicate accepted");
        assert!(matches!(err, ModelError::DuplicateType { .. }));
        assert_eq!(model.get_type(&Name::from_case("Vm")), Some(first));
    }

    #[test]
    fn test_add_placeholder_fails() {
        let mut model = Model::new();
        let placeholder = model.undefined_type(&Name::from_case("Disk"));
        let err = model.add_type(placeholder).expect_err("placeholder accepted");
        assert!(matches!(err, ModelError::PlaceholderInsert { .. }));
    }

    #[test]
    fn test_intern_list_is_unique_per_element_name() {
        let mut model = Model::new();
        let disk = alloc_struct(&mut model, "Disk");
        model.add_type(disk).expect("Failed to add type");
        let name = Name::from_case("Disk");

        let mut calls = 0;
        let first = model.intern_list(&name, |_, _| {
            calls += 1;
            disk
        });
        let second = model.intern_list(&name, |_, _| {
            calls += 1;
            disk
        });

        assert_eq!(first, second);
        assert_eq!(calls, 1);
        assert_eq!(model.list_count(), 1);
        assert_eq!(model.ty(first).as_list().map(|l| l.element), Some(disk));
    }

    #[test]
    fn test_intern_module_is_idempotent() {
        let mut model = Model::new();
        let name = Name::from_separator("types.vms", '.');
        let a = model.intern_module(&name);
        let b = model.intern_module(&name);
        assert_eq!(a, b);
        assert!(model.add_module(Module::new(name)).is_err());
        assert_eq!(model.modules().count(), 1);
    }

    #[test]
    fn test_module_collects_registered_types() {
        let mut model = Model::new();
        let module = model.intern_module(&Name::from_case("types"));
        let vm = alloc_struct(&mut model, "Vm");
        model.ty_mut(vm).set_module(module);
        model.add_type(vm).expect("Failed to add type");
        assert_eq!(model.module(module).types, vec![vm]);
    }

    #[test]
    fn test_is_extension() {
        let mut model = Model::new();
        let identified = alloc_struct(&mut model, "Identified");
        let base = alloc_struct(&mut model, "VmBase");
        let vm = alloc_struct(&mut model, "Vm");
        if let Some(s) = model.ty_mut(base).as_struct_mut() {
            s.base = Some(identified);
        }
        if let Some(s) = model.ty_mut(vm).as_struct_mut() {
            s.base = Some(base);
        }
        assert!(model.is_extension(vm, identified));
        assert!(model.is_extension(vm, base));
        assert!(!model.is_extension(identified, vm));
    }

    #[test]
    fn test_is_extension_terminates_on_cycle() {
        let mut model = Model::new();
        let a = alloc_struct(&mut model, "A");
        let b = alloc_struct(&mut model, "B");
        let other = alloc_struct(&mut model, "Other");
        if let Some(s) = model.ty_mut(a).as_struct_mut() {
            s.base = Some(b);
        }
        if let Some(s) = model.ty_mut(b).as_struct_mut() {
            s.base = Some(a);
        }
        assert!(!model.is_extension(a, other));
    }

    #[test]
    fn test_set_root_returns_previous() {
        let mut model = Model::new();
        let a = model.alloc_service(DefinedService::new(Concept::new(Name::from_case("System"))));
        let b = model.alloc_service(DefinedService::new(Concept::new(Name::from_case("Other"))));
        assert_eq!(model.set_root(a), None);
        assert_eq!(model.set_root(b), Some(a));
        assert_eq!(model.root(), Some(b));
    }

    #[test]
    fn test_documents_sorted_by_name() {
        let mut model = Model::new();
        for name in ["b", "a"] {
            model.add_document(Document {
                name: Name::from_case(name),
                source: String::new(),
                appendix: false,
            });
        }
        let names: Vec<String> = model.documents().iter().map(|d| d.name.to_string()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
