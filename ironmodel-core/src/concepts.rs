//! Named, documented and annotated concepts.
//!
//! Every entity of the model (types, members, services, methods, parameters,
//! constraints) embeds a [`Concept`] carrying its name, documentation,
//! annotations and optional raw source text.

use crate::name::Name;
use crate::service::ServiceId;
use crate::types::TypeId;
use std::collections::BTreeMap;

/// Name of the parameter that holds the text of documentation tags.
pub const VALUE_PARAMETER: &str = "value";

/// Common attributes of every model entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Concept {
    /// Canonical name.
    pub name: Name,
    /// Free-text documentation.
    pub doc: Option<String>,
    /// Annotations keyed by name.
    pub annotations: BTreeMap<Name, Annotation>,
    /// Raw source text the concept was built from.
    pub source: Option<String>,
}

impl Concept {
    /// Creates a concept with the given name and nothing else.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Sets the documentation, trimming it. Blank text clears it.
    pub fn set_doc(&mut self, text: Option<&str>) {
        self.doc = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    /// Looks up an annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &Name) -> Option<&Annotation> {
        self.annotations.get(name)
    }

    /// Adds an annotation, replacing any previous one with the same name.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Option<Annotation> {
        self.annotations.insert(annotation.name.clone(), annotation)
    }

    /// Returns the annotation with the given name, creating an empty one if needed.
    pub fn annotation_entry(&mut self, name: Name) -> &mut Annotation {
        self.annotations
            .entry(name.clone())
            .or_insert_with(|| Annotation::new(name))
    }
}

/// Annotation attached to a concept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Annotation name.
    pub name: Name,
    /// Parameters keyed by name.
    pub parameters: BTreeMap<Name, AnnotationParameter>,
}

impl Annotation {
    /// Creates an annotation without parameters.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            parameters: BTreeMap::new(),
        }
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &Name) -> Option<&AnnotationParameter> {
        self.parameters.get(name)
    }

    /// Returns the parameter with the given name, creating an empty one if needed.
    pub fn parameter_entry(&mut self, name: Name) -> &mut AnnotationParameter {
        self.parameters
            .entry(name.clone())
            .or_insert_with(|| AnnotationParameter::new(name))
    }

    /// Returns the values of the conventional `value` parameter.
    #[must_use]
    pub fn values(&self) -> &[String] {
        self.parameters
            .get(&Name::from_case(VALUE_PARAMETER))
            .map(|p| p.values.as_slice())
            .unwrap_or(&[])
    }
}

/// Named parameter of an annotation, holding one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationParameter {
    /// Parameter name.
    pub name: Name,
    /// Parameter values, in declaration order.
    pub values: Vec<String>,
}

impl AnnotationParameter {
    /// Creates a parameter without values.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            values: Vec::new(),
        }
    }
}

/// Identifier of a module inside a [`crate::Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Returns the arena index of the module.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Namespace grouping types and services.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    /// Module name.
    pub name: Name,
    /// Types registered in this module.
    pub types: Vec<TypeId>,
    /// Services registered in this module.
    pub services: Vec<ServiceId>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            types: Vec::new(),
            services: Vec::new(),
        }
    }
}

/// Free-standing document of the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Document name, including the ordering prefix as first word.
    pub name: Name,
    /// Raw text of the document.
    pub source: String,
    /// True if the ordering prefix starts with a letter.
    pub appendix: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_doc_trims_and_clears() {
        let mut concept = Concept::new(Name::from_case("vm"));
        concept.set_doc(Some("  Virtual machine.  "));
        assert_eq!(concept.doc.as_deref(), Some("Virtual machine."));
        concept.set_doc(Some("   "));
        assert!(concept.doc.is_none());
    }

    #[test]
    fn test_annotation_entry_accumulates_values() {
        let mut concept = Concept::new(Name::from_case("vm"));
        let value = Name::from_case(VALUE_PARAMETER);
        for author in ["alice", "bob"] {
            concept
                .annotation_entry(Name::from_case("author"))
                .parameter_entry(value.clone())
                .values
                .push(author.to_string());
        }
        let annotation = concept
            .annotation(&Name::from_case("author"))
            .expect("annotation missing");
        assert_eq!(annotation.values(), ["alice", "bob"]);
        assert_eq!(concept.annotations.len(), 1);
    }

    #[test]
    fn test_add_annotation_replaces() {
        let mut concept = Concept::default();
        let name = Name::from_case("deprecated");
        assert!(concept.add_annotation(Annotation::new(name.clone())).is_none());
        assert!(concept.add_annotation(Annotation::new(name)).is_some());
    }
}
