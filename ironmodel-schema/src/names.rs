//! Naming collaborators of the schema generator.
//!
//! The generator never builds schema names itself. It asks a [`SchemaNaming`]
//! policy for tag and type names, a [`Pluralizer`] for collection names and a
//! [`MemberClassifier`] to decide which members become XML attributes.

use ironmodel_core::{Name, PrimitiveKind};
use std::collections::BTreeSet;

/// Casing and punctuation convention of the schema.
pub trait SchemaNaming {
    /// Name of the XML element for a concept, e.g. `dns_servers`.
    fn tag_name(&self, name: &Name) -> String;

    /// Name of the schema type for a concept, e.g. `DnsServers`.
    fn type_name(&self, name: &Name) -> String;

    /// Built-in schema type used for a primitive.
    fn primitive_type_name(&self, kind: PrimitiveKind) -> String;
}

/// Converts names between singular and plural.
pub trait Pluralizer {
    /// Returns the plural of `name`.
    fn plural(&self, name: &Name) -> Name;

    /// Returns the singular of `name`.
    fn singular(&self, name: &Name) -> Name;
}

/// Decides whether a struct member is written as an XML attribute.
pub trait MemberClassifier {
    /// Returns true if the member named `name` is an XML attribute.
    fn is_attribute(&self, name: &Name) -> bool;
}

/// Lowercase tags joined with `_`, capitalized type names, `xs:` primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNaming;

impl SchemaNaming for DefaultNaming {
    fn tag_name(&self, name: &Name) -> String {
        name.join("_")
    }

    fn type_name(&self, name: &Name) -> String {
        name.words().iter().map(|w| capitalize(w)).collect()
    }

    fn primitive_type_name(&self, kind: PrimitiveKind) -> String {
        let name = match kind {
            PrimitiveKind::Boolean => "xs:boolean",
            PrimitiveKind::String => "xs:string",
            PrimitiveKind::Integer => "xs:int",
            PrimitiveKind::Decimal => "xs:decimal",
            PrimitiveKind::Date => "xs:dateTime",
        };
        name.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Regular English plural rules, applied to the last word of a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishPluralizer;

impl Pluralizer for EnglishPluralizer {
    fn plural(&self, name: &Name) -> Name {
        name.map_last_word(plural_word)
    }

    fn singular(&self, name: &Name) -> Name {
        name.map_last_word(singular_word)
    }
}

fn plural_word(word: &str) -> String {
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

fn singular_word(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Classifies a fixed set of member names as XML attributes.
#[derive(Debug, Clone)]
pub struct AttributeSet {
    names: BTreeSet<Name>,
}

impl AttributeSet {
    /// Creates a classifier for the given member names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| Name::from_case(n.as_ref())).collect(),
        }
    }
}

impl Default for AttributeSet {
    /// `id`, `href` and `rel`.
    fn default() -> Self {
        Self::new(["id", "href", "rel"])
    }
}

impl MemberClassifier for AttributeSet {
    fn is_attribute(&self, name: &Name) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Name {
        Name::from_case(text)
    }

    #[test]
    fn test_default_naming() {
        let naming = DefaultNaming;
        assert_eq!(naming.tag_name(&name("dnsServers")), "dns_servers");
        assert_eq!(naming.type_name(&name("dnsServers")), "DnsServers");
        assert_eq!(naming.type_name(&name("Vm")), "Vm");
        assert_eq!(naming.primitive_type_name(PrimitiveKind::Date), "xs:dateTime");
        assert_eq!(naming.primitive_type_name(PrimitiveKind::Integer), "xs:int");
    }

    #[test]
    fn test_plural() {
        let p = EnglishPluralizer;
        let plural = |text: &str| p.plural(&name(text)).to_string();
        assert_eq!(plural("Vm"), "vms");
        assert_eq!(plural("VmStatus"), "vm_statuses");
        assert_eq!(plural("Policy"), "policies");
        assert_eq!(plural("Key"), "keys");
        assert_eq!(plural("Box"), "boxes");
        assert_eq!(plural("Switch"), "switches");
    }

    #[test]
    fn test_singular() {
        let p = EnglishPluralizer;
        let singular = |text: &str| p.singular(&name(text)).to_string();
        assert_eq!(singular("dnsServers"), "dns_server");
        assert_eq!(singular("policies"), "policy");
        assert_eq!(singular("statuses"), "status");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("address"), "address");
        assert_eq!(singular("disk"), "disk");
    }

    #[test]
    fn test_default_attribute_set() {
        let classifier = AttributeSet::default();
        assert!(classifier.is_attribute(&name("id")));
        assert!(classifier.is_attribute(&name("href")));
        assert!(!classifier.is_attribute(&name("name")));
    }
}
