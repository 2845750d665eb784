//! Thin event writer used to emit schema nodes.

use crate::error::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::io::Write;

/// Namespace of the XML Schema vocabulary.
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace of the JAXB binding customizations.
pub const JAXB_NAMESPACE: &str = "http://java.sun.com/xml/ns/jaxb";

/// Indented XML writer with helpers for the nodes a schema is made of.
pub struct XsdWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> XsdWriter<W> {
    /// Creates a writer that indents nested elements by two spaces.
    pub fn new(out: W) -> Self {
        Self {
            inner: Writer::new_with_indent(out, b' ', 2),
        }
    }

    /// Writes a start tag with the given attributes, in order.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = element(name, attributes);
        self.inner.write_event(Event::Start(element))?;
        Ok(())
    }

    /// Writes a self-closing element with the given attributes, in order.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = element(name, attributes);
        self.inner.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// Writes an end tag.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes an `xs:annotation/xs:appinfo` block holding one JAXB
    /// customization element, e.g. `<jaxb:property name="Links"/>`.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn jaxb(&mut self, customization: &str, name: &str) -> Result<()> {
        self.start("xs:annotation", &[])?;
        self.start("xs:appinfo", &[])?;
        self.empty(&format!("jaxb:{customization}"), &[("name", name)])?;
        self.end("xs:appinfo")?;
        self.end("xs:annotation")
    }

    /// Consumes the writer, returning the output.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for &attribute in attributes {
        element.push_attribute(attribute);
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut XsdWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut writer = XsdWriter::new(Vec::new());
        f(&mut writer).expect("Failed to write");
        String::from_utf8(writer.into_inner()).expect("Failed to decode output")
    }

    #[test]
    fn test_empty_element_keeps_attribute_order() {
        let xml = render(|w| {
            w.empty(
                "xs:element",
                &[("name", "vm"), ("type", "Vm"), ("minOccurs", "0")],
            )
        });
        assert_eq!(xml, r#"<xs:element name="vm" type="Vm" minOccurs="0"/>"#);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let xml = render(|w| w.empty("xs:documentation", &[("source", "a<b&c")]));
        assert_eq!(xml, r#"<xs:documentation source="a&lt;b&amp;c"/>"#);
    }

    #[test]
    fn test_jaxb_customization() {
        let xml = render(|w| w.jaxb("property", "Links"));
        assert!(xml.starts_with("<xs:annotation>"));
        assert!(xml.contains(r#"<jaxb:property name="Links"/>"#));
        assert!(xml.trim_end().ends_with("</xs:annotation>"));
    }
}
