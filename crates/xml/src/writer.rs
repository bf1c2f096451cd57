//! Deterministic compact writer.
//!
//! Output has no indentation and no insignificant whitespace. Attributes are
//! written in stored order with double quotes, childless elements use the
//! empty-element form, and elements flagged verbatim are copied from their
//! source text unchanged.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, XmlError};
use crate::tree::{Element, Node};

pub(crate) fn element_to_string(element: &Element) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    into_string(writer)
}

pub(crate) fn document_to_string(element: &Element) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    write_element(&mut writer, element)?;
    into_string(writer)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    if element.is_verbatim() {
        if let Some(source) = element.source_text() {
            writer.get_mut().extend_from_slice(source.as_bytes());
            return Ok(());
        }
    }

    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in element.children() {
        match child {
            Node::Element(inner) => write_element(writer, inner)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(write_error)
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Write(err.to_string()))
}

fn write_error(err: impl std::fmt::Display) -> XmlError {
    XmlError::Write(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Fragment;

    #[test]
    fn test_compact_output() {
        let element = Element::new("concern").with_child(
            Element::new("description").with_child(Element::leaf("text", "anxiety")),
        );
        assert_eq!(
            element_to_string(&element).unwrap(),
            "<concern><description><text>anxiety</text></description></concern>"
        );
    }

    #[test]
    fn test_empty_element_form() {
        let element = Element::new("a").with_attribute("name", "x");
        assert_eq!(element_to_string(&element).unwrap(), r#"<a name="x"/>"#);
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let element = Element::leaf("a", "1 < 2 & 3").with_attribute("q", "say \"hi\"");
        let xml = element_to_string(&element).unwrap();
        assert!(xml.contains("1 &lt; 2 &amp; 3"));
        assert!(!xml.contains("\"hi\""));

        let back = Fragment::parse(&xml).unwrap();
        assert_eq!(back.root(), &element);
    }

    #[test]
    fn test_declaration() {
        let xml = document_to_string(&Element::new("a")).unwrap();
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#);
    }

    #[test]
    fn test_verbatim_element_is_copied() {
        let fragment = Fragment::parse("<r><x  b='2'  a=\"1\" >t</x></r>").unwrap();
        let x = fragment.root().child("x").unwrap().clone();

        let structural = Element::new("out").with_child(x.clone());
        assert_eq!(
            element_to_string(&structural).unwrap(),
            r#"<out><x b="2" a="1">t</x></out>"#
        );

        let verbatim = Element::new("out").with_child(x.preserve_verbatim());
        assert_eq!(
            element_to_string(&verbatim).unwrap(),
            "<out><x  b='2'  a=\"1\" >t</x></out>"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let element = Element::new("a")
            .with_attribute("z", "1")
            .with_attribute("b", "2")
            .with_child(Element::leaf("c", "3"));
        let first = element_to_string(&element).unwrap();
        let second = element_to_string(&element.clone()).unwrap();
        assert_eq!(first, second);
    }
}
