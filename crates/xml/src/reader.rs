//! Fragment parsing on top of quick-xml events.
//!
//! Every element records the byte span it occupied in the input so callers
//! can re-emit untouched regions exactly as they were received.

use std::sync::Arc;

use quick_xml::errors::IllFormedError;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::{Decoder, Reader};

use crate::error::{Result, XmlError};
use crate::tree::{Element, Fragment, Node, Origin};

/// An element whose end tag has not been read yet.
struct OpenElement {
    element: Element,
    start: usize,
    text: String,
}

impl OpenElement {
    /// Moves accumulated character data into the children list so text and
    /// elements keep their document order.
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.element.push_text(text);
        }
    }
}

/// Parses `xml` into a [`Fragment`].
///
/// Comments, processing instructions, the XML declaration and DOCTYPE are
/// skipped. Whitespace-only text between child elements is dropped; text in
/// leaf elements is kept exactly, including surrounding whitespace.
pub(crate) fn parse(xml: &str) -> Result<Fragment> {
    let source: Arc<str> = Arc::from(xml);
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|err| read_error(reader.buffer_position() as usize, err))?;

        match event {
            Event::Start(start_tag) => {
                ensure_before_root(&root, start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.flush_text();
                }
                stack.push(OpenElement {
                    element: open_element(&start_tag, reader.decoder(), start)?,
                    start,
                    text: String::new(),
                });
            }
            Event::Empty(start_tag) => {
                ensure_before_root(&root, start)?;
                let mut element = open_element(&start_tag, reader.decoder(), start)?;
                let end = reader.buffer_position() as usize;
                element.set_origin(Origin {
                    source: Arc::clone(&source),
                    span: start..end,
                });
                attach(&mut stack, &mut root, element, start)?;
            }
            Event::End(_) => {
                let Some(mut open) = stack.pop() else {
                    return Err(XmlError::Syntax {
                        position: start,
                        message: "end tag without a matching start tag".to_string(),
                    });
                };
                open.flush_text();
                let end = reader.buffer_position() as usize;
                let mut element = open.element;
                if element.has_element_children() {
                    element.children_mut().retain(|node| !node.is_whitespace());
                }
                element.set_origin(Origin {
                    source: Arc::clone(&source),
                    span: open.start..end,
                });
                attach(&mut stack, &mut root, element, start)?;
            }
            Event::Text(text) => {
                let text = text.decode().map_err(|err| syntax(start, err))?;
                push_character_data(&mut stack, &text, start)?;
            }
            Event::CData(cdata) => {
                let raw = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                push_character_data(&mut stack, &raw, start)?;
            }
            Event::GeneralRef(reference) => {
                let resolved = resolve_reference(&reference, start)?;
                push_character_data(&mut stack, &resolved, start)?;
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::UnexpectedEof {
            open: open.element.name().to_string(),
        });
    }

    root.map(Fragment::new).ok_or(XmlError::NoRootElement)
}

fn ensure_before_root(root: &Option<Element>, position: usize) -> Result<()> {
    if root.is_some() {
        return Err(XmlError::TrailingContent { position });
    }
    Ok(())
}

fn open_element(start_tag: &BytesStart<'_>, decoder: Decoder, position: usize) -> Result<Element> {
    let name = String::from_utf8_lossy(start_tag.name().as_ref()).into_owned();
    let mut element = Element::new(name);

    for attribute in start_tag.attributes() {
        let attribute = attribute.map_err(|err| syntax(position, err))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|err| syntax(position, err))?;
        element.set_attribute(key, value.into_owned());
    }

    Ok(element)
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<Element>,
    element: Element,
    position: usize,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.flush_text();
            parent.element.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::TrailingContent { position }),
    }
}

fn push_character_data(stack: &mut [OpenElement], text: &str, position: usize) -> Result<()> {
    match stack.last_mut() {
        Some(open) => {
            open.text.push_str(text);
            Ok(())
        }
        None if Node::Text(text.to_string()).is_whitespace() => Ok(()),
        None => Err(XmlError::TrailingContent { position }),
    }
}

/// Resolves a character reference or one of the five predefined entities.
fn resolve_reference(reference: &BytesRef<'_>, position: usize) -> Result<String> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|err| syntax(position, err))?
    {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(|err| syntax(position, err))?;
    match resolve_predefined_entity(&name) {
        Some(text) => Ok(text.to_string()),
        None => Err(syntax(
            position,
            format!("unknown entity reference '&{};'", name),
        )),
    }
}

fn read_error(position: usize, err: quick_xml::Error) -> XmlError {
    match err {
        quick_xml::Error::IllFormed(IllFormedError::MismatchedEndTag { expected, found }) => {
            XmlError::MismatchedEnd {
                position,
                expected,
                found,
            }
        }
        other => syntax(position, other),
    }
}

fn syntax(position: usize, message: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax {
        position,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_and_text() {
        let fragment = parse("<concern><description><text>anxiety</text></description></concern>")
            .unwrap();
        let root = fragment.root();
        assert_eq!(root.name(), "concern");
        let text = root.child("description").and_then(|d| d.child("text")).unwrap();
        assert_eq!(text.text().as_deref(), Some("anxiety"));
    }

    #[test]
    fn test_whitespace_between_elements_is_dropped() {
        let fragment = parse("<a>\n  <b>1</b>\n  <c/>\n</a>").unwrap();
        assert_eq!(fragment.root().children().len(), 2);
    }

    #[test]
    fn test_leaf_text_keeps_surrounding_whitespace() {
        let fragment = parse("<a> x </a>").unwrap();
        assert_eq!(fragment.root().text().as_deref(), Some(" x "));
    }

    #[test]
    fn test_entities_and_char_refs_are_resolved() {
        let fragment = parse(r#"<a k="1 &lt; 2">fish &amp; chips &#65;&#x42;</a>"#).unwrap();
        assert_eq!(fragment.root().attribute("k"), Some("1 < 2"));
        assert_eq!(fragment.root().text().as_deref(), Some("fish & chips AB"));
    }

    #[test]
    fn test_spans_cover_exact_source() {
        let xml = "<?xml version=\"1.0\"?>\n<r><x  a='1'>t</x><y/></r>";
        let fragment = parse(xml).unwrap();
        let x = fragment.root().child("x").unwrap();
        assert_eq!(x.source_text(), Some("<x  a='1'>t</x>"));
        let y = fragment.root().child("y").unwrap();
        assert_eq!(y.source_text(), Some("<y/>"));
    }

    #[test]
    fn test_declaration_and_comments_are_skipped() {
        let fragment = parse("<?xml version=\"1.0\"?><!-- c --><a><!-- inner -->v</a>").unwrap();
        assert_eq!(fragment.root().text().as_deref(), Some("v"));
    }

    #[test]
    fn test_cdata_is_text() {
        let fragment = parse("<a><![CDATA[<raw> & stuff]]></a>").unwrap();
        assert_eq!(fragment.root().text().as_deref(), Some("<raw> & stuff"));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert_eq!(parse("  ").unwrap_err(), XmlError::NoRootElement);
    }

    #[test]
    fn test_second_root_is_rejected() {
        assert!(matches!(
            parse("<a/><b/>").unwrap_err(),
            XmlError::TrailingContent { .. }
        ));
    }

    #[test]
    fn test_unclosed_element_is_rejected() {
        assert!(parse("<a><b>").is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        match parse("<a><b></a></b>").unwrap_err() {
            XmlError::MismatchedEnd {
                expected, found, ..
            } => {
                assert_eq!(expected, "b");
                assert_eq!(found, "a");
            }
            other => panic!("expected mismatched end, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        for xml in ["<a>&nbsp;</a>", r#"<a k="&nbsp;"/>"#] {
            assert!(matches!(
                parse(xml).unwrap_err(),
                XmlError::Syntax { .. }
            ));
        }
    }

    #[test]
    fn test_forbidden_char_refs_are_rejected() {
        for xml in ["<a>&#0;</a>", "<a>&#xD800;</a>", r#"<a k="&#0;"/>"#, "<a>&#-1;</a>"] {
            assert!(
                matches!(parse(xml).unwrap_err(), XmlError::Syntax { .. }),
                "{xml}"
            );
        }
    }

    #[test]
    fn test_attribute_char_refs_are_resolved() {
        let fragment = parse(r#"<a k="&#x41;&amp;&quot;"/>"#).unwrap();
        assert_eq!(fragment.root().attribute("k"), Some("A&\""));
    }
}
