use std::cell::Cell;

use healthvault_xml::Element;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::path::FieldPath;

/// Cursor over the children and attributes of one element.
///
/// Codecs take the parts they understand; whatever is left when the reader
/// is finished marks the value as carrying unknown content, which the engine
/// then preserves.
pub struct ElementReader<'a> {
    element: &'a Element,
    path: FieldPath,
    children: Vec<&'a Element>,
    consumed: Vec<bool>,
    attributes_read: Vec<bool>,
    text_read: bool,
    unknown: &'a Cell<bool>,
}

impl<'a> ElementReader<'a> {
    pub(crate) fn new(element: &'a Element, path: FieldPath, unknown: &'a Cell<bool>) -> Self {
        let children: Vec<&'a Element> = element.child_elements().collect();
        Self {
            element,
            path,
            consumed: vec![false; children.len()],
            attributes_read: vec![false; element.attributes().len()],
            children,
            text_read: false,
            unknown,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// The single child named `name`, if present. A repeated child is
    /// malformed.
    pub fn optional(&mut self, name: &str) -> Result<Option<&'a Element>, ValidationError> {
        let mut found = None;
        for (index, child) in self.children.iter().enumerate() {
            if child.name() != name {
                continue;
            }
            if found.is_some() {
                return Err(ValidationError::malformed(
                    self.path.child(name),
                    format!("<{}> may appear only once", name),
                ));
            }
            found = Some(index);
        }
        Ok(found.map(|index| {
            self.consumed[index] = true;
            self.children[index]
        }))
    }

    pub fn required(&mut self, name: &str) -> Result<&'a Element, ValidationError> {
        self.optional(name)?
            .ok_or_else(|| ValidationError::missing(self.path.child(name)))
    }

    /// Every child named `name`, in document order.
    pub fn repeated(&mut self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        for (index, child) in self.children.iter().enumerate() {
            if child.name() == name {
                self.consumed[index] = true;
                found.push(*child);
            }
        }
        found
    }

    pub fn attribute(&mut self, name: &str) -> Option<&'a str> {
        let index = self
            .element
            .attributes()
            .iter()
            .position(|(key, _)| key == name)?;
        self.attributes_read[index] = true;
        Some(self.element.attributes()[index].1.as_str())
    }

    /// Text content of a leaf element; empty when the element has none.
    pub fn text(&mut self) -> Result<String, ValidationError> {
        if self.element.has_element_children() {
            return Err(ValidationError::malformed(
                self.path.clone(),
                "expected text content, found child elements",
            ));
        }
        self.text_read = true;
        Ok(self.element.text().unwrap_or_default())
    }

    /// A reader for `child`, sharing this reader's unknown-content flag.
    pub fn nested(&self, child: &'a Element) -> ElementReader<'a> {
        ElementReader::new(child, self.path.child(child.name()), self.unknown)
    }

    /// A reader for the `index`-th occurrence of a repeated child.
    pub fn nested_at(&self, child: &'a Element, index: usize) -> ElementReader<'a> {
        ElementReader::new(child, self.path.child(child.name()).index(index), self.unknown)
    }

    pub fn required_text(&mut self, name: &str) -> Result<String, ValidationError> {
        let child = self.required(name)?;
        self.leaf_text(child)
    }

    pub fn optional_text(&mut self, name: &str) -> Result<Option<String>, ValidationError> {
        match self.optional(name)? {
            Some(child) => self.leaf_text(child).map(Some),
            None => Ok(None),
        }
    }

    pub fn required_integer(&mut self, name: &str) -> Result<i64, ValidationError> {
        let text = self.required_text(name)?;
        parse_integer(&text, &self.path.child(name))
    }

    pub fn optional_integer(&mut self, name: &str) -> Result<Option<i64>, ValidationError> {
        match self.optional_text(name)? {
            Some(text) => parse_integer(&text, &self.path.child(name)).map(Some),
            None => Ok(None),
        }
    }

    pub fn required_decimal(&mut self, name: &str) -> Result<Decimal, ValidationError> {
        let text = self.required_text(name)?;
        parse_decimal(&text, &self.path.child(name))
    }

    fn leaf_text(&self, child: &'a Element) -> Result<String, ValidationError> {
        let mut reader = self.nested(child);
        let text = reader.text()?;
        reader.finish();
        Ok(text)
    }

    /// Flags unknown content if any child, attribute or text was left
    /// unread. Namespace declarations are not content.
    pub fn finish(self) {
        let stray_child = self.consumed.iter().any(|consumed| !consumed);
        let stray_attribute = self
            .element
            .attributes()
            .iter()
            .zip(&self.attributes_read)
            .any(|((name, _), read)| !read && !is_namespace_declaration(name));
        let stray_text = !self.text_read && self.element.has_significant_text();
        if stray_child || stray_attribute || stray_text {
            self.unknown.set(true);
        }
    }
}

pub(crate) fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

pub fn parse_integer(text: &str, path: &FieldPath) -> Result<i64, ValidationError> {
    text.trim().parse::<i64>().map_err(|_| {
        ValidationError::malformed(path.clone(), format!("'{}' is not an integer", text))
    })
}

/// Accepts plain and scientific notation.
pub fn parse_decimal(text: &str, path: &FieldPath) -> Result<Decimal, ValidationError> {
    let trimmed = text.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::malformed(path.clone(), format!("'{}' is not a number", text)))
}

/// Accepts `true`, `false`, `1` and `0`.
pub fn parse_bool(text: &str, path: &FieldPath) -> Result<bool, ValidationError> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ValidationError::malformed(
            path.clone(),
            format!("'{}' is not a boolean", text),
        )),
    }
}

#[cfg(test)]
mod tests {
    use healthvault_xml::Fragment;

    use super::*;
    use crate::error::ValidationErrorKind;

    #[test]
    fn test_unread_child_flags_unknown() {
        let fragment = Fragment::parse("<v><a>1</a><b>2</b></v>").unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("v"), &flag);
        assert_eq!(reader.required_integer("a").unwrap(), 1);
        reader.finish();
        assert!(flag.get());
    }

    #[test]
    fn test_fully_read_element_is_clean() {
        let fragment = Fragment::parse(r#"<v xmlns="urn:x" u="k"><a>1</a></v>"#).unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("v"), &flag);
        assert_eq!(reader.attribute("u"), Some("k"));
        assert_eq!(reader.optional_text("a").unwrap().as_deref(), Some("1"));
        reader.finish();
        assert!(!flag.get());
    }

    #[test]
    fn test_duplicate_single_child_is_malformed() {
        let fragment = Fragment::parse("<v><a>1</a><a>2</a></v>").unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("v"), &flag);
        let error = reader.optional("a").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::MalformedSubStructure);
        assert_eq!(error.path, "v/a");
    }

    #[test]
    fn test_missing_required_child() {
        let fragment = Fragment::parse("<v/>").unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("v"), &flag);
        let error = reader.required_text("text").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::MissingRequiredField);
        assert_eq!(error.path, "v/text");
    }

    #[test]
    fn test_leaf_parsers() {
        let path = FieldPath::root("x");
        assert_eq!(parse_integer(" 42 ", &path).unwrap(), 42);
        assert!(parse_integer("4.2", &path).is_err());
        assert_eq!(parse_decimal("70.50", &path).unwrap().to_string(), "70.50");
        assert_eq!(parse_decimal("1e2", &path).unwrap(), Decimal::from(100));
        assert!(parse_bool("1", &path).unwrap());
        assert!(!parse_bool("false", &path).unwrap());
        assert!(parse_bool("yes", &path).is_err());
    }
}
