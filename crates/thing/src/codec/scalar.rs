use healthvault_xml::Element;
use rust_decimal::Decimal;

use super::reader::{ElementReader, parse_bool, parse_decimal, parse_integer};
use super::ValueCodec;
use crate::error::ValidationError;

impl ValueCodec for String {
    /// Text is taken exactly as written, whitespace included.
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        reader.text()
    }

    fn encode(&self, element: &mut Element) {
        if !self.is_empty() {
            element.push_text(self.as_str());
        }
    }
}

impl ValueCodec for i64 {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let text = reader.text()?;
        parse_integer(&text, reader.path())
    }

    fn encode(&self, element: &mut Element) {
        element.push_text(self.to_string());
    }
}

impl ValueCodec for Decimal {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let text = reader.text()?;
        parse_decimal(&text, reader.path())
    }

    fn encode(&self, element: &mut Element) {
        element.push_text(self.to_string());
    }
}

impl ValueCodec for bool {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let text = reader.text()?;
        parse_bool(&text, reader.path())
    }

    fn encode(&self, element: &mut Element) {
        element.push_text(if *self { "true" } else { "false" });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use healthvault_xml::Fragment;

    use super::*;
    use crate::path::FieldPath;

    fn decode<T: ValueCodec>(xml: &str) -> Result<T, ValidationError> {
        let fragment = Fragment::parse(xml).unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("v"), &flag);
        T::decode(&mut reader)
    }

    fn encode<T: ValueCodec>(value: &T) -> String {
        let mut element = Element::new("v");
        value.encode(&mut element);
        element.to_xml_string().unwrap()
    }

    #[test]
    fn test_text_keeps_whitespace() {
        assert_eq!(decode::<String>("<v> a b </v>").unwrap(), " a b ");
        assert_eq!(decode::<String>("<v/>").unwrap(), "");
        assert_eq!(encode(&"x & y".to_string()), "<v>x &amp; y</v>");
    }

    #[test]
    fn test_text_with_child_elements_is_malformed() {
        assert!(decode::<String>("<v><w/></v>").is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(decode::<i64>("<v>-7</v>").unwrap(), -7);
        assert!(decode::<i64>("<v>seven</v>").is_err());
        assert_eq!(encode(&Decimal::new(705, 1)), "<v>70.5</v>");
    }

    #[test]
    fn test_booleans_write_canonically() {
        assert!(decode::<bool>("<v>1</v>").unwrap());
        assert_eq!(encode(&true), "<v>true</v>");
        assert_eq!(encode(&false), "<v>false</v>");
    }
}
