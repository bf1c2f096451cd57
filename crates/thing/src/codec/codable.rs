use healthvault_xml::Element;

use super::ValueCodec;
use super::reader::ElementReader;
use crate::error::{ValidationError, ValidationReport};
use crate::path::FieldPath;
use crate::values::{CodableValue, CodedValue};

// <text/>, then any number of <code><value/><family/><type/><version/></code>.
impl ValueCodec for CodableValue {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let text = reader.required_text("text")?;
        let mut codes = Vec::new();
        for (index, child) in reader.repeated("code").into_iter().enumerate() {
            let mut code = reader.nested_at(child, index);
            codes.push(CodedValue::decode(&mut code)?);
            code.finish();
        }
        Ok(CodableValue { text, codes })
    }

    fn encode(&self, element: &mut Element) {
        element.push_element(Element::leaf("text", self.text.as_str()));
        for code in &self.codes {
            let mut child = Element::new("code");
            code.encode(&mut child);
            element.push_element(child);
        }
    }

    fn check(&self, path: &FieldPath, report: &mut ValidationReport) {
        if self.text.trim().is_empty() {
            report.push(ValidationError::blank(path.child("text")));
        }
        for (index, code) in self.codes.iter().enumerate() {
            code.check(&path.child("code").index(index), report);
        }
    }
}

impl ValueCodec for CodedValue {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        Ok(CodedValue {
            value: reader.required_text("value")?,
            family: reader.optional_text("family")?,
            vocabulary: reader.required_text("type")?,
            version: reader.optional_text("version")?,
        })
    }

    fn encode(&self, element: &mut Element) {
        element.push_element(Element::leaf("value", self.value.as_str()));
        if let Some(family) = &self.family {
            element.push_element(Element::leaf("family", family.as_str()));
        }
        element.push_element(Element::leaf("type", self.vocabulary.as_str()));
        if let Some(version) = &self.version {
            element.push_element(Element::leaf("version", version.as_str()));
        }
    }

    fn check(&self, path: &FieldPath, report: &mut ValidationReport) {
        if self.value.trim().is_empty() {
            report.push(ValidationError::blank(path.child("value")));
        }
        if self.vocabulary.trim().is_empty() {
            report.push(ValidationError::blank(path.child("type")));
        }
        for (name, text) in [("family", &self.family), ("version", &self.version)] {
            if text.as_deref().is_some_and(|text| text.trim().is_empty()) {
                report.push(ValidationError::blank(path.child(name)));
            }
        }
    }
}
