use healthvault_xml::Element;

use super::ValueCodec;
use super::reader::{ElementReader, parse_decimal};
use crate::error::{ValidationError, ValidationReport};
use crate::path::FieldPath;
use crate::schema::MeasurementKind;
use crate::validate::at_least;
use crate::values::{DisplayValue, Measurement};

// <display units="lb" units-code="lb">154</display>
impl ValueCodec for DisplayValue {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let units = reader.attribute("units").map(str::to_string);
        let units_code = reader.attribute("units-code").map(str::to_string);
        let text = reader.text()?;
        Ok(DisplayValue {
            value: parse_decimal(&text, reader.path())?,
            units,
            units_code,
        })
    }

    fn encode(&self, element: &mut Element) {
        if let Some(units) = &self.units {
            element.set_attribute("units", units.as_str());
        }
        if let Some(code) = &self.units_code {
            element.set_attribute("units-code", code.as_str());
        }
        element.push_text(self.value.to_string());
    }
}

/// Reads `<unit>value</unit>` plus an optional `<display>`, where the unit
/// element is named by `kind`.
pub(crate) fn decode(
    reader: &mut ElementReader<'_>,
    kind: &MeasurementKind,
) -> Result<Measurement, ValidationError> {
    let value = reader.required_decimal(&kind.unit_element)?;
    let display = match reader.optional("display")? {
        Some(child) => {
            let mut nested = reader.nested(child);
            let display = DisplayValue::decode(&mut nested)?;
            nested.finish();
            Some(display)
        }
        None => None,
    };
    Ok(Measurement { value, display })
}

pub(crate) fn encode(value: &Measurement, kind: &MeasurementKind, element: &mut Element) {
    element.push_element(Element::leaf(kind.unit_element.as_str(), value.value.to_string()));
    if let Some(display) = &value.display {
        let mut child = Element::new("display");
        display.encode(&mut child);
        element.push_element(child);
    }
}

pub(crate) fn check(
    value: &Measurement,
    kind: &MeasurementKind,
    path: &FieldPath,
    report: &mut ValidationReport,
) {
    if !at_least(value.value, kind.minimum) {
        report.push(ValidationError::out_of_range(
            path.child(&kind.unit_element),
            format!("{} {} is below the minimum", value.value, kind.unit_element),
        ));
    }
    if let Some(display) = &value.display {
        let path = path.child("display");
        for (name, text) in [("units", &display.units), ("units-code", &display.units_code)] {
            if text.as_deref().is_some_and(|text| text.trim().is_empty()) {
                report.push(ValidationError::blank(path.attribute(name)));
            }
        }
    }
}
