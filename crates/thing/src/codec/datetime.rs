use healthvault_xml::Element;

use super::reader::ElementReader;
use super::{ValueCodec, component_error};
use crate::error::{ValidationError, ValidationReport};
use crate::path::FieldPath;
use crate::values::{
    ApproximateDate, ApproximateDateTime, ApproximateTime, CodableValue, HealthServiceDate,
    HealthServiceDateTime,
};

/// Narrows a parsed component, reporting values that do not even fit the
/// target type as out of range.
fn narrow<T: TryFrom<i64>>(value: i64, path: &FieldPath, element: &str) -> Result<T, ValidationError> {
    T::try_from(value).map_err(|_| {
        ValidationError::out_of_range(path.child(element), format!("{} is out of range", value))
    })
}

fn optional_component<T: TryFrom<i64>>(
    reader: &mut ElementReader<'_>,
    element: &str,
) -> Result<Option<T>, ValidationError> {
    match reader.optional_integer(element)? {
        Some(value) => narrow(value, reader.path(), element).map(Some),
        None => Ok(None),
    }
}

fn required_component<T: TryFrom<i64>>(
    reader: &mut ElementReader<'_>,
    element: &str,
) -> Result<T, ValidationError> {
    let value = reader.required_integer(element)?;
    narrow(value, reader.path(), element)
}

fn push_number(element: &mut Element, name: &str, value: impl ToString) {
    element.push_element(Element::leaf(name, value.to_string()));
}

fn decode_child<T: ValueCodec>(
    reader: &mut ElementReader<'_>,
    name: &str,
) -> Result<Option<T>, ValidationError> {
    let Some(child) = reader.optional(name)? else {
        return Ok(None);
    };
    let mut nested = reader.nested(child);
    let value = T::decode(&mut nested)?;
    nested.finish();
    Ok(Some(value))
}

fn encode_child<T: ValueCodec>(element: &mut Element, name: &str, value: &T) {
    let mut child = Element::new(name);
    value.encode(&mut child);
    element.push_element(child);
}

// <y/><m/><d/>, month and day optional.
impl ValueCodec for ApproximateDate {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let year = required_component(reader, "y")?;
        let month = optional_component(reader, "m")?;
        let day = optional_component(reader, "d")?;
        ApproximateDate::new(year, month, day).map_err(|error| component_error(error, reader.path()))
    }

    fn encode(&self, element: &mut Element) {
        push_number(element, "y", self.year());
        if let Some(month) = self.month() {
            push_number(element, "m", month);
        }
        if let Some(day) = self.day() {
            push_number(element, "d", day);
        }
    }
}

impl ValueCodec for HealthServiceDate {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let year = required_component(reader, "y")?;
        let month = required_component(reader, "m")?;
        let day = required_component(reader, "d")?;
        HealthServiceDate::new(year, month, day).map_err(|error| component_error(error, reader.path()))
    }

    fn encode(&self, element: &mut Element) {
        push_number(element, "y", self.year());
        push_number(element, "m", self.month());
        push_number(element, "d", self.day());
    }
}

// <h/><m/><s/><f/>, seconds and milliseconds optional.
impl ValueCodec for ApproximateTime {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let hour = required_component(reader, "h")?;
        let minute = required_component(reader, "m")?;
        let second = optional_component(reader, "s")?;
        let millisecond = optional_component(reader, "f")?;
        ApproximateTime::new(hour, minute, second, millisecond)
            .map_err(|error| component_error(error, reader.path()))
    }

    fn encode(&self, element: &mut Element) {
        push_number(element, "h", self.hour());
        push_number(element, "m", self.minute());
        if let Some(second) = self.second() {
            push_number(element, "s", second);
        }
        if let Some(millisecond) = self.millisecond() {
            push_number(element, "f", millisecond);
        }
    }
}

// <date/><time/><tz/>, time and zone optional.
impl ValueCodec for HealthServiceDateTime {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let date = decode_child::<HealthServiceDate>(reader, "date")?
            .ok_or_else(|| ValidationError::missing(reader.path().child("date")))?;
        Ok(HealthServiceDateTime {
            date,
            time: decode_child(reader, "time")?,
            time_zone: decode_child(reader, "tz")?,
        })
    }

    fn encode(&self, element: &mut Element) {
        encode_child(element, "date", &self.date);
        if let Some(time) = &self.time {
            encode_child(element, "time", time);
        }
        if let Some(time_zone) = &self.time_zone {
            encode_child(element, "tz", time_zone);
        }
    }

    fn check(&self, path: &FieldPath, report: &mut ValidationReport) {
        if let Some(time_zone) = &self.time_zone {
            time_zone.check(&path.child("tz"), report);
        }
    }
}

// Either <structured><date/><time/><tz/></structured> or
// <descriptive>text</descriptive>.
impl ValueCodec for ApproximateDateTime {
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError> {
        let structured = reader.optional("structured")?;
        let descriptive = reader.optional("descriptive")?;
        match (structured, descriptive) {
            (Some(structured), None) => {
                let mut nested = reader.nested(structured);
                let date = decode_child::<ApproximateDate>(&mut nested, "date")?
                    .ok_or_else(|| ValidationError::missing(nested.path().child("date")))?;
                let time = decode_child(&mut nested, "time")?;
                let time_zone = decode_child::<CodableValue>(&mut nested, "tz")?;
                nested.finish();
                Ok(ApproximateDateTime::Structured {
                    date,
                    time,
                    time_zone,
                })
            }
            (None, Some(descriptive)) => {
                let mut nested = reader.nested(descriptive);
                let text = nested.text()?;
                nested.finish();
                Ok(ApproximateDateTime::Descriptive(text))
            }
            (Some(_), Some(_)) => Err(ValidationError::malformed(
                reader.path().clone(),
                "expected either <structured> or <descriptive>, found both",
            )),
            (None, None) => Err(ValidationError::missing(reader.path().child("structured"))),
        }
    }

    fn encode(&self, element: &mut Element) {
        match self {
            ApproximateDateTime::Structured {
                date,
                time,
                time_zone,
            } => {
                let mut structured = Element::new("structured");
                encode_child(&mut structured, "date", date);
                if let Some(time) = time {
                    encode_child(&mut structured, "time", time);
                }
                if let Some(time_zone) = time_zone {
                    encode_child(&mut structured, "tz", time_zone);
                }
                element.push_element(structured);
            }
            ApproximateDateTime::Descriptive(text) => {
                element.push_element(Element::leaf("descriptive", text.as_str()));
            }
        }
    }

    fn check(&self, path: &FieldPath, report: &mut ValidationReport) {
        match self {
            ApproximateDateTime::Structured {
                time_zone: Some(time_zone),
                ..
            } => time_zone.check(&path.child("structured").child("tz"), report),
            ApproximateDateTime::Descriptive(text) if text.trim().is_empty() => {
                report.push(ValidationError::blank(path.child("descriptive")));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use healthvault_xml::Fragment;

    use super::*;
    use crate::error::ValidationErrorKind;

    fn decode<T: ValueCodec>(xml: &str) -> Result<T, ValidationError> {
        let fragment = Fragment::parse(xml).unwrap();
        let flag = Cell::new(false);
        let mut reader = ElementReader::new(fragment.root(), FieldPath::root("when"), &flag);
        T::decode(&mut reader)
    }

    fn encode<T: ValueCodec>(value: &T) -> String {
        let mut element = Element::new("when");
        value.encode(&mut element);
        element.to_xml_string().unwrap()
    }

    #[test]
    fn test_month_out_of_range_points_at_component() {
        let error = decode::<HealthServiceDate>("<when><y>2020</y><m>13</m><d>1</d></when>").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::OutOfRange);
        assert_eq!(error.path, "when/m");

        let error = decode::<HealthServiceDate>("<when><y>2020</y><m>0</m><d>1</d></when>").unwrap_err();
        assert_eq!(error.path, "when/m");
    }

    #[test]
    fn test_month_boundaries_accepted() {
        assert!(decode::<HealthServiceDate>("<when><y>2020</y><m>1</m><d>1</d></when>").is_ok());
        assert!(decode::<HealthServiceDate>("<when><y>2020</y><m>12</m><d>31</d></when>").is_ok());
    }

    #[test]
    fn test_negative_component_does_not_wrap() {
        let error = decode::<ApproximateTime>("<when><h>-1</h><m>0</m></when>").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::OutOfRange);
        assert_eq!(error.path, "when/h");
    }

    #[test]
    fn test_day_without_month_is_malformed() {
        let error = decode::<ApproximateDate>("<when><y>2020</y><d>4</d></when>").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::MalformedSubStructure);
        assert_eq!(error.path, "when/d");
    }

    #[test]
    fn test_health_service_date_time() {
        let xml = "<when><date><y>2021</y><m>3</m><d>14</d></date><time><h>6</h><m>30</m><s>0</s></time></when>";
        let value = decode::<HealthServiceDateTime>(xml).unwrap();
        assert_eq!(value.time.unwrap().second(), Some(0));
        assert_eq!(encode(&value), xml);
    }

    #[test]
    fn test_missing_date_is_reported() {
        let error = decode::<HealthServiceDateTime>("<when><time><h>6</h><m>30</m></time></when>").unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::MissingRequiredField);
        assert_eq!(error.path, "when/date");
    }

    #[test]
    fn test_nested_component_path() {
        let xml = "<when><date><y>2021</y><m>3</m><d>14</d></date><time><h>25</h><m>0</m></time></when>";
        let error = decode::<HealthServiceDateTime>(xml).unwrap_err();
        assert_eq!(error.path, "when/time/h");
    }

    #[test]
    fn test_approximate_date_time_forms() {
        let structured = "<when><structured><date><y>1999</y><m>12</m></date></structured></when>";
        let value = decode::<ApproximateDateTime>(structured).unwrap();
        assert_eq!(value.date().and_then(|date| date.month()), Some(12));
        assert_eq!(encode(&value), structured);

        let descriptive = "<when><descriptive>as a child</descriptive></when>";
        let value = decode::<ApproximateDateTime>(descriptive).unwrap();
        assert_eq!(value, ApproximateDateTime::descriptive("as a child"));
        assert_eq!(encode(&value), descriptive);
    }

    #[test]
    fn test_approximate_date_time_requires_exactly_one_form() {
        let both = "<when><structured><date><y>1999</y></date></structured><descriptive>x</descriptive></when>";
        assert_eq!(
            decode::<ApproximateDateTime>(both).unwrap_err().kind,
            ValidationErrorKind::MalformedSubStructure
        );
        assert_eq!(
            decode::<ApproximateDateTime>("<when/>").unwrap_err().kind,
            ValidationErrorKind::MissingRequiredField
        );
    }
}
