//! Primitive value codecs.
//!
//! Each primitive type knows how to read itself from an element, write itself
//! into an element and check the invariants the type system cannot express.
//! The element itself is named by the field that holds the value.

mod codable;
mod datetime;
mod measurement;
mod reader;
mod scalar;

use healthvault_xml::Element;

use crate::error::{ComponentError, ValidationError, ValidationReport};
use crate::path::FieldPath;
use crate::schema::ValueKind;
use crate::values::Value;

pub use reader::{ElementReader, parse_bool, parse_decimal, parse_integer};
pub(crate) use reader::is_namespace_declaration;

pub(crate) use measurement::{check as check_measurement, decode as decode_measurement};

/// Encoding and decoding of one primitive value type.
pub trait ValueCodec: Sized {
    /// Reads a value from the element under `reader`.
    fn decode(reader: &mut ElementReader<'_>) -> Result<Self, ValidationError>;

    /// Writes the value's content into `element`.
    fn encode(&self, element: &mut Element);

    /// Reports violations the constructors cannot prevent.
    fn check(&self, _path: &FieldPath, _report: &mut ValidationReport) {}
}

/// Reads a primitive value of `kind`. Structures are decoded by the engine.
pub(crate) fn decode_primitive(
    kind: &ValueKind,
    reader: &mut ElementReader<'_>,
) -> Result<Value, ValidationError> {
    let value = match kind {
        ValueKind::Text => Value::Text(String::decode(reader)?),
        ValueKind::Integer => Value::Integer(i64::decode(reader)?),
        ValueKind::Decimal => Value::Decimal(rust_decimal::Decimal::decode(reader)?),
        ValueKind::Boolean => Value::Boolean(bool::decode(reader)?),
        ValueKind::CodableValue => Value::Codable(ValueCodec::decode(reader)?),
        ValueKind::ApproximateDate => Value::ApproximateDate(ValueCodec::decode(reader)?),
        ValueKind::ApproximateTime => Value::ApproximateTime(ValueCodec::decode(reader)?),
        ValueKind::ApproximateDateTime => Value::ApproximateDateTime(ValueCodec::decode(reader)?),
        ValueKind::HealthServiceDate => Value::HealthServiceDate(ValueCodec::decode(reader)?),
        ValueKind::HealthServiceDateTime => {
            Value::HealthServiceDateTime(ValueCodec::decode(reader)?)
        }
        ValueKind::Measurement(measurement) => {
            Value::Measurement(decode_measurement(reader, measurement)?)
        }
        ValueKind::Structure(_) => {
            return Err(ValidationError::malformed(
                reader.path().clone(),
                "structures are not primitive values",
            ));
        }
    };
    Ok(value)
}

/// Writes a primitive value into `element`.
pub(crate) fn encode_primitive(
    value: &Value,
    kind: &ValueKind,
    element: &mut Element,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    match (value, kind) {
        (Value::Text(value), _) => value.encode(element),
        (Value::Integer(value), _) => value.encode(element),
        (Value::Decimal(value), _) => value.encode(element),
        (Value::Boolean(value), _) => value.encode(element),
        (Value::Codable(value), _) => value.encode(element),
        (Value::ApproximateDate(value), _) => value.encode(element),
        (Value::ApproximateTime(value), _) => value.encode(element),
        (Value::ApproximateDateTime(value), _) => value.encode(element),
        (Value::HealthServiceDate(value), _) => value.encode(element),
        (Value::HealthServiceDateTime(value), _) => value.encode(element),
        (Value::Measurement(value), ValueKind::Measurement(measurement)) => {
            measurement::encode(value, measurement, element)
        }
        (other, _) => {
            return Err(ValidationError::malformed(
                path.clone(),
                format!("cannot write {} as {}", other.kind_name(), kind.name()),
            ));
        }
    }
    Ok(())
}

/// Runs the codec checks of a primitive value.
pub(crate) fn check_primitive(value: &Value, path: &FieldPath, report: &mut ValidationReport) {
    match value {
        Value::Codable(value) => value.check(path, report),
        Value::ApproximateDateTime(value) => value.check(path, report),
        Value::HealthServiceDateTime(value) => value.check(path, report),
        _ => {}
    }
}

/// Attributes a component error to its wire element below `path`.
pub(crate) fn component_error(error: ComponentError, path: &FieldPath) -> ValidationError {
    let component = match &error {
        ComponentError::OutOfRange { component, .. } | ComponentError::Requires { component, .. } => {
            *component
        }
    };
    let element = match component {
        "year" => "y",
        "month" | "minute" => "m",
        "day" => "d",
        "hour" => "h",
        "second" => "s",
        "millisecond" => "f",
        other => other,
    };
    error.at(path, element)
}
