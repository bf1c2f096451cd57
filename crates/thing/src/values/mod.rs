//! Primitive and composite value types.
//!
//! Component types such as [`ApproximateDate`] keep their parts private and
//! check ranges in every constructor and setter, so an out-of-range value
//! cannot be built in memory. Composite types built only from checked parts
//! expose their fields directly.

mod codable;
mod date;
mod datetime;
mod measurement;
mod structure;
mod time;

use rust_decimal::Decimal;
use serde::Serialize;

pub use codable::{CodableValue, CodedValue};
pub use date::{ApproximateDate, HealthServiceDate, MAX_YEAR, MIN_YEAR};
pub use datetime::{ApproximateDateTime, HealthServiceDateTime};
pub use measurement::{DisplayValue, Measurement};
pub use structure::{StructValue, UnknownElement};
pub(crate) use structure::{Entry, entry_path, field_path};
pub use time::ApproximateTime;

/// A field value of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Codable(CodableValue),
    ApproximateDate(ApproximateDate),
    ApproximateTime(ApproximateTime),
    ApproximateDateTime(ApproximateDateTime),
    HealthServiceDate(HealthServiceDate),
    HealthServiceDateTime(HealthServiceDateTime),
    Measurement(Measurement),
    Structure(StructValue),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Boolean(_) => "boolean",
            Value::Codable(_) => "codable value",
            Value::ApproximateDate(_) => "approximate date",
            Value::ApproximateTime(_) => "approximate time",
            Value::ApproximateDateTime(_) => "approximate date-time",
            Value::HealthServiceDate(_) => "health service date",
            Value::HealthServiceDateTime(_) => "health service date-time",
            Value::Measurement(_) => "measurement",
            Value::Structure(_) => "structure",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_codable(&self) -> Option<&CodableValue> {
        match self {
            Value::Codable(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_approximate_date(&self) -> Option<&ApproximateDate> {
        match self {
            Value::ApproximateDate(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_approximate_time(&self) -> Option<&ApproximateTime> {
        match self {
            Value::ApproximateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_approximate_date_time(&self) -> Option<&ApproximateDateTime> {
        match self {
            Value::ApproximateDateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_health_service_date(&self) -> Option<&HealthServiceDate> {
        match self {
            Value::HealthServiceDate(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_health_service_date_time(&self) -> Option<&HealthServiceDateTime> {
        match self {
            Value::HealthServiceDateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_measurement(&self) -> Option<&Measurement> {
        match self {
            Value::Measurement(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructValue> {
        match self {
            Value::Structure(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<CodableValue> for Value {
    fn from(value: CodableValue) -> Self {
        Value::Codable(value)
    }
}

impl From<ApproximateDate> for Value {
    fn from(value: ApproximateDate) -> Self {
        Value::ApproximateDate(value)
    }
}

impl From<ApproximateTime> for Value {
    fn from(value: ApproximateTime) -> Self {
        Value::ApproximateTime(value)
    }
}

impl From<ApproximateDateTime> for Value {
    fn from(value: ApproximateDateTime) -> Self {
        Value::ApproximateDateTime(value)
    }
}

impl From<HealthServiceDate> for Value {
    fn from(value: HealthServiceDate) -> Self {
        Value::HealthServiceDate(value)
    }
}

impl From<HealthServiceDateTime> for Value {
    fn from(value: HealthServiceDateTime) -> Self {
        Value::HealthServiceDateTime(value)
    }
}

impl From<Measurement> for Value {
    fn from(value: Measurement) -> Self {
        Value::Measurement(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Structure(value)
    }
}
