use rust_decimal::Decimal;
use serde::Serialize;

/// A value as the user entered or saw it, with its units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayValue {
    pub value: Decimal,
    pub units: Option<String>,
    pub units_code: Option<String>,
}

impl DisplayValue {
    pub fn new(value: Decimal, units: impl Into<String>) -> Self {
        Self {
            value,
            units: Some(units.into()),
            units_code: None,
        }
    }

    pub fn with_units_code(mut self, code: impl Into<String>) -> Self {
        self.units_code = Some(code.into());
        self
    }
}

/// A quantity in the canonical unit of its kind, with an optional display
/// form. Which unit applies is declared by the field, see
/// [`MeasurementKind`](crate::MeasurementKind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Measurement {
    pub value: Decimal,
    pub display: Option<DisplayValue>,
}

impl Measurement {
    pub fn new(value: Decimal) -> Self {
        Self {
            value,
            display: None,
        }
    }

    pub fn with_display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }
}
