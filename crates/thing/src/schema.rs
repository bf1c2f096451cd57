//! Declarative schema descriptors.
//!
//! A [`SchemaDescriptor`] states, for one thing type, the root element name
//! and an ordered [`Layout`] of fields. Each [`FieldSpec`] names its element
//! (or attribute), the [`ValueKind`] it holds, its [`Cardinality`] and an
//! optional [`FieldRule`]. Nested structures are layouts themselves, so the
//! same generic engine encodes, decodes and validates every type.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::type_id::ThingTypeId;
use crate::values::Value;

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cardinality {
    Required,
    Optional,
    Repeated,
}

/// Where a field lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldLocation {
    Element,
    /// An attribute of the enclosing element. Only text fields can be
    /// attributes, and they cannot repeat.
    Attribute,
}

/// The quantity a measurement field holds: the element that carries the
/// canonical value and, optionally, its smallest legal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MeasurementKind {
    pub unit_element: String,
    pub minimum: Option<Decimal>,
}

impl MeasurementKind {
    pub fn new(unit_element: impl Into<String>) -> Self {
        Self {
            unit_element: unit_element.into(),
            minimum: None,
        }
    }

    /// A measurement that cannot be negative.
    pub fn non_negative(unit_element: impl Into<String>) -> Self {
        Self {
            unit_element: unit_element.into(),
            minimum: Some(Decimal::ZERO),
        }
    }

    /// Blood glucose in millimoles per liter.
    pub fn blood_glucose() -> Self {
        Self::non_negative("mmolPerL")
    }

    /// Insulin in international units.
    pub fn insulin() -> Self {
        Self::non_negative("IU")
    }

    /// Weight in kilograms.
    pub fn weight() -> Self {
        Self::non_negative("kg")
    }

    /// Length in meters.
    pub fn length() -> Self {
        Self::non_negative("m")
    }
}

/// The kind of value a field holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    CodableValue,
    ApproximateDate,
    ApproximateTime,
    ApproximateDateTime,
    HealthServiceDate,
    HealthServiceDateTime,
    Measurement(MeasurementKind),
    Structure(Arc<Layout>),
}

impl ValueKind {
    /// Returns true if `value` is of this kind. Structures must have been
    /// built for an equal layout.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Text, Value::Text(_))
            | (ValueKind::Integer, Value::Integer(_))
            | (ValueKind::Decimal, Value::Decimal(_))
            | (ValueKind::Boolean, Value::Boolean(_))
            | (ValueKind::CodableValue, Value::Codable(_))
            | (ValueKind::ApproximateDate, Value::ApproximateDate(_))
            | (ValueKind::ApproximateTime, Value::ApproximateTime(_))
            | (ValueKind::ApproximateDateTime, Value::ApproximateDateTime(_))
            | (ValueKind::HealthServiceDate, Value::HealthServiceDate(_))
            | (ValueKind::HealthServiceDateTime, Value::HealthServiceDateTime(_))
            | (ValueKind::Measurement(_), Value::Measurement(_)) => true,
            (ValueKind::Structure(layout), Value::Structure(structure)) => {
                Arc::ptr_eq(layout, structure.layout()) || **layout == **structure.layout()
            }
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::Boolean => "boolean",
            ValueKind::CodableValue => "codable value",
            ValueKind::ApproximateDate => "approximate date",
            ValueKind::ApproximateTime => "approximate time",
            ValueKind::ApproximateDateTime => "approximate date-time",
            ValueKind::HealthServiceDate => "health service date",
            ValueKind::HealthServiceDateTime => "health service date-time",
            ValueKind::Measurement(_) => "measurement",
            ValueKind::Structure(_) => "structure",
        }
    }
}

/// A constraint on a field's value beyond its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FieldRule {
    /// Closed integer range; a missing bound is unbounded.
    IntegerRange { min: Option<i64>, max: Option<i64> },
    /// Closed decimal range; a missing bound is unbounded.
    DecimalRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    /// Text must contain something other than whitespace.
    NotBlank,
}

impl FieldRule {
    pub fn at_least(min: i64) -> Self {
        FieldRule::IntegerRange {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: i64, max: i64) -> Self {
        FieldRule::IntegerRange {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn decimal_at_least(min: Decimal) -> Self {
        FieldRule::DecimalRange {
            min: Some(min),
            max: None,
        }
    }

    pub fn decimal_between(min: Decimal, max: Decimal) -> Self {
        FieldRule::DecimalRange {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// One field of a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub location: FieldLocation,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    pub rule: Option<FieldRule>,
}

impl FieldSpec {
    fn element(name: impl Into<String>, kind: ValueKind, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            location: FieldLocation::Element,
            kind,
            cardinality,
            rule: None,
        }
    }

    pub fn required(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::element(name, kind, Cardinality::Required)
    }

    pub fn optional(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::element(name, kind, Cardinality::Optional)
    }

    pub fn repeated(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::element(name, kind, Cardinality::Repeated)
    }

    /// An optional text attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: FieldLocation::Attribute,
            kind: ValueKind::Text,
            cardinality: Cardinality::Optional,
            rule: None,
        }
    }

    pub fn required_attribute(name: impl Into<String>) -> Self {
        Self {
            cardinality: Cardinality::Required,
            ..Self::attribute(name)
        }
    }

    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn is_required(&self) -> bool {
        self.cardinality == Cardinality::Required
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_attribute(&self) -> bool {
        self.location == FieldLocation::Attribute
    }
}

/// A rule that spans several fields of one layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CrossFieldRule {
    /// Two fields express the same fact in different forms. When both are
    /// present, `preferred` wins and `alternative` is dropped on write. When
    /// `required`, at least one of them must be present.
    PreferredChoice {
        preferred: String,
        alternative: String,
        required: bool,
    },
}

/// An ordered list of fields plus the rules that span them.
///
/// The field order is the element order on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    fields: Vec<FieldSpec>,
    rules: Vec<CrossFieldRule>,
}

impl Layout {
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn rules(&self) -> &[CrossFieldRule] {
        &self.rules
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub(crate) fn element_position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.location == FieldLocation::Element && field.name == name)
    }

    pub(crate) fn attribute_position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.location == FieldLocation::Attribute && field.name == name)
    }

    /// Checks that the layout can be encoded unambiguously, recursing into
    /// nested structures.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(format!("field {} has an empty name", i));
            }
            let duplicate = self.fields[..i]
                .iter()
                .any(|other| other.name == field.name && other.location == field.location);
            if duplicate {
                return Err(format!("field '{}' is declared twice", field.name));
            }
            if field.is_attribute() {
                if field.kind != ValueKind::Text {
                    return Err(format!("attribute '{}' must hold text", field.name));
                }
                if field.is_repeated() {
                    return Err(format!("attribute '{}' cannot repeat", field.name));
                }
            }
            if let Some(rule) = &field.rule {
                check_rule_fits(field, rule)?;
            }
            if let ValueKind::Structure(layout) = &field.kind {
                layout
                    .check_consistency()
                    .map_err(|message| format!("in '{}': {}", field.name, message))?;
            }
        }

        for rule in &self.rules {
            let CrossFieldRule::PreferredChoice {
                preferred,
                alternative,
                ..
            } = rule;
            for name in [preferred, alternative] {
                match self.field(name) {
                    None => return Err(format!("choice names unknown field '{}'", name)),
                    Some(field) if field.cardinality != Cardinality::Optional => {
                        return Err(format!("choice field '{}' must be optional", name));
                    }
                    Some(_) => {}
                }
            }
            if preferred == alternative {
                return Err(format!("choice between '{}' and itself", preferred));
            }
        }
        Ok(())
    }
}

fn check_rule_fits(field: &FieldSpec, rule: &FieldRule) -> Result<(), String> {
    let fits = matches!(
        (rule, &field.kind),
        (FieldRule::IntegerRange { .. }, ValueKind::Integer)
            | (FieldRule::DecimalRange { .. }, ValueKind::Decimal)
            | (FieldRule::NotBlank, ValueKind::Text)
    );
    if fits {
        Ok(())
    } else {
        Err(format!(
            "rule on '{}' does not apply to {} values",
            field.name,
            field.kind.name()
        ))
    }
}

/// Builder for [`Layout`].
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    layout: Layout,
}

impl LayoutBuilder {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.layout.fields.push(field);
        self
    }

    pub fn rule(mut self, rule: CrossFieldRule) -> Self {
        self.layout.rules.push(rule);
        self
    }

    pub fn build(self) -> Arc<Layout> {
        Arc::new(self.layout)
    }
}

/// The complete description of one thing type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    type_id: ThingTypeId,
    root: String,
    name: String,
    layout: Arc<Layout>,
}

impl SchemaDescriptor {
    /// Starts a descriptor for `type_id` whose fragments use the root
    /// element `root`.
    pub fn builder(type_id: ThingTypeId, root: impl Into<String>) -> SchemaDescriptorBuilder {
        let root = root.into();
        SchemaDescriptorBuilder {
            type_id,
            name: root.clone(),
            root,
            layout: Layout::default(),
        }
    }

    /// A descriptor over an existing layout.
    pub fn new(type_id: ThingTypeId, root: impl Into<String>, layout: Arc<Layout>) -> Self {
        let root = root.into();
        Self {
            type_id,
            name: root.clone(),
            root,
            layout,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn type_id(&self) -> ThingTypeId {
        self.type_id
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Human-readable type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn check_consistency(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("root element name is empty".to_string());
        }
        self.layout.check_consistency()
    }
}

/// Builder for [`SchemaDescriptor`].
#[derive(Debug)]
pub struct SchemaDescriptorBuilder {
    type_id: ThingTypeId,
    root: String,
    name: String,
    layout: Layout,
}

impl SchemaDescriptorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.layout.fields.push(field);
        self
    }

    pub fn rule(mut self, rule: CrossFieldRule) -> Self {
        self.layout.rules.push(rule);
        self
    }

    pub fn build(self) -> SchemaDescriptor {
        SchemaDescriptor {
            type_id: self.type_id,
            root: self.root,
            name: self.name,
            layout: Arc::new(self.layout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ThingTypeId {
        ThingTypeId::from_u128(1)
    }

    #[test]
    fn test_builder_preserves_field_order() {
        let descriptor = SchemaDescriptor::builder(id(), "sample")
            .name("Sample")
            .field(FieldSpec::required("b", ValueKind::Text))
            .field(FieldSpec::optional("a", ValueKind::Integer))
            .build();

        let names: Vec<&str> = descriptor
            .layout()
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(descriptor.name(), "Sample");
        assert!(descriptor.check_consistency().is_ok());
    }

    #[test]
    fn test_duplicate_field_is_inconsistent() {
        let descriptor = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::required("a", ValueKind::Text))
            .field(FieldSpec::optional("a", ValueKind::Text))
            .build();
        assert!(descriptor.check_consistency().is_err());
    }

    #[test]
    fn test_attribute_and_element_may_share_a_name() {
        let descriptor = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::attribute("name"))
            .field(FieldSpec::optional("name", ValueKind::Text))
            .build();
        assert!(descriptor.check_consistency().is_ok());
    }

    #[test]
    fn test_rule_must_fit_kind() {
        let descriptor = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::optional("a", ValueKind::Text).with_rule(FieldRule::at_least(0)))
            .build();
        assert!(descriptor.check_consistency().is_err());
    }

    #[test]
    fn test_choice_fields_must_exist_and_be_optional() {
        let missing = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::optional("a", ValueKind::Decimal))
            .rule(CrossFieldRule::PreferredChoice {
                preferred: "a".into(),
                alternative: "b".into(),
                required: true,
            })
            .build();
        assert!(missing.check_consistency().is_err());

        let required = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::optional("a", ValueKind::Decimal))
            .field(FieldSpec::required("b", ValueKind::Decimal))
            .rule(CrossFieldRule::PreferredChoice {
                preferred: "a".into(),
                alternative: "b".into(),
                required: true,
            })
            .build();
        assert!(required.check_consistency().is_err());
    }

    #[test]
    fn test_nested_layout_is_checked() {
        let inner = Layout::builder()
            .field(FieldSpec::attribute("x").with_rule(FieldRule::NotBlank))
            .field(FieldSpec {
                location: FieldLocation::Attribute,
                ..FieldSpec::optional("y", ValueKind::Integer)
            })
            .build();
        let descriptor = SchemaDescriptor::builder(id(), "sample")
            .field(FieldSpec::optional("inner", ValueKind::Structure(inner)))
            .build();
        let message = descriptor.check_consistency().unwrap_err();
        assert!(message.contains("inner"));
    }

    #[test]
    fn test_descriptor_equality_is_structural() {
        let build = || {
            SchemaDescriptor::builder(id(), "sample")
                .field(FieldSpec::required(
                    "weight",
                    ValueKind::Measurement(MeasurementKind::weight()),
                ))
                .build()
        };
        assert_eq!(build(), build());
    }
}
