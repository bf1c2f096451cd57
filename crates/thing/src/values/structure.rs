use std::sync::Arc;

use healthvault_xml::Element;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ValidationError, ValidationErrorKind, ValidationReport};
use crate::path::FieldPath;
use crate::schema::{CrossFieldRule, FieldSpec, Layout};
use crate::validate;

use super::Value;

/// One value of a field, plus the element it was decoded from when that
/// element carried content the codec did not understand.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) value: Value,
    pub(crate) preserved: Option<Element>,
}

impl Entry {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            preserved: None,
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// An element the layout does not declare, kept so it can be written back.
#[derive(Debug, Clone)]
pub struct UnknownElement {
    /// Index of the declared field it followed, `None` if it came before
    /// every declared field.
    pub after: Option<usize>,
    pub element: Element,
}

/// The values of a nested structure, one slot per field of its layout.
///
/// Every setter checks the field it changes and leaves the structure
/// untouched when the check fails.
#[derive(Debug, Clone)]
pub struct StructValue {
    layout: Arc<Layout>,
    slots: Vec<Vec<Entry>>,
    unknown_elements: Vec<UnknownElement>,
    unknown_attributes: Vec<(String, String)>,
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.layout, &other.layout) || self.layout == other.layout)
            && self.slots == other.slots
            && self.unknown_attributes == other.unknown_attributes
            && self.unknown_elements.len() == other.unknown_elements.len()
            && self
                .unknown_elements
                .iter()
                .zip(&other.unknown_elements)
                .all(|(a, b)| a.element == b.element)
    }
}

impl StructValue {
    /// An empty structure for `layout`.
    pub fn new(layout: &Arc<Layout>) -> Self {
        Self {
            layout: Arc::clone(layout),
            slots: vec![Vec::new(); layout.fields().len()],
            unknown_elements: Vec::new(),
            unknown_attributes: Vec::new(),
        }
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// The first value of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slot(name)
            .and_then(|entries| entries.first())
            .map(|entry| &entry.value)
    }

    /// Every value of `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&Value> {
        self.slot(name)
            .map(|entries| entries.iter().map(|entry| &entry.value).collect())
            .unwrap_or_default()
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|entries| !entries.is_empty())
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationReport> {
        self.replace(name, vec![Entry::new(value.into())], &FieldPath::default())
    }

    pub fn set_all(&mut self, name: &str, values: Vec<Value>) -> Result<(), ValidationReport> {
        let entries = values.into_iter().map(Entry::new).collect();
        self.replace(name, entries, &FieldPath::default())
    }

    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationReport> {
        self.append(name, value.into(), &FieldPath::default())
    }

    pub fn clear(&mut self, name: &str) -> Result<(), ValidationReport> {
        self.replace(name, Vec::new(), &FieldPath::default())
    }

    /// Chaining form of [`StructValue::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ValidationReport> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn unknown_elements(&self) -> &[UnknownElement] {
        &self.unknown_elements
    }

    pub fn unknown_attributes(&self) -> &[(String, String)] {
        &self.unknown_attributes
    }

    /// Drops all preserved unknown content.
    pub fn discard_unknown(&mut self) {
        self.unknown_elements.clear();
        self.unknown_attributes.clear();
        for entries in &mut self.slots {
            for entry in entries {
                entry.preserved = None;
            }
        }
    }

    fn slot(&self, name: &str) -> Option<&Vec<Entry>> {
        self.layout.position(name).map(|index| &self.slots[index])
    }

    fn locate(&self, name: &str, base: &FieldPath) -> Result<(usize, FieldPath), ValidationReport> {
        let index = self.layout.position(name).ok_or_else(|| {
            ValidationError::malformed(base.child(name), format!("no field named '{}'", name))
        })?;
        Ok((index, field_path(&self.layout.fields()[index], base)))
    }

    pub(crate) fn replace(
        &mut self,
        name: &str,
        entries: Vec<Entry>,
        base: &FieldPath,
    ) -> Result<(), ValidationReport> {
        let (index, path) = self.locate(name, base)?;
        let spec = &self.layout.fields()[index];

        let mut report = ValidationReport::new();
        validate::check_entries(spec, &entries, &path, &mut report);
        if entries.is_empty() {
            self.check_choice_kept(name, base, &mut report);
        }
        report.into_result()?;

        self.slots[index] = entries;
        Ok(())
    }

    pub(crate) fn append(
        &mut self,
        name: &str,
        value: Value,
        base: &FieldPath,
    ) -> Result<(), ValidationReport> {
        let (index, path) = self.locate(name, base)?;
        let spec = &self.layout.fields()[index];
        if !spec.is_repeated() && !self.slots[index].is_empty() {
            return Err(ValidationError::malformed(path, "field holds a single value").into());
        }

        let entry_path = entry_path(spec, &path, self.slots[index].len());
        let mut report = ValidationReport::new();
        validate::check_value(spec, &value, &entry_path, &mut report);
        report.into_result()?;

        self.slots[index].push(Entry::new(value));
        Ok(())
    }

    /// Reports a required choice that would be left with neither field.
    fn check_choice_kept(&self, cleared: &str, base: &FieldPath, report: &mut ValidationReport) {
        for rule in self.layout.rules() {
            let CrossFieldRule::PreferredChoice {
                preferred,
                alternative,
                required,
            } = rule;
            let other = if preferred == cleared {
                alternative
            } else if alternative == cleared {
                preferred
            } else {
                continue;
            };
            if *required && !self.is_present(other) {
                report.push(ValidationError::new(
                    ValidationErrorKind::MissingRequiredField,
                    base.child(cleared),
                    format!("one of '{}' or '{}' is required", preferred, alternative),
                ));
            }
        }
    }

    pub(crate) fn slots(&self) -> &[Vec<Entry>] {
        &self.slots
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Vec<Entry> {
        &mut self.slots[index]
    }

    pub(crate) fn push_unknown_element(&mut self, after: Option<usize>, element: Element) {
        self.unknown_elements.push(UnknownElement { after, element });
    }

    pub(crate) fn push_unknown_attribute(&mut self, name: String, value: String) {
        self.unknown_attributes.push((name, value));
    }
}

/// Path of a field below `base`, using `@name` for attributes.
pub(crate) fn field_path(spec: &FieldSpec, base: &FieldPath) -> FieldPath {
    if spec.is_attribute() {
        base.attribute(&spec.name)
    } else {
        base.child(&spec.name)
    }
}

/// Path of the `index`-th value of a field; only repeated fields are
/// indexed.
pub(crate) fn entry_path(spec: &FieldSpec, path: &FieldPath, index: usize) -> FieldPath {
    if spec.is_repeated() {
        path.index(index)
    } else {
        path.clone()
    }
}

struct Values<'a>(&'a [Entry]);

impl Serialize for Values<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|entry| &entry.value))
    }
}

impl Serialize for StructValue {
    /// Present fields as a map; repeated fields become arrays and attributes
    /// are keyed `@name`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.slots.iter().filter(|entries| !entries.is_empty()).count();
        let unknown = usize::from(!self.unknown_elements.is_empty());
        let mut map = serializer.serialize_map(Some(present + unknown))?;
        for (spec, entries) in self.layout.fields().iter().zip(&self.slots) {
            if entries.is_empty() {
                continue;
            }
            let key = if spec.is_attribute() {
                format!("@{}", spec.name)
            } else {
                spec.name.clone()
            };
            if spec.is_repeated() {
                map.serialize_entry(&key, &Values(entries))?;
            } else {
                map.serialize_entry(&key, &entries[0].value)?;
            }
        }
        if !self.unknown_elements.is_empty() {
            let elements: Vec<&Element> =
                self.unknown_elements.iter().map(|unknown| &unknown.element).collect();
            map.serialize_entry("unknown-elements", &elements)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldRule, ValueKind};

    fn layout() -> Arc<Layout> {
        Layout::builder()
            .field(FieldSpec::attribute("name"))
            .field(FieldSpec::required("count", ValueKind::Integer).with_rule(FieldRule::at_least(0)))
            .field(FieldSpec::repeated("tag", ValueKind::Text).with_rule(FieldRule::NotBlank))
            .field(FieldSpec::optional("a", ValueKind::Decimal))
            .field(FieldSpec::optional("b", ValueKind::Decimal))
            .rule(CrossFieldRule::PreferredChoice {
                preferred: "a".into(),
                alternative: "b".into(),
                required: true,
            })
            .build()
    }

    #[test]
    fn test_set_and_get() {
        let mut value = StructValue::new(&layout());
        value.set("count", 3).unwrap();
        value.set("name", "zone").unwrap();
        assert_eq!(value.get("count"), Some(&Value::Integer(3)));
        assert_eq!(value.get("name").and_then(Value::as_text), Some("zone"));
        assert!(!value.is_present("tag"));
    }

    #[test]
    fn test_invalid_set_leaves_value_unchanged() {
        let mut value = StructValue::new(&layout());
        value.set("count", 3).unwrap();

        let report = value.set("count", -1).unwrap_err();
        assert!(report.contains(ValidationErrorKind::OutOfRange, "count"));
        assert_eq!(value.get("count"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let mut value = StructValue::new(&layout());
        let report = value.set("count", "three").unwrap_err();
        assert!(report.has_kind(ValidationErrorKind::MalformedSubStructure));
    }

    #[test]
    fn test_clearing_required_field_fails() {
        let mut value = StructValue::new(&layout());
        value.set("count", 1).unwrap();
        let report = value.clear("count").unwrap_err();
        assert!(report.contains(ValidationErrorKind::MissingRequiredField, "count"));
        assert!(value.is_present("count"));
    }

    #[test]
    fn test_push_indexes_repeated_paths() {
        let mut value = StructValue::new(&layout());
        value.push("tag", "one").unwrap();
        let report = value.push("tag", "  ").unwrap_err();
        assert!(report.contains(ValidationErrorKind::EmptyOrWhitespaceString, "tag[1]"));
        assert_eq!(value.get_all("tag").len(), 1);
    }

    #[test]
    fn test_push_on_single_field_with_value_fails() {
        let mut value = StructValue::new(&layout());
        value.push("count", 1).unwrap();
        assert!(value.push("count", 2).is_err());
    }

    #[test]
    fn test_clearing_last_choice_fails() {
        let mut value = StructValue::new(&layout());
        value.set("b", rust_decimal::Decimal::ONE).unwrap();
        let report = value.clear("b").unwrap_err();
        assert!(report.contains(ValidationErrorKind::MissingRequiredField, "b"));

        value.set("a", rust_decimal::Decimal::TWO).unwrap();
        value.clear("b").unwrap();
    }

    #[test]
    fn test_unknown_field_name() {
        let mut value = StructValue::new(&layout());
        let report = value.set("nope", 1).unwrap_err();
        assert!(report.contains(ValidationErrorKind::MalformedSubStructure, "nope"));
    }

    #[test]
    fn test_serializes_present_fields() {
        let value = StructValue::new(&layout())
            .with("name", "zone")
            .unwrap()
            .with("count", 2)
            .unwrap();
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({ "@name": "zone", "count": 2 }));
    }
}
