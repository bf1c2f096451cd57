//! Document codec engine.
//!
//! Encodes and decodes any [`EntityRecord`] by walking its descriptor's
//! layout. Reading is lenient about child order and collects every error it
//! finds; writing is strict about required fields and emits declared fields
//! in layout order. Unknown content found on read is kept and written back
//! in place.

use std::cell::Cell;
use std::sync::Arc;

use healthvault_xml::{Element, Fragment};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::codec::{self, ElementReader, is_namespace_declaration};
use crate::error::{Result, ThingError, ValidationError, ValidationErrorKind, ValidationReport};
use crate::path::FieldPath;
use crate::record::EntityRecord;
use crate::schema::{CrossFieldRule, FieldSpec, Layout, SchemaDescriptor, ValueKind};
use crate::validate;
use crate::values::{Entry, StructValue, Value, entry_path};

/// Behaviour switches for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Run the full validator before writing. Required fields are checked
    /// on write regardless.
    pub validate_before_write: bool,
    /// Keep undeclared elements and attributes found on read so they are
    /// written back.
    pub preserve_unknown_content: bool,
    /// Prefix string output with an XML declaration.
    pub xml_declaration: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            validate_before_write: true,
            preserve_unknown_content: true,
            xml_declaration: false,
        }
    }
}

/// Generic encoder and decoder for schema-described records.
#[derive(Debug, Clone, Default)]
pub struct DocumentCodec {
    settings: CodecSettings,
}

impl DocumentCodec {
    pub fn new(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Encodes `record` as a fragment rooted at the descriptor's root
    /// element.
    pub fn write(&self, record: &EntityRecord, descriptor: &SchemaDescriptor) -> Result<Fragment> {
        if record.type_id() != descriptor.type_id() || !same_schema(record.schema(), descriptor) {
            return Err(ThingError::SchemaMismatch {
                type_id: descriptor.type_id(),
                record_root: record.schema().root().to_string(),
            });
        }

        let root_path = FieldPath::root(descriptor.root());
        if self.settings.validate_before_write {
            let report = validate::validate_struct(record.body(), &root_path);
            if !report.is_empty() {
                debug!(
                    type_id = %descriptor.type_id(),
                    errors = report.len(),
                    "refusing to write invalid record"
                );
                return Err(ThingError::Invalid(report));
            }
        }

        let mut root = Element::new(descriptor.root());
        encode_struct(record.body(), &mut root, &root_path)?;
        trace!(type_id = %descriptor.type_id(), root = descriptor.root(), "encoded record");
        Ok(Fragment::new(root))
    }

    /// Encodes `record` as a string, with a declaration if configured.
    pub fn write_string(&self, record: &EntityRecord, descriptor: &SchemaDescriptor) -> Result<String> {
        let fragment = self.write(record, descriptor)?;
        let xml = if self.settings.xml_declaration {
            fragment.to_xml_string_with_declaration()?
        } else {
            fragment.to_xml_string()?
        };
        Ok(xml)
    }

    /// Decodes `fragment` into a new record of `descriptor`'s type.
    pub fn read(&self, fragment: &Fragment, descriptor: &Arc<SchemaDescriptor>) -> Result<EntityRecord> {
        let root = fragment.root();
        if root.name() != descriptor.root() {
            return Err(ValidationReport::from(ValidationError::unknown_root(
                descriptor.root(),
                root.name(),
            ))
            .into());
        }

        let root_path = FieldPath::root(descriptor.root());
        let mut report = ValidationReport::new();
        let body = decode_struct(root, descriptor.layout(), &root_path, &self.settings, &mut report);

        // Shape errors make further checks noise; only run the validator on
        // a structurally sound body.
        if report.is_empty() {
            validate::check_struct(&body, &root_path, &mut report);
        }
        if !report.is_empty() {
            debug!(
                type_id = %descriptor.type_id(),
                errors = report.len(),
                "rejected fragment"
            );
            return Err(ThingError::Invalid(report));
        }

        trace!(type_id = %descriptor.type_id(), root = descriptor.root(), "decoded record");
        Ok(EntityRecord::from_parts(
            Arc::clone(descriptor),
            body,
            Some(fragment.clone()),
        ))
    }

    /// Decodes `fragment` into `target`. On failure `target` is left as it
    /// was.
    pub fn read_into(&self, fragment: &Fragment, target: &mut EntityRecord) -> Result<()> {
        let descriptor = Arc::clone(target.schema());
        let staged = self.read(fragment, &descriptor)?;
        *target = staged;
        Ok(())
    }
}

fn same_schema(schema: &Arc<SchemaDescriptor>, descriptor: &SchemaDescriptor) -> bool {
    std::ptr::eq(Arc::as_ptr(schema), descriptor) || **schema == *descriptor
}

/// Index of the alternative field of every choice whose preferred field is
/// present.
fn dropped_alternatives(value: &StructValue) -> Vec<usize> {
    value
        .layout()
        .rules()
        .iter()
        .filter_map(|rule| {
            let CrossFieldRule::PreferredChoice {
                preferred,
                alternative,
                ..
            } = rule;
            if value.is_present(preferred) && value.is_present(alternative) {
                value.layout().position(alternative)
            } else {
                None
            }
        })
        .collect()
}

pub(crate) fn encode_struct(
    value: &StructValue,
    element: &mut Element,
    path: &FieldPath,
) -> std::result::Result<(), ValidationError> {
    let layout = value.layout();

    for rule in layout.rules() {
        let CrossFieldRule::PreferredChoice {
            preferred,
            alternative,
            required,
        } = rule;
        if *required && !value.is_present(preferred) && !value.is_present(alternative) {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingRequiredField,
                path.child(preferred),
                format!("one of '{}' or '{}' is required", preferred, alternative),
            ));
        }
    }
    let dropped = dropped_alternatives(value);

    for (spec, entries) in layout.fields().iter().zip(value.slots()) {
        if spec.is_attribute() {
            if let Some(entry) = entries.first() {
                let text = entry.value.as_text().ok_or_else(|| {
                    ValidationError::malformed(
                        path.attribute(&spec.name),
                        format!("attribute holds {}", entry.value.kind_name()),
                    )
                })?;
                element.set_attribute(spec.name.as_str(), text);
            } else if spec.is_required() {
                return Err(ValidationError::missing(path.attribute(&spec.name)));
            }
        }
    }
    for (name, text) in value.unknown_attributes() {
        element.set_attribute(name.as_str(), text.as_str());
    }

    write_unknown(value, None, element);
    for (index, (spec, entries)) in layout.fields().iter().zip(value.slots()).enumerate() {
        if !spec.is_attribute() {
            if dropped.contains(&index) {
                debug!(field = %path.child(&spec.name), "dropping alternative of a present preferred field");
            } else if entries.is_empty() {
                if spec.is_required() {
                    return Err(ValidationError::missing(path.child(&spec.name)));
                }
            } else {
                let base = path.child(&spec.name);
                for (n, entry) in entries.iter().enumerate() {
                    let child = encode_entry(spec, entry, &entry_path(spec, &base, n))?;
                    element.push_element(child);
                }
            }
        }
        write_unknown(value, Some(index), element);
    }
    Ok(())
}

fn write_unknown(value: &StructValue, after: Option<usize>, element: &mut Element) {
    for unknown in value.unknown_elements() {
        if unknown.after == after {
            element.push_element(unknown.element.clone().preserve_verbatim());
        }
    }
}

fn encode_entry(
    spec: &FieldSpec,
    entry: &Entry,
    path: &FieldPath,
) -> std::result::Result<Element, ValidationError> {
    if let Some(preserved) = &entry.preserved {
        return Ok(preserved.clone().preserve_verbatim());
    }

    let mut element = Element::new(spec.name.as_str());
    match (&spec.kind, &entry.value) {
        (ValueKind::Structure(_), Value::Structure(inner)) => {
            encode_struct(inner, &mut element, path)?
        }
        (ValueKind::Structure(_), other) => {
            return Err(ValidationError::malformed(
                path.clone(),
                format!("expected structure, found {}", other.kind_name()),
            ));
        }
        (kind, value) => codec::encode_primitive(value, kind, &mut element, path)?,
    }
    Ok(element)
}

fn decode_struct(
    element: &Element,
    layout: &Arc<Layout>,
    path: &FieldPath,
    settings: &CodecSettings,
    report: &mut ValidationReport,
) -> StructValue {
    let mut value = StructValue::new(layout);

    for (name, text) in element.attributes() {
        match layout.attribute_position(name) {
            Some(index) => value
                .slot_mut(index)
                .push(Entry::new(Value::Text(text.clone()))),
            None if is_namespace_declaration(name) || settings.preserve_unknown_content => {
                value.push_unknown_attribute(name.clone(), text.clone())
            }
            None => debug!(attribute = %path.attribute(name), "dropping unknown attribute"),
        }
    }

    if element.has_significant_text() {
        report.push(ValidationError::malformed(
            path.clone(),
            "unexpected text content",
        ));
    }

    let mut last_known: Option<usize> = None;
    for child in element.child_elements() {
        let Some(index) = layout.element_position(child.name()) else {
            if settings.preserve_unknown_content {
                trace!(element = %path.child(child.name()), "preserving unknown element");
                value.push_unknown_element(last_known, child.clone());
            } else {
                debug!(element = %path.child(child.name()), "dropping unknown element");
            }
            continue;
        };
        last_known = Some(index);

        let spec = &layout.fields()[index];
        let base = path.child(&spec.name);
        let seen = value.slots()[index].len();
        if seen > 0 && !spec.is_repeated() {
            report.push(ValidationError::malformed(
                base,
                format!("<{}> may appear only once", spec.name),
            ));
            continue;
        }

        let entry_path = entry_path(spec, &base, seen);
        if let Some(entry) = decode_entry(child, spec, entry_path, settings, report) {
            value.slot_mut(index).push(entry);
        }
    }

    value
}

fn decode_entry(
    element: &Element,
    spec: &FieldSpec,
    path: FieldPath,
    settings: &CodecSettings,
    report: &mut ValidationReport,
) -> Option<Entry> {
    if let ValueKind::Structure(layout) = &spec.kind {
        let errors_before = report.len();
        let inner = decode_struct(element, layout, &path, settings, report);
        return (report.len() == errors_before).then(|| Entry::new(Value::Structure(inner)));
    }

    let unknown = Cell::new(false);
    let mut reader = ElementReader::new(element, path, &unknown);
    match codec::decode_primitive(&spec.kind, &mut reader) {
        Ok(value) => {
            reader.finish();
            let preserved = (unknown.get() && settings.preserve_unknown_content).then(|| {
                trace!(field = %spec.name, "keeping source element with unknown content");
                element.clone()
            });
            Some(Entry { value, preserved })
        }
        Err(error) => {
            report.push(error);
            None
        }
    }
}
