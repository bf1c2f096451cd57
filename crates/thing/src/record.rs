//! Entity records.

use std::sync::Arc;

use healthvault_xml::Fragment;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::error::ValidationReport;
use crate::path::FieldPath;
use crate::schema::SchemaDescriptor;
use crate::type_id::ThingTypeId;
use crate::values::{Entry, StructValue, Value};

/// One change applied by [`EntityRecord::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(String, Value),
    SetAll(String, Vec<Value>),
    Push(String, Value),
    Clear(String),
}

/// A typed health record item: field values laid out by a schema
/// descriptor.
///
/// Setters validate the field they touch and reject a value that breaks its
/// constraints, leaving the record unchanged. A freshly created record is
/// empty, so completeness is only enforced on write.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    schema: Arc<SchemaDescriptor>,
    body: StructValue,
    raw_fragment: Option<Fragment>,
}

impl PartialEq for EntityRecord {
    /// Compares type and field values; the raw fragment a record was read
    /// from does not take part.
    fn eq(&self, other: &Self) -> bool {
        self.schema.type_id() == other.schema.type_id() && self.body == other.body
    }
}

impl EntityRecord {
    pub fn new(schema: Arc<SchemaDescriptor>) -> Self {
        let body = StructValue::new(schema.layout());
        Self {
            schema,
            body,
            raw_fragment: None,
        }
    }

    pub(crate) fn from_parts(
        schema: Arc<SchemaDescriptor>,
        body: StructValue,
        raw_fragment: Option<Fragment>,
    ) -> Self {
        Self {
            schema,
            body,
            raw_fragment,
        }
    }

    pub fn type_id(&self) -> ThingTypeId {
        self.schema.type_id()
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn body(&self) -> &StructValue {
        &self.body
    }

    /// The fragment this record was last decoded from.
    pub fn raw_fragment(&self) -> Option<&Fragment> {
        self.raw_fragment.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    pub fn get_all(&self, name: &str) -> Vec<&Value> {
        self.body.get_all(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.body.is_present(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationReport> {
        let root = self.root_path();
        self.body
            .replace(name, vec![Entry::new(value.into())], &root)
    }

    pub fn set_all(&mut self, name: &str, values: Vec<Value>) -> Result<(), ValidationReport> {
        let root = self.root_path();
        let entries = values.into_iter().map(Entry::new).collect();
        self.body.replace(name, entries, &root)
    }

    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationReport> {
        let root = self.root_path();
        self.body.append(name, value.into(), &root)
    }

    /// Removes every value of `name`. Required fields cannot be cleared.
    pub fn clear(&mut self, name: &str) -> Result<(), ValidationReport> {
        let root = self.root_path();
        self.body.replace(name, Vec::new(), &root)
    }

    /// Chaining form of [`EntityRecord::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ValidationReport> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Applies `updates` in order, all or nothing. Every failing update is
    /// reported.
    pub fn apply(
        &mut self,
        updates: impl IntoIterator<Item = FieldUpdate>,
    ) -> Result<(), ValidationReport> {
        let root = self.root_path();
        let mut staged = self.body.clone();
        let mut report = ValidationReport::new();
        for update in updates {
            let outcome = match update {
                FieldUpdate::Set(name, value) => {
                    staged.replace(&name, vec![Entry::new(value)], &root)
                }
                FieldUpdate::SetAll(name, values) => {
                    staged.replace(&name, values.into_iter().map(Entry::new).collect(), &root)
                }
                FieldUpdate::Push(name, value) => staged.append(&name, value, &root),
                FieldUpdate::Clear(name) => staged.replace(&name, Vec::new(), &root),
            };
            if let Err(errors) = outcome {
                report.extend(errors);
            }
        }
        report.into_result()?;
        self.body = staged;
        Ok(())
    }

    /// Drops preserved unknown content and the raw fragment, so the next
    /// write emits only declared fields.
    pub fn discard_unknown(&mut self) {
        self.body.discard_unknown();
        self.raw_fragment = None;
    }

    fn root_path(&self) -> FieldPath {
        FieldPath::root(self.schema.root())
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EntityRecord", 4)?;
        state.serialize_field("type_id", &self.schema.type_id())?;
        state.serialize_field("type_name", self.schema.name())?;
        state.serialize_field("root", self.schema.root())?;
        state.serialize_field("fields", &self.body)?;
        state.end()
    }
}
