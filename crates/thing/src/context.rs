//! Registry-backed entry point for serializing things.

use std::sync::Arc;

use healthvault_xml::Fragment;

use crate::engine::{CodecSettings, DocumentCodec};
use crate::error::{RegistryError, Result, ValidationReport};
use crate::path::FieldPath;
use crate::record::EntityRecord;
use crate::registry::TypeRegistry;
use crate::schema::SchemaDescriptor;
use crate::type_id::ThingTypeId;
use crate::validate;

/// Serializes, deserializes and validates records of any registered type.
#[derive(Debug, Clone)]
pub struct ThingContext {
    registry: Arc<TypeRegistry>,
    codec: DocumentCodec,
}

impl ThingContext {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_settings(registry, CodecSettings::default())
    }

    pub fn with_settings(registry: Arc<TypeRegistry>, settings: CodecSettings) -> Self {
        Self {
            registry,
            codec: DocumentCodec::new(settings),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &CodecSettings {
        self.codec.settings()
    }

    /// Registers a descriptor with the underlying registry.
    pub fn register_type(
        &self,
        type_id: ThingTypeId,
        descriptor: SchemaDescriptor,
    ) -> std::result::Result<Arc<SchemaDescriptor>, RegistryError> {
        self.registry.register(type_id, descriptor)
    }

    /// An empty record of a registered type.
    pub fn new_record(&self, type_id: ThingTypeId) -> Result<EntityRecord> {
        Ok(EntityRecord::new(self.registry.resolve(type_id)?))
    }

    /// Encodes `record` with the descriptor registered for its type.
    pub fn serialize(&self, record: &EntityRecord) -> Result<Fragment> {
        let descriptor = self.registry.resolve(record.type_id())?;
        self.codec.write(record, &descriptor)
    }

    pub fn serialize_to_string(&self, record: &EntityRecord) -> Result<String> {
        let descriptor = self.registry.resolve(record.type_id())?;
        self.codec.write_string(record, &descriptor)
    }

    /// Decodes `fragment` as a record of `type_id`.
    pub fn deserialize(&self, fragment: &Fragment, type_id: ThingTypeId) -> Result<EntityRecord> {
        let descriptor = self.registry.resolve(type_id)?;
        self.codec.read(fragment, &descriptor)
    }

    /// Parses and decodes `xml` as a record of `type_id`.
    pub fn deserialize_str(&self, xml: &str, type_id: ThingTypeId) -> Result<EntityRecord> {
        let fragment = Fragment::parse(xml)?;
        self.deserialize(&fragment, type_id)
    }

    /// Decodes `fragment` into `target`, whose type selects the descriptor.
    /// `target` is unchanged on failure.
    pub fn deserialize_into(&self, fragment: &Fragment, target: &mut EntityRecord) -> Result<()> {
        self.registry.resolve(target.type_id())?;
        self.codec.read_into(fragment, target)
    }

    /// Every validation error in `record`; empty when the record is valid.
    pub fn validate(&self, record: &EntityRecord) -> ValidationReport {
        validate::validate_struct(record.body(), &FieldPath::root(record.schema().root()))
    }
}
