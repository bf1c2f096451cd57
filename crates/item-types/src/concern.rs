//! The `concern` thing type: a health concern the person has recorded.

use std::sync::Arc;

use once_cell::sync::Lazy;

use healthvault_thing::{
    CodableValue, EntityRecord, FieldSpec, SchemaDescriptor, ThingTypeId, ValidationReport,
    ValueKind,
};

pub const TYPE_ID: ThingTypeId = ThingTypeId::from_u128(0xaea2e8f2_11dd_4a7d_ab43_1d58764ebc19);
pub const ROOT: &str = "concern";

pub const DESCRIPTION: &str = "description";
pub const STATUS: &str = "status";

static DESCRIPTOR: Lazy<SchemaDescriptor> = Lazy::new(|| {
    SchemaDescriptor::builder(TYPE_ID, ROOT)
        .name("Concern")
        .field(FieldSpec::required(DESCRIPTION, ValueKind::CodableValue))
        .field(FieldSpec::optional(STATUS, ValueKind::CodableValue))
        .build()
});

pub fn descriptor() -> &'static SchemaDescriptor {
    &DESCRIPTOR
}

/// Builds a concern record against `schema` with the given description.
pub fn record(
    schema: Arc<SchemaDescriptor>,
    description: impl Into<CodableValue>,
) -> Result<EntityRecord, ValidationReport> {
    EntityRecord::new(schema).with(DESCRIPTION, description.into())
}
