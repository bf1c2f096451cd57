//! The `diabetes-insulin-injection-use` thing type.

use once_cell::sync::Lazy;

use healthvault_thing::{
    FieldRule, FieldSpec, MeasurementKind, SchemaDescriptor, ThingTypeId, ValueKind,
};

pub const TYPE_ID: ThingTypeId = ThingTypeId::from_u128(0x184166be_8adb_4d9c_8162_c403040e31ad);
pub const ROOT: &str = "diabetes-insulin-injection-use";

pub const WHEN: &str = "when";
pub const TYPE: &str = "type";
pub const AMOUNT: &str = "amount";
pub const DEVICE_ID: &str = "device-id";

static DESCRIPTOR: Lazy<SchemaDescriptor> = Lazy::new(|| {
    SchemaDescriptor::builder(TYPE_ID, ROOT)
        .name("Insulin Injection Use")
        .field(FieldSpec::required(WHEN, ValueKind::HealthServiceDateTime))
        .field(FieldSpec::required(TYPE, ValueKind::CodableValue))
        .field(FieldSpec::required(
            AMOUNT,
            ValueKind::Measurement(MeasurementKind::insulin()),
        ))
        .field(FieldSpec::optional(DEVICE_ID, ValueKind::Text).with_rule(FieldRule::NotBlank))
        .build()
});

pub fn descriptor() -> &'static SchemaDescriptor {
    &DESCRIPTOR
}
