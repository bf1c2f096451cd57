//! Shared fixtures for the thing integration tests.
//!
//! The `reading` type exercises every layout feature: an attribute, a
//! required date-time, a preferred choice between an absolute measurement
//! and a relative decimal, a repeated text field and a nested structure.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal_macros::dec;

use healthvault_thing::{
    ApproximateDate, ApproximateDateTime, ApproximateTime, CodableValue, CrossFieldRule,
    EntityRecord, FieldRule, FieldSpec, HealthServiceDate, HealthServiceDateTime, Layout,
    Measurement, MeasurementKind, SchemaDescriptor, StructValue, ThingContext, ThingTypeId,
    TypeRegistry, ValueKind,
};

pub const READING_TYPE_ID: ThingTypeId =
    ThingTypeId::from_u128(0x5f1c_0a77_3b2e_4d19_9e6a_1c2f_8b3d_7e01);

pub fn detail_layout() -> Arc<Layout> {
    Layout::builder()
        .field(FieldSpec::required("note", ValueKind::Text).with_rule(FieldRule::NotBlank))
        .field(FieldSpec::optional("onset", ValueKind::ApproximateDateTime))
        .field(FieldSpec::optional("confirmed", ValueKind::Boolean))
        .build()
}

pub fn reading_descriptor() -> SchemaDescriptor {
    SchemaDescriptor::builder(READING_TYPE_ID, "reading")
        .name("Reading")
        .field(FieldSpec::attribute("source"))
        .field(FieldSpec::required("when", ValueKind::HealthServiceDateTime))
        .field(FieldSpec::optional(
            "absolute",
            ValueKind::Measurement(MeasurementKind::blood_glucose()),
        ))
        .field(
            FieldSpec::optional("relative", ValueKind::Decimal)
                .with_rule(FieldRule::decimal_between(dec!(0), dec!(1))),
        )
        .field(FieldSpec::repeated("tag", ValueKind::Text).with_rule(FieldRule::NotBlank))
        .field(FieldSpec::optional("detail", ValueKind::Structure(detail_layout())))
        .field(FieldSpec::optional("count", ValueKind::Integer).with_rule(FieldRule::at_least(0)))
        .field(FieldSpec::optional("method", ValueKind::CodableValue))
        .rule(CrossFieldRule::PreferredChoice {
            preferred: "absolute".into(),
            alternative: "relative".into(),
            required: true,
        })
        .build()
}

pub fn registry() -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    registry
        .register(READING_TYPE_ID, reading_descriptor())
        .expect("fixture descriptor registers");
    registry
}

pub fn context() -> ThingContext {
    ThingContext::new(registry())
}

pub fn when() -> HealthServiceDateTime {
    HealthServiceDateTime::at(
        HealthServiceDate::new(2024, 3, 9).unwrap(),
        ApproximateTime::hm(7, 45).unwrap(),
    )
}

/// A valid record with every field populated except `relative`.
pub fn full_reading(context: &ThingContext) -> EntityRecord {
    let mut record = context.new_record(READING_TYPE_ID).unwrap();
    record.set("source", "meter").unwrap();
    record.set("when", when()).unwrap();
    record
        .set("absolute", Measurement::new(dec!(5.4)))
        .unwrap();
    record.push("tag", "fasting").unwrap();
    record.push("tag", "morning").unwrap();

    let detail = StructValue::new(&detail_layout())
        .with("note", "felt fine")
        .unwrap()
        .with(
            "onset",
            ApproximateDateTime::from_date(ApproximateDate::year_month(2023, 12).unwrap()),
        )
        .unwrap()
        .with("confirmed", true)
        .unwrap();
    record.set("detail", detail).unwrap();
    record.set("count", 2).unwrap();
    record.set("method", CodableValue::new("finger stick")).unwrap();
    record
}

pub const WHEN_XML: &str =
    "<when><date><y>2024</y><m>3</m><d>9</d></date><time><h>7</h><m>45</m></time></when>";
