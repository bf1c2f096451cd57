//! The `pregnancy` thing type and its nested delivery, baby and name
//! structures.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use healthvault_thing::{
    FieldRule, FieldSpec, Layout, MeasurementKind, SchemaDescriptor, ThingTypeId, ValueKind,
};

pub const TYPE_ID: ThingTypeId = ThingTypeId::from_u128(0x46d485cf_2b84_429d_9159_83152ba801f4);
pub const ROOT: &str = "pregnancy";

pub const DUE_DATE: &str = "due-date";
pub const LAST_MENSTRUAL_PERIOD: &str = "last-menstrual-period";
pub const CONCEPTION_METHOD: &str = "conception-method";
pub const FETUS_COUNT: &str = "fetus-count";
pub const GESTATIONAL_AGE: &str = "gestational-age";
pub const DELIVERY: &str = "delivery";

/// Field names of a `delivery` entry.
pub mod delivery {
    pub const TIME_OF_DELIVERY: &str = "time-of-delivery";
    pub const LABOR_DURATION: &str = "labor-duration";
    pub const COMPLICATIONS: &str = "complications";
    pub const ANESTHESIA: &str = "anesthesia";
    pub const DELIVERY_METHOD: &str = "delivery-method";
    pub const OUTCOME: &str = "outcome";
    pub const BABY: &str = "baby";
    pub const NOTE: &str = "note";
}

/// Field names of a delivered `baby`.
pub mod baby {
    pub const NAME: &str = "name";
    pub const GENDER: &str = "gender";
    pub const WEIGHT: &str = "weight";
    pub const LENGTH: &str = "length";
    pub const HEAD_CIRCUMFERENCE: &str = "head-circumference";
    pub const NOTE: &str = "note";
}

/// Field names of a person's `name`.
pub mod name {
    pub const FULL: &str = "full";
    pub const TITLE: &str = "title";
    pub const FIRST: &str = "first";
    pub const MIDDLE: &str = "middle";
    pub const LAST: &str = "last";
    pub const SUFFIX: &str = "suffix";
}

static NAME_LAYOUT: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::required(name::FULL, ValueKind::Text).with_rule(FieldRule::NotBlank))
        .field(FieldSpec::optional(name::TITLE, ValueKind::CodableValue))
        .field(FieldSpec::optional(name::FIRST, ValueKind::Text))
        .field(FieldSpec::optional(name::MIDDLE, ValueKind::Text))
        .field(FieldSpec::optional(name::LAST, ValueKind::Text))
        .field(FieldSpec::optional(name::SUFFIX, ValueKind::CodableValue))
        .build()
});

static BABY_LAYOUT: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::optional(
            baby::NAME,
            ValueKind::Structure(name_layout()),
        ))
        .field(FieldSpec::optional(baby::GENDER, ValueKind::CodableValue))
        .field(FieldSpec::optional(
            baby::WEIGHT,
            ValueKind::Measurement(MeasurementKind::weight()),
        ))
        .field(FieldSpec::optional(
            baby::LENGTH,
            ValueKind::Measurement(MeasurementKind::length()),
        ))
        .field(FieldSpec::optional(
            baby::HEAD_CIRCUMFERENCE,
            ValueKind::Measurement(MeasurementKind::length()),
        ))
        .field(FieldSpec::optional(baby::NOTE, ValueKind::Text))
        .build()
});

static DELIVERY_LAYOUT: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::optional(
            delivery::TIME_OF_DELIVERY,
            ValueKind::ApproximateDateTime,
        ))
        .field(
            FieldSpec::optional(delivery::LABOR_DURATION, ValueKind::Decimal)
                .with_rule(FieldRule::decimal_at_least(Decimal::ZERO)),
        )
        .field(FieldSpec::repeated(
            delivery::COMPLICATIONS,
            ValueKind::CodableValue,
        ))
        .field(FieldSpec::repeated(delivery::ANESTHESIA, ValueKind::CodableValue))
        .field(FieldSpec::optional(
            delivery::DELIVERY_METHOD,
            ValueKind::CodableValue,
        ))
        .field(FieldSpec::optional(delivery::OUTCOME, ValueKind::CodableValue))
        .field(FieldSpec::optional(
            delivery::BABY,
            ValueKind::Structure(baby_layout()),
        ))
        .field(FieldSpec::optional(delivery::NOTE, ValueKind::Text))
        .build()
});

static DESCRIPTOR: Lazy<SchemaDescriptor> = Lazy::new(|| {
    SchemaDescriptor::builder(TYPE_ID, ROOT)
        .name("Pregnancy")
        .field(FieldSpec::optional(DUE_DATE, ValueKind::ApproximateDate))
        .field(FieldSpec::optional(
            LAST_MENSTRUAL_PERIOD,
            ValueKind::HealthServiceDate,
        ))
        .field(FieldSpec::optional(CONCEPTION_METHOD, ValueKind::CodableValue))
        .field(
            FieldSpec::optional(FETUS_COUNT, ValueKind::Integer).with_rule(FieldRule::at_least(0)),
        )
        .field(
            FieldSpec::optional(GESTATIONAL_AGE, ValueKind::Integer)
                .with_rule(FieldRule::at_least(0)),
        )
        .field(FieldSpec::repeated(
            DELIVERY,
            ValueKind::Structure(delivery_layout()),
        ))
        .build()
});

pub fn descriptor() -> &'static SchemaDescriptor {
    &DESCRIPTOR
}

pub fn delivery_layout() -> Arc<Layout> {
    Arc::clone(&DELIVERY_LAYOUT)
}

pub fn baby_layout() -> Arc<Layout> {
    Arc::clone(&BABY_LAYOUT)
}

pub fn name_layout() -> Arc<Layout> {
    Arc::clone(&NAME_LAYOUT)
}
