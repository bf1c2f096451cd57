//! The `diabetes-profile` thing type and its target glucose zones.
//!
//! A zone bound is stated either as an absolute blood glucose value or as a
//! fraction of the person's maximum glucose. The absolute form wins when a
//! bound carries both.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use healthvault_thing::{
    CrossFieldRule, FieldRule, FieldSpec, Layout, Measurement, MeasurementKind, SchemaDescriptor,
    StructValue, ThingTypeId, ValidationReport, ValueKind,
};

pub const TYPE_ID: ThingTypeId = ThingTypeId::from_u128(0x80cf4080_ad3f_4bb5_a0b5_907c22f73017);
pub const ROOT: &str = "diabetes-profile";

pub const WHEN: &str = "when";
pub const MAX_HBA1C: &str = "max-hba1c";
pub const TARGET_GLUCOSE_ZONE: &str = "target-glucose-zone";

/// Field names of a `target-glucose-zone`.
pub mod zone {
    pub const NAME: &str = "name";
    pub const LOWER_BOUND: &str = "lower-bound";
    pub const UPPER_BOUND: &str = "upper-bound";
}

/// Field names of a zone bound.
pub mod bound {
    pub const ABSOLUTE_GLUCOSE: &str = "absolute-glucose";
    pub const PERCENT_MAX_GLUCOSE: &str = "percent-max-glucose";
}

static BOUND_LAYOUT: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::optional(
            bound::ABSOLUTE_GLUCOSE,
            ValueKind::Measurement(MeasurementKind::blood_glucose()),
        ))
        .field(
            FieldSpec::optional(bound::PERCENT_MAX_GLUCOSE, ValueKind::Decimal)
                .with_rule(FieldRule::decimal_between(dec!(0), dec!(1))),
        )
        .rule(CrossFieldRule::PreferredChoice {
            preferred: bound::ABSOLUTE_GLUCOSE.into(),
            alternative: bound::PERCENT_MAX_GLUCOSE.into(),
            required: true,
        })
        .build()
});

static ZONE_LAYOUT: Lazy<Arc<Layout>> = Lazy::new(|| {
    Layout::builder()
        .field(FieldSpec::attribute(zone::NAME))
        .field(FieldSpec::required(
            zone::LOWER_BOUND,
            ValueKind::Structure(bound_layout()),
        ))
        .field(FieldSpec::required(
            zone::UPPER_BOUND,
            ValueKind::Structure(bound_layout()),
        ))
        .build()
});

static DESCRIPTOR: Lazy<SchemaDescriptor> = Lazy::new(|| {
    SchemaDescriptor::builder(TYPE_ID, ROOT)
        .name("Diabetes Profile")
        .field(FieldSpec::required(WHEN, ValueKind::HealthServiceDateTime))
        .field(
            FieldSpec::optional(MAX_HBA1C, ValueKind::Decimal)
                .with_rule(FieldRule::decimal_between(dec!(0), dec!(1))),
        )
        .field(FieldSpec::repeated(
            TARGET_GLUCOSE_ZONE,
            ValueKind::Structure(zone_layout()),
        ))
        .build()
});

pub fn descriptor() -> &'static SchemaDescriptor {
    &DESCRIPTOR
}

pub fn zone_layout() -> Arc<Layout> {
    Arc::clone(&ZONE_LAYOUT)
}

pub fn bound_layout() -> Arc<Layout> {
    Arc::clone(&BOUND_LAYOUT)
}

/// A zone bound given as blood glucose in mmol/L.
pub fn absolute_bound(mmol_per_l: Decimal) -> Result<StructValue, ValidationReport> {
    StructValue::new(&bound_layout()).with(bound::ABSOLUTE_GLUCOSE, Measurement::new(mmol_per_l))
}

/// A zone bound given as a fraction of maximum glucose.
pub fn relative_bound(fraction: Decimal) -> Result<StructValue, ValidationReport> {
    StructValue::new(&bound_layout()).with(bound::PERCENT_MAX_GLUCOSE, fraction)
}

/// A target zone between two bounds, optionally named.
pub fn target_zone(
    name: Option<&str>,
    lower: StructValue,
    upper: StructValue,
) -> Result<StructValue, ValidationReport> {
    let mut value = StructValue::new(&zone_layout())
        .with(zone::LOWER_BOUND, lower)?
        .with(zone::UPPER_BOUND, upper)?;
    if let Some(name) = name {
        value.set(zone::NAME, name)?;
    }
    Ok(value)
}
