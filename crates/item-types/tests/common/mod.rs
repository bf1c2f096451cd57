//! Shared helpers for the item type integration tests.
//!
//! `valid_record` builds a proptest strategy for any registered descriptor by
//! walking its layout, so the round-trip property covers every schema
//! without per-type generators.

#![allow(dead_code)]

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use healthvault_item_types::standard_registry;
use healthvault_thing::{
    ApproximateDate, ApproximateDateTime, ApproximateTime, CodableValue, CodedValue,
    CrossFieldRule, DisplayValue, EntityRecord, FieldRule, FieldSpec, HealthServiceDate,
    HealthServiceDateTime, Layout, Measurement, MeasurementKind, SchemaDescriptor, StructValue,
    ThingContext, Value, ValueKind,
};
use healthvault_thing::{Cardinality, FieldUpdate};

pub fn context() -> ThingContext {
    ThingContext::new(standard_registry().unwrap())
}

pub fn when() -> HealthServiceDateTime {
    HealthServiceDateTime::at(
        HealthServiceDate::new(2024, 5, 17).unwrap(),
        ApproximateTime::hm(6, 30).unwrap(),
    )
}

pub const WHEN_XML: &str =
    "<when><date><y>2024</y><m>5</m><d>17</d></date><time><h>6</h><m>30</m></time></when>";

// ============================================================================
// Value strategies
// ============================================================================

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,11}"
}

fn approximate_date() -> impl Strategy<Value = ApproximateDate> {
    (1000i32..=9999, prop::option::of((1u32..=12, prop::option::of(1u32..=28)))).prop_map(
        |(year, rest)| match rest {
            None => ApproximateDate::year_only(year).unwrap(),
            Some((month, day)) => ApproximateDate::new(year, Some(month), day).unwrap(),
        },
    )
}

fn health_service_date() -> impl Strategy<Value = HealthServiceDate> {
    (1000i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| HealthServiceDate::new(year, month, day).unwrap())
}

fn approximate_time() -> impl Strategy<Value = ApproximateTime> {
    (0u32..24, 0u32..60, prop::option::of((0u32..60, prop::option::of(0u32..1000)))).prop_map(
        |(hour, minute, rest)| match rest {
            None => ApproximateTime::hm(hour, minute).unwrap(),
            Some((second, millisecond)) => {
                ApproximateTime::new(hour, minute, Some(second), millisecond).unwrap()
            }
        },
    )
}

fn codable() -> impl Strategy<Value = CodableValue> {
    (word(), prop::collection::vec((word(), word()), 0..3)).prop_map(|(text, codes)| {
        codes
            .into_iter()
            .fold(CodableValue::new(text), |value, (code, vocabulary)| {
                value.with_code(CodedValue::new(code, vocabulary))
            })
    })
}

fn health_service_date_time() -> impl Strategy<Value = HealthServiceDateTime> {
    (health_service_date(), prop::option::of(approximate_time())).prop_map(|(date, time)| {
        match time {
            Some(time) => HealthServiceDateTime::at(date, time),
            None => HealthServiceDateTime::new(date),
        }
    })
}

fn approximate_date_time() -> impl Strategy<Value = ApproximateDateTime> {
    prop_oneof![
        approximate_date().prop_map(ApproximateDateTime::from_date),
        (approximate_date(), approximate_time())
            .prop_map(|(date, time)| ApproximateDateTime::at(date, time)),
        word().prop_map(ApproximateDateTime::descriptive),
    ]
}

fn hundredths(min: i64, max: i64) -> impl Strategy<Value = Decimal> {
    (min..=max).prop_map(|n| Decimal::new(n, 2))
}

fn integer(rule: Option<&FieldRule>) -> BoxedStrategy<i64> {
    match rule {
        Some(FieldRule::IntegerRange { min, max }) => {
            let low = min.unwrap_or(-1_000);
            let high = max.unwrap_or(low + 10_000);
            (low..=high).boxed()
        }
        _ => (-1_000i64..=1_000).boxed(),
    }
}

fn decimal(rule: Option<&FieldRule>) -> BoxedStrategy<Decimal> {
    match rule {
        Some(FieldRule::DecimalRange { min, max }) => {
            let to_hundredths = |d: Decimal| {
                i64::try_from((d * Decimal::ONE_HUNDRED).trunc().mantissa()).unwrap_or(0)
            };
            let low = min.map(to_hundredths).unwrap_or(-100_000);
            let high = max.map(to_hundredths).unwrap_or(low + 100_000);
            hundredths(low, high).boxed()
        }
        _ => hundredths(-100_000, 100_000).boxed(),
    }
}

fn measurement(kind: &MeasurementKind) -> BoxedStrategy<Measurement> {
    let unit = kind.unit_element.clone();
    let low = if kind.minimum.is_some() { 0 } else { -10_000 };
    (hundredths(low, 100_000), any::<bool>())
        .prop_map(move |(value, shown)| {
            let measurement = Measurement::new(value);
            if shown {
                measurement.with_display(DisplayValue::new(value, unit.clone()))
            } else {
                measurement
            }
        })
        .boxed()
}

fn value(spec: &FieldSpec) -> BoxedStrategy<Value> {
    let rule = spec.rule.as_ref();
    match &spec.kind {
        ValueKind::Text => word().prop_map(Value::from).boxed(),
        ValueKind::Integer => integer(rule).prop_map(Value::from).boxed(),
        ValueKind::Decimal => decimal(rule).prop_map(Value::from).boxed(),
        ValueKind::Boolean => any::<bool>().prop_map(Value::from).boxed(),
        ValueKind::CodableValue => codable().prop_map(Value::from).boxed(),
        ValueKind::ApproximateDate => approximate_date().prop_map(Value::from).boxed(),
        ValueKind::ApproximateTime => approximate_time().prop_map(Value::from).boxed(),
        ValueKind::ApproximateDateTime => approximate_date_time().prop_map(Value::from).boxed(),
        ValueKind::HealthServiceDate => health_service_date().prop_map(Value::from).boxed(),
        ValueKind::HealthServiceDateTime => {
            health_service_date_time().prop_map(Value::from).boxed()
        }
        ValueKind::Measurement(kind) => measurement(kind).prop_map(Value::from).boxed(),
        ValueKind::Structure(layout) => structure(layout).prop_map(Value::from).boxed(),
    }
}

// ============================================================================
// Layout strategies
// ============================================================================

/// Names that take part in a preferred choice; exactly one side is kept.
fn choice_pairs(layout: &Layout) -> Vec<(String, String)> {
    layout
        .rules()
        .iter()
        .map(|rule| match rule {
            CrossFieldRule::PreferredChoice {
                preferred,
                alternative,
                ..
            } => (preferred.clone(), alternative.clone()),
        })
        .collect()
}

/// Field values for a valid instance of `layout`, in layout order, with
/// absent fields omitted.
pub fn layout_values(layout: &Arc<Layout>) -> BoxedStrategy<Vec<(String, Vec<Value>)>> {
    let pairs = choice_pairs(layout);
    let in_choice =
        |name: &str| pairs.iter().any(|(a, b)| a.as_str() == name || b.as_str() == name);

    let fields: Vec<BoxedStrategy<(String, Vec<Value>)>> = layout
        .fields()
        .iter()
        .map(|spec| {
            let name = spec.name.clone();
            let values = match spec.cardinality {
                _ if in_choice(&spec.name) => value(spec).prop_map(|v| vec![v]).boxed(),
                Cardinality::Required => value(spec).prop_map(|v| vec![v]).boxed(),
                Cardinality::Optional => prop::option::of(value(spec))
                    .prop_map(|v| v.into_iter().collect())
                    .boxed(),
                Cardinality::Repeated => prop::collection::vec(value(spec), 0..3).boxed(),
            };
            values.prop_map(move |values| (name.clone(), values)).boxed()
        })
        .collect();

    let picks = prop::collection::vec(any::<bool>(), pairs.len());
    (fields, picks)
        .prop_map(move |(mut fields, picks)| {
            for ((preferred, alternative), keep_preferred) in pairs.iter().zip(picks) {
                let dropped = if keep_preferred { alternative } else { preferred };
                fields.retain(|(name, _)| name != dropped);
            }
            fields.retain(|(_, values)| !values.is_empty());
            fields
        })
        .boxed()
}

pub fn structure(layout: &Arc<Layout>) -> BoxedStrategy<StructValue> {
    let layout = Arc::clone(layout);
    layout_values(&layout)
        .prop_map(move |fields| {
            let mut value = StructValue::new(&layout);
            for (name, values) in fields {
                value.set_all(&name, values).unwrap();
            }
            value
        })
        .boxed()
}

/// A valid record of the type `schema` describes.
pub fn valid_record(schema: Arc<SchemaDescriptor>) -> BoxedStrategy<EntityRecord> {
    layout_values(schema.layout())
        .prop_map(move |fields| {
            let mut record = EntityRecord::new(Arc::clone(&schema));
            record
                .apply(
                    fields
                        .into_iter()
                        .map(|(name, values)| FieldUpdate::SetAll(name, values)),
                )
                .unwrap();
            record
        })
        .boxed()
}
