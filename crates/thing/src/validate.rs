//! Field validator.
//!
//! Walks a structure against its layout and collects every violation:
//! missing required fields, cardinality, value kind, declared field rules,
//! the checks each primitive codec defines, and cross-field rules.

use rust_decimal::Decimal;

use crate::codec;
use crate::error::{ValidationError, ValidationErrorKind, ValidationReport};
use crate::path::FieldPath;
use crate::schema::{CrossFieldRule, FieldRule, FieldSpec, ValueKind};
use crate::values::{Entry, StructValue, Value, entry_path, field_path};

/// Validates every field of `value` and the rules of its layout.
pub fn validate_struct(value: &StructValue, path: &FieldPath) -> ValidationReport {
    let mut report = ValidationReport::new();
    check_struct(value, path, &mut report);
    report
}

pub(crate) fn check_struct(value: &StructValue, path: &FieldPath, report: &mut ValidationReport) {
    let layout = value.layout();
    for (spec, entries) in layout.fields().iter().zip(value.slots()) {
        check_entries(spec, entries, &field_path(spec, path), report);
    }

    for rule in layout.rules() {
        let CrossFieldRule::PreferredChoice {
            preferred,
            alternative,
            required,
        } = rule;
        if *required && !value.is_present(preferred) && !value.is_present(alternative) {
            report.push(ValidationError::new(
                ValidationErrorKind::MissingRequiredField,
                path.child(preferred),
                format!("one of '{}' or '{}' is required", preferred, alternative),
            ));
        }
    }
}

/// Checks the complete value list of one field at `path`.
pub(crate) fn check_entries(
    spec: &FieldSpec,
    entries: &[Entry],
    path: &FieldPath,
    report: &mut ValidationReport,
) {
    if entries.is_empty() {
        if spec.is_required() {
            report.push(ValidationError::missing(path.clone()));
        }
        return;
    }
    if !spec.is_repeated() && entries.len() > 1 {
        report.push(ValidationError::malformed(
            path.clone(),
            format!("field holds a single value, found {}", entries.len()),
        ));
    }
    for (index, entry) in entries.iter().enumerate() {
        check_value(spec, &entry.value, &entry_path(spec, path, index), report);
    }
}

/// Checks one value of a field at `path`.
pub(crate) fn check_value(
    spec: &FieldSpec,
    value: &Value,
    path: &FieldPath,
    report: &mut ValidationReport,
) {
    if !spec.kind.accepts(value) {
        report.push(ValidationError::malformed(
            path.clone(),
            format!("expected {}, found {}", spec.kind.name(), value.kind_name()),
        ));
        return;
    }

    if let Some(rule) = &spec.rule {
        check_rule(rule, value, path, report);
    }

    match (&spec.kind, value) {
        (ValueKind::Structure(_), Value::Structure(inner)) => check_struct(inner, path, report),
        (ValueKind::Measurement(kind), Value::Measurement(measurement)) => {
            codec::check_measurement(measurement, kind, path, report)
        }
        _ => codec::check_primitive(value, path, report),
    }
}

fn check_rule(rule: &FieldRule, value: &Value, path: &FieldPath, report: &mut ValidationReport) {
    match (rule, value) {
        (FieldRule::IntegerRange { min, max }, Value::Integer(number)) => {
            if min.is_some_and(|min| *number < min) || max.is_some_and(|max| *number > max) {
                report.push(ValidationError::out_of_range(
                    path.clone(),
                    format!("{} is outside {}", number, describe_range(min, max)),
                ));
            }
        }
        (FieldRule::DecimalRange { min, max }, Value::Decimal(number)) => {
            if min.is_some_and(|min| *number < min) || max.is_some_and(|max| *number > max) {
                report.push(ValidationError::out_of_range(
                    path.clone(),
                    format!("{} is outside {}", number, describe_range(min, max)),
                ));
            }
        }
        (FieldRule::NotBlank, Value::Text(text)) => {
            if text.trim().is_empty() {
                report.push(ValidationError::blank(path.clone()));
            }
        }
        _ => {}
    }
}

fn describe_range<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{}, {}]", min, max),
        (Some(min), None) => format!("[{}, ..)", min),
        (None, Some(max)) => format!("(.., {}]", max),
        (None, None) => "(.., ..)".to_string(),
    }
}

/// Returns true if `value` is at least `minimum`, treating a missing
/// minimum as unbounded.
pub(crate) fn at_least(value: Decimal, minimum: Option<Decimal>) -> bool {
    minimum.is_none_or(|minimum| value >= minimum)
}
