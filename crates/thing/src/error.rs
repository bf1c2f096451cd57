//! Error types for thing validation, encoding, decoding and registration.
//!
//! Validation problems are collected rather than raised one at a time: every
//! operation that validates returns a [`ValidationReport`] holding all
//! [`ValidationError`]s it found, each tagged with a [`FieldPath`].

use std::fmt;

use healthvault_xml::XmlError;
use serde::Serialize;
use thiserror::Error;

use crate::path::FieldPath;
use crate::type_id::ThingTypeId;

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    /// A required field (or a required choice between fields) has no value.
    MissingRequiredField,
    /// A number is outside its declared range.
    OutOfRange,
    /// A string that must carry content is empty or whitespace.
    EmptyOrWhitespaceString,
    /// An element has the wrong shape: missing or duplicated parts, text
    /// that does not parse, or a value of the wrong kind.
    MalformedSubStructure,
    /// The fragment root is not the element the schema expects.
    UnknownRootElement,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationErrorKind::MissingRequiredField => "missing required field",
            ValidationErrorKind::OutOfRange => "value out of range",
            ValidationErrorKind::EmptyOrWhitespaceString => "empty or whitespace string",
            ValidationErrorKind::MalformedSubStructure => "malformed structure",
            ValidationErrorKind::UnknownRootElement => "unknown root element",
        };
        f.write_str(label)
    }
}

/// A single validation failure at a specific location.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind} at '{path}': {message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub path: FieldPath,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    pub fn missing(path: FieldPath) -> Self {
        let message = format!("'{}' is required", path);
        Self::new(ValidationErrorKind::MissingRequiredField, path, message)
    }

    pub fn out_of_range(path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::OutOfRange, path, message)
    }

    pub fn blank(path: FieldPath) -> Self {
        Self::new(
            ValidationErrorKind::EmptyOrWhitespaceString,
            path,
            "value must not be empty or whitespace",
        )
    }

    pub fn malformed(path: FieldPath, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MalformedSubStructure, path, message)
    }

    pub fn unknown_root(expected: &str, found: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownRootElement,
            FieldPath::root(found),
            format!("expected root element <{}>, found <{}>", expected, found),
        )
    }
}

/// Every validation failure found by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Returns true if the report holds an error of `kind` at `path`.
    pub fn contains(&self, kind: ValidationErrorKind, path: &str) -> bool {
        self.errors
            .iter()
            .any(|error| error.kind == kind && error.path == path)
    }

    /// Returns true if the report holds an error of `kind` anywhere.
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind == kind)
    }

    /// `Ok(())` when empty, otherwise the report itself as the error.
    pub fn into_result(self) -> std::result::Result<(), ValidationReport> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no validation errors"),
            1 => write!(f, "{}", self.errors[0]),
            n => {
                write!(f, "{} validation errors: ", n)?;
                for (i, error) in self.errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationReport {}

impl From<ValidationError> for ValidationReport {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ValidationError> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Rejection of a primitive component value by its constructor or setter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The component is outside its closed range.
    #[error("{component} must be between {min} and {max}, got {value}")]
    OutOfRange {
        component: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The component may only be present together with another one.
    #[error("{component} cannot be set without {requires}")]
    Requires {
        component: &'static str,
        requires: &'static str,
    },
}

impl ComponentError {
    /// Attributes the error to the component element `element` below
    /// `parent`.
    pub fn at(self, parent: &FieldPath, element: &str) -> ValidationError {
        let path = parent.child(element);
        match self {
            ComponentError::OutOfRange { .. } => ValidationError::out_of_range(path, self.to_string()),
            ComponentError::Requires { .. } => ValidationError::malformed(path, self.to_string()),
        }
    }
}

pub(crate) fn check_component(
    component: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> std::result::Result<(), ComponentError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ComponentError::OutOfRange {
            component,
            value,
            min,
            max,
        })
    }
}

/// Errors raised by the [`TypeRegistry`](crate::TypeRegistry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type id {type_id} is not registered")]
    UnregisteredTypeId { type_id: ThingTypeId },

    #[error(
        "type id {type_id} is already registered with a different schema \
         (registered root <{existing_root}>, offered root <{offered_root}>)"
    )]
    ConflictingSchemaRegistration {
        type_id: ThingTypeId,
        existing_root: String,
        offered_root: String,
    },

    #[error("descriptor for <{root}> declares type id {declared} but was registered as {requested}")]
    TypeIdMismatch {
        requested: ThingTypeId,
        declared: ThingTypeId,
        root: String,
    },

    #[error("invalid descriptor for type id {type_id}: {message}")]
    InvalidDescriptor { type_id: ThingTypeId, message: String },

    #[error("registry is frozen; cannot register type id {type_id}")]
    RegistryFrozen { type_id: ThingTypeId },
}

/// Top-level error for serialize and deserialize operations.
#[derive(Error, Debug, Clone)]
pub enum ThingError {
    /// One failure found by an encoder that stops at the first problem.
    #[error(transparent)]
    Field(#[from] ValidationError),

    /// All failures found while validating or decoding.
    #[error(transparent)]
    Invalid(#[from] ValidationReport),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The record was built against a different descriptor than the one
    /// registered for its type id.
    #[error("record schema <{record_root}> does not match the descriptor registered for {type_id}")]
    SchemaMismatch {
        type_id: ThingTypeId,
        record_root: String,
    },
}

impl ThingError {
    /// The validation errors carried by this error, if any.
    pub fn validation_errors(&self) -> Vec<&ValidationError> {
        match self {
            ThingError::Field(error) => vec![error],
            ThingError::Invalid(report) => report.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if this error carries a validation error of `kind`.
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.validation_errors()
            .iter()
            .any(|error| error.kind == kind)
    }
}

/// Result type alias for thing operations.
pub type Result<T> = std::result::Result<T, ThingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_every_error() {
        let mut report = ValidationReport::new();
        report.push(ValidationError::missing(FieldPath::root("concern").child("description")));
        report.push(ValidationError::blank(FieldPath::root("concern").child("status")));

        let text = report.to_string();
        assert!(text.starts_with("2 validation errors"));
        assert!(text.contains("concern/description"));
        assert!(text.contains("concern/status"));
    }

    #[test]
    fn test_report_contains() {
        let report: ValidationReport =
            ValidationError::out_of_range(FieldPath::root("a").child("m"), "month").into();
        assert!(report.contains(ValidationErrorKind::OutOfRange, "a/m"));
        assert!(!report.contains(ValidationErrorKind::OutOfRange, "a/d"));
        assert!(report.has_kind(ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_component_error_mapping() {
        let parent = FieldPath::root("when");
        let range = ComponentError::OutOfRange {
            component: "month",
            value: 13,
            min: 1,
            max: 12,
        };
        let error = range.at(&parent, "m");
        assert_eq!(error.kind, ValidationErrorKind::OutOfRange);
        assert_eq!(error.path, "when/m");

        let requires = ComponentError::Requires {
            component: "day",
            requires: "month",
        };
        assert_eq!(
            requires.at(&parent, "d").kind,
            ValidationErrorKind::MalformedSubStructure
        );
    }

    #[test]
    fn test_thing_error_collects_validation_errors() {
        let report: ValidationReport = vec![
            ValidationError::missing(FieldPath::root("x")),
            ValidationError::missing(FieldPath::root("y")),
        ]
        .into_iter()
        .collect();
        let error = ThingError::from(report);
        assert_eq!(error.validation_errors().len(), 2);
        assert!(error.has_kind(ValidationErrorKind::MissingRequiredField));
        assert!(!error.has_kind(ValidationErrorKind::OutOfRange));
    }

    #[test]
    fn test_into_result_returns_the_report() {
        assert!(ValidationReport::new().into_result().is_ok());

        let report: ValidationReport = ValidationError::missing(FieldPath::root("x")).into();
        let error = report.into_result().unwrap_err();
        assert!(error.contains(ValidationErrorKind::MissingRequiredField, "x"));
    }

    #[test]
    fn test_check_component_bounds_are_inclusive() {
        assert!(check_component("month", 1, 1, 12).is_ok());
        assert!(check_component("month", 12, 1, 12).is_ok());
        assert_eq!(
            check_component("month", 13, 1, 12).unwrap_err(),
            ComponentError::OutOfRange {
                component: "month",
                value: 13,
                min: 1,
                max: 12,
            }
        );
    }
}
