//! # HealthVault things
//!
//! Typed health record items ("things") and the machinery that turns them
//! into the type-specific XML fragment of a record and back.
//!
//! Every thing type is described declaratively by a [`SchemaDescriptor`]: a
//! root element name plus an ordered [`Layout`] of fields. One generic
//! [`DocumentCodec`] encodes, decodes and validates all types from their
//! descriptors, using the primitive [`codec`]s for dates, times, codable
//! values and measurements. A [`TypeRegistry`] maps each stable
//! [`ThingTypeId`] to its descriptor, and [`ThingContext`] ties the two
//! together.
//!
//! ```
//! use std::sync::Arc;
//!
//! use healthvault_thing::{
//!     CodableValue, EntityRecord, FieldSpec, SchemaDescriptor, ThingContext, ThingTypeId,
//!     TypeRegistry, ValueKind,
//! };
//!
//! let type_id = ThingTypeId::from_u128(0x1);
//! let registry = Arc::new(TypeRegistry::new());
//! let descriptor = registry.register(
//!     type_id,
//!     SchemaDescriptor::builder(type_id, "note")
//!         .field(FieldSpec::required("subject", ValueKind::CodableValue))
//!         .build(),
//! )?;
//!
//! let context = ThingContext::new(registry);
//! let record = EntityRecord::new(descriptor).with("subject", CodableValue::new("follow-up"))?;
//! let xml = context.serialize_to_string(&record)?;
//! assert_eq!(xml, "<note><subject><text>follow-up</text></subject></note>");
//!
//! let back = context.deserialize_str(&xml, type_id)?;
//! assert_eq!(back, record);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod context;
pub mod engine;
pub mod error;
pub mod path;
pub mod record;
pub mod registry;
pub mod schema;
pub mod type_id;
pub mod validate;
pub mod values;

pub use context::ThingContext;
pub use engine::{CodecSettings, DocumentCodec};
pub use error::{
    ComponentError, RegistryError, Result, ThingError, ValidationError, ValidationErrorKind,
    ValidationReport,
};
pub use path::FieldPath;
pub use record::{EntityRecord, FieldUpdate};
pub use registry::TypeRegistry;
pub use schema::{
    Cardinality, CrossFieldRule, FieldLocation, FieldRule, FieldSpec, Layout, MeasurementKind,
    SchemaDescriptor, ValueKind,
};
pub use type_id::ThingTypeId;
pub use values::{
    ApproximateDate, ApproximateDateTime, ApproximateTime, CodableValue, CodedValue, DisplayValue,
    HealthServiceDate, HealthServiceDateTime, Measurement, StructValue, UnknownElement, Value,
};

// Re-exported so descriptors and tests can name decimal values and fragments
// without extra dependencies.
pub use healthvault_xml::{Element, Fragment};
pub use rust_decimal::Decimal;
