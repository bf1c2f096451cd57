//! # HealthVault item types
//!
//! Schema descriptors for the standard thing types. Each module exposes the
//! type's stable [`TYPE_ID`](concern::TYPE_ID), its root element name, the
//! field names of its layout and a lazily built [`SchemaDescriptor`].
//!
//! ```
//! use healthvault_item_types::{concern, standard_registry};
//! use healthvault_thing::{CodableValue, ThingContext};
//!
//! let context = ThingContext::new(standard_registry()?);
//! let record = context
//!     .new_record(concern::TYPE_ID)?
//!     .with(concern::DESCRIPTION, CodableValue::new("anxiety"))?;
//! assert_eq!(
//!     context.serialize_to_string(&record)?,
//!     "<concern><description><text>anxiety</text></description></concern>"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use healthvault_thing::{RegistryError, SchemaDescriptor, TypeRegistry};
use tracing::debug;

pub mod concern;
pub mod diabetes_profile;
pub mod insulin;
pub mod layouts;
pub mod pregnancy;
pub mod sleep;

/// Every standard descriptor, in registration order.
pub fn descriptors() -> [&'static SchemaDescriptor; 5] {
    [
        concern::descriptor(),
        pregnancy::descriptor(),
        sleep::descriptor(),
        insulin::descriptor(),
        diabetes_profile::descriptor(),
    ]
}

/// Registers every standard descriptor with `registry`.
///
/// Registering into a registry that already holds the same descriptors is a
/// no-op.
pub fn register_all(registry: &TypeRegistry) -> Result<(), RegistryError> {
    register(registry, &descriptors())?;
    debug!(count = registry.len(), "standard item types registered");
    Ok(())
}

/// A frozen registry holding the standard item types.
pub fn standard_registry() -> Result<Arc<TypeRegistry>, RegistryError> {
    frozen_registry(&descriptors())
}

fn register(registry: &TypeRegistry, descriptors: &[&SchemaDescriptor]) -> Result<(), RegistryError> {
    for descriptor in descriptors {
        registry.register(descriptor.type_id(), (*descriptor).clone())?;
    }
    Ok(())
}

fn frozen_registry(descriptors: &[&SchemaDescriptor]) -> Result<Arc<TypeRegistry>, RegistryError> {
    let registry = TypeRegistry::new();
    register(&registry, descriptors)?;
    registry.freeze();
    Ok(Arc::new(registry))
}
