//! Type Registry.
//!
//! Maps thing type ids to their schema descriptors. Registration happens
//! while the process starts up; afterwards the registry is usually frozen and
//! only read. Reads go through an atomically swapped snapshot and never take
//! a lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::schema::SchemaDescriptor;
use crate::type_id::ThingTypeId;

#[derive(Debug, Default, Clone)]
struct Snapshot {
    /// Descriptors indexed by type id.
    by_id: HashMap<ThingTypeId, Arc<SchemaDescriptor>>,

    /// First type registered for each root element name.
    by_root: HashMap<String, ThingTypeId>,
}

/// Registry of thing schema descriptors.
///
/// Registering an equal descriptor twice is a no-op; registering a
/// different descriptor under a taken id is rejected.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    snapshot: ArcSwap<Snapshot>,
    write_lock: Mutex<()>,
    frozen: AtomicBool,
}

impl TypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under `type_id`, returning the stored
    /// descriptor.
    pub fn register(
        &self,
        type_id: ThingTypeId,
        descriptor: SchemaDescriptor,
    ) -> Result<Arc<SchemaDescriptor>, RegistryError> {
        if descriptor.type_id() != type_id {
            return Err(RegistryError::TypeIdMismatch {
                requested: type_id,
                declared: descriptor.type_id(),
                root: descriptor.root().to_string(),
            });
        }
        self.register_descriptor(descriptor)
    }

    /// Registers `descriptor` under its own type id.
    pub fn register_descriptor(
        &self,
        descriptor: SchemaDescriptor,
    ) -> Result<Arc<SchemaDescriptor>, RegistryError> {
        let type_id = descriptor.type_id();
        let _guard = self.write_lock.lock();

        let current = self.snapshot.load();
        if let Some(existing) = current.by_id.get(&type_id) {
            if **existing == descriptor {
                debug!(%type_id, root = descriptor.root(), "descriptor already registered");
                return Ok(Arc::clone(existing));
            }
            warn!(%type_id, root = descriptor.root(), "conflicting descriptor registration");
            return Err(RegistryError::ConflictingSchemaRegistration {
                type_id,
                existing_root: existing.root().to_string(),
                offered_root: descriptor.root().to_string(),
            });
        }

        if self.frozen.load(Ordering::Acquire) {
            return Err(RegistryError::RegistryFrozen { type_id });
        }

        descriptor
            .check_consistency()
            .map_err(|message| RegistryError::InvalidDescriptor { type_id, message })?;

        let descriptor = Arc::new(descriptor);
        let mut next = Snapshot::clone(&current);
        next.by_id.insert(type_id, Arc::clone(&descriptor));
        next.by_root
            .entry(descriptor.root().to_string())
            .or_insert(type_id);
        self.snapshot.store(Arc::new(next));

        info!(%type_id, root = descriptor.root(), name = descriptor.name(), "registered thing type");
        Ok(descriptor)
    }

    /// Looks up the descriptor for `type_id`.
    pub fn resolve(&self, type_id: ThingTypeId) -> Result<Arc<SchemaDescriptor>, RegistryError> {
        self.snapshot
            .load()
            .by_id
            .get(&type_id)
            .cloned()
            .ok_or(RegistryError::UnregisteredTypeId { type_id })
    }

    /// Looks up a descriptor by the root element of its fragments.
    pub fn resolve_root(&self, root: &str) -> Option<Arc<SchemaDescriptor>> {
        let snapshot = self.snapshot.load();
        snapshot
            .by_root
            .get(root)
            .and_then(|type_id| snapshot.by_id.get(type_id))
            .cloned()
    }

    pub fn contains(&self, type_id: ThingTypeId) -> bool {
        self.snapshot.load().by_id.contains_key(&type_id)
    }

    /// Stops further registrations. Re-registering an equal descriptor
    /// still succeeds.
    pub fn freeze(&self) {
        let _guard = self.write_lock.lock();
        if !self.frozen.swap(true, Ordering::AcqRel) {
            debug!(types = self.len(), "type registry frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Registered type ids, sorted.
    pub fn type_ids(&self) -> Vec<ThingTypeId> {
        let mut ids: Vec<ThingTypeId> = self.snapshot.load().by_id.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Registered descriptors, sorted by type id.
    pub fn descriptors(&self) -> Vec<Arc<SchemaDescriptor>> {
        let snapshot = self.snapshot.load();
        let mut descriptors: Vec<Arc<SchemaDescriptor>> = snapshot.by_id.values().cloned().collect();
        descriptors.sort_by_key(|descriptor| descriptor.type_id());
        descriptors
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.snapshot.load().by_id.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshot.load().by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ValueKind};

    fn descriptor(id: u128, root: &str) -> SchemaDescriptor {
        SchemaDescriptor::builder(ThingTypeId::from_u128(id), root)
            .field(FieldSpec::required("text", ValueKind::Text))
            .build()
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = TypeRegistry::new();
        registry.register_descriptor(descriptor(1, "a")).unwrap();

        let resolved = registry.resolve(ThingTypeId::from_u128(1)).unwrap();
        assert_eq!(resolved.root(), "a");
        assert_eq!(registry.resolve_root("a").unwrap().type_id(), ThingTypeId::from_u128(1));
        assert!(registry.resolve_root("b").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mismatched_id() {
        let registry = TypeRegistry::new();
        let error = registry
            .register(ThingTypeId::from_u128(2), descriptor(1, "a"))
            .unwrap_err();
        assert!(matches!(error, RegistryError::TypeIdMismatch { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_frozen_registry_rejects_new_types() {
        let registry = TypeRegistry::new();
        registry.register_descriptor(descriptor(1, "a")).unwrap();
        registry.freeze();
        assert!(registry.is_frozen());

        assert!(registry.register_descriptor(descriptor(1, "a")).is_ok());
        assert_eq!(
            registry.register_descriptor(descriptor(2, "b")).unwrap_err(),
            RegistryError::RegistryFrozen {
                type_id: ThingTypeId::from_u128(2)
            }
        );
    }

    #[test]
    fn test_inconsistent_descriptor_is_rejected() {
        let registry = TypeRegistry::new();
        let bad = SchemaDescriptor::builder(ThingTypeId::from_u128(9), "bad")
            .field(FieldSpec::required("x", ValueKind::Text))
            .field(FieldSpec::required("x", ValueKind::Integer))
            .build();
        assert!(matches!(
            registry.register_descriptor(bad),
            Err(RegistryError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_type_ids_are_sorted() {
        let registry = TypeRegistry::new();
        registry.register_descriptor(descriptor(5, "e")).unwrap();
        registry.register_descriptor(descriptor(3, "c")).unwrap();
        assert_eq!(
            registry.type_ids(),
            [ThingTypeId::from_u128(3), ThingTypeId::from_u128(5)]
        );
    }
}
