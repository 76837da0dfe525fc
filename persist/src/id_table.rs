//! Compact integer ids standing in for component type names on the wire.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};

use crate::error::RegistryError;
use crate::registry::ComponentRegistry;

/// Bidirectional `TypeId` <-> `i32` map.
///
/// An empty table means types are written by name. Install one on a
/// serializer with [`ComponentSerializer::set_id_mapping`](crate::ComponentSerializer::set_id_mapping).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentIdTable {
    by_type: HashMap<TypeId, i32>,
    by_id: BTreeMap<i32, TypeId>,
}

impl ComponentIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `id` to every registered type in registration order,
    /// starting at 0.
    pub fn from_registry(registry: &ComponentRegistry) -> Self {
        let mut table = Self::new();
        for (id, metadata) in (0..).zip(registry.iter()) {
            table.by_type.insert(metadata.type_id(), id);
            table.by_id.insert(id, metadata.type_id());
        }
        table
    }

    pub fn insert<T: 'static>(&mut self, id: i32) -> Result<(), RegistryError> {
        self.insert_type_id(TypeId::of::<T>(), id)
    }

    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if `id` is taken and
    /// [`RegistryError::AlreadyMapped`] if the type already has an id.
    pub fn insert_type_id(&mut self, type_id: TypeId, id: i32) -> Result<(), RegistryError> {
        if self.by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateId { id });
        }
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Err(RegistryError::AlreadyMapped { id: existing });
        }
        self.by_type.insert(type_id, id);
        self.by_id.insert(id, type_id);
        Ok(())
    }

    pub fn id_of(&self, type_id: TypeId) -> Option<i32> {
        self.by_type.get(&type_id).copied()
    }

    pub fn type_of(&self, id: i32) -> Option<TypeId> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// `(id, type)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, TypeId)> + '_ {
        self.by_id.iter().map(|(&id, &type_id)| (id, type_id))
    }
}
