//! Catalogue of registered component types.
//!
//! The registry is populated during initialization and then shared
//! read-only (typically as `Arc<ComponentRegistry>` inside a
//! [`ComponentSerializer`](crate::ComponentSerializer)). Metadata is kept in
//! registration order so iteration is reproducible.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::component::{Component, DynComponent};
use crate::error::RegistryError;
use crate::metadata::ComponentMetadata;
use crate::naming::{AffixNaming, NamingStrategy};

/// Maps component types to their [`ComponentMetadata`] and every lookup
/// alias to its type.
///
/// # Example
///
/// ```
/// use ecs_persist::{Component, ComponentRegistry};
///
/// #[derive(Clone, Default, PartialEq, Component)]
/// struct HealthComponent {
///     hp: i32,
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry.register::<HealthComponent>().unwrap();
///
/// let meta = registry.metadata_by_name("health").unwrap();
/// assert_eq!(meta.canonical_name(), "Health");
/// assert!(registry.register::<HealthComponent>().is_err());
/// ```
pub struct ComponentRegistry {
    entries: Vec<ComponentMetadata>,
    by_type: HashMap<TypeId, usize>,
    /// Lower-cased alias -> entry index.
    by_alias: HashMap<String, usize>,
    naming: Box<dyn NamingStrategy>,
}

impl ComponentRegistry {
    /// Creates an empty registry using [`AffixNaming::default`].
    pub fn new() -> Self {
        Self::with_naming(AffixNaming::default())
    }

    /// Creates an empty registry with a custom naming strategy.
    pub fn with_naming(naming: impl NamingStrategy + 'static) -> Self {
        Self {
            entries: Vec::new(),
            by_type: HashMap::new(),
            by_alias: HashMap::new(),
            naming: Box::new(naming),
        }
    }

    /// Registers a component type.
    ///
    /// # Errors
    ///
    /// Rejects a type that is already registered, an alias already owned by
    /// another type, and duplicate field names. The registry is unchanged
    /// on error.
    pub fn register<T: Component + Default>(&mut self) -> Result<&ComponentMetadata, RegistryError> {
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::AlreadyRegistered { type_name: T::NAME });
        }

        let canonical = self.naming.canonical_name(T::NAME);
        let mut aliases = self.naming.names_for(T::NAME);
        if !aliases.contains(&canonical) {
            aliases.push(canonical.clone());
        }
        let mut keys: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in &aliases {
            let key = alias.to_lowercase();
            if keys.contains(&key) {
                continue;
            }
            if let Some(&existing) = self.by_alias.get(&key) {
                return Err(RegistryError::AliasConflict {
                    alias: alias.clone(),
                    existing: self.entries[existing].type_name(),
                    incoming: T::NAME,
                });
            }
            keys.push(key);
        }

        let metadata = ComponentMetadata::build::<T>(canonical, aliases)?;
        let index = self.entries.len();
        self.by_type.insert(metadata.type_id(), index);
        for key in keys {
            self.by_alias.insert(key, index);
        }
        log::debug!(
            "Registered component `{}` as `{}` with {} field(s)",
            metadata.type_name(),
            metadata.canonical_name(),
            metadata.fields().len()
        );
        self.entries.push(metadata);
        Ok(&self.entries[index])
    }

    pub fn metadata<T: 'static>(&self) -> Option<&ComponentMetadata> {
        self.metadata_by_type_id(TypeId::of::<T>())
    }

    pub fn metadata_by_type_id(&self, type_id: TypeId) -> Option<&ComponentMetadata> {
        self.by_type.get(&type_id).map(|&index| &self.entries[index])
    }

    /// Metadata for the runtime type of `component`.
    pub fn metadata_of(&self, component: &dyn DynComponent) -> Option<&ComponentMetadata> {
        self.metadata_by_type_id(component.runtime_type_id())
    }

    /// Metadata for any alias of a registered type, ignoring case.
    pub fn metadata_by_name(&self, name: &str) -> Option<&ComponentMetadata> {
        self.by_alias
            .get(&name.to_lowercase())
            .map(|&index| &self.entries[index])
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// The naming strategy used to derive wire names and aliases.
    pub fn naming(&self) -> &dyn NamingStrategy {
        self.naming.as_ref()
    }

    /// Creates a new instance of the same type with every described field
    /// cloned from `component`.
    ///
    /// Returns `None` (and logs an error) if the type is not registered.
    pub fn copy(&self, component: &dyn DynComponent) -> Option<Box<dyn DynComponent>> {
        let Some(metadata) = self.metadata_of(component) else {
            log::error!(
                "Unable to copy unregistered component type: {}",
                component.type_name()
            );
            return None;
        };

        let mut copy = metadata.new_instance();
        for field in metadata.fields() {
            if let Err(err) = field.access().copy(component, copy.as_mut()) {
                log::error!(
                    "Unable to copy field {} of component type {}: {}",
                    field.name(),
                    metadata.type_name(),
                    err
                );
                return None;
            }
        }
        Some(copy)
    }

    /// Registered metadata in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentMetadata> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ComponentRegistry {
    type Item = &'a ComponentMetadata;
    type IntoIter = std::slice::Iter<'a, ComponentMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|m| m.type_name()))
            .finish()
    }
}
