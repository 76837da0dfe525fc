//! Serialization of components to and from [`WireComponent`]s.
//!
//! The serializer walks the field descriptors stored in the
//! [`ComponentRegistry`] and encodes each field through its codec, so no
//! per-type serialization code is written by hand.
//!
//! # Entry points
//!
//! Every operation comes in two forms:
//!
//! - the plain form (`serialize`, `deserialize`, ...) returns an `Option`
//!   and never fails loudly. Problems are logged and the offending field
//!   or component is skipped.
//! - the `try_` form returns `Result<Report<T>, ComponentError>`, where the
//!   [`Report`] lists every field that was skipped. Logging happens here,
//!   so both forms log the same events.
//!
//! # Type designators
//!
//! A serialized component names its type with the id from the installed
//! [`ComponentIdTable`] when that table maps the type, and with the
//! canonical name otherwise. On read the id takes precedence; an id never
//! falls back to name lookup.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::check::{AcceptAll, FieldSerializeCheck};
use crate::component::DynComponent;
use crate::error::{ComponentError, FieldError, FieldFailure};
use crate::id_table::ComponentIdTable;
use crate::metadata::ComponentMetadata;
use crate::registry::ComponentRegistry;
use crate::value::Value;
use crate::wire::{TypeDesignator, WireComponent};

/// Result of an operation together with the fields it had to skip.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub value: T,
    pub skipped: Vec<FieldFailure>,
}

impl<T> Report<T> {
    /// No field was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Converts components to and from their wire form.
///
/// The registry is shared and read-only. The id table is held as a
/// snapshot that can be swapped at any time with
/// [`set_id_mapping`](Self::set_id_mapping); each call reads it once, so a
/// swap never affects a call already in progress.
///
/// # Example
///
/// ```
/// use ecs_persist::{Component, ComponentIdTable, ComponentRegistry, ComponentSerializer};
///
/// #[derive(Clone, Default, PartialEq, Debug, Component)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry.register::<Position>().unwrap();
/// let serializer = ComponentSerializer::new(registry);
///
/// let wire = serializer.serialize(&Position { x: 1.0, y: 2.0 }).unwrap();
/// assert_eq!(wire.type_name.as_deref(), Some("Position"));
///
/// let mut table = ComponentIdTable::new();
/// table.insert::<Position>(3).unwrap();
/// serializer.set_id_mapping(table);
/// let wire = serializer.serialize(&Position { x: 1.0, y: 2.0 }).unwrap();
/// assert_eq!(wire.type_id, Some(3));
///
/// let restored = serializer.deserialize(&wire).unwrap();
/// assert_eq!(restored.downcast_ref::<Position>(), Some(&Position { x: 1.0, y: 2.0 }));
/// ```
pub struct ComponentSerializer {
    registry: Arc<ComponentRegistry>,
    id_table: RwLock<Arc<ComponentIdTable>>,
}

impl ComponentSerializer {
    /// Creates a serializer that writes types by name.
    pub fn new(registry: impl Into<Arc<ComponentRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            id_table: RwLock::new(Arc::new(ComponentIdTable::new())),
        }
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Replaces the id table. Later calls write ids for mapped types.
    pub fn set_id_mapping(&self, table: impl Into<Arc<ComponentIdTable>>) {
        *self.id_table.write() = table.into();
    }

    /// Reverts to writing every type by name.
    pub fn clear_id_mapping(&self) {
        *self.id_table.write() = Arc::new(ComponentIdTable::new());
    }

    /// The current id table snapshot.
    pub fn id_mapping(&self) -> Arc<ComponentIdTable> {
        Arc::clone(&self.id_table.read())
    }

    // ---------------------------------------------------------------------
    // Serialize
    // ---------------------------------------------------------------------

    /// Serializes every field of `component`.
    ///
    /// Returns `None` if the component type is not registered.
    pub fn serialize(&self, component: &dyn DynComponent) -> Option<WireComponent> {
        self.serialize_with(component, &AcceptAll)
    }

    /// Serializes the fields of `component` accepted by `check`.
    pub fn serialize_with<K>(&self, component: &dyn DynComponent, check: &K) -> Option<WireComponent>
    where
        K: FieldSerializeCheck + ?Sized,
    {
        self.try_serialize_with(component, check)
            .ok()
            .map(Report::into_value)
    }

    pub fn try_serialize(
        &self,
        component: &dyn DynComponent,
    ) -> Result<Report<WireComponent>, ComponentError> {
        self.try_serialize_with(component, &AcceptAll)
    }

    /// Fields encoding to [`Value::Null`] are omitted. Fields whose codec
    /// fails are logged and reported in [`Report::skipped`].
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnregisteredType`] if the component type is not
    /// registered.
    pub fn try_serialize_with<K>(
        &self,
        component: &dyn DynComponent,
        check: &K,
    ) -> Result<Report<WireComponent>, ComponentError>
    where
        K: FieldSerializeCheck + ?Sized,
    {
        let metadata = self.registered(component)?;
        let table = self.id_mapping();
        let mut wire = designate(&table, metadata);
        let mut skipped = Vec::new();

        for field in metadata.fields() {
            if !check.should_serialize(field, component) {
                continue;
            }
            match field.access().encode(component) {
                Ok(Value::Null) => {}
                Ok(value) => wire.push_field(field.name(), value),
                Err(error) => {
                    log::error!(
                        "Unable to serialize field {} of component type {}: {}",
                        field.name(),
                        metadata.type_name(),
                        error
                    );
                    skipped.push(FieldFailure {
                        field: field.name().to_owned(),
                        error,
                    });
                }
            }
        }

        Ok(Report {
            value: wire,
            skipped,
        })
    }

    // ---------------------------------------------------------------------
    // Delta
    // ---------------------------------------------------------------------

    /// Serializes the fields of `delta` that differ from `base`.
    ///
    /// Returns `None` if nothing differs, as well as on failure.
    pub fn serialize_delta(
        &self,
        base: &dyn DynComponent,
        delta: &dyn DynComponent,
    ) -> Option<WireComponent> {
        self.serialize_delta_with(base, delta, &AcceptAll)
    }

    pub fn serialize_delta_with<K>(
        &self,
        base: &dyn DynComponent,
        delta: &dyn DynComponent,
        check: &K,
    ) -> Option<WireComponent>
    where
        K: FieldSerializeCheck + ?Sized,
    {
        self.try_serialize_delta_with(base, delta, check)
            .ok()
            .map(Report::into_value)
    }

    pub fn try_serialize_delta(
        &self,
        base: &dyn DynComponent,
        delta: &dyn DynComponent,
    ) -> Result<Report<WireComponent>, ComponentError> {
        self.try_serialize_delta_with(base, delta, &AcceptAll)
    }

    /// Fields are compared with `PartialEq`, so a float field holding NaN
    /// always counts as changed. The check is consulted with `delta`.
    ///
    /// A differing field that fails to encode, or encodes to null, is
    /// logged and skipped without counting as a change.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::UnregisteredType`] if `base`'s type is not registered.
    /// - [`ComponentError::MismatchedTypes`] if `delta` is of another type.
    /// - [`ComponentError::NoChange`] if no field was written.
    pub fn try_serialize_delta_with<K>(
        &self,
        base: &dyn DynComponent,
        delta: &dyn DynComponent,
        check: &K,
    ) -> Result<Report<WireComponent>, ComponentError>
    where
        K: FieldSerializeCheck + ?Sized,
    {
        let metadata = self.registered(base)?;
        if !metadata.describes(delta) {
            log::error!(
                "Unable to diff component type {} against {}",
                base.type_name(),
                delta.type_name()
            );
            return Err(ComponentError::MismatchedTypes {
                base: base.type_name(),
                delta: delta.type_name(),
            });
        }

        let table = self.id_mapping();
        let mut wire = designate(&table, metadata);
        let mut skipped = Vec::new();
        let mut changed = false;

        for field in metadata.fields() {
            if !check.should_serialize(field, delta) {
                continue;
            }
            let encoded = match field.access().equals(base, delta) {
                Ok(true) => continue,
                Ok(false) => match field.access().encode(delta) {
                    Ok(Value::Null) => Err(FieldError::NullEncoding),
                    other => other,
                },
                Err(error) => Err(error),
            };
            match encoded {
                Ok(value) => {
                    wire.push_field(field.name(), value);
                    changed = true;
                }
                Err(error) => {
                    log::error!(
                        "Unable to serialize field {} of component type {}: {}",
                        field.name(),
                        metadata.type_name(),
                        error
                    );
                    skipped.push(FieldFailure {
                        field: field.name().to_owned(),
                        error,
                    });
                }
            }
        }

        if !changed {
            log::trace!("No change in component type {}", metadata.type_name());
            return Err(ComponentError::NoChange);
        }
        Ok(Report {
            value: wire,
            skipped,
        })
    }

    // ---------------------------------------------------------------------
    // Deserialize
    // ---------------------------------------------------------------------

    /// Creates a default instance of the designated type and applies the
    /// wire fields to it.
    ///
    /// Returns `None` if the type cannot be resolved.
    pub fn deserialize(&self, wire: &WireComponent) -> Option<Box<dyn DynComponent>> {
        self.try_deserialize(wire).ok().map(Report::into_value)
    }

    /// # Errors
    ///
    /// Any resolution error of [`try_resolve_component`](Self::try_resolve_component).
    pub fn try_deserialize(
        &self,
        wire: &WireComponent,
    ) -> Result<Report<Box<dyn DynComponent>>, ComponentError> {
        let metadata = self.try_resolve_component(wire)?;
        let mut component = metadata.new_instance();
        let skipped = merge(metadata, component.as_mut(), wire);
        Ok(Report {
            value: component,
            skipped,
        })
    }

    /// Applies the wire fields to `target` and returns it.
    ///
    /// Fields absent from the wire, unknown to the type, null, or failing
    /// to decode leave the target unmodified. The wire type is not checked
    /// against the target's type; if they differ every field fails.
    pub fn deserialize_onto<'a>(
        &self,
        target: &'a mut dyn DynComponent,
        wire: &WireComponent,
    ) -> &'a mut dyn DynComponent {
        let _ = self.try_deserialize_onto(target, wire);
        target
    }

    /// # Errors
    ///
    /// Any resolution error of [`try_resolve_component`](Self::try_resolve_component);
    /// `target` is untouched in that case.
    pub fn try_deserialize_onto(
        &self,
        target: &mut dyn DynComponent,
        wire: &WireComponent,
    ) -> Result<Report<()>, ComponentError> {
        let metadata = self.try_resolve_component(wire)?;
        let skipped = merge(metadata, target, wire);
        Ok(Report { value: (), skipped })
    }

    // ---------------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------------

    /// The registered type the wire component designates, if any.
    pub fn resolve_component(&self, wire: &WireComponent) -> Option<&ComponentMetadata> {
        self.try_resolve_component(wire).ok()
    }

    /// Resolves the id if present (through the id table only), otherwise
    /// the name (through any registered alias, ignoring case). Logs one
    /// warning on failure.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnresolvableType`] or
    /// [`ComponentError::MissingTypeDesignator`].
    pub fn try_resolve_component(
        &self,
        wire: &WireComponent,
    ) -> Result<&ComponentMetadata, ComponentError> {
        let designator = wire.designator();
        let metadata = match designator {
            TypeDesignator::Id(id) => self
                .id_mapping()
                .type_of(id)
                .and_then(|type_id| self.registry.metadata_by_type_id(type_id)),
            TypeDesignator::Name(name) => self.registry.metadata_by_name(name),
            TypeDesignator::Missing => {
                log::warn!("Unable to deserialize component, no type provided");
                return Err(ComponentError::MissingTypeDesignator);
            }
        };
        metadata.ok_or_else(|| {
            log::warn!("Unable to deserialize unknown component {designator}");
            ComponentError::UnresolvableType {
                designator: designator.to_string(),
            }
        })
    }

    fn registered(&self, component: &dyn DynComponent) -> Result<&ComponentMetadata, ComponentError> {
        self.registry.metadata_of(component).ok_or_else(|| {
            log::error!("Unregistered component type: {}", component.type_name());
            ComponentError::UnregisteredType {
                type_name: component.type_name(),
            }
        })
    }
}

impl fmt::Debug for ComponentSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSerializer")
            .field("registry", &self.registry)
            .field("id_table", &self.id_mapping())
            .finish()
    }
}

fn designate(table: &ComponentIdTable, metadata: &ComponentMetadata) -> WireComponent {
    match table.id_of(metadata.type_id()) {
        Some(id) => WireComponent::with_id(id),
        None => WireComponent::named(metadata.canonical_name()),
    }
}

/// Applies known wire fields onto `target`. Failures are logged once for
/// the whole component.
fn merge(
    metadata: &ComponentMetadata,
    target: &mut dyn DynComponent,
    wire: &WireComponent,
) -> Vec<FieldFailure> {
    let mut skipped = Vec::new();
    for pair in &wire.fields {
        let Some(field) = metadata.field(&pair.name) else {
            continue;
        };
        if let Err(error) = field.access().decode_into(target, &pair.value) {
            skipped.push(FieldFailure {
                field: pair.name.clone(),
                error,
            });
        }
    }

    if !skipped.is_empty() {
        let details: Vec<String> = skipped.iter().map(ToString::to_string).collect();
        log::error!(
            "Unable to deserialize {} field(s) of component type {}: {}",
            skipped.len(),
            metadata.type_name(),
            details.join("; ")
        );
    }
    skipped
}
