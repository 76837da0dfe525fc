//! Per-type component metadata built at registration.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::component::{Component, DynComponent};
use crate::error::RegistryError;
use crate::field::FieldDescriptor;

/// Everything the serializer needs to know about one component type.
pub struct ComponentMetadata {
    type_id: TypeId,
    type_name: &'static str,
    canonical_name: String,
    aliases: Vec<String>,
    fields: Vec<FieldDescriptor>,
    field_index: HashMap<&'static str, usize>,
    factory: fn() -> Box<dyn DynComponent>,
}

impl ComponentMetadata {
    pub(crate) fn build<T: Component + Default>(
        canonical_name: String,
        aliases: Vec<String>,
    ) -> Result<Self, RegistryError> {
        let fields = T::field_descriptors();
        let mut field_index = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if field_index.insert(field.name(), index).is_some() {
                return Err(RegistryError::DuplicateField {
                    component: T::NAME,
                    field: field.name(),
                });
            }
        }

        Ok(Self {
            type_id: TypeId::of::<T>(),
            type_name: T::NAME,
            canonical_name,
            aliases,
            fields,
            field_index,
            factory: || -> Box<dyn DynComponent> { Box::new(T::default()) },
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The bare type name ([`Component::NAME`]).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The name written to the wire when no id is assigned.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Every name this type answers to in by-name lookup.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_index.get(name).map(|&index| &self.fields[index])
    }

    /// A fresh default instance.
    pub fn new_instance(&self) -> Box<dyn DynComponent> {
        (self.factory)()
    }

    /// Whether `component` is an instance of this type.
    pub fn describes(&self, component: &dyn DynComponent) -> bool {
        component.runtime_type_id() == self.type_id
    }
}

impl fmt::Debug for ComponentMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMetadata")
            .field("type_name", &self.type_name)
            .field("canonical_name", &self.canonical_name)
            .field("aliases", &self.aliases)
            .field("fields", &self.fields)
            .finish()
    }
}
