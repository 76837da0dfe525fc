//! Component trait and its type-erased counterpart.
//!
//! [`Component`] is implemented per type, normally through
//! `#[derive(Component)]`, and exposes the field descriptors the registry
//! stores. [`DynComponent`] is blanket-implemented for every component so
//! the serializer can work on `&dyn DynComponent` / `Box<dyn DynComponent>`
//! without knowing the concrete type.

use std::any::{Any, TypeId};

use crate::field::FieldDescriptor;

/// A typed bundle of named fields describing one aspect of an entity.
///
/// # Deriving
///
/// ```ignore
/// #[derive(Clone, Default, Component)]
/// struct Health {
///     hp: i32,
///     #[field(tag = "server_only")]
///     regen: Option<f32>,
/// }
/// ```
///
/// # Manual implementation
///
/// ```ignore
/// impl Component for Marker {
///     const NAME: &'static str = "Marker";
///
///     fn field_descriptors() -> Vec<FieldDescriptor> {
///         vec![FieldDescriptor::new::<Self, u32>("level", |c| &c.level, |c| &mut c.level)]
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// The bare type name (e.g. `"HealthComponent"`).
    ///
    /// The registry derives the canonical wire name and every lookup alias
    /// from it through its naming strategy.
    const NAME: &'static str;

    /// Returns the bare type name.
    fn component_name(&self) -> &'static str {
        Self::NAME
    }

    /// Field descriptors in declaration order.
    ///
    /// Called once, when the type is registered.
    fn field_descriptors() -> Vec<FieldDescriptor>
    where
        Self: Sized;
}

/// Object-safe view of a [`Component`].
pub trait DynComponent: Any + Send + Sync + 'static {
    /// The bare type name of the concrete component.
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> DynComponent for T {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn DynComponent {
    /// The `TypeId` of the concrete component behind the trait object.
    pub fn runtime_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Recover the concrete box, handing the original back on mismatch.
    pub fn downcast<T: Component>(self: Box<Self>) -> Result<Box<T>, Box<dyn DynComponent>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let raw = Box::into_raw(self) as *mut T;
        // SAFETY: the concrete type behind the pointer was checked to be `T`
        // above, and the allocation came from a `Box` of that type.
        Ok(unsafe { Box::from_raw(raw) })
    }
}

impl std::fmt::Debug for dyn DynComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynComponent")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}
