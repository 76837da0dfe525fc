//! Field descriptors and field codecs.
//!
//! A [`FieldDescriptor`] is built by `#[derive(Component)]` from a pair of
//! accessor functions (`&C -> &F`, `&mut C -> &mut F`) and a codec. The
//! concrete `C` and `F` are erased behind [`ErasedField`] so the registry
//! can store descriptors of every component type side by side and the
//! serializer can drive them through `&dyn DynComponent`.
//!
//! # Codecs
//!
//! [`SerdeCodec`] is used for every field unless the derive names another
//! one with `#[field(codec = ...)]`. A codec that encodes a raw value to
//! [`Value::Null`] marks the field as unset; decoding `Value::Null`
//! yields `None`, which leaves the target field untouched.
//!
//! Null carries no nesting, so [`SerdeCodec`] folds every null-like value
//! into it: `None`, the inner `Some(None)` of an `Option<Option<T>>`, `()`
//! and unit structs. Such fields are omitted on serialize and keep their
//! previous value on deserialize. A field that must tell these apart needs
//! its own [`FieldCodec`].

use std::fmt;

use crate::component::{Component, DynComponent};
use crate::error::{CodecError, FieldError};
use crate::value::{self, Value};

/// Per-field encode/decode between a raw value and a wire [`Value`].
pub trait FieldCodec<F>: Send + Sync + 'static {
    fn encode(&self, raw: &F) -> Result<Value, CodecError>;

    /// `Ok(None)` means the wire value is null and the field must not change.
    fn decode(&self, value: &Value) -> Result<Option<F>, CodecError>;
}

/// Default codec bridging any serde type through [`value::to_value`] /
/// [`value::from_value`].
///
/// `Some(None)`, `()` and unit structs encode to [`Value::Null`] just like
/// `None`, so they read back as "unset" rather than as themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeCodec;

impl<F> FieldCodec<F> for SerdeCodec
where
    F: serde::Serialize + serde::de::DeserializeOwned,
{
    fn encode(&self, raw: &F) -> Result<Value, CodecError> {
        value::to_value(raw)
    }

    fn decode(&self, value: &Value) -> Result<Option<F>, CodecError> {
        if value.is_null() {
            return Ok(None);
        }
        value::from_value(value.clone()).map(Some)
    }
}

/// Bounds every field type must meet: value comparison for deltas and
/// cloning for [`ComponentRegistry::copy`](crate::ComponentRegistry::copy).
pub trait FieldType: PartialEq + Clone + Send + Sync + 'static {}

impl<T: PartialEq + Clone + Send + Sync + 'static> FieldType for T {}

/// Type-erased field operations against a component instance.
///
/// Every method fails with [`FieldError::Access`] when handed an instance
/// of another component type.
pub trait ErasedField: Send + Sync {
    /// Encode the field's current value.
    fn encode(&self, component: &dyn DynComponent) -> Result<Value, FieldError>;

    /// Decode `value` and store it. Returns `false` if the value was null
    /// and the field was left unmodified.
    fn decode_into(&self, component: &mut dyn DynComponent, value: &Value)
    -> Result<bool, FieldError>;

    /// Compare the field between two instances.
    fn equals(&self, a: &dyn DynComponent, b: &dyn DynComponent) -> Result<bool, FieldError>;

    /// Clone the field from `src` into `dst`.
    fn copy(&self, src: &dyn DynComponent, dst: &mut dyn DynComponent) -> Result<(), FieldError>;
}

struct TypedField<C, F, K> {
    get: fn(&C) -> &F,
    get_mut: fn(&mut C) -> &mut F,
    codec: K,
}

impl<C, F, K> TypedField<C, F, K>
where
    C: Component,
    F: FieldType,
    K: FieldCodec<F>,
{
    fn read<'a>(&self, component: &'a dyn DynComponent) -> Result<&'a F, FieldError> {
        component
            .as_any()
            .downcast_ref::<C>()
            .map(self.get)
            .ok_or(FieldError::Access { expected: C::NAME })
    }

    fn write<'a>(&self, component: &'a mut dyn DynComponent) -> Result<&'a mut F, FieldError> {
        component
            .as_any_mut()
            .downcast_mut::<C>()
            .map(self.get_mut)
            .ok_or(FieldError::Access { expected: C::NAME })
    }
}

impl<C, F, K> ErasedField for TypedField<C, F, K>
where
    C: Component,
    F: FieldType,
    K: FieldCodec<F>,
{
    fn encode(&self, component: &dyn DynComponent) -> Result<Value, FieldError> {
        Ok(self.codec.encode(self.read(component)?)?)
    }

    fn decode_into(
        &self,
        component: &mut dyn DynComponent,
        value: &Value,
    ) -> Result<bool, FieldError> {
        // Resolve the target first so a type mismatch is reported even for null values.
        let slot = self.write(component)?;
        match self.codec.decode(value)? {
            Some(decoded) => {
                *slot = decoded;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn equals(&self, a: &dyn DynComponent, b: &dyn DynComponent) -> Result<bool, FieldError> {
        Ok(self.read(a)? == self.read(b)?)
    }

    fn copy(&self, src: &dyn DynComponent, dst: &mut dyn DynComponent) -> Result<(), FieldError> {
        let value = self.read(src)?.clone();
        *self.write(dst)? = value;
        Ok(())
    }
}

/// Metadata and accessors for one component field.
pub struct FieldDescriptor {
    name: &'static str,
    type_name: &'static str,
    tags: &'static [&'static str],
    access: Box<dyn ErasedField>,
}

impl FieldDescriptor {
    /// Describe a field using the default [`SerdeCodec`].
    pub fn new<C, F>(name: &'static str, get: fn(&C) -> &F, get_mut: fn(&mut C) -> &mut F) -> Self
    where
        C: Component,
        F: FieldType + serde::Serialize + serde::de::DeserializeOwned,
    {
        Self::with_codec(name, get, get_mut, SerdeCodec)
    }

    /// Describe a field with an explicit codec.
    pub fn with_codec<C, F, K>(
        name: &'static str,
        get: fn(&C) -> &F,
        get_mut: fn(&mut C) -> &mut F,
        codec: K,
    ) -> Self
    where
        C: Component,
        F: FieldType,
        K: FieldCodec<F>,
    {
        Self {
            name,
            type_name: std::any::type_name::<F>(),
            tags: &[],
            access: Box::new(TypedField { get, get_mut, codec }),
        }
    }

    /// Attach policy tags consulted by [`FieldSerializeCheck`](crate::FieldSerializeCheck)s.
    pub fn with_tags(mut self, tags: &'static [&'static str]) -> Self {
        self.tags = tags;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust type name of the field value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    /// Type-erased accessor and codec.
    pub fn access(&self) -> &dyn ErasedField {
        self.access.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
