//! Error types for the registry, the field codecs and the serializer.
//!
//! The serializer never lets these escape its plain entry points; they
//! surface through the `try_*` variants and [`Report`](crate::Report).

use std::fmt;

use thiserror::Error;

/// Failure converting a raw field value to or from a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl serde::ser::Error for CodecError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(msg.to_string())
    }
}

impl serde::de::Error for CodecError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::new(msg.to_string())
    }
}

/// Failure reading, writing or encoding a single field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The field codec rejected the value.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// The instance handed to the descriptor is not of the descriptor's type.
    #[error("instance is not a `{expected}`")]
    Access { expected: &'static str },
    /// A value that differs from the baseline encoded to null and cannot be sent.
    #[error("value differs from baseline but encodes to null")]
    NullEncoding,
}

/// A field that was skipped while processing a component.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    pub field: String,
    pub error: FieldError,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// Component-level outcome that prevents producing any result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComponentError {
    /// The component's runtime type was never registered.
    #[error("unregistered component type `{type_name}`")]
    UnregisteredType { type_name: &'static str },
    /// The wire designator does not resolve to a registered type.
    #[error("unable to resolve component {designator}")]
    UnresolvableType { designator: String },
    /// The wire component carries neither an id nor a name.
    #[error("component has no type designator")]
    MissingTypeDesignator,
    /// A delta was requested between instances of different types.
    #[error("cannot diff `{base}` against `{delta}`")]
    MismatchedTypes {
        base: &'static str,
        delta: &'static str,
    },
    /// Delta serialization found no differing field. Not a fault.
    #[error("no field differs from the baseline")]
    NoChange,
}

/// Errors raised while building a [`ComponentRegistry`](crate::ComponentRegistry)
/// or a [`ComponentIdTable`](crate::ComponentIdTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("component `{type_name}` is already registered")]
    AlreadyRegistered { type_name: &'static str },
    #[error("alias `{alias}` of `{incoming}` is already used by `{existing}`")]
    AliasConflict {
        alias: String,
        existing: &'static str,
        incoming: &'static str,
    },
    #[error("component `{component}` declares field `{field}` twice")]
    DuplicateField {
        component: &'static str,
        field: &'static str,
    },
    #[error("component id {id} is already assigned")]
    DuplicateId { id: i32 },
    #[error("component type already has id {id}")]
    AlreadyMapped { id: i32 },
}

/// Failure converting [`WireComponent`](crate::WireComponent)s to or from bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot write components as {format}: {message}")]
    Write { format: &'static str, message: String },
    #[error("cannot read components from {format}: {message}")]
    Read { format: &'static str, message: String },
}
