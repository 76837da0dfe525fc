//! # ECS Persist
//!
//! Metadata-driven serialization of ECS components without hand-written
//! per-type code.
//!
//! ## Core Types
//!
//! - [`Component`]: Typed bundle of named fields, usually derived
//! - [`ComponentRegistry`]: Catalogue of component types and their field metadata
//! - [`ComponentSerializer`]: Serialize, delta-serialize and deserialize components
//! - [`WireComponent`] / [`Value`]: Neutral wire form of a component
//!
//! ## Policy
//!
//! - [`ComponentIdTable`]: Compact integer ids substituted for type names
//! - [`FieldSerializeCheck`]: Per-call field filter ([`AcceptAll`], [`ExcludeTagged`])
//! - [`FieldCodec`]: Per-field encoding, [`SerdeCodec`] by default
//! - [`NamingStrategy`]: Wire names and lookup aliases ([`AffixNaming`])
//!
//! ## Byte formats
//!
//! [`format::encode_components`] / [`format::decode_components`] frame a
//! batch of [`WireComponent`]s as RON (`serialize-ron` feature) or bincode
//! (`serialize-bincode` feature).
//!
//! ## Logging
//!
//! Diagnostics go through the `log` facade; no logger is installed here.

mod check;
mod component;
mod error;
pub mod field;
pub mod format;
mod id_table;
mod metadata;
mod naming;
mod registry;
mod serializer;
pub mod value;
mod wire;

pub use check::{AcceptAll, ExcludeTagged, FieldSerializeCheck};
pub use component::{Component, DynComponent};
pub use ecs_persist_macro::Component;
pub use error::{CodecError, ComponentError, FieldError, FieldFailure, FormatError, RegistryError};
pub use field::{FieldCodec, FieldDescriptor, FieldType, SerdeCodec};
pub use format::Format;
pub use id_table::ComponentIdTable;
pub use metadata::ComponentMetadata;
pub use naming::{AffixNaming, NamingStrategy};
pub use registry::ComponentRegistry;
pub use serializer::{ComponentSerializer, Report};
pub use value::Value;
pub use wire::{NameValue, TypeDesignator, WireComponent};
