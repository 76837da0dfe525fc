//! The neutral serialized form of a component.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One component as written to the wire.
///
/// Carries a type designator (a compact id or a name) followed by the
/// encoded fields in declaration order. Components written by
/// [`ComponentSerializer`](crate::ComponentSerializer) carry exactly one
/// designator; when both are present the id wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireComponent {
    /// Name of the component type (any registered alias resolves).
    #[serde(default)]
    pub type_name: Option<String>,
    /// Id from the active [`ComponentIdTable`](crate::ComponentIdTable).
    #[serde(default)]
    pub type_id: Option<i32>,
    /// Encoded fields.
    #[serde(default)]
    pub fields: Vec<NameValue>,
}

/// A single encoded field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: Value,
}

/// How a [`WireComponent`] names its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDesignator<'a> {
    Id(i32),
    Name(&'a str),
    Missing,
}

impl std::fmt::Display for TypeDesignator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "with id {id}"),
            Self::Name(name) => write!(f, "named `{name}`"),
            Self::Missing => f.write_str("without designator"),
        }
    }
}

impl WireComponent {
    /// An empty component designated by name.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    /// An empty component designated by id.
    pub fn with_id(type_id: i32) -> Self {
        Self {
            type_id: Some(type_id),
            ..Self::default()
        }
    }

    /// Appends a field pair.
    pub fn push_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push(NameValue {
            name: name.into(),
            value,
        });
    }

    /// Builder form of [`push_field`](Self::push_field).
    pub fn field_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.push_field(name, value);
        self
    }

    /// The first value recorded under `name`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| &pair.value)
    }

    /// The designator the reader honours: the id if present, else the name.
    pub fn designator(&self) -> TypeDesignator<'_> {
        match (self.type_id, self.type_name.as_deref()) {
            (Some(id), _) => TypeDesignator::Id(id),
            (None, Some(name)) => TypeDesignator::Name(name),
            (None, None) => TypeDesignator::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_wins_over_name() {
        let mut wire = WireComponent::named("Position");
        assert_eq!(wire.designator(), TypeDesignator::Name("Position"));
        wire.type_id = Some(4);
        assert_eq!(wire.designator(), TypeDesignator::Id(4));
        assert_eq!(WireComponent::default().designator(), TypeDesignator::Missing);
    }

    #[test]
    fn field_lookup() {
        let wire = WireComponent::with_id(1)
            .field_value("x", Value::F32(1.0))
            .field_value("y", Value::F32(2.0));
        assert_eq!(wire.field("y"), Some(&Value::F32(2.0)));
        assert_eq!(wire.field("z"), None);
        assert_eq!(wire.fields.len(), 2);
    }

    #[test]
    fn designator_display() {
        assert_eq!(TypeDesignator::Id(3).to_string(), "with id 3");
        assert_eq!(TypeDesignator::Name("Foo").to_string(), "named `Foo`");
    }
}
