//! Entity metadata: the property tables queries are validated against.

use serde::de::DeserializeOwned;

use crate::query::Value;

/// What a property holds, as far as query validation cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Int,
    Float,
    Bool,
    DateTime,
    /// Enum property; carries the namespace-qualified enum type name.
    Enum(&'static str),
    /// Collection of primitives or complex values. Selectable, not filterable.
    Collection,
    /// Single complex value. Selectable, not filterable.
    Complex,
    Navigation,
}

impl PropertyKind {
    /// Whether the property can appear in `$filter` and `$orderby`.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            PropertyKind::Collection | PropertyKind::Complex | PropertyKind::Navigation
        )
    }
}

/// One row of an entity's property table.
#[derive(Clone, Copy, Debug)]
pub struct Property {
    pub name: &'static str,
    pub kind: PropertyKind,
}

impl Property {
    pub const fn new(name: &'static str, kind: PropertyKind) -> Self {
        Self { name, kind }
    }
}

/// Typed record materialized from an OData payload.
pub trait Entity: DeserializeOwned {
    /// Entity type name used in error messages (e.g. "Person").
    const TYPE_NAME: &'static str;

    /// Every structural and navigation property of the type.
    const PROPERTIES: &'static [Property];

    /// Looks up a property by its exact (case-sensitive) wire name.
    fn property(name: &str) -> Option<&'static Property> {
        Self::PROPERTIES.iter().find(|p| p.name == name)
    }

    /// Current value of a scalar property, for local evaluation.
    fn value(&self, property: &str) -> Option<Value>;

    /// Whether the named navigation property has been populated.
    fn is_loaded(&self, _navigation: &str) -> bool {
        false
    }

    /// Populates a navigation property from the array payload the service returned.
    fn set_navigation(
        &mut self,
        navigation: &str,
        _payload: serde_json::Value,
    ) -> Result<(), serde_json::Error> {
        tracing::warn!("{} has no navigation property {}", Self::TYPE_NAME, navigation);
        Ok(())
    }
}

/// Entity exposed through a top-level entity set.
pub trait EntitySet: Entity {
    /// Entity set name in the service root (e.g. "People").
    const NAME: &'static str;

    /// Wire name of the key property.
    const KEY: &'static str;

    fn key(&self) -> Key;
}

/// Entity key, rendered as an OData key literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    String(String),
    Int(i64),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Key::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_literals() {
        assert_eq!(Key::from("russellwhyte").to_string(), "'russellwhyte'");
        assert_eq!(Key::from("o'neil").to_string(), "'o''neil'");
        assert_eq!(Key::from(42).to_string(), "42");
    }

    #[test]
    fn scalar_kinds() {
        assert!(PropertyKind::String.is_scalar());
        assert!(PropertyKind::Enum("Ns.Type").is_scalar());
        assert!(!PropertyKind::Collection.is_scalar());
        assert!(!PropertyKind::Navigation.is_scalar());
    }
}
