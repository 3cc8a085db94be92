//! Trips, reachable through `Person.Trips`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{Entity, Property, PropertyKind};
use crate::query::Value;

/// A trip planned by a person.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Trip {
    /// Identifier, unique per owning person.
    pub trip_id: i64,

    #[serde(default)]
    pub share_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub budget: f64,

    #[serde(default)]
    pub starts_at: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub ends_at: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity for Trip {
    const TYPE_NAME: &'static str = "Trip";

    const PROPERTIES: &'static [Property] = &[
        Property::new("TripId", PropertyKind::Int),
        Property::new("ShareId", PropertyKind::String),
        Property::new("Description", PropertyKind::String),
        Property::new("Name", PropertyKind::String),
        Property::new("Budget", PropertyKind::Float),
        Property::new("StartsAt", PropertyKind::DateTime),
        Property::new("EndsAt", PropertyKind::DateTime),
        Property::new("Tags", PropertyKind::Collection),
    ];

    fn value(&self, property: &str) -> Option<Value> {
        let optional = |v: &Option<String>| v.as_deref().map_or(Value::Null, Value::from);
        Some(match property {
            "TripId" => Value::Int(self.trip_id),
            "ShareId" => optional(&self.share_id),
            "Description" => optional(&self.description),
            "Name" => Value::from(self.name.as_str()),
            "Budget" => Value::Float(self.budget),
            "StartsAt" => self.starts_at.map_or(Value::Null, Value::DateTime),
            "EndsAt" => self.ends_at.map_or(Value::Null, Value::DateTime),
            _ => return None,
        })
    }
}
