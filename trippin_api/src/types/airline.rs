use serde::{Deserialize, Serialize};

use super::{Entity, EntitySet, Key, Property, PropertyKind};
use crate::query::Value;

/// An airline, keyed by its IATA code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Airline {
    pub airline_code: String,

    #[serde(default)]
    pub name: String,
}

impl Entity for Airline {
    const TYPE_NAME: &'static str = "Airline";

    const PROPERTIES: &'static [Property] = &[
        Property::new("AirlineCode", PropertyKind::String),
        Property::new("Name", PropertyKind::String),
    ];

    fn value(&self, property: &str) -> Option<Value> {
        match property {
            "AirlineCode" => Some(Value::from(self.airline_code.as_str())),
            "Name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }
}

impl EntitySet for Airline {
    const NAME: &'static str = "Airlines";
    const KEY: &'static str = "AirlineCode";

    fn key(&self) -> Key {
        Key::String(self.airline_code.clone())
    }
}
