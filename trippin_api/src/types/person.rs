//! People entity set and its complex types.

use serde::{Deserialize, Serialize};

use super::{Entity, EntitySet, Key, Navigation, Property, PropertyKind, Trip};
use crate::query::Value;

/// A registered TripPin user. Keyed by `UserName`.
///
/// Structural properties other than the key default when absent so that a
/// `$select` projection still materializes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    /// Unique user name (e.g. "russellwhyte").
    pub user_name: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub emails: Vec<String>,

    #[serde(default)]
    pub address_info: Vec<Location>,

    /// `None` only when the property was not selected or sent as null.
    #[serde(default)]
    pub gender: Option<PersonGender>,

    /// Optimistic concurrency token maintained by the service.
    #[serde(default)]
    pub concurrency: i64,

    #[serde(default, skip_serializing_if = "Navigation::is_not_loaded")]
    pub trips: Navigation<Trip>,

    #[serde(default, skip_serializing_if = "Navigation::is_not_loaded")]
    pub friends: Navigation<Person>,
}

impl Entity for Person {
    const TYPE_NAME: &'static str = "Person";

    const PROPERTIES: &'static [Property] = &[
        Property::new("UserName", PropertyKind::String),
        Property::new("FirstName", PropertyKind::String),
        Property::new("LastName", PropertyKind::String),
        Property::new("Emails", PropertyKind::Collection),
        Property::new("AddressInfo", PropertyKind::Collection),
        Property::new("Gender", PropertyKind::Enum(PersonGender::TYPE_NAME)),
        Property::new("Concurrency", PropertyKind::Int),
        Property::new("Trips", PropertyKind::Navigation),
        Property::new("Friends", PropertyKind::Navigation),
    ];

    fn value(&self, property: &str) -> Option<Value> {
        Some(match property {
            "UserName" => Value::from(self.user_name.as_str()),
            "FirstName" => Value::from(self.first_name.as_str()),
            "LastName" => Value::from(self.last_name.as_str()),
            "Gender" => self.gender.map_or(Value::Null, Value::from),
            "Concurrency" => Value::Int(self.concurrency),
            _ => return None,
        })
    }

    fn is_loaded(&self, navigation: &str) -> bool {
        match navigation {
            "Trips" => self.trips.is_loaded(),
            "Friends" => self.friends.is_loaded(),
            _ => false,
        }
    }

    fn set_navigation(
        &mut self,
        navigation: &str,
        payload: serde_json::Value,
    ) -> Result<(), serde_json::Error> {
        match navigation {
            "Trips" => self.trips = Navigation::Loaded(serde_json::from_value(payload)?),
            "Friends" => self.friends = Navigation::Loaded(serde_json::from_value(payload)?),
            _ => tracing::warn!("Person has no navigation property {}", navigation),
        }
        Ok(())
    }
}

impl EntitySet for Person {
    const NAME: &'static str = "People";
    const KEY: &'static str = "UserName";

    fn key(&self) -> Key {
        Key::String(self.user_name.clone())
    }
}

/// Closed set of genders the service defines. Unknown wire values are a
/// deserialization error.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonGender {
    Male = 0,
    Female = 1,
    Unknown = 2,
}

impl PersonGender {
    /// Namespace-qualified enum type name used in filter literals.
    pub const TYPE_NAME: &'static str = "Microsoft.OData.SampleService.Models.TripPin.PersonGender";
}

impl std::fmt::Display for PersonGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PersonGender::Male => "Male",
                PersonGender::Female => "Female",
                PersonGender::Unknown => "Unknown",
            }
        )
    }
}

impl From<PersonGender> for Value {
    fn from(gender: PersonGender) -> Self {
        Value::Enum {
            type_name: PersonGender::TYPE_NAME,
            member: gender.to_string(),
            value: gender as i64,
        }
    }
}

/// Postal address entry in `AddressInfo`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    #[serde(default)]
    pub address: Option<String>,
    pub city: Option<City>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct City {
    pub country_region: String,
    pub name: String,
    pub region: String,
}
