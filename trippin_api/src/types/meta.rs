//! Payload envelopes and the navigation-field marker.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A collection payload: `{"value": [...], "@odata.nextLink": "..."}`.
#[derive(Serialize, Deserialize)]
pub struct Collection<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// State of a navigation property on a materialized entity.
///
/// `NotLoaded` means the service was never asked for it. `Loaded(vec![])`
/// means it was asked and the relationship is empty.
#[derive(Clone, Debug, PartialEq)]
pub enum Navigation<T> {
    NotLoaded,
    Loaded(Vec<T>),
}

impl<T> Default for Navigation<T> {
    fn default() -> Self {
        Navigation::NotLoaded
    }
}

impl<T> Navigation<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Navigation::Loaded(_))
    }

    pub fn is_not_loaded(&self) -> bool {
        !self.is_loaded()
    }

    /// The loaded items, or `None` if the property was never loaded.
    pub fn as_loaded(&self) -> Option<&[T]> {
        match self {
            Navigation::NotLoaded => None,
            Navigation::Loaded(items) => Some(items),
        }
    }
}

impl<T: Serialize> Serialize for Navigation<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Navigation::NotLoaded => serializer.serialize_none(),
            Navigation::Loaded(items) => items.serialize(serializer),
        }
    }
}

// A navigation key present on the wire always means the service sent it.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Navigation<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Navigation::Loaded)
    }
}
