//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping upstream client errors
/// and adding configuration and input validation failures.
#[derive(Debug)]
pub enum TripPinError {
    /// An error from the underlying OData client.
    Api(trippin_api::Error),
    /// An environment setting could not be parsed.
    Config(String),
    /// JSON serialization failed while projecting an entity.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl TripPinError {
    /// The upstream client error, if this is one.
    pub fn api(&self) -> Option<&trippin_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for TripPinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "OData error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for TripPinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<trippin_api::Error> for TripPinError {
    fn from(e: trippin_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<serde_json::Error> for TripPinError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
